#![doc = include_str!("../README.md")]
//!

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(any(), deny(clippy::unwrap_used))]

pub mod constants;
pub mod crypto;
pub mod keys;
pub mod name;
pub mod record;
pub mod registry;
pub mod zonefile;
