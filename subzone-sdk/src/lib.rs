#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(any(), deny(clippy::unwrap_used))]

pub mod backend;
mod builder;
pub mod errors;
mod registrar;
mod resolver;

#[cfg(test)]
mod test_support;

// --- PUBLIC API EXPORTS ---
// High level actors
pub use registrar::Registrar;
pub use resolver::{Profile, Resolver};

// Builder and errors
pub use builder::{BuildError, SubzoneBuilder};
pub use errors::{BackendError, BoxError, Error, PublishError, Result};

// Re-exports of the protocol core
pub use subzone_common::{
    crypto::{Keypair, PublicKey},
    keys::KeyEntry,
    name::Fqa,
    record::{extract_from_zonefile, is_subdomain_record, SnapshotRecords, SubdomainRecord},
    registry::{Rejection, ReplayObserver, SubdomainTable, TracingObserver},
    zonefile::{TxtRecord, TxtValue, Zonefile},
};
