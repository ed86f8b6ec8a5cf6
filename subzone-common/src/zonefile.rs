//! Structured view of a decoded zonefile's TXT record list.
//!
//! The outer zonefile format is parsed and rendered by an external
//! collaborator; this module only models the slice the subdomain layer reads
//! and rewrites. Everything outside the TXT list is carried through opaquely.

use serde::{Deserialize, Serialize};

use crate::constants::SUBDOMAIN_NAME_PREFIX;

/// TXT rdata: either a single character-string or a list of them.
///
/// Subdomain records are always list-valued; a single string marks an
/// ordinary TXT entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TxtValue {
    /// A single `<character-string>`.
    Single(String),
    /// An ordered list of `<character-string>`s.
    List(Vec<String>),
}

/// One TXT record as exposed by the external zonefile decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxtRecord {
    /// The record's name within the zone.
    pub name: String,
    /// The record's rdata.
    pub txt: TxtValue,
}

/// The slice of a decoded zonefile the subdomain layer operates on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Zonefile {
    /// The zone's TXT records.
    #[serde(default)]
    pub txt: Vec<TxtRecord>,
    /// Zonefile content outside the TXT list, carried through untouched.
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl Zonefile {
    /// Drop every TXT entry under the reserved subdomain name prefix.
    ///
    /// Run before appending a fresh subdomain entry so stale bookkeeping
    /// records do not accumulate across updates.
    pub fn strip_reserved_subdomain_entries(&mut self) {
        self.txt
            .retain(|record| !record.name.starts_with(SUBDOMAIN_NAME_PREFIX));
    }

    /// Append a TXT record, rejecting a name that is already present.
    pub fn append_txt(&mut self, record: TxtRecord) -> Result<(), Error> {
        if self.txt.iter().any(|existing| existing.name == record.name) {
            return Err(Error::DuplicateTxtName(record.name));
        }
        self.txt.push(record);
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
/// Error rewriting a zonefile's TXT list.
pub enum Error {
    #[error("TXT record `{0}` already exists in the zonefile")]
    /// TXT record already exists in the zonefile
    DuplicateTxtName(String),
}
