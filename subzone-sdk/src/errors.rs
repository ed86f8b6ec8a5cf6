//! Unified error types for the `subzone` crate.
//!
//! This module centralizes all failures that can occur while resolving or
//! registering subdomains and provides a single top-level [`Error`] enum plus
//! the convenient [`Result`] alias. Collaborator failures are wrapped into
//! structured [`BackendError`] variants so callers can handle them precisely,
//! and the protocol-level outcomes (`SubdomainNotFound`,
//! `SubdomainAlreadyExists`, `ProfileNotFound`) are first-class variants a
//! consumer can match on directly.

use thiserror::Error;

/// Boxed error a collaborator implementation may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The crate's top-level error type.
///
/// It groups failures into high-level categories:
/// - [`Error::SubdomainNotFound`] / [`Error::SubdomainAlreadyExists`] /
///   [`Error::ProfileNotFound`] — protocol-level outcomes
/// - [`Error::Encode`] / [`Error::Zonefile`] — building the updated zonefile failed
/// - [`Error::Backend`] — a collaborator (history, codec, profile store) failed
/// - [`Error::Publish`] — submitting the updated zonefile failed
#[derive(Debug, Error)]
pub enum Error {
    /// The name is absent from the replayed subdomain table.
    #[error("subdomain `{0}` not found")]
    SubdomainNotFound(String),

    /// The creation pre-check found the name already registered.
    #[error("subdomain `{0}` already exists")]
    SubdomainAlreadyExists(String),

    /// The subdomain resolved, but no profile document was found at any of
    /// its declared endpoints. Distinct from [`Error::SubdomainNotFound`].
    #[error("no profile document found for `{0}`")]
    ProfileNotFound(String),

    /// A subdomain record could not be packed into TXT wire strings.
    #[error("failed to encode subdomain record: {0}")]
    Encode(#[from] subzone_common::record::EncodeError),

    /// Rewriting the zonefile's TXT list failed.
    #[error(transparent)]
    Zonefile(#[from] subzone_common::zonefile::Error),

    /// A collaborator operation failed.
    #[error("backend operation failed: {0}")]
    Backend(#[from] BackendError),

    /// Submitting the updated zonefile failed. Reported, never retried.
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Failures of the external collaborators the SDK calls out to.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Listing the domain's zonefile history failed.
    #[error("failed to list zonefile history for `{domain}`")]
    History {
        /// The domain being resolved.
        domain: String,
        /// The collaborator's failure.
        #[source]
        source: BoxError,
    },

    /// Fetching the domain's current zonefile failed.
    #[error("failed to fetch the current zonefile for `{domain}`")]
    CurrentZonefile {
        /// The domain being updated.
        domain: String,
        /// The collaborator's failure.
        #[source]
        source: BoxError,
    },

    /// Decoding a zonefile document failed.
    #[error("failed to decode a zonefile for `{origin}`")]
    Decode {
        /// The zone the document belongs to.
        origin: String,
        /// The collaborator's failure.
        #[source]
        source: BoxError,
    },

    /// Encoding the rewritten zonefile failed.
    #[error("failed to encode the updated zonefile for `{domain}`")]
    Encode {
        /// The domain being updated.
        domain: String,
        /// The collaborator's failure.
        #[source]
        source: BoxError,
    },

    /// Fetching the profile document failed (transport or decode).
    #[error("profile fetch failed for `{name}`")]
    ProfileFetch {
        /// The fully-qualified subdomain being resolved.
        name: String,
        /// The collaborator's failure.
        #[source]
        source: BoxError,
    },
}

/// The publisher rejected or failed the zonefile update.
#[derive(Debug, Error)]
#[error("publisher rejected the zonefile update for `{domain}`")]
pub struct PublishError {
    /// The domain whose update failed.
    pub domain: String,
    /// The collaborator's failure.
    #[source]
    pub source: BoxError,
}

/// A specialized `Result` type for `subzone` operations.
pub type Result<T> = std::result::Result<T, Error>;
