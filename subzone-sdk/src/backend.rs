//! Collaborator contracts the subdomain layer calls out to.
//!
//! The protocol core is pure computation; everything that touches the
//! blockchain, storage backends, or the network lives behind these traits.
//! Implementations may block or be fully async — the actors only await them.
//! Cancellation and timeouts are the implementation's responsibility.

use async_trait::async_trait;
use subzone_common::zonefile::Zonefile;
use url::Url;

use crate::errors::BoxError;

/// Source of a domain's on-chain zonefile documents.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Every historical zonefile of `domain`, oldest first.
    ///
    /// The order must be stable within one resolution; replay correctness
    /// depends on it.
    async fn list_zonefile_history(&self, domain: &str) -> Result<Vec<String>, BoxError>;

    /// The domain's current (latest) zonefile.
    async fn current_zonefile(&self, domain: &str) -> Result<String, BoxError>;
}

/// Parses and renders the outer zonefile format.
pub trait ZonefileCodec: Send + Sync {
    /// Parse a raw zonefile document into its structured form.
    fn decode(&self, origin: &str, raw: &str) -> Result<Zonefile, BoxError>;

    /// Render a structured zonefile back into its raw document form.
    fn encode(&self, zonefile: &Zonefile) -> Result<String, BoxError>;
}

/// Locates and fetches externally-hosted profile documents.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Service endpoints declared in a subdomain's embedded zonefile.
    fn extract_urls(&self, zonefile: &Zonefile) -> Vec<Url>;

    /// The data-publishing key declared in the embedded zonefile, if any.
    ///
    /// When absent, resolution falls back to the hex form of the record's
    /// owner key.
    fn extract_data_publish_key(&self, zonefile: &Zonefile) -> Option<String>;

    /// Fetch and decode the profile document published under
    /// `publisher_key` from one of `urls`.
    ///
    /// `Ok(None)` means no document was found at any candidate URL; an
    /// `Err` is a transport or decode failure.
    async fn fetch_mutable_data(
        &self,
        publisher_key: &str,
        urls: &[Url],
    ) -> Result<Option<serde_json::Value>, BoxError>;
}

/// Submits an updated zonefile to the blockchain layer.
#[async_trait]
pub trait ZonefilePublisher: Send + Sync {
    /// Queue `raw` as the next zonefile for `domain`.
    ///
    /// Asynchronous from the caller's perspective: success means accepted
    /// for publication, not confirmed on chain.
    async fn submit_zonefile_update(&self, domain: &str, raw: &str) -> Result<(), BoxError>;
}
