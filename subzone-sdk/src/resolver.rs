//! Resolving a subdomain to its current record and published profile.

use core::fmt;
use std::sync::Arc;

use subzone_common::{
    keys::KeyEntry,
    name::Fqa,
    record::{self, SubdomainRecord},
    registry::{ReplayObserver, SubdomainTable, TracingObserver},
};

use crate::{
    backend::{HistorySource, ProfileStore, ZonefileCodec},
    errors::{BackendError, Error, Result},
};

/// The externally observable result of a successful resolution.
#[derive(Debug, Clone)]
pub struct Profile {
    /// The decoded profile document.
    pub document: serde_json::Value,
    /// Hex form of the key the document was fetched under.
    pub publisher_key: String,
    /// The authoritative record resolution was based on.
    pub record: SubdomainRecord,
}

/// Read actor: replays a domain's zonefile history and resolves subdomains.
///
/// Holds no mutable state; the subdomain table is rebuilt from history on
/// every resolution, so a [`Resolver`] can be cloned and shared freely.
/// Callers that resolve many names under one domain should replay once via
/// [`Resolver::replay_domain`] and query the returned table themselves.
#[derive(Clone)]
pub struct Resolver {
    history: Arc<dyn HistorySource>,
    codec: Arc<dyn ZonefileCodec>,
    profiles: Arc<dyn ProfileStore>,
}

impl Resolver {
    /// Construct a resolver over the given collaborators.
    pub fn new(
        history: Arc<dyn HistorySource>,
        codec: Arc<dyn ZonefileCodec>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            history,
            codec,
            profiles,
        }
    }

    /// Replay the full zonefile history of `domain` into its subdomain
    /// table, reporting rejected transitions to `tracing`.
    pub async fn replay_domain(&self, domain: &str) -> Result<SubdomainTable> {
        self.replay_domain_with(domain, &TracingObserver).await
    }

    /// Same as [`Resolver::replay_domain`], with a caller-supplied observer.
    pub async fn replay_domain_with(
        &self,
        domain: &str,
        observer: &dyn ReplayObserver,
    ) -> Result<SubdomainTable> {
        let history = self
            .history
            .list_zonefile_history(domain)
            .await
            .map_err(|source| BackendError::History {
                domain: domain.to_string(),
                source,
            })?;

        let mut table = SubdomainTable::new();
        for raw in &history {
            let zonefile = match self.codec.decode(domain, raw) {
                Ok(zonefile) => zonefile,
                Err(error) => {
                    tracing::warn!(%domain, %error, "skipping undecodable zonefile snapshot");
                    continue;
                }
            };
            let snapshot = match record::extract_from_zonefile(&zonefile) {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    tracing::warn!(%domain, %error, "skipping zonefile snapshot with conflicting subdomain records");
                    continue;
                }
            };
            table = table.apply_snapshot(&snapshot, observer);
        }

        Ok(table)
    }

    /// Look up a subdomain's current record without touching profile
    /// storage.
    ///
    /// This is the precondition query the registration workflow branches
    /// on; absence is an ordinary `None`, not an error.
    pub async fn try_resolve_record(
        &self,
        subdomain: &str,
        domain: &str,
    ) -> Result<Option<SubdomainRecord>> {
        let table = self.replay_domain(domain).await?;
        Ok(table.get(subdomain).cloned())
    }

    /// Resolve `subdomain.domain` to its published profile document.
    ///
    /// Replays history, looks up the winning record, decodes its embedded
    /// zonefile, and fetches the profile through the declared endpoints —
    /// preferring an explicitly declared data-publishing key and falling
    /// back to the owner key's hex form.
    pub async fn resolve(&self, subdomain: &str, domain: &str) -> Result<Profile> {
        let fqa = format!("{subdomain}.{domain}");

        let record = self
            .try_resolve_record(subdomain, domain)
            .await?
            .ok_or_else(|| Error::SubdomainNotFound(fqa.clone()))?;

        let embedded =
            std::str::from_utf8(record.payload()).map_err(|source| BackendError::Decode {
                origin: fqa.clone(),
                source: source.into(),
            })?;
        let parsed = self
            .codec
            .decode(record.name(), embedded)
            .map_err(|source| BackendError::Decode {
                origin: fqa.clone(),
                source,
            })?;

        let urls = self.profiles.extract_urls(&parsed);
        let publisher_key = match self.profiles.extract_data_publish_key(&parsed) {
            Some(key) => key,
            None => match record.key() {
                KeyEntry::Ec(owner) => owner.to_hex(),
                KeyEntry::Unknown { data, .. } => data.clone(),
            },
        };

        let document = self
            .profiles
            .fetch_mutable_data(&publisher_key, &urls)
            .await
            .map_err(|source| BackendError::ProfileFetch {
                name: fqa.clone(),
                source,
            })?
            .ok_or(Error::ProfileNotFound(fqa))?;

        Ok(Profile {
            document,
            publisher_key,
            record,
        })
    }

    /// Resolve a parsed fully-qualified address.
    pub async fn resolve_fqa(&self, fqa: &Fqa) -> Result<Profile> {
        self.resolve(fqa.subdomain(), fqa.domain()).await
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}
