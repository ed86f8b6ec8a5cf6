//! Creating and extending subdomains inside a domain's zonefile.

use core::fmt;
use std::sync::Arc;

use subzone_common::{crypto::Keypair, keys::KeyEntry, record::SubdomainRecord};

use crate::{
    backend::{HistorySource, ZonefileCodec, ZonefilePublisher},
    errors::{BackendError, Error, PublishError, Result},
    resolver::Resolver,
};

/// Write actor: registers new subdomains and extends succession chains.
#[derive(Clone)]
pub struct Registrar {
    resolver: Resolver,
    history: Arc<dyn HistorySource>,
    codec: Arc<dyn ZonefileCodec>,
    publisher: Arc<dyn ZonefilePublisher>,
}

impl Registrar {
    /// Construct a registrar over the given collaborators.
    pub fn new(
        resolver: Resolver,
        history: Arc<dyn HistorySource>,
        codec: Arc<dyn ZonefileCodec>,
        publisher: Arc<dyn ZonefilePublisher>,
    ) -> Self {
        Self {
            resolver,
            history,
            codec,
            publisher,
        }
    }

    /// Register `subdomain.domain`, assigning it to `owner` with `payload`
    /// as its embedded zonefile document.
    ///
    /// One-time assignment: if the name already has an accepted record in
    /// the replayed history, this fails with
    /// [`Error::SubdomainAlreadyExists`]. The fresh record carries
    /// `sequence = 0` and no signature; succession integrity begins at the
    /// second record.
    pub async fn register(
        &self,
        subdomain: &str,
        domain: &str,
        owner: KeyEntry,
        payload: Vec<u8>,
    ) -> Result<()> {
        if self
            .resolver
            .try_resolve_record(subdomain, domain)
            .await?
            .is_some()
        {
            return Err(Error::SubdomainAlreadyExists(format!(
                "{subdomain}.{domain}"
            )));
        }

        let record = SubdomainRecord::new(subdomain, owner, 0, payload);
        self.embed_and_publish(domain, &record).await
    }

    /// Produce and publish the signed successor of `current`.
    ///
    /// `signer` must hold the key `current` names as owner — the previous
    /// key holder authorizes the new state. `next_owner` may be the same
    /// key or a new one; handing the name over is just a successor whose
    /// embedded owner key differs.
    pub async fn extend(
        &self,
        domain: &str,
        current: &SubdomainRecord,
        signer: &Keypair,
        next_owner: KeyEntry,
        payload: Vec<u8>,
    ) -> Result<()> {
        let mut record = SubdomainRecord::new(
            current.name(),
            next_owner,
            current.sequence() + 1,
            payload,
        );
        record.sign(signer)?;
        self.embed_and_publish(domain, &record).await
    }

    /// Rewrite the domain's current zonefile around `record` and hand it to
    /// the publisher: strip the reserved subdomain bookkeeping entries,
    /// append the record under its own name, re-encode, submit.
    async fn embed_and_publish(&self, domain: &str, record: &SubdomainRecord) -> Result<()> {
        let raw = self
            .history
            .current_zonefile(domain)
            .await
            .map_err(|source| BackendError::CurrentZonefile {
                domain: domain.to_string(),
                source,
            })?;
        let mut zonefile =
            self.codec
                .decode(domain, &raw)
                .map_err(|source| BackendError::Decode {
                    origin: domain.to_string(),
                    source,
                })?;

        zonefile.strip_reserved_subdomain_entries();
        zonefile.append_txt(record.as_txt_record()?)?;

        let updated = self
            .codec
            .encode(&zonefile)
            .map_err(|source| BackendError::Encode {
                domain: domain.to_string(),
                source,
            })?;

        self.publisher
            .submit_zonefile_update(domain, &updated)
            .await
            .map_err(|source| PublishError {
                domain: domain.to_string(),
                source,
            })?;

        Ok(())
    }
}

impl fmt::Debug for Registrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrar").finish_non_exhaustive()
    }
}
