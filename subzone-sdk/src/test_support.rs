//! In-memory collaborators for exercising the actors end to end.
//!
//! The zonefile codec is plain JSON over the structured model, the history
//! source is a per-domain vector of raw documents, and the profile store is
//! a key-to-document map. Good enough to drive every workflow without a
//! network.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use subzone_common::{record::SubdomainRecord, zonefile::Zonefile};
use url::Url;

use crate::{
    backend::{HistorySource, ProfileStore, ZonefileCodec, ZonefilePublisher},
    errors::BoxError,
    registrar::Registrar,
    resolver::Resolver,
};

/// A minimal embedded zonefile document declaring a data-publishing key.
pub(crate) fn embedded_zonefile(data_pubkey: &str) -> Vec<u8> {
    format!(r#"{{"txt": [], "uri": [], "data_pubkey": "{data_pubkey}"}}"#).into_bytes()
}

#[derive(Default)]
struct Shared {
    zonefiles: Mutex<HashMap<String, Vec<String>>>,
    profiles: Mutex<HashMap<String, serde_json::Value>>,
    published: Mutex<Vec<(String, String)>>,
    fail_publish: Mutex<bool>,
}

#[async_trait]
impl HistorySource for Shared {
    async fn list_zonefile_history(&self, domain: &str) -> Result<Vec<String>, BoxError> {
        Ok(self
            .zonefiles
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or_default())
    }

    async fn current_zonefile(&self, domain: &str) -> Result<String, BoxError> {
        self.zonefiles
            .lock()
            .unwrap()
            .get(domain)
            .and_then(|history| history.last().cloned())
            .ok_or_else(|| format!("no zonefile for `{domain}`").into())
    }
}

impl ZonefileCodec for Shared {
    fn decode(&self, _origin: &str, raw: &str) -> Result<Zonefile, BoxError> {
        Ok(serde_json::from_str(raw)?)
    }

    fn encode(&self, zonefile: &Zonefile) -> Result<String, BoxError> {
        Ok(serde_json::to_string(zonefile)?)
    }
}

#[async_trait]
impl ProfileStore for Shared {
    fn extract_urls(&self, _zonefile: &Zonefile) -> Vec<Url> {
        vec![Url::parse("https://storage.test/profiles").unwrap()]
    }

    fn extract_data_publish_key(&self, zonefile: &Zonefile) -> Option<String> {
        zonefile
            .rest
            .get("data_pubkey")
            .and_then(|value| value.as_str())
            .map(str::to_string)
    }

    async fn fetch_mutable_data(
        &self,
        publisher_key: &str,
        _urls: &[Url],
    ) -> Result<Option<serde_json::Value>, BoxError> {
        Ok(self.profiles.lock().unwrap().get(publisher_key).cloned())
    }
}

#[async_trait]
impl ZonefilePublisher for Shared {
    async fn submit_zonefile_update(&self, domain: &str, raw: &str) -> Result<(), BoxError> {
        if *self.fail_publish.lock().unwrap() {
            return Err("publisher unavailable".into());
        }
        self.published
            .lock()
            .unwrap()
            .push((domain.to_string(), raw.to_string()));
        Ok(())
    }
}

/// All four collaborators over one shared in-memory state.
pub(crate) struct MemoryBackend {
    shared: Arc<Shared>,
}

impl MemoryBackend {
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
        }
    }

    pub(crate) fn resolver(&self) -> Resolver {
        Resolver::new(
            self.shared.clone(),
            self.shared.clone(),
            self.shared.clone(),
        )
    }

    pub(crate) fn registrar(&self) -> Registrar {
        Registrar::new(
            self.resolver(),
            self.shared.clone(),
            self.shared.clone(),
            self.shared.clone(),
        )
    }

    /// Append a raw zonefile document to the domain's history.
    pub(crate) fn push_raw_snapshot(&self, domain: &str, raw: &str) {
        self.shared
            .zonefiles
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .push(raw.to_string());
    }

    /// Append a snapshot embedding the given subdomain records.
    pub(crate) fn push_snapshot(&self, domain: &str, records: &[&SubdomainRecord]) {
        let mut zonefile = Zonefile::default();
        for record in records {
            zonefile.txt.push(record.as_txt_record().unwrap());
        }
        self.push_raw_snapshot(domain, &serde_json::to_string(&zonefile).unwrap());
    }

    /// Store a profile document under a publisher key.
    pub(crate) fn put_profile(&self, publisher_key: &str, document: serde_json::Value) {
        self.shared
            .profiles
            .lock()
            .unwrap()
            .insert(publisher_key.to_string(), document);
    }

    /// Every zonefile update the publisher accepted, in order.
    pub(crate) fn published(&self) -> Vec<(String, String)> {
        self.shared.published.lock().unwrap().clone()
    }

    /// Make every subsequent publish attempt fail.
    pub(crate) fn fail_publishing(&self) {
        *self.shared.fail_publish.lock().unwrap() = true;
    }
}
