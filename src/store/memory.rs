use crate::error::Error;
use crate::key::challenge_key;
use crate::store::Store;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory [`Store`]. Each relation has its own lock so challenge churn never waits on
/// tenant registration.
#[derive(Default, Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct MemoryStore {
    cids: RwLock<HashMap<String, String>>,
    challenges: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with tenant bindings (external id to CID).
    #[must_use]
    pub fn with_cids(cids: HashMap<String, String>) -> Self {
        Self {
            cids: RwLock::new(cids),
            challenges: RwLock::default(),
        }
    }

    /// A copy of the current tenant bindings.
    pub async fn cids(&self) -> HashMap<String, String> {
        self.cids.read().await.clone()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn set_cid(&self, id: &str, cid: &str) -> Result<(), Error> {
        match self.cids.write().await.entry(id.to_string()) {
            Entry::Occupied(_) => Err(Error::AlreadyExists(id.to_string())),
            Entry::Vacant(e) => {
                e.insert(cid.to_string());
                Ok(())
            }
        }
    }

    async fn get_cid(&self, id: &str) -> Option<String> {
        self.cids.read().await.get(id).cloned()
    }

    async fn remove_cid(&self, id: &str) -> Result<(), Error> {
        self.cids
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn set_challenge(&self, cid: &str, domain: &str, challenge: &str) -> Result<(), Error> {
        let key = challenge_key(cid, domain);
        if let Some(stale) = self
            .challenges
            .write()
            .await
            .insert(key.clone(), challenge.to_string())
        {
            tracing::debug!("replaced stale challenge \"{stale}\" for {key}");
        }
        Ok(())
    }

    async fn get_challenge(&self, cid: &str, domain: &str) -> Option<String> {
        self.challenges
            .read()
            .await
            .get(&challenge_key(cid, domain))
            .cloned()
    }

    async fn remove_challenge(&self, cid: &str, domain: &str) -> Result<(), Error> {
        let key = challenge_key(cid, domain);
        match self.challenges.write().await.remove(&key) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(key)),
        }
    }
}
