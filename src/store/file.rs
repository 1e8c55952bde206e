//! A JSON file-backed implementation of the [`Store`][super::Store] trait.
//!
//! Wraps a [`MemoryStore`][super::memory::MemoryStore] instance, persisting tenant bindings to
//! a JSON file on disk that can be reloaded across restarts. Challenges only live for the
//! duration of a renewal and are kept in memory.
use crate::error::Error;
use crate::store::memory::MemoryStore;
use crate::store::Store;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use tokio::fs::File;
use tokio::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;

#[derive(Default, Debug, Serialize, Deserialize)]
struct State {
    cids: HashMap<String, String>,
}

/// A file-backed store. After each tenant registration or removal a JSON file on disk is
/// updated with the new bindings. This file can be reloaded across restarts so that tenants
/// keep their CIDs.
///
/// Wraps a [`MemoryStore`][super::memory::MemoryStore], operating the same way except for
/// maintaining tenant state beyond in-memory.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct FileStore {
    store: MemoryStore,
    path: String,
    save_lock: Mutex<()>,
}

impl FileStore {
    /// Save the tenant bindings as JSON to the store's configured path, or return an Error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if the bindings can't be serialized to JSON.
    ///
    /// Returns [`Error::IO`] if the serialized state can't be written to the backing file path.
    pub async fn save(&self) -> Result<(), Error> {
        // Snapshot under the lock so a slower writer can't overwrite a newer state.
        let _guard = self.save_lock.lock().await;
        let state = State {
            cids: self.store.cids().await,
        };
        let data = serde_json::to_string_pretty(&state)?;
        let mut output_file = File::create(&self.path).await?;
        output_file.write_all(data.as_bytes()).await?;
        output_file.flush().await?;
        Ok(())
    }

    /// Load a [`FileStore`] from the JSON state located at the given path, or return an Error.
    /// A missing file is created with an empty state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if the JSON state file is invalid.
    ///
    /// Returns [`Error::IO`] if the path can't be opened or read.
    pub async fn try_from_file(p: &str) -> Result<Self, Error> {
        let contents = match File::open(p).await {
            Ok(mut f) => {
                let mut buf = vec![];
                f.read_to_end(&mut buf).await?;
                buf
            }
            Err(err) => match err.kind() {
                ErrorKind::NotFound => Self::write_empty_state(File::create(&p).await?).await?,
                _ => return Err(Error::IO(err)),
            },
        };

        let state: State = serde_json::from_slice(&contents)?;
        tracing::debug!("loaded {} tenant(s) from {p}", state.cids.len());
        Ok(Self {
            store: MemoryStore::with_cids(state.cids),
            path: p.to_string(),
            save_lock: Mutex::default(),
        })
    }

    async fn write_empty_state(mut f: File) -> io::Result<Vec<u8>> {
        let default_data = serde_json::to_string_pretty(&State::default())?;
        let default_bytes = default_data.as_bytes();
        f.write_all(default_bytes).await?;
        f.flush().await?;
        Ok(default_bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl Store for FileStore {
    async fn set_cid(&self, id: &str, cid: &str) -> Result<(), Error> {
        self.store.set_cid(id, cid).await?;
        self.save().await
    }

    async fn get_cid(&self, id: &str) -> Option<String> {
        self.store.get_cid(id).await
    }

    async fn remove_cid(&self, id: &str) -> Result<(), Error> {
        self.store.remove_cid(id).await?;
        self.save().await
    }

    async fn set_challenge(&self, cid: &str, domain: &str, challenge: &str) -> Result<(), Error> {
        self.store.set_challenge(cid, domain, challenge).await
    }

    async fn get_challenge(&self, cid: &str, domain: &str) -> Option<String> {
        self.store.get_challenge(cid, domain).await
    }

    async fn remove_challenge(&self, cid: &str, domain: &str) -> Result<(), Error> {
        self.store.remove_challenge(cid, domain).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_path(dir: &tempfile::TempDir) -> String {
        dir.path().join("state.json").to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = state_path(&dir);

        let store = FileStore::try_from_file(&path).await.unwrap();
        assert_eq!(store.get_cid("anyone").await, None);

        let contents = std::fs::read_to_string(&path).unwrap();
        let state: State = serde_json::from_str(&contents).unwrap();
        assert!(state.cids.is_empty());
    }

    #[tokio::test]
    async fn test_reload_keeps_tenants_not_challenges() {
        let dir = tempfile::tempdir().unwrap();
        let path = state_path(&dir);

        let store = FileStore::try_from_file(&path).await.unwrap();
        store.set_cid("alice", "cid-a").await.unwrap();
        store.set_cid("bob", "cid-b").await.unwrap();
        store.remove_cid("bob").await.unwrap();
        store
            .set_challenge("cid-a", "example.com", "token")
            .await
            .unwrap();
        assert_eq!(
            store.get_challenge("cid-a", "example.com").await.as_deref(),
            Some("token")
        );
        drop(store);

        let reloaded = FileStore::try_from_file(&path).await.unwrap();
        assert_eq!(reloaded.get_cid("alice").await.as_deref(), Some("cid-a"));
        assert_eq!(reloaded.get_cid("bob").await, None);
        assert_eq!(reloaded.get_challenge("cid-a", "example.com").await, None);
    }

    #[tokio::test]
    async fn test_invalid_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = state_path(&dir);
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileStore::try_from_file(&path).await,
            Err(Error::InvalidJSON(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_registration_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = state_path(&dir);

        let store = FileStore::try_from_file(&path).await.unwrap();
        store.set_cid("alice", "cid-a").await.unwrap();
        assert!(matches!(
            store.set_cid("alice", "cid-z").await,
            Err(Error::AlreadyExists(_))
        ));

        let reloaded = FileStore::try_from_file(&path).await.unwrap();
        assert_eq!(reloaded.get_cid("alice").await.as_deref(), Some("cid-a"));
    }
}
