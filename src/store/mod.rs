//! Tenant and DNS-01 challenge storage.
//!
//! Supports a generic interface for two relations: external tenant id to CID, and
//! (CID, domain) to the [RFC-8555][RFC-8555] [DNS-01] challenge value currently being served
//! for it.
//!
//! Two implementations are provided, [`memory::MemoryStore`] and [`file::FileStore`]. The
//! former is not durable across restarts. The latter will write its tenant bindings to disk for
//! each update and load them again on startup.
//!
//! Implementations normalize the domain they are given with [`crate::key::challenge_key`], so
//! callers may pass either a raw domain (`example.com`) or its normalized label
//! (`example-com`).
//!
//! [RFC-8555]: https://www.rfc-editor.org/rfc/rfc8555
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4

use crate::error::Error;
use std::sync::Arc;

pub mod file;
pub mod memory;

#[allow(clippy::module_name_repetitions)]
pub use file::FileStore;
#[allow(clippy::module_name_repetitions)]
pub use memory::MemoryStore;

/// `DynStore` is a type alias for a [`Store`] shared between the DNS handler, the ACME
/// provider and the admin API. Implementations do their own locking.
#[allow(clippy::module_name_repetitions)]
pub type DynStore = Arc<dyn Store>;

/// An async trait describing storage of tenant CIDs and the DNS-01 challenge values published
/// for them. Every operation touches a single key and must be safe to call concurrently.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Register `cid` for the external `id`. Fails with [`Error::AlreadyExists`] if `id`
    /// already has a CID.
    async fn set_cid(&self, id: &str, cid: &str) -> Result<(), Error>;

    /// Get the CID registered for `id` (if any).
    async fn get_cid(&self, id: &str) -> Option<String>;

    /// Remove the CID registered for `id`, or fail with [`Error::NotFound`].
    async fn remove_cid(&self, id: &str) -> Result<(), Error>;

    /// Store `challenge` for the given CID and domain, replacing any challenge left for the
    /// pair by an earlier renewal.
    async fn set_challenge(&self, cid: &str, domain: &str, challenge: &str) -> Result<(), Error>;

    /// Get the challenge live for the given CID and domain (if any).
    async fn get_challenge(&self, cid: &str, domain: &str) -> Option<String>;

    /// Remove the challenge for the given CID and domain, or fail with [`Error::NotFound`].
    async fn remove_challenge(&self, cid: &str, domain: &str) -> Result<(), Error>;
}
