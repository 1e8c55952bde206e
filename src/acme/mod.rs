//! DNS-01 certificate renewal.
//!
//! Certifier hands out a CID per tenant and, during a renewal, publishes the tenant's DNS-01
//! challenge as a `TXT` record at `<domain label>.<cid>.<root>`, where `<domain label>` is the
//! domain being validated with its periods replaced by hyphens.
//!
//! For this to work each tenant delegates its challenge name to Certifier with a `CNAME`:
//!
//! ```text
//! _acme-challenge.test.example.com. CNAME test-example-com.<cid>.acme.example.net.
//! ```
//!
//! The ACME client doing the renewal is supplied by the caller through the [`AcmeClient`]
//! trait. Certifier gives it a [`ChallengeProvider`] bound to the tenant's CID and the domain,
//! then asks it for the certificate.

mod client;
pub mod dns01;
mod provider;
#[cfg(test)]
pub(crate) mod testing;

pub use client::AcmeClient;
pub use provider::{ChallengeProvider, Dns01Provider};

use crate::error::Error;
use crate::store::DynStore;
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

/// Registers tenants and runs renewals against a shared [`Store`][crate::store::Store].
#[derive(Clone)]
pub struct Renewer {
    store: DynStore,
    trusted_name_servers: Vec<SocketAddr>,
}

impl Renewer {
    #[must_use]
    pub fn new(store: DynStore, trusted_name_servers: Vec<SocketAddr>) -> Self {
        Self {
            store,
            trusted_name_servers,
        }
    }

    /// Generate a CID for the external `id` and register it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTenantID`] for an empty or blank `id`, and
    /// [`Error::AlreadyExists`] if `id` already has a CID. The existing CID is left untouched.
    pub async fn register_cid(&self, id: &str) -> Result<String, Error> {
        if id.trim().is_empty() {
            return Err(Error::EmptyTenantID);
        }
        let cid = Uuid::new_v4().to_string();
        self.store.set_cid(id, &cid).await?;
        tracing::info!("registered CID \"{cid}\" for ID \"{id}\"");
        Ok(cid)
    }

    /// Obtain a certificate for `domain` with `client`, publishing the DNS-01 challenge under
    /// the CID registered for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TenantNotFound`] (converted into `C::Error`) if `id` has no CID. Errors
    /// from the client, including a failed challenge publication, are returned as-is.
    pub async fn renew<C: AcmeClient>(
        &self,
        id: &str,
        domain: &str,
        client: &mut C,
        private_key: &C::PrivateKey,
    ) -> Result<C::Certificate, C::Error> {
        tracing::debug!("starting certificate renewal for ID \"{id}\" and domain \"{domain}\"");
        let Some(cid) = self.store.get_cid(id).await else {
            return Err(Error::TenantNotFound(id.to_string()).into());
        };

        let provider = ChallengeProvider::new(self.store.clone(), cid, dns01::base_domain(domain));
        tracing::info!(
            "renewing \"{domain}\" with challenge at {}.{}",
            provider.domain(),
            provider.cid()
        );
        client.set_dns01_provider(Arc::new(provider), &self.trusted_name_servers)?;
        client.obtain(&[domain.to_string()], private_key).await
    }

    /// The resolvers handed to ACME clients for propagation checks.
    #[must_use]
    pub fn trusted_name_servers(&self) -> &[SocketAddr] {
        &self.trusted_name_servers
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FailingStore, FakeClient, FakeError, Probe, ProbeFuture};
    use super::*;
    use crate::store::{MemoryStore, Store};

    fn renewer() -> (Arc<MemoryStore>, Renewer) {
        let store = Arc::new(MemoryStore::new());
        let ns = vec!["127.0.0.1:5053".parse().unwrap()];
        (store.clone(), Renewer::new(store, ns))
    }

    fn store_probe(store: &Arc<MemoryStore>, cid: &str, label: &str) -> Probe {
        let (store, cid, label) = (store.clone(), cid.to_string(), label.to_string());
        Arc::new(move || {
            let (store, cid, label) = (store.clone(), cid.clone(), label.clone());
            Box::pin(async move { store.get_challenge(&cid, &label).await }) as ProbeFuture
        })
    }

    #[tokio::test]
    async fn test_register_cid() {
        let (store, renewer) = renewer();
        let cid = renewer.register_cid("user").await.unwrap();
        assert!(Uuid::parse_str(&cid).is_ok());
        assert_eq!(store.get_cid("user").await, Some(cid.clone()));

        // Always an error the second time, and the first CID stays.
        for _ in 0..3 {
            assert!(matches!(
                renewer.register_cid("user").await,
                Err(Error::AlreadyExists(_))
            ));
        }
        assert_eq!(store.get_cid("user").await, Some(cid));
    }

    #[tokio::test]
    async fn test_register_empty_id() {
        let (_, renewer) = renewer();
        assert!(matches!(
            renewer.register_cid("").await,
            Err(Error::EmptyTenantID)
        ));
        assert!(matches!(
            renewer.register_cid(" \t").await,
            Err(Error::EmptyTenantID)
        ));
    }

    #[tokio::test]
    async fn test_renew_unknown_tenant() {
        let (_, renewer) = renewer();
        let mut client = FakeClient::default();
        let res = renewer
            .renew("nobody", "example.com", &mut client, &())
            .await;
        assert!(matches!(
            res,
            Err(FakeError::Certifier(Error::TenantNotFound(id))) if id == "nobody"
        ));
        assert!(client.provider.is_none());
    }

    #[tokio::test]
    async fn test_renew_publishes_and_retracts() {
        let (store, renewer) = renewer();
        let cid = renewer.register_cid("user").await.unwrap();

        let mut client = FakeClient {
            probe: Some(store_probe(&store, &cid, "test-example-com")),
            ..FakeClient::default()
        };
        let cert = renewer
            .renew("user", "test.example.com", &mut client, &())
            .await
            .unwrap();

        assert_eq!(cert.domains, vec!["test.example.com".to_string()]);
        let (_, expected) = dns01::record("test.example.com", &client.key_auth);
        assert_eq!(cert.published, vec![Some(expected)]);
        assert_eq!(
            client.recursive_nameservers,
            renewer.trusted_name_servers().to_vec()
        );
        assert_eq!(store.get_challenge(&cid, "test.example.com").await, None);
    }

    #[tokio::test]
    async fn test_renew_wildcard_uses_base_domain() {
        let (store, renewer) = renewer();
        let cid = renewer.register_cid("user").await.unwrap();

        let mut client = FakeClient {
            probe: Some(store_probe(&store, &cid, "example-com")),
            ..FakeClient::default()
        };
        let cert = renewer
            .renew("user", "*.example.com", &mut client, &())
            .await
            .unwrap();
        assert_eq!(cert.domains, vec!["*.example.com".to_string()]);
        assert!(cert.published[0].is_some());
    }

    #[tokio::test]
    async fn test_renew_client_error_passed_through() {
        let (store, renewer) = renewer();
        let cid = renewer.register_cid("user").await.unwrap();

        let mut client = FakeClient {
            reject: true,
            ..FakeClient::default()
        };
        let res = renewer
            .renew("user", "test.example.com", &mut client, &())
            .await;
        assert!(matches!(res, Err(FakeError::Rejected)));
        assert_eq!(store.get_challenge(&cid, "test.example.com").await, None);
    }

    #[tokio::test]
    async fn test_renew_publication_failure_aborts() {
        let renewer = Renewer::new(Arc::new(FailingStore), Vec::new());
        let mut client = FakeClient::default();
        let res = renewer
            .renew("user", "test.example.com", &mut client, &())
            .await;
        assert!(matches!(
            res,
            Err(FakeError::Certifier(Error::ChallengePublication { .. }))
        ));
    }

    #[tokio::test]
    async fn test_renew_after_abandoned_presentation() {
        let (store, renewer) = renewer();
        let cid = renewer.register_cid("user").await.unwrap();
        store
            .set_challenge(&cid, "test.example.com", "stale")
            .await
            .unwrap();

        let mut client = FakeClient {
            probe: Some(store_probe(&store, &cid, "test-example-com")),
            ..FakeClient::default()
        };
        let cert = renewer
            .renew("user", "test.example.com", &mut client, &())
            .await
            .unwrap();
        let (_, expected) = dns01::record("test.example.com", &client.key_auth);
        assert_eq!(cert.published, vec![Some(expected)]);
        assert_eq!(store.get_challenge(&cid, "test.example.com").await, None);
    }

    #[tokio::test]
    async fn test_renew_mixed_case_domain() {
        let (store, renewer) = renewer();
        let cid = renewer.register_cid("user").await.unwrap();

        let mut client = FakeClient {
            probe: Some(store_probe(&store, &cid, "test-example-com")),
            ..FakeClient::default()
        };
        let cert = renewer
            .renew("user", "Test.Example.com", &mut client, &())
            .await
            .unwrap();
        assert!(cert.published[0].is_some());
    }
}
