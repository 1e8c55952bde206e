//! An in-process [`AcmeClient`] for tests: presents each challenge, lets the test observe what
//! is being served, then cleans up.

use crate::acme::{AcmeClient, Dns01Provider};
use crate::error::Error;
use crate::store::Store;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

pub(crate) type ProbeFuture = Pin<Box<dyn Future<Output = Option<String>> + Send>>;
pub(crate) type Probe = Arc<dyn Fn() -> ProbeFuture + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub(crate) enum FakeError {
    #[error(transparent)]
    Certifier(#[from] Error),
    #[error("no DNS-01 provider configured")]
    NoProvider,
    #[error("challenge rejected by CA")]
    Rejected,
}

#[derive(Debug)]
pub(crate) struct FakeCertificate {
    pub domains: Vec<String>,
    /// What the probe observed while each challenge was presented.
    pub published: Vec<Option<String>>,
}

pub(crate) struct FakeClient {
    pub key_auth: String,
    pub reject: bool,
    pub probe: Option<Probe>,
    pub provider: Option<Arc<dyn Dns01Provider>>,
    pub recursive_nameservers: Vec<SocketAddr>,
}

impl Default for FakeClient {
    fn default() -> Self {
        Self {
            key_auth: "token.thumbprint".to_string(),
            reject: false,
            probe: None,
            provider: None,
            recursive_nameservers: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl AcmeClient for FakeClient {
    type Certificate = FakeCertificate;
    type PrivateKey = ();
    type Error = FakeError;

    fn set_dns01_provider(
        &mut self,
        provider: Arc<dyn Dns01Provider>,
        recursive_nameservers: &[SocketAddr],
    ) -> Result<(), FakeError> {
        self.provider = Some(provider);
        self.recursive_nameservers = recursive_nameservers.to_vec();
        Ok(())
    }

    async fn obtain(
        &mut self,
        domains: &[String],
        _private_key: &(),
    ) -> Result<FakeCertificate, FakeError> {
        let provider = self.provider.clone().ok_or(FakeError::NoProvider)?;
        let mut published = Vec::with_capacity(domains.len());
        for domain in domains {
            let domain = domain.strip_prefix("*.").unwrap_or(domain);
            provider.present(domain, "token", &self.key_auth).await?;
            published.push(match &self.probe {
                Some(probe) => probe().await,
                None => None,
            });
            provider.clean_up(domain, "token", &self.key_auth).await?;
        }
        if self.reject {
            return Err(FakeError::Rejected);
        }
        Ok(FakeCertificate {
            domains: domains.to_vec(),
            published,
        })
    }
}

/// A [`Store`] whose writes always fail.
pub(crate) struct FailingStore;

fn unavailable() -> Error {
    Error::IO(io::Error::new(io::ErrorKind::Other, "store unavailable"))
}

#[async_trait::async_trait]
impl Store for FailingStore {
    async fn set_cid(&self, _id: &str, _cid: &str) -> Result<(), Error> {
        Err(unavailable())
    }

    async fn get_cid(&self, _id: &str) -> Option<String> {
        Some("cid".to_string())
    }

    async fn remove_cid(&self, _id: &str) -> Result<(), Error> {
        Err(unavailable())
    }

    async fn set_challenge(&self, _cid: &str, _domain: &str, _challenge: &str) -> Result<(), Error> {
        Err(unavailable())
    }

    async fn get_challenge(&self, _cid: &str, _domain: &str) -> Option<String> {
        None
    }

    async fn remove_challenge(&self, _cid: &str, _domain: &str) -> Result<(), Error> {
        Err(unavailable())
    }
}
