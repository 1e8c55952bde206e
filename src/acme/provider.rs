use crate::acme::dns01;
use crate::error::Error;
use crate::key::normalize_domain;
use crate::store::DynStore;

/// The capability an ACME client expects from a DNS-01 challenge provider: publish the
/// challenge record before asking the CA to validate, and retract it afterwards.
#[async_trait::async_trait]
pub trait Dns01Provider: Send + Sync {
    /// Publish the record for `domain` derived from the key authorization `key_auth`.
    async fn present(&self, domain: &str, token: &str, key_auth: &str) -> Result<(), Error>;

    /// Retract the record published by [`Dns01Provider::present`].
    async fn clean_up(&self, domain: &str, token: &str, key_auth: &str) -> Result<(), Error>;
}

/// A [`Dns01Provider`] that publishes challenges into a [`Store`][crate::store::Store] for one
/// tenant and one domain, where the [DNS handler][crate::dns] will serve them from.
///
/// A fresh provider is created for every renewal.
#[derive(Clone)]
pub struct ChallengeProvider {
    store: DynStore,
    cid: String,
    domain: String,
}

impl ChallengeProvider {
    #[must_use]
    pub fn new(store: DynStore, cid: String, domain: &str) -> Self {
        Self {
            store,
            cid,
            // Query names reach the handler lowercased.
            domain: normalize_domain(&domain.to_ascii_lowercase()),
        }
    }

    /// The CID challenges are published under.
    #[must_use]
    pub fn cid(&self) -> &str {
        &self.cid
    }

    /// The normalized domain label challenges are published under.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

#[async_trait::async_trait]
impl Dns01Provider for ChallengeProvider {
    async fn present(&self, domain: &str, _token: &str, key_auth: &str) -> Result<(), Error> {
        let (fqdn, challenge) = dns01::record(domain, key_auth);
        self.store
            .set_challenge(&self.cid, &self.domain, &challenge)
            .await
            .map_err(|err| Error::ChallengePublication {
                domain: domain.to_string(),
                source: Box::new(err),
            })?;
        tracing::debug!(
            "set challenge \"{challenge}\" for {fqdn} (CID \"{}\", domain \"{}\")",
            self.cid,
            self.domain
        );
        Ok(())
    }

    async fn clean_up(&self, domain: &str, _token: &str, _key_auth: &str) -> Result<(), Error> {
        match self.store.remove_challenge(&self.cid, &self.domain).await {
            Ok(()) => tracing::debug!(
                "removed challenge for CID \"{}\" and domain \"{}\"",
                self.cid,
                self.domain
            ),
            // Never fails the renewal.
            Err(source) => {
                let cause = source.to_string();
                let err = Error::ChallengeRetraction {
                    domain: domain.to_string(),
                    source: Box::new(source),
                };
                tracing::warn!("{err}: {cause}");
            }
        }
        Ok(())
    }
}
