use crate::acme::Dns01Provider;
use crate::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

/// The parts of an ACME client a renewal drives.
///
/// Certifier doesn't speak the ACME protocol itself. Account registration, order handling,
/// polling and CSR signing all belong to the implementation of this trait, which is handed a
/// [`Dns01Provider`] to publish its DNS-01 challenges through.
///
/// Crate errors raised during a renewal (e.g. [`Error::TenantNotFound`]) are converted into
/// the client's own error type, so callers only ever see `Self::Error`.
#[async_trait::async_trait]
pub trait AcmeClient: Send {
    /// The issued certificate (chain, key, metadata) as the client represents it.
    type Certificate: Send + 'static;
    /// The private key the certificate is issued for.
    type PrivateKey: Send + Sync + 'static;
    /// The client's error type.
    type Error: From<Error> + Send + 'static;

    /// Use `provider` for DNS-01 challenges. When `recursive_nameservers` is non-empty, only
    /// those resolvers are used to check that a challenge has propagated.
    ///
    /// # Errors
    ///
    /// Returns an error if the client rejects the provider.
    fn set_dns01_provider(
        &mut self,
        provider: Arc<dyn Dns01Provider>,
        recursive_nameservers: &[SocketAddr],
    ) -> Result<(), Self::Error>;

    /// Order, validate and download a certificate covering `domains`.
    ///
    /// # Errors
    ///
    /// Returns an error if any step of the ACME exchange fails.
    async fn obtain(
        &mut self,
        domains: &[String],
        private_key: &Self::PrivateKey,
    ) -> Result<Self::Certificate, Self::Error>;
}
