//! The Certifier façade: one DNS server and one renewer sharing a store.

use crate::acme::{AcmeClient, Renewer};
use crate::config::Shared;
use crate::dns::{self, Handler};
use crate::error::Error;
use crate::store::DynStore;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct Certifier {
    config: Shared,
    store: DynStore,
    handler: Handler,
    renewer: Renewer,
    shutdown: watch::Sender<()>,
}

impl Certifier {
    /// Create a Certifier for `config`, keeping tenants and challenges in `store`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DNSError`] if the configured domains aren't valid DNS names.
    pub fn new(config: Shared, store: DynStore) -> Result<Self, Error> {
        let handler = Handler::new(&config, store.clone())?;
        let renewer = Renewer::new(store.clone(), config.trusted_name_servers.clone());
        let (shutdown, _) = watch::channel(());
        Ok(Self {
            config,
            store,
            handler,
            renewer,
            shutdown,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Shared {
        &self.config
    }

    /// Bind `addr` and serve DNS on it until [`Certifier::shutdown`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the socket can't be bound, or [`Error::DNSError`] if the server
    /// fails.
    pub async fn start(&self, addr: SocketAddr) -> Result<(), Error> {
        let socket = dns::server::bind(addr).await?;
        self.serve(socket).await
    }

    /// Serve DNS on an already bound socket until [`Certifier::shutdown`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DNSError`] if the server fails.
    pub async fn serve(&self, socket: UdpSocket) -> Result<(), Error> {
        let mut shutdown = self.shutdown.subscribe();
        tracing::info!(
            "DNS listening on UDP {} with root domain {}",
            socket.local_addr()?,
            self.handler.root()
        );
        let server = dns::server::new(self.handler.clone(), socket);
        tokio::select! {
            res = server.block_until_done() => Ok(res?),
            _ = shutdown.changed() => {
                tracing::info!("stopping DNS");
                Ok(())
            }
        }
    }

    /// Stop every listener started with [`Certifier::start`] or [`Certifier::serve`]. Renewals
    /// in progress are not cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRunning`] if nothing is being served.
    pub fn shutdown(&self) -> Result<(), Error> {
        self.shutdown.send(()).map_err(|_| Error::NotRunning)
    }

    /// Register a new tenant for the external `id`, returning its CID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if `id` is already registered.
    pub async fn register_tenant(&self, id: &str) -> Result<String, Error> {
        self.renewer.register_cid(id).await
    }

    /// Remove the tenant registered for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` isn't registered.
    pub async fn deregister_tenant(&self, id: &str) -> Result<(), Error> {
        self.store.remove_cid(id).await?;
        tracing::info!("removed CID for ID \"{id}\"");
        Ok(())
    }

    /// The CID registered for `id`, if any.
    pub async fn tenant_cid(&self, id: &str) -> Option<String> {
        self.store.get_cid(id).await
    }

    /// Obtain a certificate for `domain` on behalf of the tenant `id`. See [`Renewer::renew`].
    ///
    /// The DNS server must be running concurrently, since the CA validates the challenge by
    /// querying it.
    ///
    /// # Errors
    ///
    /// Returns `C::Error` from the client, or [`Error::TenantNotFound`] converted into it.
    pub async fn renew<C: AcmeClient>(
        &self,
        id: &str,
        domain: &str,
        client: &mut C,
        private_key: &C::PrivateKey,
    ) -> Result<C::Certificate, C::Error> {
        self.renewer.renew(id, domain, client, private_key).await
    }

    /// Run [`Certifier::renew`] on its own task. The handle resolves to the renewal's result.
    pub fn spawn_renew<C: AcmeClient + 'static>(
        &self,
        id: String,
        domain: String,
        mut client: C,
        private_key: C::PrivateKey,
    ) -> JoinHandle<Result<C::Certificate, C::Error>> {
        let renewer = self.renewer.clone();
        tokio::spawn(async move {
            renewer
                .renew(&id, &domain, &mut client, &private_key)
                .await
        })
    }
}
