//! Error types.

use std::net::IpAddr;
use trust_dns_server::proto::error::ProtoError;

/// Error enumerates the possible Certifier error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned by a [`Store`][crate::store::Store] when a CID is registered for an external id
    /// that already has one, or when a challenge is set for a (CID, domain) pair that already
    /// holds a live challenge.
    #[error("\"{0}\" already exists")]
    AlreadyExists(String),

    /// Returned by a [`Store`][crate::store::Store] when removing a CID or challenge that
    /// doesn't exist.
    #[error("\"{0}\" not found")]
    NotFound(String),

    /// Returned when renewing a certificate for an external id that has no registered CID.
    #[error("no CID registered for ID \"{0}\"")]
    TenantNotFound(String),

    /// Returned when registering a tenant with an empty external id.
    #[error("tenant ID must not be empty")]
    EmptyTenantID,

    /// Returned by [`Dns01Provider::present`][crate::acme::Dns01Provider::present] when the
    /// challenge could not be written to the store. Fails the renewal.
    #[error("failed to publish DNS-01 challenge for \"{domain}\"")]
    ChallengePublication {
        domain: String,
        #[source]
        source: Box<Error>,
    },

    /// Produced when a challenge could not be removed from the store after a renewal. Only ever
    /// logged.
    #[error("failed to retract DNS-01 challenge for \"{domain}\"")]
    ChallengeRetraction {
        domain: String,
        #[source]
        source: Box<Error>,
    },

    /// Returned by [`Certifier::shutdown`][crate::Certifier::shutdown] when no DNS listener is
    /// being served.
    #[error("DNS server is not running")]
    NotRunning,

    /// Returned when the [`Config::api_bind_addr`][`crate::config::Config::api_bind_addr`] is
    /// not a loopback address, or an address within a private network space. The
    /// [admin HTTP API][crate::api] hands out tenant identifiers and must not be reachable
    /// from the public internet.
    #[error("API bind address ({0}) must be a loopback or private IP")]
    InsecureAPIBind(IpAddr),

    /// Returned when a generic IO error occurs, including failing to bind the DNS socket.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON from disk (e.g.
    /// [trying to load a `Config`][crate::config::Config::try_from_file], or
    /// [trying to load a `FileStore`][crate::store::file::FileStore::try_from_file]) fails
    /// due to invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when the Certifier DNS server encounters a generic DNS protocol error, or when a
    /// configured domain isn't a valid DNS name.
    #[error("DNS error")]
    DNSError(#[from] ProtoError),
}
