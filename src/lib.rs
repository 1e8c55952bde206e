//! Certifier
//!
//! A minimal authoritative DNS server for completing [RFC-8555][RFC-8555] [DNS-01] challenges
//! on behalf of many tenants.
//!
//! Each tenant is registered under an opaque, unguessable CID. During a renewal its challenge
//! is served only at `<domain label>.<cid>.<root>`, so one tenant can neither collide with nor
//! answer for another tenant's domain. Tenants point their `_acme-challenge` records at that
//! name with a `CNAME`, and the root domain is delegated to Certifier with an `NS` record.
//!
//! [RFC-8555]: https://www.rfc-editor.org/rfc/rfc8555
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4
//!
#![warn(clippy::pedantic)]

pub mod acme;
pub mod api;
pub mod certifier;
pub mod config;
pub mod dns;
pub mod error;
pub mod key;
pub mod store;

pub use acme::{AcmeClient, ChallengeProvider, Dns01Provider, Renewer};
pub use api::new as new_http;
pub use certifier::Certifier;
pub use config::{Config, Shared};
pub use store::{DynStore, FileStore, MemoryStore, Store};
