//! Authoritative DNS server for the delegated challenge zone.
//!
//! Certifier answers only standard queries. Any other operation code is answered with
//! `REFUSED`. Every question of a query is answered independently, and a response with no
//! answers carries `NXDOMAIN`. Responses are authoritative and never offer recursion.
//!
//! # Dynamic TXT Records
//!
//! Certifier will serve a response to `TXT` class queries for names of the exact shape
//! `<label>.<cid>.<root>`, iff a [RFC-8555][RFC-8555] [DNS-01] challenge response value has
//! been presented for that CID and label during a [renewal][crate::acme].
//!
//! E.g. with config:
//! ```json
//! {
//!   "root": "acme.example.net",
//!   "public": "ns.example.net",
//!   ...
//! }
//! ```
//!
//! While the tenant with CID `9c5e…` is renewing a certificate for `test.example.com`, a `TXT`
//! class query for `test-example-com.9c5e….acme.example.net` would return:
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 5353 +short test-example-com.9c5e….acme.example.net TXT
//! "LPsIwTo7o8BoG0-vjCyGQGBWSVIPxI-i_X336eUOQZo"
//! ```
//!
//! These answers have a TTL of 1 second. Names with more or fewer labels in front of the root
//! never resolve to a challenge.
//!
//! [RFC-8555]: https://www.rfc-editor.org/rfc/rfc8555
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4
//!
//! # Static Records
//!
//! `NS` and `SOA` records are served for the root domain and for any name up to two labels
//! below it, so that resolvers probing for the zone cut at different depths all find the
//! delegation. Both are derived from the [`Config`][`crate::config::Config`] and have a TTL of
//! one day.
//!
//! ## NS
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 5353 acme.example.net +short NS
//! ns.example.net.
//! ```
//!
//! ## SOA
//!
//! ```bash
//! ❯ dig @127.0.0.1 -p 5353 acme.example.net +short SOA
//! ns.example.net. admin.ns.example.net. 20230312 14400 3600 604800 86400
//! ```
//!
//! _Note: Unless [`Config::serial`][`crate::config::Config::serial`] is set, the zone serial
//! (`20230312`) will differ based on the date the query is performed._

pub(crate) mod handlers;
pub(crate) mod server;

pub use handlers::{Answer, Handler};
