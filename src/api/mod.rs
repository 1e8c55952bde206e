//! Admin HTTP API for managing tenants.
//!
//! The API is only served when [`Config::api_bind_addr`][crate::config::Config::api_bind_addr]
//! is set, and only on loopback or private addresses. It performs no authentication of its own.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/register` (POST)
//!
//!   Expects a JSON request body of the form:
//!
//!   ```json
//!   { "id": "customer-1234" }
//!   ```
//!
//!   Where `id` is the caller's own identifier for the tenant. A new CID is generated for it and
//!   returned with HTTP 200 (OK):
//!
//!   ```json
//!   { "id": "customer-1234", "cid": "1f0b6a64-2d4c-4c52-8d0c-5c7c2b3d1e9a" }
//!   ```
//!
//!   Registering an `id` twice returns HTTP 409 (Conflict) and leaves the first CID in place.
//!   An empty `id` returns HTTP 400 (Bad Request).
//!
//! ## `/deregister` (POST)
//!
//!   Expects the same body as `/register` and removes the tenant, returning `{ "id": ... }`.
//!   Unknown ids return HTTP 404 (Not Found).
//!
//! ## `/tenants/:id` (GET)
//!
//!   Returns the tenant's CID in the same form as `/register`, or HTTP 404 (Not Found).
//!
//! Errors are returned as `{ "error": "..." }`.

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::new;
