//! Vega Video HTTP server.
//!
//! Wires the core wizard, avatar catalog, and vendor client into a running
//! Axum server. Serves the JSON API at `/v1/*` and a minimal landing page
//! at `/`.

pub mod config;
pub mod error;
pub mod routes;
pub mod sessions;
pub mod state;
