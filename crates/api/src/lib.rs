//! HTTP surface of the cohort portal.
//!
//! The binary in `main.rs` and the integration tests both assemble the app
//! through [`router::build_app_router`].

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod secrets;
pub mod sessions;
pub mod state;
