//! Domain types for the cohort portal.
//!
//! Everything here is free of I/O: worksheet schemas, typed row views,
//! SDLC phases, notification templates, and input validation. The sheet
//! access layer and the HTTP surface both build on these.

pub mod error;
pub mod models;
pub mod notification;
pub mod phase;
pub mod roles;
pub mod schema;
pub mod types;
pub mod validation;
