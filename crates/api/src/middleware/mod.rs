//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the JWT Bearer token to a live login session.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireParticipant`] -- Requires the `participant` role.
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.

pub mod auth;
pub mod rbac;
