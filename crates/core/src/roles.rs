//! Well-known role name constants.
//!
//! Embedded in session tokens; the admin role is granted only to the single
//! configured administrator credential.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PARTICIPANT: &str = "participant";
