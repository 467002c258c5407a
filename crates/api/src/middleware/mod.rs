//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireClient`] -- Requires the `client` role.

pub mod auth;
pub mod rbac;
