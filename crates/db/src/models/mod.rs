//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - Conversions into the domain types from `gigboard_core` where one exists

pub mod chat;
pub mod message;
pub mod project;
pub mod session;
pub mod user;
