//! Domain logic for the Gigboard freelance marketplace.
//!
//! This crate has no database or HTTP dependencies. Persistence is reached
//! through the [`bidding::ProjectStore`] trait, implemented by `gigboard-db`.

pub mod bidding;
pub mod chat;
pub mod error;
pub mod pagination;
pub mod profile;
pub mod project;
pub mod roles;
pub mod types;
