pub mod auth;
pub mod chat;
pub mod project;
pub mod user;
