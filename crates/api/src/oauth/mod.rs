//! External identity providers.

pub mod yandex;
