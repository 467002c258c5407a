//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod chat_repo;
pub mod message_repo;
pub mod project_repo;
pub mod session_repo;
pub mod user_repo;

pub use chat_repo::ChatRepo;
pub use message_repo::MessageRepo;
pub use project_repo::ProjectRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
