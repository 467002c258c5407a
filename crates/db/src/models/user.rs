//! User entity model and DTOs.

use gigboard_core::error::CoreError;
use gigboard_core::profile::UserProfile;
use gigboard_core::roles::Role;
use gigboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] or [`PublicUser`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    /// `None` for accounts created through OAuth.
    pub password_hash: Option<String>,
    pub full_name: String,
    pub role: String,
    pub profile: serde_json::Value,
    pub oauth_provider: Option<String>,
    pub oauth_subject: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn role(&self) -> Result<Role, CoreError> {
        self.role
            .parse()
            .map_err(|_| CoreError::Internal(format!("User {} has unknown role '{}'", self.id, self.role)))
    }

    pub fn profile(&self) -> Result<UserProfile, CoreError> {
        UserProfile::from_json(self.profile.clone())
    }
}

/// The caller's own account, as returned by auth endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub profile: UserProfile,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl TryFrom<User> for UserResponse {
    type Error = CoreError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            role: user.role()?,
            profile: user.profile()?,
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            created_at: user.created_at,
        })
    }
}

/// Another user's profile as visible to anyone (no email, no credentials).
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: DbId,
    pub full_name: String,
    pub role: Role,
    pub profile: UserProfile,
    pub created_at: Timestamp,
}

impl TryFrom<User> for PublicUser {
    type Error = CoreError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            role: user.role()?,
            profile: user.profile()?,
            id: user.id,
            full_name: user.full_name,
            created_at: user.created_at,
        })
    }
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: Option<String>,
    pub full_name: String,
    pub role: Role,
    pub profile: UserProfile,
    pub oauth_provider: Option<String>,
    pub oauth_subject: Option<String>,
}
