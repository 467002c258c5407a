//! Repository for the `users` table.

use gigboard_core::profile::FreelancerQuery;
use gigboard_core::project::like_pattern;
use gigboard_core::roles::ROLE_FREELANCER;
use gigboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, full_name, role, profile, \
                       oauth_provider, oauth_subject, is_active, created_at, updated_at";

/// Freelancer search predicate. `$1` category, `$2` ILIKE pattern, `$3` raw search text.
const FREELANCER_FILTER: &str = "role = 'freelancer' AND is_active = true
    AND ($1::text IS NULL OR COALESCE(profile->>'category', 'other') = $1)
    AND ($2::text IS NULL
         OR full_name ILIKE $2
         OR COALESCE(profile->>'bio', '') ILIKE $2
         OR EXISTS (
             SELECT 1 FROM jsonb_array_elements_text(COALESCE(profile->'skills', '[]'::jsonb)) AS skill
             WHERE lower(skill) = lower($3)
         ))";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users
                (email, password_hash, full_name, role, profile, oauth_provider, oauth_subject)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .bind(input.role.as_str())
            .bind(input.profile.to_json())
            .bind(&input.oauth_provider)
            .bind(&input.oauth_subject)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find the account linked to an external identity.
    pub async fn find_by_oauth_identity(
        pool: &PgPool,
        provider: &str,
        subject: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE oauth_provider = $1 AND oauth_subject = $2"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(provider)
            .bind(subject)
            .fetch_optional(pool)
            .await
    }

    /// Link an external identity to an existing account and refresh its
    /// name and profile document from the provider.
    pub async fn link_oauth_identity(
        pool: &PgPool,
        id: DbId,
        provider: &str,
        subject: &str,
        full_name: &str,
        profile: &serde_json::Value,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                oauth_provider = $2,
                oauth_subject = $3,
                full_name = $4,
                profile = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(provider)
            .bind(subject)
            .bind(full_name)
            .bind(profile)
            .fetch_optional(pool)
            .await
    }

    /// Replace the profile document and optionally the display name.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        full_name: Option<&str>,
        profile: &serde_json::Value,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                full_name = COALESCE($2, full_name),
                profile = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(full_name)
            .bind(profile)
            .fetch_optional(pool)
            .await
    }

    /// Active freelancers matching the query, highest rated first, plus the
    /// total number of matches.
    pub async fn search_freelancers(
        pool: &PgPool,
        query: &FreelancerQuery,
    ) -> Result<(Vec<User>, i64), sqlx::Error> {
        let category = query.category.map(|c| c.as_str());
        let pattern = query.search.as_deref().map(like_pattern);

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM users WHERE {FREELANCER_FILTER}"))
                .bind(category)
                .bind(&pattern)
                .bind(&query.search)
                .fetch_one(pool)
                .await?;

        let sql = format!(
            "SELECT {COLUMNS} FROM users
             WHERE {FREELANCER_FILTER}
             ORDER BY COALESCE((profile->>'rating')::float8, 5.0) DESC, id ASC
             LIMIT $4 OFFSET $5"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(category)
            .bind(&pattern)
            .bind(&query.search)
            .bind(query.page.limit)
            .bind(query.page.offset())
            .fetch_all(pool)
            .await?;

        Ok((users, total))
    }

    /// True if `id` belongs to an active freelancer.
    pub async fn is_active_freelancer(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND role = $2 AND is_active = true)",
        )
        .bind(id)
        .bind(ROLE_FREELANCER)
        .fetch_one(pool)
        .await?;
        Ok(exists.0)
    }
}
