//! Repository for the `user_sessions` table.

use gigboard_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::session::{NewSession, RefreshSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, user_agent, ip_address, expires_at, \
                       revoked_at, rotated_to, created_at, updated_at";

/// Refresh-session persistence: issue, look up, rotate, revoke.
pub struct SessionRepo;

impl SessionRepo {
    /// Store a freshly issued refresh token.
    pub async fn create(pool: &PgPool, input: &NewSession) -> Result<RefreshSession, sqlx::Error> {
        Self::insert(pool, input).await
    }

    async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        input: &NewSession,
    ) -> Result<RefreshSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, token_hash, user_agent, ip_address, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(&input.origin.user_agent)
            .bind(&input.origin.ip_address)
            .bind(input.expires_at)
            .fetch_one(executor)
            .await
    }

    /// Find a session by token hash in any state. Callers distinguish live,
    /// expired and rotated sessions.
    pub async fn find_by_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<RefreshSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_sessions WHERE token_hash = $1");
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Exchange live session `old_id` for `next` in one transaction: the old
    /// row is revoked and linked to its successor.
    ///
    /// Returns `None` without writing anything when `old_id` is no longer
    /// live, which includes losing a race against a concurrent rotation.
    pub async fn rotate(
        pool: &PgPool,
        old_id: DbId,
        next: &NewSession,
    ) -> Result<Option<RefreshSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM user_sessions
             WHERE id = $1 AND revoked_at IS NULL AND expires_at > NOW()
             FOR UPDATE",
        )
        .bind(old_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let successor = Self::insert(&mut *tx, next).await?;
        sqlx::query("UPDATE user_sessions SET revoked_at = NOW(), rotated_to = $2 WHERE id = $1")
            .bind(old_id)
            .bind(successor.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(successor))
    }

    /// Revoke every live session of a user. Returns how many were revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET revoked_at = NOW()
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Live sessions of a user, newest first.
    pub async fn list_live_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<RefreshSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > NOW()
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
