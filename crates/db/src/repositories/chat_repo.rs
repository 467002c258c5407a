//! Repository for the `chats` table.

use gigboard_core::chat::ChatSide;
use gigboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::chat::{Chat, ChatOverview, CreateChat};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, client_id, freelancer_id, last_message, last_message_at, \
                       unread_count_client, unread_count_freelancer, is_active, created_at";

/// Provides persistence operations for chats.
pub struct ChatRepo;

impl ChatRepo {
    /// Return the chat for the `(project, client, freelancer)` triple, creating it
    /// if needed. The flag is `true` when a new row was inserted.
    ///
    /// An existing chat that was deactivated comes back active, so reopening
    /// never hands out a chat the message endpoints would refuse.
    pub async fn find_or_create(
        pool: &PgPool,
        input: &CreateChat,
    ) -> Result<(Chat, bool), sqlx::Error> {
        let insert = format!(
            "INSERT INTO chats (project_id, client_id, freelancer_id)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_chats_participants DO NOTHING
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Chat>(&insert)
            .bind(input.project_id)
            .bind(input.client_id)
            .bind(input.freelancer_id)
            .fetch_optional(pool)
            .await?;
        if let Some(chat) = created {
            return Ok((chat, true));
        }

        let reopen = format!(
            "UPDATE chats SET is_active = true
             WHERE project_id = $1 AND client_id = $2 AND freelancer_id = $3
             RETURNING {COLUMNS}"
        );
        let existing = sqlx::query_as::<_, Chat>(&reopen)
            .bind(input.project_id)
            .bind(input.client_id)
            .bind(input.freelancer_id)
            .fetch_one(pool)
            .await?;
        Ok((existing, false))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Chat>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM chats WHERE id = $1");
        sqlx::query_as::<_, Chat>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active chats the user takes part in, most recent activity first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ChatOverview>, sqlx::Error> {
        sqlx::query_as::<_, ChatOverview>(
            "SELECT c.id, c.project_id, c.client_id, c.freelancer_id, c.last_message,
                    c.last_message_at, c.unread_count_client, c.unread_count_freelancer,
                    c.is_active, c.created_at,
                    p.title AS project_title,
                    cu.full_name AS client_name,
                    fu.full_name AS freelancer_name
             FROM chats c
             JOIN projects p ON p.id = c.project_id
             JOIN users cu ON cu.id = c.client_id
             JOIN users fu ON fu.id = c.freelancer_id
             WHERE (c.client_id = $1 OR c.freelancer_id = $1) AND c.is_active = true
             ORDER BY c.last_message_at DESC, c.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Mark every unread message from the other participant as read and
    /// zero the reader's unread counter. Returns the number of messages marked.
    pub async fn mark_read(
        pool: &PgPool,
        chat_id: DbId,
        reader_id: DbId,
        reader_side: ChatSide,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let marked = sqlx::query(
            "UPDATE messages SET is_read = true
             WHERE chat_id = $1 AND sender_id <> $2 AND is_read = false",
        )
        .bind(chat_id)
        .bind(reader_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let counter = unread_column(reader_side);
        sqlx::query(&format!("UPDATE chats SET {counter} = 0 WHERE id = $1"))
            .bind(chat_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(marked)
    }
}

/// The unread counter owned by `side`.
pub(crate) fn unread_column(side: ChatSide) -> &'static str {
    match side {
        ChatSide::Client => "unread_count_client",
        ChatSide::Freelancer => "unread_count_freelancer",
    }
}
