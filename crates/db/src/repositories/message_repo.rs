//! Repository for the `messages` table.

use gigboard_core::chat::ChatSide;
use gigboard_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::message::{CreateMessage, Message};
use crate::repositories::chat_repo::unread_column;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, chat_id, sender_id, text, kind, file, is_read, created_at";

/// Provides persistence operations for chat messages.
pub struct MessageRepo;

impl MessageRepo {
    /// Store a message and update the chat's preview and the recipient's
    /// unread counter in the same transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMessage,
        recipient: ChatSide,
    ) -> Result<Message, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO messages (chat_id, sender_id, text, kind, file)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let message = sqlx::query_as::<_, Message>(&query)
            .bind(input.chat_id)
            .bind(input.sender_id)
            .bind(&input.text)
            .bind(input.kind.as_str())
            .bind(input.file.as_ref().map(Json))
            .fetch_one(&mut *tx)
            .await?;

        let counter = unread_column(recipient);
        sqlx::query(&format!(
            "UPDATE chats SET
                last_message = $2,
                last_message_at = $3,
                {counter} = {counter} + 1
             WHERE id = $1"
        ))
        .bind(input.chat_id)
        .bind(&message.text)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(message)
    }

    /// All messages in a chat, oldest first.
    pub async fn list_for_chat(pool: &PgPool, chat_id: DbId) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages WHERE chat_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(chat_id)
            .fetch_all(pool)
            .await
    }
}
