//! Chat message model and DTOs.

use gigboard_core::chat::{FileAttachment, MessageKind};
use gigboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub chat_id: DbId,
    pub sender_id: DbId,
    pub text: String,
    pub kind: String,
    pub file: Option<Json<FileAttachment>>,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// DTO for storing a message.
#[derive(Debug, Clone)]
pub struct CreateMessage {
    pub chat_id: DbId,
    pub sender_id: DbId,
    pub text: String,
    pub kind: MessageKind,
    pub file: Option<FileAttachment>,
}
