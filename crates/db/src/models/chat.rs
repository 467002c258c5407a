//! Chat entity model.

use gigboard_core::chat::ChatParticipants;
use gigboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `chats` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Chat {
    pub id: DbId,
    pub project_id: DbId,
    pub client_id: DbId,
    pub freelancer_id: DbId,
    pub last_message: String,
    pub last_message_at: Timestamp,
    pub unread_count_client: i32,
    pub unread_count_freelancer: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl Chat {
    pub fn participants(&self) -> ChatParticipants {
        ChatParticipants {
            client_id: self.client_id,
            freelancer_id: self.freelancer_id,
        }
    }
}

/// A chat with the names needed to render a chat list.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatOverview {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub chat: Chat,
    pub project_title: String,
    pub client_name: String,
    pub freelancer_name: String,
}

/// DTO for opening a chat.
#[derive(Debug, Clone)]
pub struct CreateChat {
    pub project_id: DbId,
    pub client_id: DbId,
    pub freelancer_id: DbId,
}
