//! Handlers for the `/chats` resource.
//!
//! Chats are polled: clients fetch messages over plain HTTP and reading a
//! chat marks the other participant's messages as read.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gigboard_core::chat::{ChatSide, OpenChat, SendMessage};
use gigboard_core::error::CoreError;
use gigboard_core::types::DbId;
use gigboard_db::models::chat::{Chat, ChatOverview, CreateChat};
use gigboard_db::models::message::{CreateMessage, Message};
use gigboard_db::repositories::{ChatRepo, MessageRepo, ProjectRepo, UserRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireClient;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatEnvelope {
    pub chat: Chat,
}

#[derive(Debug, Serialize)]
pub struct ChatListEnvelope {
    pub chats: Vec<ChatOverview>,
}

#[derive(Debug, Serialize)]
pub struct MessagesEnvelope {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub message: Message,
}

/// POST /api/v1/chats
///
/// Returns 201 when the chat is new and 200 when it already existed.
pub async fn open_chat(
    State(state): State<AppState>,
    RequireClient(auth_user): RequireClient,
    ApiJson(input): ApiJson<OpenChat>,
) -> AppResult<(StatusCode, Json<ChatEnvelope>)> {
    let project = ProjectRepo::find_by_id(&state.pool, input.project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: input.project_id,
        }))?;
    if project.owner_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the project owner can open a chat for it".into(),
        )));
    }
    if !UserRepo::is_active_freelancer(&state.pool, input.freelancer_id).await? {
        return Err(AppError::Core(CoreError::Validation(
            "freelancer_id: must refer to an existing freelancer".into(),
        )));
    }

    let (chat, created) = ChatRepo::find_or_create(
        &state.pool,
        &CreateChat {
            project_id: project.id,
            client_id: auth_user.user_id,
            freelancer_id: input.freelancer_id,
        },
    )
    .await?;

    let status = if created {
        tracing::info!(chat_id = chat.id, project_id = project.id, "Chat opened");
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ChatEnvelope { chat })))
}

/// GET /api/v1/chats/my
pub async fn my_chats(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<ChatListEnvelope>> {
    let chats = ChatRepo::list_for_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(ChatListEnvelope { chats }))
}

/// GET /api/v1/chats/{id}/messages
///
/// Oldest first. Marks the other participant's messages as read and resets
/// the caller's unread counter.
pub async fn list_messages(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(chat_id): Path<DbId>,
) -> AppResult<Json<MessagesEnvelope>> {
    let (_, side) = load_chat_for(&state, chat_id, auth_user).await?;

    let marked = ChatRepo::mark_read(&state.pool, chat_id, auth_user.user_id, side).await?;
    if marked > 0 {
        tracing::debug!(chat_id, marked, "Messages marked read");
    }

    let messages = MessageRepo::list_for_chat(&state.pool, chat_id).await?;
    Ok(Json(MessagesEnvelope { messages }))
}

/// POST /api/v1/chats/{id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(chat_id): Path<DbId>,
    ApiJson(input): ApiJson<SendMessage>,
) -> AppResult<(StatusCode, Json<MessageEnvelope>)> {
    input.check()?;
    let (chat, side) = load_chat_for(&state, chat_id, auth_user).await?;

    let message = MessageRepo::create(
        &state.pool,
        &CreateMessage {
            chat_id: chat.id,
            sender_id: auth_user.user_id,
            text: input.text.trim().to_string(),
            kind: input.kind,
            file: input.file,
        },
        side.other(),
    )
    .await?;
    tracing::info!(chat_id, message_id = message.id, "Message sent");

    Ok((StatusCode::CREATED, Json(MessageEnvelope { message })))
}

/// Load a chat and the caller's side of it. Outsiders get 403.
async fn load_chat_for(
    state: &AppState,
    chat_id: DbId,
    auth_user: AuthUser,
) -> AppResult<(Chat, ChatSide)> {
    let chat = ChatRepo::find_by_id(&state.pool, chat_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Chat",
            id: chat_id,
        }))?;
    let side = chat.participants().require_participant(auth_user.user_id)?;
    Ok((chat, side))
}
