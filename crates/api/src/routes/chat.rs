//! Route definitions for the `/chats` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// Routes mounted at `/chats`. Every route requires auth.
///
/// ```text
/// POST /                -> open_chat (client)
/// GET  /my              -> my_chats
/// GET  /{id}/messages   -> list_messages (participants)
/// POST /{id}/messages   -> send_message (participants)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(chat::open_chat))
        .route("/my", get(chat::my_chats))
        .route(
            "/{id}/messages",
            get(chat::list_messages).post(chat::send_message),
        )
}
