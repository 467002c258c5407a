//! Route definitions for the `/users` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET   /freelancers  -> list_freelancers
/// PATCH /profile      -> update_profile (requires auth)
/// GET   /{id}         -> get_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/freelancers", get(user::list_freelancers))
        .route("/profile", patch(user::update_profile))
        .route("/{id}", get(user::get_user))
}
