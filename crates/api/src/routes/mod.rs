pub mod auth;
pub mod chat;
pub mod health;
pub mod project;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user (requires auth)
/// /auth/oauth/yandex                               Yandex sign-in (public)
///
/// /projects                                        list (public), create (client)
/// /projects/{id}                                   get, counts a view (public)
/// /projects/{id}/respond                           submit response (freelancer)
/// /projects/{id}/responses/{response_id}           accept/reject (owner)
/// /projects/my/responses                           caller's responses
/// /projects/client/my-projects                     caller's projects
///
/// /users/freelancers                               freelancer directory (public)
/// /users/profile                                   update own profile
/// /users/{id}                                      public profile
///
/// /chats                                           open chat (client)
/// /chats/my                                        caller's chats
/// /chats/{id}/messages                             list, send (participants)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Accounts and tokens.
        .nest("/auth", auth::router())
        // Projects and bidding.
        .nest("/projects", project::router())
        // Freelancer directory and profiles.
        .nest("/users", user::router())
        // Client/freelancer messaging.
        .nest("/chats", chat::router())
}
