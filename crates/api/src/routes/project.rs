//! Route definitions for the `/projects` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// The static `/my/...` and `/client/...` segments take priority over `/{id}`.
///
/// ```text
/// GET   /                                 -> list_projects
/// POST  /                                 -> create_project (client)
/// GET   /my/responses                     -> my_responses
/// GET   /client/my-projects               -> my_projects
/// GET   /{id}                             -> get_project
/// POST  /{id}/respond                     -> submit_response (freelancer)
/// PATCH /{id}/responses/{response_id}     -> update_response_status (owner)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(project::list_projects).post(project::create_project),
        )
        .route("/my/responses", get(project::my_responses))
        .route("/client/my-projects", get(project::my_projects))
        .route("/{id}", get(project::get_project))
        .route("/{id}/respond", post(project::submit_response))
        .route(
            "/{id}/responses/{response_id}",
            patch(project::update_response_status),
        )
}
