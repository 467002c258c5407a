//! Handlers for the `/projects` resource.
//!
//! Authorization and the bidding rules live in
//! [`ProjectBiddingService`](gigboard_core::bidding::ProjectBiddingService);
//! these handlers only translate between HTTP and the service.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gigboard_core::project::{
    NewProject, Project, ProjectListParams, ProjectQuery, ProjectResponse, ResponseDecision,
    ResponsePayload, ResponseWithProject,
};
use gigboard_core::types::DbId;
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
pub struct ProjectEnvelope {
    pub project: Project,
}

#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    pub response: ProjectResponse,
}

#[derive(Debug, Serialize)]
pub struct MyResponsesEnvelope {
    pub responses: Vec<ResponseWithProject>,
}

#[derive(Debug, Serialize)]
pub struct MyProjectsEnvelope {
    pub projects: Vec<Project>,
}

/// GET /api/v1/projects
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<ProjectListResponse>> {
    let query = ProjectQuery::from_params(&params)?;
    let page = state.bidding.list_projects(&query).await?;
    Ok(Json(ProjectListResponse {
        projects: page.items,
        total: page.total,
        page: page.page,
        pages: page.pages,
    }))
}

/// GET /api/v1/projects/{id}
///
/// Every successful read counts as a view.
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectEnvelope>> {
    let project = state.bidding.get_project(id).await?;
    Ok(Json(ProjectEnvelope { project }))
}

/// POST /api/v1/projects
pub async fn create_project(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiJson(input): ApiJson<NewProject>,
) -> AppResult<(StatusCode, Json<ProjectEnvelope>)> {
    let project = state
        .bidding
        .create_project(&auth_user.principal(), input)
        .await?;
    tracing::info!(project_id = project.id, owner_id = auth_user.user_id, "Project created");
    Ok((StatusCode::CREATED, Json(ProjectEnvelope { project })))
}

/// POST /api/v1/projects/{id}/respond
pub async fn submit_response(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(project_id): Path<DbId>,
    ApiJson(payload): ApiJson<ResponsePayload>,
) -> AppResult<(StatusCode, Json<ResponseEnvelope>)> {
    let response = state
        .bidding
        .submit_response(project_id, &auth_user.principal(), payload)
        .await?;
    tracing::info!(
        project_id,
        response_id = response.id,
        freelancer_id = auth_user.user_id,
        "Response submitted"
    );
    Ok((StatusCode::CREATED, Json(ResponseEnvelope { response })))
}

/// PATCH /api/v1/projects/{project_id}/responses/{response_id}
pub async fn update_response_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((project_id, response_id)): Path<(DbId, DbId)>,
    ApiJson(decision): ApiJson<ResponseDecision>,
) -> AppResult<Json<ResponseEnvelope>> {
    let status = decision.parse()?;
    let response = state
        .bidding
        .update_response_status(project_id, response_id, &auth_user.principal(), status)
        .await?;
    tracing::info!(project_id, response_id, status = %status, "Response decided");
    Ok(Json(ResponseEnvelope { response }))
}

/// GET /api/v1/projects/my/responses
pub async fn my_responses(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<MyResponsesEnvelope>> {
    let responses = state
        .bidding
        .list_responses_for_user(&auth_user.principal())
        .await?;
    Ok(Json(MyResponsesEnvelope { responses }))
}

/// GET /api/v1/projects/client/my-projects
pub async fn my_projects(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<MyProjectsEnvelope>> {
    let projects = state
        .bidding
        .list_projects_for_owner(&auth_user.principal())
        .await?;
    Ok(Json(MyProjectsEnvelope { projects }))
}
