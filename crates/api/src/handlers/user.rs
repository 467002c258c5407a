//! Handlers for the `/users` resource: freelancer directory and profiles.

use axum::extract::{Path, Query, State};
use axum::Json;
use gigboard_core::error::CoreError;
use gigboard_core::pagination::Page;
use gigboard_core::profile::{FreelancerListParams, FreelancerQuery, ProfileUpdate};
use gigboard_core::types::DbId;
use gigboard_db::models::user::{PublicUser, UserResponse};
use gigboard_db::repositories::UserRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FreelancerListResponse {
    pub freelancers: Vec<PublicUser>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct PublicUserEnvelope {
    pub user: PublicUser,
}

/// GET /api/v1/users/freelancers
pub async fn list_freelancers(
    State(state): State<AppState>,
    Query(params): Query<FreelancerListParams>,
) -> AppResult<Json<FreelancerListResponse>> {
    let query = FreelancerQuery::from_params(&params)?;
    let (users, total) = UserRepo::search_freelancers(&state.pool, &query).await?;

    let freelancers = users
        .into_iter()
        .map(PublicUser::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let page = Page::new(freelancers, total, query.page);

    Ok(Json(FreelancerListResponse {
        freelancers: page.items,
        total: page.total,
        page: page.page,
        pages: page.pages,
    }))
}

/// PATCH /api/v1/users/profile
///
/// Only the supplied fields change. `name` updates the account's full name.
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidJson(update): ValidJson<ProfileUpdate>,
) -> AppResult<Json<UserEnvelope>> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        })
    };

    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(not_found)?;

    let mut profile = user.profile()?;
    let full_name = profile.apply(update);

    let updated = UserRepo::update_profile(
        &state.pool,
        user.id,
        full_name.as_deref(),
        &profile.to_json(),
    )
    .await?
    .ok_or_else(not_found)?;
    tracing::info!(user_id = updated.id, "Profile updated");

    Ok(Json(UserEnvelope {
        user: updated.try_into()?,
    }))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PublicUserEnvelope>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(PublicUserEnvelope {
        user: user.try_into()?,
    }))
}
