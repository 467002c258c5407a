//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! match. Roles are a closed enum, so each check is an exhaustive match.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gigboard_core::error::CoreError;
use gigboard_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `client` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn client_only(RequireClient(user): RequireClient) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireClient(pub AuthUser);

impl FromRequestParts<AppState> for RequireClient {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        match user.role {
            Role::Client => Ok(RequireClient(user)),
            Role::Freelancer => Err(AppError::Core(CoreError::Forbidden(
                "Client role required".into(),
            ))),
        }
    }
}
