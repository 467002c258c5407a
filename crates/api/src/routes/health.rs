//! Root-level `/health` for load balancers and uptime checks.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use gigboard_core::project::ProjectStatus;
use gigboard_db::repositories::ProjectRepo;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Projects accepting responses. Absent while the database is down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_projects: Option<i64>,
    /// Yandex login mode, see [`YandexConfig::mode`](crate::oauth::yandex::YandexConfig::mode).
    pub oauth: &'static str,
}

/// GET /health
///
/// Always 200; callers read `status`.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let open_projects = match gigboard_db::health_check(&state.pool).await {
        Ok(()) => match ProjectRepo::count_by_status(&state.pool, ProjectStatus::Open).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(error = %e, "Open project count failed");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            None
        }
    };
    let db_healthy = open_projects.is_some();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        open_projects,
        oauth: state.config.yandex.mode(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
