//! PostgreSQL implementation of [`ProjectStore`].

use std::collections::HashMap;

use gigboard_core::bidding::ProjectStore;
use gigboard_core::error::CoreError;
use gigboard_core::project::{
    NewProject, NewResponse, Project, ProjectQuery, ProjectResponse, ResponseStatus,
    ResponseWithProject,
};
use gigboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::ProjectRow;
use crate::repositories::ProjectRepo;

/// Project aggregates backed by the `projects` and `project_responses` tables.
///
/// Responses live in their own table under a `(project_id, freelancer_id)`
/// unique constraint, so duplicate bids are rejected by the database even
/// when two submissions race.
#[derive(Debug, Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach responses to each row, keeping row order.
    async fn assemble(&self, rows: Vec<ProjectRow>) -> Result<Vec<Project>, CoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let response_rows = ProjectRepo::list_responses_for_projects(&self.pool, &ids)
            .await
            .map_err(storage_error)?;

        let mut by_project: HashMap<DbId, Vec<ProjectResponse>> = HashMap::new();
        for row in response_rows {
            let project_id = row.project_id;
            by_project
                .entry(project_id)
                .or_default()
                .push(row.try_into()?);
        }

        rows.into_iter()
            .map(|row| {
                let responses = by_project.remove(&row.id).unwrap_or_default();
                row.into_project(responses)
            })
            .collect()
    }

    async fn assemble_one(&self, row: Option<ProjectRow>) -> Result<Option<Project>, CoreError> {
        match row {
            None => Ok(None),
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
        }
    }
}

impl ProjectStore for PgProjectStore {
    async fn create_project(
        &self,
        owner_id: DbId,
        input: &NewProject,
    ) -> Result<Project, CoreError> {
        let row = ProjectRepo::create(&self.pool, owner_id, input)
            .await
            .map_err(storage_error)?;
        row.into_project(Vec::new())
    }

    async fn find_project(&self, id: DbId) -> Result<Option<Project>, CoreError> {
        let row = ProjectRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error)?;
        self.assemble_one(row).await
    }

    async fn increment_views(&self, id: DbId) -> Result<Option<Project>, CoreError> {
        let row = ProjectRepo::increment_views(&self.pool, id)
            .await
            .map_err(storage_error)?;
        self.assemble_one(row).await
    }

    async fn query_projects(&self, query: &ProjectQuery) -> Result<(Vec<Project>, i64), CoreError> {
        let (rows, total) = ProjectRepo::query(&self.pool, query)
            .await
            .map_err(storage_error)?;
        Ok((self.assemble(rows).await?, total))
    }

    async fn list_projects_by_owner(&self, owner_id: DbId) -> Result<Vec<Project>, CoreError> {
        let rows = ProjectRepo::list_by_owner(&self.pool, owner_id)
            .await
            .map_err(storage_error)?;
        self.assemble(rows).await
    }

    async fn append_response(
        &self,
        project_id: DbId,
        input: &NewResponse,
    ) -> Result<Option<ProjectResponse>, CoreError> {
        ProjectRepo::insert_response(&self.pool, project_id, input)
            .await
            .map_err(storage_error)?
            .map(ProjectResponse::try_from)
            .transpose()
    }

    async fn set_response_status(
        &self,
        project_id: DbId,
        response_id: DbId,
        status: ResponseStatus,
    ) -> Result<Option<ProjectResponse>, CoreError> {
        ProjectRepo::decide_response(&self.pool, project_id, response_id, status)
            .await
            .map_err(storage_error)?
            .map(ProjectResponse::try_from)
            .transpose()
    }

    async fn list_responses_by_freelancer(
        &self,
        freelancer_id: DbId,
    ) -> Result<Vec<ResponseWithProject>, CoreError> {
        ProjectRepo::list_responses_by_freelancer(&self.pool, freelancer_id)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(ResponseWithProject::try_from)
            .collect()
    }
}

/// Map a sqlx error into the domain error space.
///
/// A unique violation on a `uq_*` constraint becomes `Conflict`; anything
/// else is logged and reported as `Storage` without internal detail.
pub fn storage_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    tracing::error!(error = %err, "Project store failure");
    CoreError::Storage(err.to_string())
}
