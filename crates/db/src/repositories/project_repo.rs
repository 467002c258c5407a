//! Repository for the `projects` and `project_responses` tables.

use gigboard_core::project::{
    like_pattern, NewProject, NewResponse, ProjectQuery, ProjectStatus, ResponseStatus,
};
use gigboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{ProjectRow, ResponseRow, ResponseWithProjectRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, title, description, category, budget, deadline, skills, \
                       status, views, created_at, updated_at";

const RESPONSE_COLUMNS: &str =
    "id, project_id, freelancer_id, proposal, price, timeline, status, created_at";

/// Listing predicate. `$1` status, `$2` category, `$3` ILIKE pattern, `$4` raw search text.
const LIST_FILTER: &str = "status = $1
    AND ($2::text IS NULL OR category = $2)
    AND ($3::text IS NULL
         OR title ILIKE $3
         OR description ILIKE $3
         OR EXISTS (SELECT 1 FROM unnest(skills) AS skill WHERE lower(skill) = lower($4)))";

/// Provides persistence operations for projects and their responses.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    ///
    /// The project starts `open` with zero views.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &NewProject,
    ) -> Result<ProjectRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (owner_id, title, description, category, budget, deadline, skills)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, ''), COALESCE($7, '{{}}'::text[]))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.category.as_str())
            .bind(input.budget)
            .bind(&input.deadline)
            .bind(&input.skills)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Add one to `views` in place and return the updated row.
    pub async fn increment_views(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query =
            format!("UPDATE projects SET views = views + 1 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of projects matching `query`, newest first, plus the total match count.
    pub async fn query(
        pool: &PgPool,
        query: &ProjectQuery,
    ) -> Result<(Vec<ProjectRow>, i64), sqlx::Error> {
        let category = query.category.map(|c| c.as_str());
        let pattern = query.search.as_deref().map(like_pattern);

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM projects WHERE {LIST_FILTER}"))
                .bind(query.status.as_str())
                .bind(category)
                .bind(&pattern)
                .bind(&query.search)
                .fetch_one(pool)
                .await?;

        let sql = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE {LIST_FILTER}
             ORDER BY created_at DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(query.status.as_str())
            .bind(category)
            .bind(&pattern)
            .bind(&query.search)
            .bind(query.page.limit)
            .bind(query.page.offset())
            .fetch_all(pool)
            .await?;

        Ok((rows, total))
    }

    /// Number of projects currently in `status`.
    pub async fn count_by_status(pool: &PgPool, status: ProjectStatus) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Projects posted by `owner_id`, newest first.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Responses for the given projects in submission order.
    pub async fn list_responses_for_projects(
        pool: &PgPool,
        project_ids: &[DbId],
    ) -> Result<Vec<ResponseRow>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM project_responses
             WHERE project_id = ANY($1)
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ResponseRow>(&query)
            .bind(project_ids)
            .fetch_all(pool)
            .await
    }

    /// Insert a response unless the freelancer already responded to the project.
    ///
    /// Returns `None` when `uq_project_responses_project_freelancer` already
    /// holds a row for the pair.
    pub async fn insert_response(
        pool: &PgPool,
        project_id: DbId,
        input: &NewResponse,
    ) -> Result<Option<ResponseRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_responses (project_id, freelancer_id, proposal, price, timeline)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_project_responses_project_freelancer DO NOTHING
             RETURNING {RESPONSE_COLUMNS}"
        );
        sqlx::query_as::<_, ResponseRow>(&query)
            .bind(project_id)
            .bind(input.freelancer_id)
            .bind(&input.proposal)
            .bind(input.price)
            .bind(&input.timeline)
            .fetch_optional(pool)
            .await
    }

    /// Decide a pending response. Accepting also moves an `open` project to
    /// `in_progress`. Both updates commit together.
    ///
    /// Returns `None` if the response does not exist on the project or is no
    /// longer pending.
    pub async fn decide_response(
        pool: &PgPool,
        project_id: DbId,
        response_id: DbId,
        status: ResponseStatus,
    ) -> Result<Option<ResponseRow>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE project_responses SET status = $3
             WHERE id = $2 AND project_id = $1 AND status = $4
             RETURNING {RESPONSE_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ResponseRow>(&query)
            .bind(project_id)
            .bind(response_id)
            .bind(status.as_str())
            .bind(ResponseStatus::Pending.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        if updated.is_some() && status == ResponseStatus::Accepted {
            sqlx::query("UPDATE projects SET status = $2 WHERE id = $1 AND status = $3")
                .bind(project_id)
                .bind(ProjectStatus::InProgress.as_str())
                .bind(ProjectStatus::Open.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Every response by `freelancer_id` with its project and owner, newest first.
    pub async fn list_responses_by_freelancer(
        pool: &PgPool,
        freelancer_id: DbId,
    ) -> Result<Vec<ResponseWithProjectRow>, sqlx::Error> {
        sqlx::query_as::<_, ResponseWithProjectRow>(
            "SELECT r.id, r.project_id, r.freelancer_id, r.proposal, r.price, r.timeline,
                    r.status, r.created_at,
                    p.title AS project_title, p.budget AS project_budget,
                    p.owner_id, u.full_name AS owner_name
             FROM project_responses r
             JOIN projects p ON p.id = r.project_id
             JOIN users u ON u.id = p.owner_id
             WHERE r.freelancer_id = $1
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(freelancer_id)
        .fetch_all(pool)
        .await
    }
}
