//! Project and response rows.
//!
//! Enum columns are stored as text and parsed back into the domain enums;
//! a value the CHECK constraints should have rejected surfaces as
//! `CoreError::Storage`.

use std::str::FromStr;

use gigboard_core::error::CoreError;
use gigboard_core::project::{
    OwnerSummary, Project, ProjectResponse, ProjectSummary, ResponseWithProject,
};
use gigboard_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `projects` table (without responses).
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub budget: i64,
    pub deadline: String,
    pub skills: Vec<String>,
    pub status: String,
    pub views: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectRow {
    /// Combine with the project's responses, which must already be in
    /// submission order.
    pub fn into_project(self, responses: Vec<ProjectResponse>) -> Result<Project, CoreError> {
        Ok(Project {
            category: parse_column("projects.category", &self.category)?,
            status: parse_column("projects.status", &self.status)?,
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            budget: self.budget,
            deadline: self.deadline,
            skills: self.skills,
            views: self.views,
            responses,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A row from the `project_responses` table.
#[derive(Debug, Clone, FromRow)]
pub struct ResponseRow {
    pub id: DbId,
    pub project_id: DbId,
    pub freelancer_id: DbId,
    pub proposal: Option<String>,
    pub price: f64,
    pub timeline: String,
    pub status: String,
    pub created_at: Timestamp,
}

impl TryFrom<ResponseRow> for ProjectResponse {
    type Error = CoreError;

    fn try_from(row: ResponseRow) -> Result<Self, Self::Error> {
        Ok(ProjectResponse {
            status: parse_column("project_responses.status", &row.status)?,
            id: row.id,
            project_id: row.project_id,
            freelancer_id: row.freelancer_id,
            proposal: row.proposal,
            price: row.price,
            timeline: row.timeline,
            created_at: row.created_at,
        })
    }
}

/// A response joined with its project and the project owner's name.
#[derive(Debug, Clone, FromRow)]
pub struct ResponseWithProjectRow {
    #[sqlx(flatten)]
    pub response: ResponseRow,
    pub project_title: String,
    pub project_budget: i64,
    pub owner_id: DbId,
    pub owner_name: String,
}

impl TryFrom<ResponseWithProjectRow> for ResponseWithProject {
    type Error = CoreError;

    fn try_from(row: ResponseWithProjectRow) -> Result<Self, Self::Error> {
        let project = ProjectSummary {
            id: row.response.project_id,
            title: row.project_title,
            budget: row.project_budget,
            owner: OwnerSummary {
                id: row.owner_id,
                full_name: row.owner_name,
            },
        };
        Ok(ResponseWithProject {
            response: row.response.try_into()?,
            project,
        })
    }
}

fn parse_column<T: FromStr>(column: &str, value: &str) -> Result<T, CoreError> {
    value
        .parse()
        .map_err(|_| CoreError::Storage(format!("Unexpected value '{value}' in {column}")))
}
