//! Project bidding workflow.
//!
//! [`ProjectBiddingService`] enforces who may post, respond to, and decide on
//! projects. It holds no state between calls; every operation goes through a
//! [`ProjectStore`], which must make each mutation atomic:
//!
//! - `append_response` inserts only if the freelancer has no response on the
//!   project yet (one response per `(project, freelancer)` pair).
//! - `set_response_status` changes only a `pending` response and moves an
//!   `open` project to `in_progress` in the same unit of work when accepting.
//! - `increment_views` increments the counter in place.

use std::future::Future;

use validator::Validate;

use crate::error::CoreError;
use crate::pagination::Page;
use crate::project::{
    NewProject, NewResponse, Project, ProjectQuery, ProjectResponse, ResponsePayload,
    ResponseStatus, ResponseWithProject,
};
use crate::roles::Role;
use crate::types::DbId;

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: DbId,
    pub role: Role,
}

/// Durable storage for project aggregates.
pub trait ProjectStore: Send + Sync {
    fn create_project(
        &self,
        owner_id: DbId,
        input: &NewProject,
    ) -> impl Future<Output = Result<Project, CoreError>> + Send;

    /// Load a project with its responses in submission order.
    fn find_project(
        &self,
        id: DbId,
    ) -> impl Future<Output = Result<Option<Project>, CoreError>> + Send;

    /// Atomically add one to `views` and return the updated project.
    fn increment_views(
        &self,
        id: DbId,
    ) -> impl Future<Output = Result<Option<Project>, CoreError>> + Send;

    /// Matching projects for the requested page, newest first, plus the total match count.
    fn query_projects(
        &self,
        query: &ProjectQuery,
    ) -> impl Future<Output = Result<(Vec<Project>, i64), CoreError>> + Send;

    fn list_projects_by_owner(
        &self,
        owner_id: DbId,
    ) -> impl Future<Output = Result<Vec<Project>, CoreError>> + Send;

    /// Append a response unless `input.freelancer_id` already responded.
    ///
    /// Returns `None` when a response by that freelancer already exists.
    fn append_response(
        &self,
        project_id: DbId,
        input: &NewResponse,
    ) -> impl Future<Output = Result<Option<ProjectResponse>, CoreError>> + Send;

    /// Move a `pending` response to `status`; accepting also moves an `open`
    /// project to `in_progress`.
    ///
    /// Returns `None` when no pending response with that id exists on the project.
    fn set_response_status(
        &self,
        project_id: DbId,
        response_id: DbId,
        status: ResponseStatus,
    ) -> impl Future<Output = Result<Option<ProjectResponse>, CoreError>> + Send;

    fn list_responses_by_freelancer(
        &self,
        freelancer_id: DbId,
    ) -> impl Future<Output = Result<Vec<ResponseWithProject>, CoreError>> + Send;
}

/// Bidding workflow rules on top of a [`ProjectStore`].
pub struct ProjectBiddingService<S> {
    store: S,
}

impl<S: ProjectStore> ProjectBiddingService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Post a new project. Only clients may post.
    pub async fn create_project(
        &self,
        caller: &Principal,
        input: NewProject,
    ) -> Result<Project, CoreError> {
        match caller.role {
            Role::Client => {}
            Role::Freelancer => {
                return Err(CoreError::Forbidden(
                    "Only clients can create projects".into(),
                ))
            }
        }
        input.validate()?;
        self.store
            .create_project(caller.id, &input.normalized())
            .await
    }

    /// Load a project, counting the read as one view.
    pub async fn get_project(&self, id: DbId) -> Result<Project, CoreError> {
        self.store
            .increment_views(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id,
            })
    }

    pub async fn list_projects(&self, query: &ProjectQuery) -> Result<Page<Project>, CoreError> {
        let (projects, total) = self.store.query_projects(query).await?;
        Ok(Page::new(projects, total, query.page))
    }

    /// Projects posted by the caller, newest first.
    pub async fn list_projects_for_owner(
        &self,
        caller: &Principal,
    ) -> Result<Vec<Project>, CoreError> {
        self.store.list_projects_by_owner(caller.id).await
    }

    /// Submit the caller's response to a project.
    pub async fn submit_response(
        &self,
        project_id: DbId,
        caller: &Principal,
        payload: ResponsePayload,
    ) -> Result<ProjectResponse, CoreError> {
        match caller.role {
            Role::Freelancer => {}
            Role::Client => {
                return Err(CoreError::Forbidden(
                    "Only freelancers can respond to projects".into(),
                ))
            }
        }
        payload.validate()?;

        let project = self
            .store
            .find_project(project_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            })?;

        if project.owner_id == caller.id {
            return Err(CoreError::Forbidden(
                "You cannot respond to your own project".into(),
            ));
        }
        if project.response_by(caller.id).is_some() {
            return Err(duplicate_response());
        }

        let input = NewResponse::resolve(caller.id, project.budget, payload);
        self.store
            .append_response(project_id, &input)
            .await?
            .ok_or_else(duplicate_response)
    }

    /// Accept or reject a response. Only the project owner may decide.
    ///
    /// Other responses on the project are left untouched, so several may
    /// remain pending after one is accepted.
    pub async fn update_response_status(
        &self,
        project_id: DbId,
        response_id: DbId,
        caller: &Principal,
        new_status: ResponseStatus,
    ) -> Result<ProjectResponse, CoreError> {
        if new_status == ResponseStatus::Pending {
            return Err(CoreError::Validation(
                "status must be 'accepted' or 'rejected'".into(),
            ));
        }

        let project = self
            .store
            .find_project(project_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            })?;

        if project.owner_id != caller.id {
            return Err(CoreError::Forbidden(
                "Only the project owner can change response status".into(),
            ));
        }

        let current = project.response(response_id).ok_or(CoreError::NotFound {
            entity: "ProjectResponse",
            id: response_id,
        })?;
        if current.status.is_decided() {
            return Err(already_decided(current.status));
        }

        self.store
            .set_response_status(project_id, response_id, new_status)
            .await?
            .ok_or_else(|| {
                CoreError::Conflict("Response was decided by a concurrent request".into())
            })
    }

    /// Every response the caller has submitted, with its project summary.
    pub async fn list_responses_for_user(
        &self,
        caller: &Principal,
    ) -> Result<Vec<ResponseWithProject>, CoreError> {
        self.store.list_responses_by_freelancer(caller.id).await
    }
}

fn duplicate_response() -> CoreError {
    CoreError::Conflict("You have already responded to this project".into())
}

fn already_decided(status: ResponseStatus) -> CoreError {
    CoreError::Conflict(format!("Response is already {status}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
