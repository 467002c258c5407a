//! Project and response (bid) model, input DTOs, and listing filters.
//!
//! A [`Project`] is the unit of consistency: it owns its ordered sequence of
//! [`ProjectResponse`]s. Statuses are closed enums stored as lowercase text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::pagination::PageRequest;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Smallest budget a project may be posted with.
pub const MIN_BUDGET: i64 = 1_000;

/// Largest budget a project may be posted with.
pub const MAX_BUDGET: i64 = 1_000_000;

/// Maximum number of skills attached to a project.
pub const MAX_PROJECT_SKILLS: usize = 10;

/// Maximum length of a single skill tag.
pub const MAX_SKILL_LENGTH: usize = 50;

/// Maximum length of the `search` listing parameter.
pub const MAX_SEARCH_LENGTH: usize = 100;

/// Timeline stored on a response submitted without one.
pub const DEFAULT_TIMELINE: &str = "2 weeks";

/// Category filter value meaning "no category filter".
pub const CATEGORY_ALL: &str = "all";

/// Price used for a response submitted without one: 80% of the budget.
///
/// Computed as `budget * 4 / 5` so the result is the correctly rounded
/// value of `0.8 * budget`.
pub fn default_price(budget: i64) -> f64 {
    (budget as f64 * 4.0) / 5.0
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Project category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Development,
    Design,
    Marketing,
    Writing,
    Seo,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Development,
        Category::Design,
        Category::Marketing,
        Category::Writing,
        Category::Seo,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Development => "development",
            Category::Design => "design",
            Category::Marketing => "marketing",
            Category::Writing => "writing",
            Category::Seo => "seo",
            Category::Other => "other",
        }
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown category '{s}'")))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project lifecycle status.
///
/// Only `open -> in_progress` is driven by this codebase (accepting a
/// response). `completed` and `cancelled` exist for data set elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Open => "open",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ProjectStatus::Open),
            "in_progress" => Ok(ProjectStatus::InProgress),
            "completed" => Ok(ProjectStatus::Completed),
            "cancelled" => Ok(ProjectStatus::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown project status '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response (bid) status. `accepted` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ResponseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseStatus::Pending => "pending",
            ResponseStatus::Accepted => "accepted",
            ResponseStatus::Rejected => "rejected",
        }
    }

    /// Whether the project owner has already decided on this response.
    pub fn is_decided(self) -> bool {
        !matches!(self, ResponseStatus::Pending)
    }
}

impl FromStr for ResponseStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ResponseStatus::Pending),
            "accepted" => Ok(ResponseStatus::Accepted),
            "rejected" => Ok(ResponseStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Unknown response status '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// A posted job listing together with its responses in submission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub budget: i64,
    pub deadline: String,
    pub skills: Vec<String>,
    pub status: ProjectStatus,
    pub views: i64,
    pub responses: Vec<ProjectResponse>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// The response submitted by `freelancer_id`, if any.
    pub fn response_by(&self, freelancer_id: DbId) -> Option<&ProjectResponse> {
        self.responses
            .iter()
            .find(|r| r.freelancer_id == freelancer_id)
    }

    pub fn response(&self, response_id: DbId) -> Option<&ProjectResponse> {
        self.responses.iter().find(|r| r.id == response_id)
    }
}

/// A freelancer's bid on a project.
///
/// `id` is only meaningful together with `project_id`; lookups always
/// scope by both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectResponse {
    pub id: DbId,
    pub project_id: DbId,
    pub freelancer_id: DbId,
    pub proposal: Option<String>,
    pub price: f64,
    pub timeline: String,
    pub status: ResponseStatus,
    pub created_at: Timestamp,
}

/// Owner details embedded in project summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerSummary {
    pub id: DbId,
    pub full_name: String,
}

/// The parent project of a response, as shown in "my responses".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: DbId,
    pub title: String,
    pub budget: i64,
    pub owner: OwnerSummary,
}

/// A response paired with a summary of the project it was submitted to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseWithProject {
    #[serde(flatten)]
    pub response: ProjectResponse,
    pub project: ProjectSummary,
}

// ---------------------------------------------------------------------------
// Input DTOs
// ---------------------------------------------------------------------------

/// Request body for creating a project.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewProject {
    #[validate(length(min = 5, max = 100, message = "must be 5-100 characters"))]
    pub title: String,
    #[validate(length(min = 10, max = 2000, message = "must be 10-2000 characters"))]
    pub description: String,
    pub category: Category,
    #[validate(range(min = 1000, max = 1_000_000, message = "must be between 1000 and 1000000"))]
    pub budget: i64,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub deadline: Option<String>,
    #[validate(custom(function = "validate_project_skills"))]
    pub skills: Option<Vec<String>>,
}

impl NewProject {
    /// Trim the title and skills, dropping blank skills.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        if let Some(skills) = self.skills.take() {
            self.skills = Some(
                skills
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }
        self
    }
}

fn validate_project_skills(skills: &Vec<String>) -> Result<(), ValidationError> {
    if skills.len() > MAX_PROJECT_SKILLS {
        return Err(ValidationError::new("too_many_skills")
            .with_message(format!("at most {MAX_PROJECT_SKILLS} skills").into()));
    }
    if skills.iter().any(|s| s.chars().count() > MAX_SKILL_LENGTH) {
        return Err(ValidationError::new("skill_too_long")
            .with_message(format!("each skill must be at most {MAX_SKILL_LENGTH} characters").into()));
    }
    Ok(())
}

/// Request body for responding to a project. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ResponsePayload {
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub proposal: Option<String>,
    #[validate(range(min = 0.0, max = 1_000_000.0, message = "must be between 0 and 1000000"))]
    pub price: Option<f64>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub timeline: Option<String>,
}

/// A response with every default resolved, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResponse {
    pub freelancer_id: DbId,
    pub proposal: Option<String>,
    pub price: f64,
    pub timeline: String,
}

impl NewResponse {
    /// Resolve defaults against the project's budget at submission time.
    ///
    /// Blank proposal/timeline strings count as absent.
    pub fn resolve(freelancer_id: DbId, budget: i64, payload: ResponsePayload) -> Self {
        let proposal = payload
            .proposal
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let timeline = payload
            .timeline
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TIMELINE.to_string());

        Self {
            freelancer_id,
            proposal,
            price: payload.price.unwrap_or_else(|| default_price(budget)),
            timeline,
        }
    }
}

/// Request body for the owner's decision on a response.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseDecision {
    pub status: String,
}

impl ResponseDecision {
    /// Parse the requested status; only `accepted` and `rejected` are allowed.
    pub fn parse(&self) -> Result<ResponseStatus, CoreError> {
        match self.status.parse::<ResponseStatus>()? {
            ResponseStatus::Pending => Err(CoreError::Validation(
                "status must be 'accepted' or 'rejected'".into(),
            )),
            decided => Ok(decided),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Raw `GET /projects` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectListParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

/// A validated project listing query.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectQuery {
    /// `None` means every category.
    pub category: Option<Category>,
    /// Trimmed, non-empty search text.
    pub search: Option<String>,
    pub status: ProjectStatus,
    pub page: PageRequest,
}

impl ProjectQuery {
    pub fn from_params(params: &ProjectListParams) -> Result<Self, CoreError> {
        let category = match params.category.as_deref().map(str::trim) {
            None | Some("") | Some(CATEGORY_ALL) => None,
            Some(other) => Some(other.parse::<Category>()?),
        };

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if let Some(s) = &search {
            if s.chars().count() > MAX_SEARCH_LENGTH {
                return Err(CoreError::Validation(format!(
                    "search must be at most {MAX_SEARCH_LENGTH} characters"
                )));
            }
        }

        let status = match params.status.as_deref().map(str::trim) {
            None | Some("") => ProjectStatus::Open,
            Some(other) => other.parse()?,
        };

        if let Some(page) = params.page {
            if page < 1 {
                return Err(CoreError::Validation("page must be at least 1".into()));
            }
        }
        if let Some(limit) = params.limit {
            if limit < 1 {
                return Err(CoreError::Validation("limit must be at least 1".into()));
            }
        }

        Ok(Self {
            category,
            search,
            status,
            page: PageRequest::new(params.page, params.limit),
        })
    }

    /// In-process evaluation of the filter, mirroring the SQL predicate.
    pub fn matches(&self, project: &Project) -> bool {
        if project.status != self.status {
            return false;
        }
        if let Some(category) = self.category {
            if project.category != category {
                return false;
            }
        }
        match &self.search {
            None => true,
            Some(search) => {
                let needle = search.to_lowercase();
                project.title.to_lowercase().contains(&needle)
                    || project.description.to_lowercase().contains(&needle)
                    || project.skills.iter().any(|s| s.to_lowercase() == needle)
            }
        }
    }
}

/// Escape `%`, `_` and `\` so user text matches literally inside `ILIKE`.
pub fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
