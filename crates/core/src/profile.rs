//! User profile schema.
//!
//! Profiles are stored as a JSON document, but every field is declared here.
//! Updates go through [`ProfileUpdate`], which rejects unknown fields instead
//! of merging arbitrary keys into the stored document.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateUrl, ValidationError};

use crate::error::CoreError;
use crate::pagination::PageRequest;
use crate::project::{Category, CATEGORY_ALL, MAX_SEARCH_LENGTH, MAX_SKILL_LENGTH};

/// Current schema version written into every stored profile.
pub const PROFILE_SCHEMA_VERSION: u32 = 1;

/// Maximum number of skills on a user profile.
pub const MAX_PROFILE_SKILLS: usize = 20;

/// Rating assigned to new accounts.
pub const DEFAULT_RATING: f64 = 5.0;

fn default_version() -> u32 {
    PROFILE_SCHEMA_VERSION
}

fn default_rating() -> f64 {
    DEFAULT_RATING
}

fn default_response_rate() -> String {
    "100%".to_string()
}

fn default_category() -> Category {
    Category::Other
}

/// A portfolio item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PortfolioItem {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(url)]
    pub url: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// A work-history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ExperienceEntry {
    #[validate(length(min = 1, max = 100))]
    pub company: String,
    #[validate(length(min = 1, max = 100))]
    pub position: String,
    #[validate(length(max = 50))]
    pub period: Option<String>,
}

/// The stored profile document.
///
/// Missing keys deserialize to their defaults so rows written by older
/// versions still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub telegram: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub portfolio: Vec<PortfolioItem>,
    #[serde(default)]
    pub experience_list: Vec<ExperienceEntry>,
    #[serde(default = "default_rating")]
    pub rating: f64,
    #[serde(default)]
    pub completed_projects: i64,
    #[serde(default = "default_response_rate")]
    pub response_rate: String,
    #[serde(default)]
    pub online: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            version: PROFILE_SCHEMA_VERSION,
            bio: String::new(),
            avatar: String::new(),
            category: default_category(),
            skills: Vec::new(),
            location: String::new(),
            title: String::new(),
            hourly_rate: None,
            experience: String::new(),
            website: String::new(),
            telegram: String::new(),
            github: String::new(),
            portfolio: Vec::new(),
            experience_list: Vec::new(),
            rating: DEFAULT_RATING,
            completed_projects: 0,
            response_rate: default_response_rate(),
            online: false,
        }
    }
}

impl UserProfile {
    /// Parse a stored document, falling back to defaults for missing keys.
    pub fn from_json(value: serde_json::Value) -> Result<Self, CoreError> {
        serde_json::from_value(value)
            .map_err(|e| CoreError::Internal(format!("Malformed stored profile: {e}")))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Apply a validated update. Only supplied fields change.
    ///
    /// Returns the new display name when the update carries one; the name
    /// lives on the user row, not inside the profile document.
    pub fn apply(&mut self, update: ProfileUpdate) -> Option<String> {
        let ProfileUpdate {
            name,
            bio,
            skills,
            location,
            category,
            title,
            hourly_rate,
            experience,
            website,
            telegram,
            github,
            avatar,
            portfolio,
            experience_list,
        } = update;

        if let Some(v) = bio {
            self.bio = v;
        }
        if let Some(v) = skills {
            self.skills = v.into_iter().map(|s| s.trim().to_string()).collect();
        }
        if let Some(v) = location {
            self.location = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = hourly_rate {
            self.hourly_rate = Some(v);
        }
        if let Some(v) = experience {
            self.experience = v;
        }
        if let Some(v) = website {
            self.website = v;
        }
        if let Some(v) = telegram {
            self.telegram = v;
        }
        if let Some(v) = github {
            self.github = v;
        }
        if let Some(v) = avatar {
            self.avatar = v;
        }
        if let Some(v) = portfolio {
            self.portfolio = v;
        }
        if let Some(v) = experience_list {
            self.experience_list = v;
        }
        self.version = PROFILE_SCHEMA_VERSION;

        name.map(|n| n.trim().to_string())
    }
}

/// Request body for `PATCH /users/profile`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    #[validate(length(min = 2, max = 50, message = "must be 2-50 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[validate(custom(function = "validate_profile_skills"))]
    pub skills: Option<Vec<String>>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    pub category: Option<Category>,
    #[validate(length(max = 100))]
    pub title: Option<String>,
    #[validate(range(min = 0.0, max = 10_000.0))]
    pub hourly_rate: Option<f64>,
    #[validate(length(max = 100))]
    pub experience: Option<String>,
    #[validate(custom(function = "validate_optional_url"))]
    pub website: Option<String>,
    #[validate(length(max = 50))]
    pub telegram: Option<String>,
    #[validate(length(max = 50))]
    pub github: Option<String>,
    #[validate(custom(function = "validate_optional_url"))]
    pub avatar: Option<String>,
    #[validate(length(max = 50), nested)]
    pub portfolio: Option<Vec<PortfolioItem>>,
    #[validate(length(max = 50), nested)]
    pub experience_list: Option<Vec<ExperienceEntry>>,
}

fn validate_profile_skills(skills: &Vec<String>) -> Result<(), ValidationError> {
    if skills.len() > MAX_PROFILE_SKILLS {
        return Err(ValidationError::new("too_many_skills")
            .with_message(format!("at most {MAX_PROFILE_SKILLS} skills").into()));
    }
    if skills.iter().any(|s| s.chars().count() > MAX_SKILL_LENGTH) {
        return Err(ValidationError::new("skill_too_long")
            .with_message(format!("each skill must be at most {MAX_SKILL_LENGTH} characters").into()));
    }
    Ok(())
}

/// Empty string clears the field; anything else must be an absolute URL.
fn validate_optional_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("must be a valid URL or empty".into()))
    }
}

// ---------------------------------------------------------------------------
// Freelancer search
// ---------------------------------------------------------------------------

/// Raw `GET /users/freelancers` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FreelancerListParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A validated freelancer search.
#[derive(Debug, Clone, PartialEq)]
pub struct FreelancerQuery {
    pub category: Option<Category>,
    pub search: Option<String>,
    pub page: PageRequest,
}

impl FreelancerQuery {
    pub fn from_params(params: &FreelancerListParams) -> Result<Self, CoreError> {
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
        if search
            .as_ref()
            .is_some_and(|s| s.chars().count() > MAX_SEARCH_LENGTH)
        {
            return Err(CoreError::Validation(format!(
                "search must be at most {MAX_SEARCH_LENGTH} characters"
            )));
        }
        Ok(Self {
            category,
            search,
            page: PageRequest::new(params.page, params.limit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_loads_with_defaults() {
        let profile = UserProfile::from_json(serde_json::json!({})).unwrap();
        assert_eq!(profile, UserProfile::default());
        assert_eq!(profile.rating, 5.0);
        assert_eq!(profile.category, Category::Other);
    }

    #[test]
    fn apply_changes_only_supplied_fields() {
        let mut profile = UserProfile {
            bio: "old bio".into(),
            avatar: "https://cdn.example.com/a.png".into(),
            ..Default::default()
        };
        let name = profile.apply(ProfileUpdate {
            name: Some(" Anna ".into()),
            skills: Some(vec![" Rust ".into(), "SQL".into()]),
            ..Default::default()
        });

        assert_eq!(name.as_deref(), Some("Anna"));
        assert_eq!(profile.bio, "old bio");
        assert_eq!(profile.avatar, "https://cdn.example.com/a.png");
        assert_eq!(profile.skills, vec!["Rust".to_string(), "SQL".to_string()]);
    }

    #[test]
    fn update_rejects_unknown_fields() {
        let body = serde_json::json!({ "bio": "hi", "rating": 5.0 });
        assert!(serde_json::from_value::<ProfileUpdate>(body).is_err());
    }

    #[test]
    fn update_validates_url_fields() {
        let update = ProfileUpdate {
            website: Some("not a url".into()),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = ProfileUpdate {
            website: Some(String::new()),
            avatar: Some("https://cdn.example.com/me.png".into()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn update_validates_hourly_rate_and_name() {
        let update = ProfileUpdate {
            hourly_rate: Some(20_000.0),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = ProfileUpdate {
            name: Some("A".into()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn update_limits_skill_count() {
        let update = ProfileUpdate {
            skills: Some((0..21).map(|i| format!("s{i}")).collect()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn freelancer_query_parses_category() {
        let q = FreelancerQuery::from_params(&FreelancerListParams {
            category: Some("seo".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(q.category, Some(Category::Seo));

        assert!(FreelancerQuery::from_params(&FreelancerListParams {
            category: Some("plumbing".into()),
            ..Default::default()
        })
        .is_err());
    }
}
