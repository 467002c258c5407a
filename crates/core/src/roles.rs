//! Principal roles.
//!
//! Every account is exactly one of these. Authorization code matches on the
//! enum exhaustively instead of comparing role strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_CLIENT: &str = "client";
pub const ROLE_FREELANCER: &str = "freelancer";

/// The role carried by an authenticated principal.
///
/// New accounts register as freelancers unless they ask otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Posts projects and decides on responses.
    Client,
    /// Responds to projects.
    #[default]
    Freelancer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => ROLE_CLIENT,
            Role::Freelancer => ROLE_FREELANCER,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_CLIENT => Ok(Role::Client),
            ROLE_FREELANCER => Ok(Role::Freelancer),
            other => Err(CoreError::Validation(format!(
                "Role must be '{ROLE_CLIENT}' or '{ROLE_FREELANCER}' (got '{other}')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!("client".parse::<Role>().unwrap(), Role::Client);
        assert_eq!("freelancer".parse::<Role>().unwrap(), Role::Freelancer);
    }

    #[test]
    fn rejects_unknown_role() {
        assert!("admin".parse::<Role>().is_err());
        assert!("Client".parse::<Role>().is_err());
    }

    #[test]
    fn default_is_freelancer() {
        assert_eq!(Role::default(), Role::Freelancer);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Role::Client).unwrap(), "\"client\"");
        let role: Role = serde_json::from_str("\"freelancer\"").unwrap();
        assert_eq!(role, Role::Freelancer);
    }
}
