//! Refresh sessions. Only the SHA-256 hash of a refresh token is stored.

use gigboard_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Longest user agent kept on a session row.
pub const MAX_USER_AGENT_LENGTH: usize = 512;

#[derive(Debug, Clone, FromRow)]
pub struct RefreshSession {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    /// Successor issued when this token was exchanged.
    pub rotated_to: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RefreshSession {
    /// Not revoked and not expired at `now`.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }

    /// The token was already exchanged once. Presenting it again is a replay.
    pub fn was_rotated(&self) -> bool {
        self.rotated_to.is_some()
    }

    /// Whether a refresh arrives from a different client than the one that
    /// opened the session. Unknown values on either side never count.
    pub fn origin_differs(&self, origin: &SessionOrigin) -> bool {
        let differs = |stored: &Option<String>, seen: &Option<String>| {
            matches!((stored, seen), (Some(a), Some(b)) if a != b)
        };
        differs(&self.user_agent, &origin.user_agent)
            || differs(&self.ip_address, &origin.ip_address)
    }
}

/// The client a session was opened from, as reported by request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOrigin {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl SessionOrigin {
    pub fn new(user_agent: Option<&str>, ip_address: Option<&str>) -> Self {
        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.chars().take(MAX_USER_AGENT_LENGTH).collect::<String>())
        };
        Self {
            user_agent: clean(user_agent),
            ip_address: clean(ip_address),
        }
    }
}

pub struct NewSession {
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub origin: SessionOrigin,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn session(origin: SessionOrigin) -> RefreshSession {
        let now = Utc::now();
        RefreshSession {
            id: 1,
            user_id: 7,
            token_hash: "hash".into(),
            user_agent: origin.user_agent,
            ip_address: origin.ip_address,
            expires_at: now + Duration::days(1),
            revoked_at: None,
            rotated_to: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn live_until_revoked_or_expired() {
        let now = Utc::now();
        let mut s = session(SessionOrigin::default());
        assert!(s.is_live(now));
        assert!(!s.is_live(now + Duration::days(2)));

        s.revoked_at = Some(now);
        assert!(!s.is_live(now));
        assert!(!s.was_rotated());
        s.rotated_to = Some(2);
        assert!(s.was_rotated());
    }

    #[test]
    fn origin_trims_and_drops_blanks() {
        let origin = SessionOrigin::new(Some("  curl/8.0 "), Some(""));
        assert_eq!(origin.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(origin.ip_address, None);

        let long = "a".repeat(MAX_USER_AGENT_LENGTH + 10);
        let origin = SessionOrigin::new(Some(&long), None);
        assert_eq!(origin.user_agent.unwrap().len(), MAX_USER_AGENT_LENGTH);
    }

    #[test]
    fn origin_differs_ignores_unknowns() {
        let s = session(SessionOrigin::new(Some("firefox"), Some("10.0.0.1")));
        assert!(!s.origin_differs(&SessionOrigin::new(Some("firefox"), Some("10.0.0.1"))));
        assert!(!s.origin_differs(&SessionOrigin::default()));
        assert!(s.origin_differs(&SessionOrigin::new(Some("chrome"), None)));
        assert!(s.origin_differs(&SessionOrigin::new(None, Some("10.0.0.2"))));
    }
}
