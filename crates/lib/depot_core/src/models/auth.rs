//! Authentication domain models.

use serde::{Deserialize, Serialize};

/// Role claim carried by automation tokens.
pub const AUTOMATION_ROLE: &str = "automation";

/// Domain user. Password hash is never serialized out of the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// JWT claims embedded in bearer tokens.
///
/// Session tokens carry `sub` + `email`; automation tokens carry
/// `role = "automation"` + `jti` (the persisted token id). One claims
/// struct covers both so a single decode path feeds [`TokenClaims::identity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject — user ID (standard JWT `sub` claim). Absent on automation tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// User email. Absent on automation tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role claim (`"automation"` for automation tokens).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Persisted token id (standard JWT `jti` claim). Automation tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

impl TokenClaims {
    /// Map verified claims onto the caller identity.
    ///
    /// Returns `None` for structurally invalid claims (e.g. an automation
    /// token without a `jti`, or a session token without subject/email) —
    /// the gate treats those the same as a bad signature.
    pub fn identity(&self) -> Option<Identity> {
        if self.role.as_deref() == Some(AUTOMATION_ROLE) {
            return self.jti.clone().map(|token_id| Identity::Automation { token_id });
        }
        match (&self.sub, &self.email) {
            (Some(user_id), Some(email)) => Some(Identity::Session {
                user_id: user_id.clone(),
                email: email.clone(),
            }),
            _ => None,
        }
    }
}

/// Authenticated caller identity.
///
/// An explicit sum type rather than a nullable email, so downstream code
/// cannot mistake an empty string for a real user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Interactive user, authenticated via a session token.
    Session { user_id: String, email: String },
    /// Non-interactive client, authenticated via a persisted automation token.
    Automation { token_id: String },
}

impl Identity {
    /// Label recorded as `uploaded_by` / `created_by` on rows this caller writes.
    pub fn uploader_label(&self) -> &str {
        match self {
            Identity::Session { email, .. } => email,
            Identity::Automation { .. } => AUTOMATION_ROLE,
        }
    }
}

/// Automation token row as persisted in the `tokens` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationToken {
    pub token_id: String,
    /// Full signed token value. Listing exposes this to authorized callers;
    /// a known sensitivity concern of the current behavior.
    pub token: String,
    pub created_by: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> TokenClaims {
        TokenClaims {
            sub: None,
            email: None,
            role: None,
            jti: None,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn session_claims_map_to_session_identity() {
        let mut c = claims();
        c.sub = Some("u-1".into());
        c.email = Some("a@b.com".into());
        assert_eq!(
            c.identity(),
            Some(Identity::Session {
                user_id: "u-1".into(),
                email: "a@b.com".into()
            })
        );
    }

    #[test]
    fn automation_claims_map_to_automation_identity() {
        let mut c = claims();
        c.role = Some(AUTOMATION_ROLE.into());
        c.jti = Some("t-1".into());
        assert_eq!(
            c.identity(),
            Some(Identity::Automation {
                token_id: "t-1".into()
            })
        );
    }

    #[test]
    fn automation_claims_without_jti_are_rejected() {
        let mut c = claims();
        c.role = Some(AUTOMATION_ROLE.into());
        assert_eq!(c.identity(), None);
    }

    #[test]
    fn incomplete_session_claims_are_rejected() {
        let mut c = claims();
        c.sub = Some("u-1".into());
        assert_eq!(c.identity(), None);
    }

    #[test]
    fn uploader_label_distinguishes_callers() {
        let session = Identity::Session {
            user_id: "u-1".into(),
            email: "a@b.com".into(),
        };
        let automation = Identity::Automation {
            token_id: "t-1".into(),
        };
        assert_eq!(session.uploader_label(), "a@b.com");
        assert_eq!(automation.uploader_label(), "automation");
    }
}
