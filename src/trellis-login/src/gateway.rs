//! Seams to the remote platform and the credential store.
//!
//! The flows in this crate only ever talk to the platform through
//! [`AuthGateway`] and persist through [`CredentialStore`]; the production
//! implementations live in `trellis-api` and `trellis-storage`.

use async_trait::async_trait;
use serde::Deserialize;

/// The authenticated platform user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
}

impl User {
    /// Name to greet the user by, falling back to the email local part.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// Remote platform operations the login flows depend on.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Create a browserless login session; returns the human-readable
    /// pairing code the user confirms on the dashboard.
    async fn create_login_session(&self) -> anyhow::Result<String>;

    /// Poll a login session: `None` while the user has not confirmed the
    /// code yet, the issued token once they have.
    async fn consume_login_session(&self, code: &str) -> anyhow::Result<Option<String>>;

    /// Fetch the user a token belongs to.
    async fn current_user(&self, token: &str) -> anyhow::Result<User>;
}

/// Persistence for the one artifact a login attempt produces.
pub trait CredentialStore: Send + Sync {
    fn store_token(&self, token: &str) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_name() {
        let user = User {
            id: "u-1".into(),
            name: Some("Ada".into()),
            email: "ada@example.com".into(),
        };
        assert_eq!(user.display_name(), "Ada");
    }

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        let user = User {
            id: "u-1".into(),
            name: None,
            email: "ada@example.com".into(),
        };
        assert_eq!(user.display_name(), "ada");

        let user = User {
            id: "u-1".into(),
            name: Some(String::new()),
            email: "ada@example.com".into(),
        };
        assert_eq!(user.display_name(), "ada");
    }
}
