//! Login form handling.
//!
//! The backend has no authentication endpoint; the login form is a local
//! gate that validates credentials and yields the user id sent with API
//! payloads.

use thiserror::Error;

/// User id used when no account system is wired up.
pub const DEFAULT_USER_ID: &str = "user_123";

/// Login validation errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please fill in both email and password.")]
    MissingFields,
}

/// Credentials entered on the login form.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Check that both fields are filled in.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.trim().is_empty() || self.password.trim().is_empty() {
            return Err(AuthError::MissingFields);
        }
        Ok(())
    }

    /// Log in locally, producing the session used for API calls.
    pub fn login(&self) -> Result<UserSession, AuthError> {
        self.validate()?;
        Ok(UserSession {
            user_id: DEFAULT_USER_ID.to_string(),
            email: self.email.trim().to_string(),
        })
    }
}

/// An authenticated (locally, at least) user.
#[derive(Debug, Clone)]
pub struct UserSession {
    /// Id sent in backend payloads.
    pub user_id: String,
    /// Email the user signed in with.
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_fields_required() {
        let mut credentials = Credentials::default();
        assert!(matches!(
            credentials.validate(),
            Err(AuthError::MissingFields)
        ));

        credentials.email = "a@b.c".into();
        assert!(matches!(
            credentials.validate(),
            Err(AuthError::MissingFields)
        ));

        credentials.password = "secret".into();
        assert!(credentials.validate().is_ok());
    }

    #[test]
    fn test_whitespace_only_fields_rejected() {
        let credentials = Credentials {
            email: "   ".into(),
            password: "secret".into(),
        };
        assert!(matches!(
            credentials.validate(),
            Err(AuthError::MissingFields)
        ));
    }

    #[test]
    fn test_login_yields_user_session() {
        let credentials = Credentials {
            email: " user@example.com ".into(),
            password: "secret".into(),
        };
        let session = credentials.login().unwrap();
        assert_eq!(session.user_id, DEFAULT_USER_ID);
        assert_eq!(session.email, "user@example.com");
    }
}
