//! Guest account requests made at checkout.

use serde::Deserialize;
use thiserror::Error;

/// Minimum length for an optional guest password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Errors in a guest account request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuestAccountError {
    /// Email is not well formed.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Full name is blank.
    #[error("Full name is required")]
    MissingName,

    /// Password is too short.
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
}

/// Account to create for an anonymous purchaser.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GuestAccountRequest {
    /// Contact email, also the login.
    pub email: String,
    /// Full name.
    pub full_name: String,
    /// Optional phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Optional password; without one the account cannot sign in until reset.
    #[serde(default)]
    pub password: Option<String>,
}

impl GuestAccountRequest {
    /// Returns the email trimmed and lowercased, as stored.
    #[must_use]
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), GuestAccountError> {
        let email = self.normalized_email();
        if !is_well_formed_email(&email) {
            return Err(GuestAccountError::InvalidEmail(self.email.clone()));
        }
        if self.full_name.trim().is_empty() {
            return Err(GuestAccountError::MissingName);
        }
        if let Some(password) = &self.password
            && password.chars().count() < MIN_PASSWORD_LEN
        {
            return Err(GuestAccountError::WeakPassword);
        }
        Ok(())
    }
}

/// Minimal shape check: one `@`, non-empty local part, dotted domain, no spaces.
fn is_well_formed_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: Option<&str>) -> GuestAccountRequest {
        GuestAccountRequest {
            email: email.to_string(),
            full_name: "Awa Ndiaye".to_string(),
            phone: None,
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request("Awa.Ndiaye@Example.sn ", None).validate().is_ok());
        assert_eq!(
            request(" Awa@Example.SN", None).normalized_email(),
            "awa@example.sn"
        );
    }

    #[test]
    fn test_malformed_emails() {
        for email in ["", "awa", "@example.sn", "awa@", "awa@example", "a b@example.sn", "a@b@c.sn"] {
            assert!(
                matches!(
                    request(email, None).validate(),
                    Err(GuestAccountError::InvalidEmail(_))
                ),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn test_short_password_rejected() {
        assert_eq!(
            request("awa@example.sn", Some("short")).validate(),
            Err(GuestAccountError::WeakPassword)
        );
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut req = request("awa@example.sn", None);
        req.full_name = "  ".to_string();
        assert_eq!(req.validate(), Err(GuestAccountError::MissingName));
    }
}
