//! Profile form input and validation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::UserProfile;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,20}$").expect("regex pattern is valid"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("regex pattern is valid")
});

/// Maximum length accepted for free-text fields.
pub const MAX_TEXT_LEN: usize = 280;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending form field.
    pub field: &'static str,
    /// Message suitable for inline display.
    pub message: String,
}

/// All field errors found in one submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("profile validation failed: {}", summary(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Returns the message for a given field, if it failed.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Raw profile form submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub discord: String,
    #[serde(default)]
    pub telegram: String,
}

impl ProfileForm {
    /// Creates a form with the two required fields.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Checks every field and collects all failures.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        let mut fail = |field: &'static str, message: &str| {
            errors.push(FieldError {
                field,
                message: message.to_string(),
            })
        };

        let username = self.username.trim();
        if username.is_empty() {
            fail("username", "Username is required");
        } else if !USERNAME_RE.is_match(username) {
            fail(
                "username",
                "Username must be 3-20 characters: letters, digits or underscore",
            );
        }

        let email = self.email.trim();
        if email.is_empty() {
            fail("email", "Email is required");
        } else if !EMAIL_RE.is_match(email) {
            fail("email", "Email address is not valid");
        }

        for (field, value) in [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("bio", &self.bio),
        ] {
            if value.chars().count() > MAX_TEXT_LEN {
                fail(field, "Text is too long");
            }
        }

        for (field, value) in [
            ("twitter", &self.twitter),
            ("discord", &self.discord),
            ("telegram", &self.telegram),
        ] {
            if value.trim().chars().any(char::is_whitespace) {
                fail(field, "Handle must not contain spaces");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { errors })
        }
    }

    /// Validates the form and converts it into a merge patch.
    ///
    /// Empty optional fields become `None` so they never blank out stored values.
    pub fn into_profile(self) -> Result<UserProfile, ValidationErrors> {
        self.validate()?;

        fn opt(value: String) -> Option<String> {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }

        Ok(UserProfile {
            wallet_type: None,
            username: opt(self.username),
            first_name: opt(self.first_name),
            last_name: opt(self.last_name),
            email: opt(self.email.to_lowercase()),
            avatar: opt(self.avatar),
            bio: opt(self.bio),
            twitter: opt(self.twitter.trim_start_matches('@').to_string()),
            discord: opt(self.discord),
            telegram: opt(self.telegram.trim_start_matches('@').to_string()),
            level: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_form() {
        let form = ProfileForm::new("alice1", "a@b.com");
        assert!(form.validate().is_ok());

        let profile = form.into_profile().unwrap();
        assert_eq!(profile.username.as_deref(), Some("alice1"));
        assert_eq!(profile.email.as_deref(), Some("a@b.com"));
        assert!(profile.bio.is_none());
    }

    #[test]
    fn test_required_fields() {
        let err = ProfileForm::default().validate().unwrap_err();

        assert_eq!(err.field("username"), Some("Username is required"));
        assert_eq!(err.field("email"), Some("Email is required"));
    }

    #[test]
    fn test_username_charset() {
        let err = ProfileForm::new("al ice!", "a@b.com").validate().unwrap_err();
        assert!(err.field("username").is_some());
        assert!(err.field("email").is_none());

        assert!(ProfileForm::new("ab", "a@b.com").validate().is_err());
        assert!(ProfileForm::new("a_very_long_username_indeed", "a@b.com")
            .validate()
            .is_err());
    }

    #[test]
    fn test_email_shape() {
        for bad in ["alice", "alice@", "@b.com", "a@b", "a b@c.com"] {
            let err = ProfileForm::new("alice1", bad).validate().unwrap_err();
            assert!(err.field("email").is_some(), "accepted {}", bad);
        }
    }

    #[test]
    fn test_social_handles_are_normalized() {
        let mut form = ProfileForm::new("alice1", "A@B.com");
        form.twitter = "@alice".to_string();

        let profile = form.into_profile().unwrap();
        assert_eq!(profile.twitter.as_deref(), Some("alice"));
        assert_eq!(profile.email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_handle_with_space_rejected() {
        let mut form = ProfileForm::new("alice1", "a@b.com");
        form.discord = "alice smith".to_string();

        let err = form.validate().unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert!(err.to_string().contains("discord"));
    }
}
