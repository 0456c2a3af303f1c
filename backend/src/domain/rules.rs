//! Field rules applied by the user edit jobs.

use regex::Regex;

use super::user::{
    EmailAddress, USER_NAME_MAX, USER_NAME_MIN, UserName, UserValidationError,
    default_name_regex,
};

/// Default minimum password length.
pub const PASSWORD_MIN: usize = 5;

/// Errors raised while building [`UserEditRules`] from configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// The configured name pattern is not a valid regular expression.
    #[error("invalid user name pattern `{pattern}`: {message}")]
    InvalidNamePattern { pattern: String, message: String },
    /// The length bounds are inverted or zero.
    #[error("user name length bounds {min}..={max} are invalid")]
    InvalidNameBounds { min: usize, max: usize },
}

/// Validation settings shared by the edit jobs.
#[derive(Debug, Clone)]
pub struct UserEditRules {
    name_min: usize,
    name_max: usize,
    name_pattern: Regex,
    password_min: usize,
    require_email_confirmation: bool,
}

impl Default for UserEditRules {
    fn default() -> Self {
        Self {
            name_min: USER_NAME_MIN,
            name_max: USER_NAME_MAX,
            name_pattern: default_name_regex().clone(),
            password_min: PASSWORD_MIN,
            require_email_confirmation: true,
        }
    }
}

impl UserEditRules {
    /// Build rules from explicit settings.
    pub fn new(
        name_min: usize,
        name_max: usize,
        name_pattern: &str,
        password_min: usize,
        require_email_confirmation: bool,
    ) -> Result<Self, RulesError> {
        if name_min == 0 || name_min > name_max {
            return Err(RulesError::InvalidNameBounds {
                min: name_min,
                max: name_max,
            });
        }
        let name_pattern =
            Regex::new(name_pattern).map_err(|error| RulesError::InvalidNamePattern {
                pattern: name_pattern.to_owned(),
                message: error.to_string(),
            })?;

        Ok(Self {
            name_min,
            name_max,
            name_pattern,
            password_min,
            require_email_confirmation,
        })
    }

    /// Validate a candidate user name.
    pub fn parse_name(&self, raw: &str) -> Result<UserName, UserValidationError> {
        UserName::validated(
            raw.to_owned(),
            self.name_min,
            self.name_max,
            &self.name_pattern,
        )
    }

    /// Validate a candidate email address.
    pub fn parse_email(&self, raw: &str) -> Result<EmailAddress, UserValidationError> {
        EmailAddress::new(raw)
    }

    /// Reject passwords shorter than the configured minimum.
    pub fn check_password(&self, raw: &str) -> Result<(), UserValidationError> {
        if raw.chars().count() < self.password_min {
            return Err(UserValidationError::PasswordTooShort {
                min: self.password_min,
            });
        }
        Ok(())
    }

    pub const fn password_min(&self) -> usize {
        self.password_min
    }

    /// Whether a new email waits for confirmation before it becomes active.
    pub const fn require_email_confirmation(&self) -> bool {
        self.require_email_confirmation
    }
}
