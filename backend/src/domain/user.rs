//! User data model.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::access_rank::AccessRank;
use super::password::PasswordHash;

/// Validation errors returned by the user field constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyName,
    NameTooShort { min: usize },
    NameTooLong { max: usize },
    NameInvalidCharacters,
    EmptyEmail,
    InvalidEmail,
    PasswordTooShort { min: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyName => write!(f, "user name must not be empty"),
            Self::NameTooShort { min } => {
                write!(f, "user name must be at least {min} characters")
            }
            Self::NameTooLong { max } => {
                write!(f, "user name must be at most {max} characters")
            }
            Self::NameInvalidCharacters => {
                write!(f, "user name contains characters that are not allowed")
            }
            Self::EmptyEmail => write!(f, "email address must not be empty"),
            Self::InvalidEmail => write!(f, "email address is malformed"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        let uuid = Uuid::new_v4();
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Minimum default length for a user name.
pub const USER_NAME_MIN: usize = 1;
/// Maximum default length for a user name.
pub const USER_NAME_MAX: usize = 32;
/// Default character pattern for user names.
pub const USER_NAME_PATTERN: &str = "^[A-Za-z0-9_.-]+$";

static USER_NAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

pub(crate) fn default_name_regex() -> &'static Regex {
    USER_NAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        Regex::new(USER_NAME_PATTERN)
            .unwrap_or_else(|error| panic!("user name regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Login name shown to other users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate a name against the default length and character rules.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::validated(name.into(), USER_NAME_MIN, USER_NAME_MAX, default_name_regex())
    }

    pub(crate) fn validated(
        name: String,
        min: usize,
        max: usize,
        pattern: &Regex,
    ) -> Result<Self, UserValidationError> {
        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }

        let length = name.chars().count();
        if length < min {
            return Err(UserValidationError::NameTooShort { min });
        }
        if length > max {
            return Err(UserValidationError::NameTooLong { max });
        }

        if !pattern.is_match(&name) {
            return Err(UserValidationError::NameInvalidCharacters);
        }

        Ok(Self(name))
    }

    /// Case-insensitive comparison used for uniqueness checks.
    pub fn matches(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Email address in `local@domain.tld` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into().trim().to_owned();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }

    /// Case-insensitive comparison; mailbox casing is not significant here.
    pub fn matches(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user.
///
/// ## Invariants
/// - `rank` is never [`AccessRank::Anonymous`] once stored.
/// - `pending_email` holds an address awaiting confirmation; `email` holds
///   the confirmed one.
/// - Field setters are crate-private: each edit job mutates only the field
///   it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    rank: AccessRank,
    name: UserName,
    password: PasswordHash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<EmailAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pending_email: Option<EmailAddress>,
}

impl User {
    /// Build a new [`User`] without an email address.
    pub fn new(id: UserId, name: UserName, rank: AccessRank, password: PasswordHash) -> Self {
        Self {
            id,
            rank,
            name,
            password,
            email: None,
            pending_email: None,
        }
    }

    /// Attach a confirmed email address.
    #[must_use]
    pub fn with_email(mut self, email: EmailAddress) -> Self {
        self.email = Some(email);
        self
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Current access rank.
    pub fn rank(&self) -> AccessRank {
        self.rank
    }

    /// Login name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Stored password credential.
    pub fn password(&self) -> &PasswordHash {
        &self.password
    }

    /// Confirmed email address, if any.
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Email address awaiting confirmation, if any.
    pub fn pending_email(&self) -> Option<&EmailAddress> {
        self.pending_email.as_ref()
    }

    pub(crate) fn set_rank(&mut self, rank: AccessRank) {
        self.rank = rank;
    }

    pub(crate) fn set_name(&mut self, name: UserName) {
        self.name = name;
    }

    pub(crate) fn set_password(&mut self, password: PasswordHash) {
        self.password = password;
    }

    pub(crate) fn set_pending_email(&mut self, email: EmailAddress) {
        self.pending_email = Some(email);
    }

    pub(crate) fn confirm_email(&mut self, email: EmailAddress) {
        self.pending_email = None;
        self.email = Some(email);
    }
}
