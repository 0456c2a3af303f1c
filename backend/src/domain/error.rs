//! Job outcome errors.
//!
//! Dispatch distinguishes three kinds of failure: a denial, which aborts the
//! whole edit; an unsatisfied job, which a composite may skip; and every
//! other execution failure, which aborts like a denial.

use std::fmt;

use super::job::{ArgumentKey, JobKind};
use super::ports::{ChangeLogError, EmailVerificationError, UserPersistenceError};
use super::principal::Privilege;
use super::user::UserId;

/// Raised when a principal may not perform a job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("access denied: {reason}")]
pub struct AccessDenied {
    privilege: Option<Privilege>,
    reason: String,
}

impl AccessDenied {
    /// Denial for a privilege the principal does not hold.
    pub fn missing_privilege(privilege: Privilege) -> Self {
        Self {
            privilege: Some(privilege),
            reason: format!("missing privilege {privilege}"),
        }
    }

    /// Denial raised by a job's own checks.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            privilege: None,
            reason: reason.into(),
        }
    }

    /// Privilege that was missing, when the denial came from the checker.
    pub const fn privilege(&self) -> Option<Privilege> {
        self.privilege
    }

    /// Human-readable explanation.
    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }
}

/// Why a job had nothing to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsatisfiedReason {
    /// The caller did not supply the argument.
    MissingArgument(ArgumentKey),
    /// The supplied value equals the current one.
    Unchanged,
}

impl fmt::Display for UnsatisfiedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgument(key) => write!(f, "argument `{key}` was not supplied"),
            Self::Unchanged => write!(f, "value is unchanged"),
        }
    }
}

/// Failure raised while dispatching or executing a job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    /// The principal lacks the needed capability.
    #[error(transparent)]
    Denied(#[from] AccessDenied),
    /// The job found nothing valid to apply.
    #[error("{job} has nothing to apply: {reason}")]
    Unsatisfied {
        job: JobKind,
        reason: UnsatisfiedReason,
    },
    /// A supplied argument failed validation.
    #[error("{job} rejected its argument: {message}")]
    InvalidArgument { job: JobKind, message: String },
    /// The target user does not exist.
    #[error("user {id} not found")]
    NotFound { id: UserId },
    /// Persisting the user failed.
    #[error(transparent)]
    Persistence(#[from] UserPersistenceError),
    /// Flushing the change log failed.
    #[error(transparent)]
    ChangeLog(#[from] ChangeLogError),
    /// The post-save email hook failed.
    #[error(transparent)]
    Notification(#[from] EmailVerificationError),
}

impl JobError {
    /// Convenience constructor for [`JobError::Unsatisfied`].
    pub const fn unsatisfied(job: JobKind, reason: UnsatisfiedReason) -> Self {
        Self::Unsatisfied { job, reason }
    }

    /// Convenience constructor for [`JobError::InvalidArgument`].
    pub fn invalid_argument(job: JobKind, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            job,
            message: message.into(),
        }
    }

    /// Whether a composite may skip past this outcome.
    pub const fn is_unsatisfied(&self) -> bool {
        matches!(self, Self::Unsatisfied { .. })
    }

    /// Whether this is an authorisation failure.
    pub const fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }
}
