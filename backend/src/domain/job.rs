//! Job abstraction shared by every user edit operation.
//!
//! A job carries its execution context, the arguments merged into it by the
//! dispatcher, and the principal it acts for. Concrete jobs expose that
//! state through [`Job::state`] and inherit the accessors.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::change_log::ChangeLogSession;
use super::error::JobError;
use super::principal::{Principal, PrivilegeAction};
use super::user::User;

/// Execution mode attached to every job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobContext {
    /// A single interactive request; the job commits its own results.
    #[default]
    Normal,
    /// Accounts created in bulk by an outer driver.
    BatchAdd,
    /// Accounts edited in bulk by an outer driver.
    BatchEdit,
}

impl JobContext {
    /// Context handed to the sub-jobs of a composite running in `self`.
    #[must_use]
    pub const fn for_sub_jobs(self) -> Self {
        match self {
            Self::BatchAdd => Self::BatchAdd,
            Self::Normal | Self::BatchEdit => Self::BatchEdit,
        }
    }

    /// Whether a job running in this context persists and flushes itself.
    #[must_use]
    pub const fn commits(self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// Stable job names used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    EditUser,
    AccessRank,
    Name,
    Password,
    Email,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EditUser => "edit-user",
            Self::AccessRank => "edit-user-access-rank",
            Self::Name => "edit-user-name",
            Self::Password => "edit-user-password",
            Self::Email => "edit-user-email",
        })
    }
}

/// Keys a caller may supply to the user edit jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArgumentKey {
    NewAccessRank,
    NewName,
    NewPassword,
    NewEmail,
}

impl ArgumentKey {
    /// Wire name of the argument.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewAccessRank => "newAccessRank",
            Self::NewName => "newUserName",
            Self::NewPassword => "newPassword",
            Self::NewEmail => "newEmail",
        }
    }
}

impl fmt::Display for ArgumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument mapping handed to a job.
///
/// Values are wiped on drop because a mapping may hold a plain password.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct JobArguments {
    values: BTreeMap<ArgumentKey, Zeroizing<String>>,
}

impl JobArguments {
    /// Empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: ArgumentKey, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: ArgumentKey, value: impl Into<String>) {
        self.values.insert(key, Zeroizing::new(value.into()));
    }

    /// Value for `key`, if supplied.
    pub fn get(&self, key: ArgumentKey) -> Option<&str> {
        self.values.get(&key).map(|value| value.as_str())
    }

    /// Whether `key` was supplied.
    pub fn contains(&self, key: ArgumentKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Copy every entry of `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(*key, value.clone());
        }
    }

    /// Supplied keys in stable order.
    pub fn keys(&self) -> impl Iterator<Item = ArgumentKey> + '_ {
        self.values.keys().copied()
    }

    /// Whether no argument was supplied.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for JobArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

/// State every job carries between construction and execution.
#[derive(Debug, Clone)]
pub struct JobState {
    context: JobContext,
    arguments: JobArguments,
    principal: Principal,
}

impl JobState {
    /// Fresh state acting for an anonymous principal.
    #[must_use]
    pub fn new(context: JobContext) -> Self {
        Self {
            context,
            arguments: JobArguments::new(),
            principal: Principal::anonymous(),
        }
    }

    /// Replace the arguments wholesale.
    #[must_use]
    pub fn with_arguments(mut self, arguments: JobArguments) -> Self {
        self.arguments = arguments;
        self
    }

    /// Replace the acting principal.
    #[must_use]
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = principal;
        self
    }
}

/// Unit of work run through the [`JobDispatcher`](super::JobDispatcher).
pub trait Job {
    /// Stable name for errors and logs.
    fn kind(&self) -> JobKind;

    /// Shared job state.
    fn state(&self) -> &JobState;

    /// Mutable shared job state.
    fn state_mut(&mut self) -> &mut JobState;

    /// Arguments that must be present before the job is authorised or run.
    fn required_arguments(&self) -> &'static [ArgumentKey] {
        &[]
    }

    /// Action the principal must be allowed to perform, if any.
    fn privilege_action(&self) -> Option<PrivilegeAction>;

    /// Whether the dispatcher must check authorisation before running.
    fn requires_privilege(&self) -> bool {
        self.privilege_action().is_some()
    }

    /// Apply the job to `user`, recording changes into `changes`.
    fn execute(&mut self, user: &mut User, changes: &mut ChangeLogSession)
    -> Result<(), JobError>;

    /// Current execution context.
    fn context(&self) -> JobContext {
        self.state().context
    }

    /// Assign the execution context.
    fn set_context(&mut self, context: JobContext) {
        self.state_mut().context = context;
    }

    /// Acting principal.
    fn principal(&self) -> &Principal {
        &self.state().principal
    }

    /// Assign the acting principal.
    fn set_principal(&mut self, principal: Principal) {
        self.state_mut().principal = principal;
    }

    /// Arguments merged so far.
    fn arguments(&self) -> &JobArguments {
        &self.state().arguments
    }

    /// Merge additional arguments into the job.
    fn merge_arguments(&mut self, arguments: &JobArguments) {
        self.state_mut().arguments.merge(arguments);
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(JobContext::Normal, JobContext::BatchEdit)]
    #[case(JobContext::BatchEdit, JobContext::BatchEdit)]
    #[case(JobContext::BatchAdd, JobContext::BatchAdd)]
    fn sub_job_context_mapping(#[case] composite: JobContext, #[case] expected: JobContext) {
        assert_eq!(composite.for_sub_jobs(), expected);
    }

    #[rstest]
    #[case(JobContext::Normal, true)]
    #[case(JobContext::BatchEdit, false)]
    #[case(JobContext::BatchAdd, false)]
    fn only_normal_context_commits(#[case] context: JobContext, #[case] expected: bool) {
        assert_eq!(context.commits(), expected);
    }

    #[rstest]
    fn merge_overrides_existing_values() {
        let mut arguments = JobArguments::new()
            .with(ArgumentKey::NewName, "old")
            .with(ArgumentKey::NewEmail, "ada@example.com");
        arguments.merge(&JobArguments::new().with(ArgumentKey::NewName, "new"));

        assert_eq!(arguments.get(ArgumentKey::NewName), Some("new"));
        assert_eq!(arguments.get(ArgumentKey::NewEmail), Some("ada@example.com"));
        assert!(!arguments.contains(ArgumentKey::NewPassword));
    }

    #[rstest]
    fn debug_output_lists_keys_only() {
        let arguments = JobArguments::new().with(ArgumentKey::NewPassword, "hunter22");
        let rendered = format!("{arguments:?}");
        assert!(rendered.contains("NewPassword"));
        assert!(!rendered.contains("hunter22"));
    }
}
