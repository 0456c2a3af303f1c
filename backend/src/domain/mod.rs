//! Domain primitives, jobs, and services for editing user accounts.
//!
//! Purpose: Define the user aggregate, the job abstraction that edits it,
//! and the authorisation and commit rules around those jobs. Adapters reach
//! the domain only through the traits in [`ports`].
//!
//! Public surface:
//! - User (alias to `user::User`): account with rank, name, password and
//!   email fields.
//! - Job / JobContext: unit of work and the execution mode it runs in.
//! - JobDispatcher: merges arguments, authorises, and executes a job.
//! - EditUserJob: composite that runs the four field jobs in order.
//! - UserEditService: driving entry point for inbound adapters.

mod access_rank;
mod change_log;
mod dispatcher;
mod edit_user_job;
pub mod error;
mod job;
mod password;
pub mod ports;
mod principal;
mod rank_policy;
mod rules;
pub mod user;
mod user_edit_service;
mod user_jobs;

pub use self::access_rank::{AccessRank, AccessRankParseError};
pub use self::change_log::{ChangeEntry, ChangeLogSession, UserChange};
pub use self::dispatcher::JobDispatcher;
pub use self::edit_user_job::EditUserJob;
pub use self::error::{AccessDenied, JobError, UnsatisfiedReason};
pub use self::job::{ArgumentKey, Job, JobArguments, JobContext, JobKind, JobState};
pub use self::password::PasswordHash;
pub use self::principal::{Principal, Privilege, PrivilegeAction, PrivilegeScope};
pub use self::rank_policy::RankPolicyChecker;
pub use self::rules::{PASSWORD_MIN, RulesError, UserEditRules};
pub use self::user::{
    EmailAddress, USER_NAME_MAX, USER_NAME_MIN, USER_NAME_PATTERN, User, UserId, UserName,
    UserValidationError,
};
pub use self::user_edit_service::{EditUserRequest, UserEditService};
pub use self::user_jobs::{
    AccessRankEditJob, EmailEditJob, NameEditJob, PasswordEditJob, UserJobPorts,
};
