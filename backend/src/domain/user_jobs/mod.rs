//! Field-level user edit jobs.
//!
//! Each job owns exactly one field of [`User`]. Run standalone in
//! [`JobContext::Normal`] a job commits itself; in batch contexts it only
//! records change entries and leaves the commit to its driver.

mod access_rank;
mod email;
mod name;
mod password;

use std::sync::Arc;

use zeroize::Zeroizing;

pub use access_rank::AccessRankEditJob;
pub use email::EmailEditJob;
pub use name::NameEditJob;
pub use password::PasswordEditJob;

use super::change_log::ChangeLogSession;
use super::error::{JobError, UnsatisfiedReason};
use super::job::{ArgumentKey, Job, JobContext};
use super::ports::{ChangeLog, EmailVerificationSender, UserRepository};
use super::rules::UserEditRules;
use super::user::User;

/// Port bundle shared by the user edit jobs.
#[derive(Clone)]
pub struct UserJobPorts {
    /// User persistence adapter.
    pub users: Arc<dyn UserRepository>,
    /// Change log adapter.
    pub change_log: Arc<dyn ChangeLog>,
    /// Email verification adapter.
    pub verification: Arc<dyn EmailVerificationSender>,
    /// Field validation rules.
    pub rules: Arc<UserEditRules>,
}

impl UserJobPorts {
    /// Build a strongly-typed job port bundle.
    pub fn new(
        users: Arc<dyn UserRepository>,
        change_log: Arc<dyn ChangeLog>,
        verification: Arc<dyn EmailVerificationSender>,
        rules: Arc<UserEditRules>,
    ) -> Self {
        Self {
            users,
            change_log,
            verification,
            rules,
        }
    }
}

/// Copy of the argument `key`, or an unsatisfied outcome when absent.
fn required_argument(job: &dyn Job, key: ArgumentKey) -> Result<Zeroizing<String>, JobError> {
    job.arguments()
        .get(key)
        .map(|value| Zeroizing::new(value.to_owned()))
        .ok_or_else(|| JobError::unsatisfied(job.kind(), UnsatisfiedReason::MissingArgument(key)))
}

/// Save `user` and flush `changes` when `context` is interactive.
fn commit_standalone(
    ports: &UserJobPorts,
    context: JobContext,
    user: &User,
    changes: &mut ChangeLogSession,
) -> Result<(), JobError> {
    if !context.commits() {
        return Ok(());
    }
    ports.users.save(user)?;
    ports.change_log.flush(std::mem::take(changes))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for the job tests.
    use std::sync::Arc;

    use crate::domain::ports::{
        FixtureChangeLog, FixtureEmailVerificationSender, FixtureUserRepository,
    };
    use crate::domain::{AccessRank, PasswordHash, Principal, User, UserEditRules, UserId, UserName};

    use super::UserJobPorts;

    pub fn fixture_ports() -> UserJobPorts {
        UserJobPorts::new(
            Arc::new(FixtureUserRepository),
            Arc::new(FixtureChangeLog),
            Arc::new(FixtureEmailVerificationSender),
            Arc::new(UserEditRules::default()),
        )
    }

    pub fn user(name: &str, rank: AccessRank) -> User {
        User::new(
            UserId::random(),
            UserName::new(name).expect("valid name"),
            rank,
            PasswordHash::generate("analytical"),
        )
    }

    pub fn moderator() -> Principal {
        Principal::new(Some(UserId::random()), AccessRank::Moderator)
    }
}
