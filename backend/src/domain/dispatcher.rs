//! Shared entry point that authorises and runs jobs.

use std::sync::Arc;

use tracing::debug;

use super::change_log::ChangeLogSession;
use super::error::{AccessDenied, JobError, UnsatisfiedReason};
use super::job::{Job, JobArguments};
use super::ports::AuthorizationChecker;
use super::principal::Privilege;
use super::user::User;

/// Runs jobs after merging their arguments and checking authorisation.
///
/// The dispatcher never recovers from a job outcome: unsatisfied results
/// propagate to the caller like every other error.
#[derive(Clone)]
pub struct JobDispatcher {
    checker: Arc<dyn AuthorizationChecker>,
}

impl JobDispatcher {
    /// Create a dispatcher backed by `checker`.
    pub fn new(checker: Arc<dyn AuthorizationChecker>) -> Self {
        Self { checker }
    }

    /// Check the job's principal against the privilege it implies for
    /// `target`. Jobs that need no privilege always pass.
    pub fn check_authorization(&self, job: &dyn Job, target: &User) -> Result<(), AccessDenied> {
        let Some(action) = job.privilege_action() else {
            return Ok(());
        };
        let privilege = Privilege::for_target(action, job.principal(), target);
        self.checker
            .check(job.principal(), privilege)
            .inspect_err(|denied| {
                debug!(job = %job.kind(), %privilege, reason = denied.reason(), "job denied");
            })
    }

    /// Merge `arguments`, verify required arguments, authorise, then execute.
    pub fn run(
        &self,
        job: &mut dyn Job,
        arguments: &JobArguments,
        user: &mut User,
        changes: &mut ChangeLogSession,
    ) -> Result<(), JobError> {
        job.merge_arguments(arguments);

        if let Some(missing) = job
            .required_arguments()
            .iter()
            .copied()
            .find(|key| !job.arguments().contains(*key))
        {
            return Err(JobError::unsatisfied(
                job.kind(),
                UnsatisfiedReason::MissingArgument(missing),
            ));
        }

        if job.requires_privilege() {
            self.check_authorization(&*job, user)?;
        }

        debug!(job = %job.kind(), context = ?job.context(), user = %user.id(), "dispatching job");
        job.execute(user, changes)
    }
}
