//! Composite job that edits every user field in one request.
//!
//! The composite holds the four field jobs in a fixed order: access rank,
//! name, password, email. It needs no privilege itself; each field job is
//! authorised separately when the dispatcher runs it.
//!
//! ## Commit rules
//! - Field jobs run in [`JobContext::BatchAdd`] when the composite does and
//!   in [`JobContext::BatchEdit`] otherwise, so they never commit.
//! - An unsatisfied field job is skipped; any other failure aborts and drops
//!   the buffered entries.
//! - In [`JobContext::Normal`] the composite saves the user, runs the email
//!   post-save hook, and flushes the buffered entries exactly once. In batch
//!   contexts it hands the entries to the caller's session instead.
//! - A failed verification request does not skip the flush: the saved user
//!   keeps its log entries and the delivery error is returned afterwards.

use tracing::{debug, info};

use super::change_log::ChangeLogSession;
use super::dispatcher::JobDispatcher;
use super::error::JobError;
use super::job::{Job, JobArguments, JobContext, JobKind, JobState};
use super::principal::{Principal, PrivilegeAction};
use super::user::User;
use super::user_jobs::{
    AccessRankEditJob, EmailEditJob, NameEditJob, PasswordEditJob, UserJobPorts,
};

/// Edits rank, name, password and email of a user in one pass.
pub struct EditUserJob {
    state: JobState,
    ports: UserJobPorts,
    dispatcher: JobDispatcher,
    sub_jobs: [Box<dyn Job>; 4],
}

impl EditUserJob {
    /// Build a composite for one request.
    pub fn new(
        context: JobContext,
        arguments: JobArguments,
        principal: Principal,
        ports: UserJobPorts,
        dispatcher: JobDispatcher,
    ) -> Self {
        let sub_context = context.for_sub_jobs();
        let sub_jobs: [Box<dyn Job>; 4] = [
            Box::new(AccessRankEditJob::new(sub_context, ports.clone())),
            Box::new(NameEditJob::new(sub_context, ports.clone())),
            Box::new(PasswordEditJob::new(sub_context, ports.clone())),
            Box::new(EmailEditJob::new(sub_context, ports.clone())),
        ];
        Self {
            state: JobState::new(context)
                .with_arguments(arguments)
                .with_principal(principal),
            ports,
            dispatcher,
            sub_jobs,
        }
    }

    /// Field jobs in execution order.
    pub fn sub_jobs(&self) -> &[Box<dyn Job>] {
        &self.sub_jobs
    }

    /// Whether `principal` may change at least one field of `target`.
    ///
    /// Checks stop at the first grant, in field order.
    pub fn can_edit_anything(&mut self, principal: &Principal, target: &User) -> bool {
        let dispatcher = &self.dispatcher;
        self.sub_jobs.iter_mut().any(|job| {
            job.set_principal(principal.clone());
            dispatcher.check_authorization(&**job, target).is_ok()
        })
    }
}

impl Job for EditUserJob {
    fn kind(&self) -> JobKind {
        JobKind::EditUser
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut JobState {
        &mut self.state
    }

    fn privilege_action(&self) -> Option<PrivilegeAction> {
        None
    }

    fn execute(
        &mut self,
        user: &mut User,
        changes: &mut ChangeLogSession,
    ) -> Result<(), JobError> {
        let mut session = self.ports.change_log.buffer_changes();
        let context = self.context().for_sub_jobs();
        let principal = self.principal().clone();
        let arguments = self.arguments().clone();

        for job in &mut self.sub_jobs {
            job.set_context(context);
            job.set_principal(principal.clone());
            match self
                .dispatcher
                .run(&mut **job, &arguments, user, &mut session)
            {
                Ok(()) => {}
                Err(error) if error.is_unsatisfied() => {}
                Err(error) => return Err(error),
            }
        }

        if self.context().commits() {
            let entries = session.len();
            EmailEditJob::commit(&self.ports, user, session)?;
            info!(user = %user.id(), entries, "user edit committed");
        } else {
            debug!(
                user = %user.id(),
                entries = session.len(),
                context = ?self.context(),
                "user edit buffered for batch commit"
            );
            changes.absorb(session);
        }
        Ok(())
    }
}
