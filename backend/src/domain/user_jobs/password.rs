//! Password edits.

use crate::domain::{
    ArgumentKey, ChangeEntry, ChangeLogSession, Job, JobContext, JobError, JobKind, JobState,
    PasswordHash, PrivilegeAction, UnsatisfiedReason, User, UserChange,
};

use super::{UserJobPorts, commit_standalone, required_argument};

/// Replaces a user's password with a freshly salted hash.
pub struct PasswordEditJob {
    state: JobState,
    ports: UserJobPorts,
}

impl PasswordEditJob {
    /// Create a password job running in `context`.
    pub fn new(context: JobContext, ports: UserJobPorts) -> Self {
        Self {
            state: JobState::new(context),
            ports,
        }
    }
}

impl Job for PasswordEditJob {
    fn kind(&self) -> JobKind {
        JobKind::Password
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut JobState {
        &mut self.state
    }

    fn required_arguments(&self) -> &'static [ArgumentKey] {
        &[ArgumentKey::NewPassword]
    }

    fn privilege_action(&self) -> Option<PrivilegeAction> {
        Some(PrivilegeAction::ChangePassword)
    }

    fn execute(
        &mut self,
        user: &mut User,
        changes: &mut ChangeLogSession,
    ) -> Result<(), JobError> {
        let raw = required_argument(&*self, ArgumentKey::NewPassword)?;
        self.ports
            .rules
            .check_password(&raw)
            .map_err(|error| JobError::invalid_argument(self.kind(), error.to_string()))?;
        if user.password().verify(&raw) {
            return Err(JobError::unsatisfied(
                self.kind(),
                UnsatisfiedReason::Unchanged,
            ));
        }

        user.set_password(PasswordHash::generate(&raw));
        // Entries never carry the secret.
        changes.record(ChangeEntry::new(
            self.principal(),
            user,
            UserChange::Password,
            self.context(),
        ));
        commit_standalone(&self.ports, self.context(), user, changes)
    }
}
