//! User name edits.

use crate::domain::{
    ArgumentKey, ChangeEntry, ChangeLogSession, Job, JobContext, JobError, JobKind, JobState,
    PrivilegeAction, UnsatisfiedReason, User, UserChange,
};

use super::{UserJobPorts, commit_standalone, required_argument};

/// Renames a user. Names are unique, compared case-insensitively.
pub struct NameEditJob {
    state: JobState,
    ports: UserJobPorts,
}

impl NameEditJob {
    /// Create a name job running in `context`.
    pub fn new(context: JobContext, ports: UserJobPorts) -> Self {
        Self {
            state: JobState::new(context),
            ports,
        }
    }
}

impl Job for NameEditJob {
    fn kind(&self) -> JobKind {
        JobKind::Name
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut JobState {
        &mut self.state
    }

    fn required_arguments(&self) -> &'static [ArgumentKey] {
        &[ArgumentKey::NewName]
    }

    fn privilege_action(&self) -> Option<PrivilegeAction> {
        Some(PrivilegeAction::ChangeName)
    }

    fn execute(
        &mut self,
        user: &mut User,
        changes: &mut ChangeLogSession,
    ) -> Result<(), JobError> {
        let raw = required_argument(&*self, ArgumentKey::NewName)?;
        let name = self
            .ports
            .rules
            .parse_name(&raw)
            .map_err(|error| JobError::invalid_argument(self.kind(), error.to_string()))?;
        if &name == user.name() {
            return Err(JobError::unsatisfied(
                self.kind(),
                UnsatisfiedReason::Unchanged,
            ));
        }

        let owner = self.ports.users.find_by_name(&name)?;
        if owner.is_some_and(|owner| owner.id() != user.id()) {
            return Err(JobError::invalid_argument(
                self.kind(),
                format!("user name {name} is already used"),
            ));
        }

        let from = user.name().clone();
        user.set_name(name.clone());
        changes.record(ChangeEntry::new(
            self.principal(),
            user,
            UserChange::Name { from, to: name },
            self.context(),
        ));
        commit_standalone(&self.ports, self.context(), user, changes)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{MockChangeLog, MockUserRepository};
    use crate::domain::user_jobs::test_support::{fixture_ports, moderator, user};
    use crate::domain::{AccessRank, JobArguments};
    use rstest::rstest;

    fn renaming_to(name: &str, context: JobContext, ports: UserJobPorts) -> NameEditJob {
        let mut job = NameEditJob::new(context, ports);
        job.merge_arguments(&JobArguments::new().with(ArgumentKey::NewName, name));
        job.set_principal(moderator());
        job
    }

    #[rstest]
    fn batch_rename_records_without_committing() {
        let mut target = user("ada", AccessRank::Regular);
        let mut changes = ChangeLogSession::new();

        renaming_to("countess", JobContext::BatchEdit, fixture_ports())
            .execute(&mut target, &mut changes)
            .expect("rename");

        assert_eq!(target.name().to_string(), "countess");
        assert_eq!(changes.len(), 1);
    }

    #[rstest]
    fn taken_name_is_rejected() {
        let taken = user("babbage", AccessRank::Regular);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_name()
            .times(1)
            .returning(move |_| Ok(Some(taken.clone())));
        users.expect_save().times(0);
        let ports = UserJobPorts {
            users: Arc::new(users),
            ..fixture_ports()
        };
        let mut target = user("ada", AccessRank::Regular);

        let error = renaming_to("Babbage", JobContext::BatchEdit, ports)
            .execute(&mut target, &mut ChangeLogSession::new())
            .expect_err("taken");

        assert!(matches!(error, JobError::InvalidArgument { .. }));
        assert_eq!(target.name().to_string(), "ada");
    }

    #[rstest]
    #[case("ada")]
    #[case("  ada ")]
    fn same_name_is_unsatisfied(#[case] name: &str) {
        let mut target = user("ada", AccessRank::Regular);
        let error = renaming_to(name, JobContext::BatchEdit, fixture_ports())
            .execute(&mut target, &mut ChangeLogSession::new())
            .expect_err("unchanged");
        assert!(error.is_unsatisfied());
    }

    #[rstest]
    fn malformed_name_is_invalid() {
        let mut target = user("ada", AccessRank::Regular);
        let error = renaming_to("no spaces", JobContext::BatchEdit, fixture_ports())
            .execute(&mut target, &mut ChangeLogSession::new())
            .expect_err("invalid");
        assert!(matches!(error, JobError::InvalidArgument { .. }));
    }

    #[rstest]
    fn standalone_rename_saves_and_flushes() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_name().returning(|_| Ok(None));
        users.expect_save().times(1).returning(|_| Ok(()));
        let mut log = MockChangeLog::new();
        log.expect_flush()
            .withf(|session| session.len() == 1)
            .times(1)
            .returning(|_| Ok(()));
        let ports = UserJobPorts {
            users: Arc::new(users),
            change_log: Arc::new(log),
            ..fixture_ports()
        };
        let mut target = user("ada", AccessRank::Regular);
        let mut changes = ChangeLogSession::new();

        renaming_to("lovelace", JobContext::Normal, ports)
            .execute(&mut target, &mut changes)
            .expect("rename");

        assert!(changes.is_empty());
    }
}
