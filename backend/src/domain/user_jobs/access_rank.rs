//! Access rank edits.

use crate::domain::{
    AccessDenied, AccessRank, ArgumentKey, ChangeEntry, ChangeLogSession, Job, JobContext,
    JobError, JobKind, JobState, PrivilegeAction, UnsatisfiedReason, User, UserChange,
};

use super::{UserJobPorts, commit_standalone, required_argument};

/// Changes a user's access rank.
///
/// A principal can never grant a rank above their own, and
/// [`AccessRank::Anonymous`] is never assignable.
pub struct AccessRankEditJob {
    state: JobState,
    ports: UserJobPorts,
}

impl AccessRankEditJob {
    /// Create an access rank job running in `context`.
    pub fn new(context: JobContext, ports: UserJobPorts) -> Self {
        Self {
            state: JobState::new(context),
            ports,
        }
    }
}

impl Job for AccessRankEditJob {
    fn kind(&self) -> JobKind {
        JobKind::AccessRank
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut JobState {
        &mut self.state
    }

    fn required_arguments(&self) -> &'static [ArgumentKey] {
        &[ArgumentKey::NewAccessRank]
    }

    fn privilege_action(&self) -> Option<PrivilegeAction> {
        Some(PrivilegeAction::ChangeAccessRank)
    }

    fn execute(
        &mut self,
        user: &mut User,
        changes: &mut ChangeLogSession,
    ) -> Result<(), JobError> {
        let raw = required_argument(&*self, ArgumentKey::NewAccessRank)?;
        let rank: AccessRank = raw
            .parse()
            .map_err(|error| JobError::invalid_argument(self.kind(), format!("{error}")))?;
        if !rank.is_assignable() {
            return Err(JobError::invalid_argument(
                self.kind(),
                format!("rank {rank} cannot be assigned"),
            ));
        }

        let current = user.rank();
        if rank == current {
            return Err(JobError::unsatisfied(
                self.kind(),
                UnsatisfiedReason::Unchanged,
            ));
        }
        let own = self.principal().rank();
        if rank > own {
            return Err(AccessDenied::new(format!(
                "cannot grant rank {rank} above own rank {own}"
            ))
            .into());
        }

        user.set_rank(rank);
        changes.record(ChangeEntry::new(
            self.principal(),
            user,
            UserChange::AccessRank {
                from: current,
                to: rank,
            },
            self.context(),
        ));
        commit_standalone(&self.ports, self.context(), user, changes)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::JobArguments;
    use crate::domain::Principal;
    use crate::domain::user_jobs::test_support::{fixture_ports, moderator, user};
    use rstest::rstest;

    fn job_with(rank: &str, principal: Principal) -> AccessRankEditJob {
        let mut job = AccessRankEditJob::new(JobContext::BatchEdit, fixture_ports());
        job.merge_arguments(&JobArguments::new().with(ArgumentKey::NewAccessRank, rank));
        job.set_principal(principal);
        job
    }

    #[rstest]
    fn promotes_and_records_the_change() {
        let mut target = user("ada", AccessRank::Regular);
        let mut changes = ChangeLogSession::new();
        let mut job = job_with("power", moderator());

        job.execute(&mut target, &mut changes).expect("promotion");

        assert_eq!(target.rank(), AccessRank::Power);
        assert_eq!(
            changes.entries()[0].change(),
            &UserChange::AccessRank {
                from: AccessRank::Regular,
                to: AccessRank::Power
            }
        );
    }

    #[rstest]
    #[case("emperor")]
    #[case("anonymous")]
    fn rejects_unknown_or_unassignable_ranks(#[case] rank: &str) {
        let mut target = user("ada", AccessRank::Regular);
        let error = job_with(rank, moderator())
            .execute(&mut target, &mut ChangeLogSession::new())
            .expect_err("invalid rank");
        assert!(matches!(error, JobError::InvalidArgument { .. }));
    }

    #[rstest]
    fn refuses_to_grant_above_own_rank() {
        let mut target = user("ada", AccessRank::Regular);
        let mut changes = ChangeLogSession::new();
        let error = job_with("administrator", moderator())
            .execute(&mut target, &mut changes)
            .expect_err("denied");

        assert!(error.is_denied());
        assert_eq!(target.rank(), AccessRank::Regular);
        assert!(changes.is_empty());
    }

    #[rstest]
    fn same_rank_is_unsatisfied() {
        let mut target = user("ada", AccessRank::Regular);
        let error = job_with("Regular", moderator())
            .execute(&mut target, &mut ChangeLogSession::new())
            .expect_err("unchanged");
        assert!(error.is_unsatisfied());
    }
}
