//! Email edits and the post-save verification hook.

use tracing::{debug, warn};

use crate::domain::{
    ArgumentKey, ChangeEntry, ChangeLogSession, Job, JobContext, JobError, JobKind, JobState,
    PrivilegeAction, UnsatisfiedReason, User, UserChange,
};

use super::{UserJobPorts, required_argument};

/// Changes a user's email address.
///
/// When confirmation is required the address is parked as the pending
/// email and [`EmailEditJob::observe_save`] asks the user to confirm it
/// once the user has been saved. Accounts created in
/// [`JobContext::BatchAdd`] are set up by an operator and skip confirmation.
pub struct EmailEditJob {
    state: JobState,
    ports: UserJobPorts,
}

impl EmailEditJob {
    /// Create an email job running in `context`.
    pub fn new(context: JobContext, ports: UserJobPorts) -> Self {
        Self {
            state: JobState::new(context),
            ports,
        }
    }

    /// Post-save hook: request verification of a pending address.
    pub fn observe_save(ports: &UserJobPorts, user: &User) -> Result<(), JobError> {
        let Some(pending) = user.pending_email() else {
            return Ok(());
        };
        debug!(user = %user.id(), "requesting email verification");
        ports.verification.send_verification(user, pending)?;
        Ok(())
    }

    /// Save `user`, run [`EmailEditJob::observe_save`], then flush
    /// `changes`.
    ///
    /// The flush happens even when the verification request fails, so a saved
    /// user always has its log entries; the delivery error is returned after.
    pub(crate) fn commit(
        ports: &UserJobPorts,
        user: &User,
        changes: ChangeLogSession,
    ) -> Result<(), JobError> {
        ports.users.save(user)?;
        let notified = Self::observe_save(ports, user).inspect_err(|error| {
            warn!(user = %user.id(), %error, "verification request failed after save");
        });
        ports.change_log.flush(changes)?;
        notified
    }

    fn confirms_immediately(&self) -> bool {
        !self.ports.rules.require_email_confirmation() || self.context() == JobContext::BatchAdd
    }
}

impl Job for EmailEditJob {
    fn kind(&self) -> JobKind {
        JobKind::Email
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut JobState {
        &mut self.state
    }

    fn required_arguments(&self) -> &'static [ArgumentKey] {
        &[ArgumentKey::NewEmail]
    }

    fn privilege_action(&self) -> Option<PrivilegeAction> {
        Some(PrivilegeAction::ChangeEmail)
    }

    fn execute(
        &mut self,
        user: &mut User,
        changes: &mut ChangeLogSession,
    ) -> Result<(), JobError> {
        let raw = required_argument(&*self, ArgumentKey::NewEmail)?;
        let email = self
            .ports
            .rules
            .parse_email(&raw)
            .map_err(|error| JobError::invalid_argument(self.kind(), error.to_string()))?;

        let confirmed = user.email().is_some_and(|current| current.matches(&email));
        let pending = user.pending_email().is_some_and(|current| current.matches(&email));
        if confirmed || (pending && !self.confirms_immediately()) {
            return Err(JobError::unsatisfied(
                self.kind(),
                UnsatisfiedReason::Unchanged,
            ));
        }

        if self.confirms_immediately() {
            user.confirm_email(email.clone());
        } else {
            user.set_pending_email(email.clone());
        }
        changes.record(ChangeEntry::new(
            self.principal(),
            user,
            UserChange::Email { to: email },
            self.context(),
        ));

        if self.context().commits() {
            Self::commit(&self.ports, user, std::mem::take(changes))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{
        EmailVerificationError, MockChangeLog, MockEmailVerificationSender, MockUserRepository,
    };
    use crate::domain::user_jobs::test_support::{fixture_ports, moderator, user};
    use crate::domain::{AccessRank, EmailAddress, JobArguments, UserEditRules};
    use rstest::rstest;

    fn setting(email: &str, context: JobContext, ports: UserJobPorts) -> EmailEditJob {
        let mut job = EmailEditJob::new(context, ports);
        job.merge_arguments(&JobArguments::new().with(ArgumentKey::NewEmail, email));
        job.set_principal(moderator());
        job
    }

    fn address(raw: &str) -> EmailAddress {
        EmailAddress::new(raw).expect("valid email")
    }

    #[rstest]
    fn batch_edit_parks_the_address_as_pending() {
        let mut target = user("ada", AccessRank::Regular);
        let mut changes = ChangeLogSession::new();

        setting("ada@example.com", JobContext::BatchEdit, fixture_ports())
            .execute(&mut target, &mut changes)
            .expect("email change");

        assert_eq!(target.pending_email(), Some(&address("ada@example.com")));
        assert_eq!(target.email(), None);
        assert_eq!(changes.len(), 1);
    }

    #[rstest]
    fn batch_add_confirms_immediately() {
        let mut target = user("ada", AccessRank::Regular);

        setting("ada@example.com", JobContext::BatchAdd, fixture_ports())
            .execute(&mut target, &mut ChangeLogSession::new())
            .expect("email change");

        assert_eq!(target.email(), Some(&address("ada@example.com")));
        assert_eq!(target.pending_email(), None);
    }

    #[rstest]
    fn disabled_confirmation_confirms_immediately() {
        let rules = UserEditRules::new(1, 32, "^[a-z]+$", 5, false).expect("valid rules");
        let ports = UserJobPorts {
            rules: Arc::new(rules),
            ..fixture_ports()
        };
        let mut target = user("ada", AccessRank::Regular);

        setting("ada@example.com", JobContext::BatchEdit, ports)
            .execute(&mut target, &mut ChangeLogSession::new())
            .expect("email change");

        assert_eq!(target.email(), Some(&address("ada@example.com")));
    }

    #[rstest]
    #[case("ADA@example.com")]
    #[case("ada@example.com")]
    fn confirmed_address_is_unsatisfied(#[case] raw: &str) {
        let mut target =
            user("ada", AccessRank::Regular).with_email(address("ada@example.com"));
        let error = setting(raw, JobContext::BatchEdit, fixture_ports())
            .execute(&mut target, &mut ChangeLogSession::new())
            .expect_err("unchanged");
        assert!(error.is_unsatisfied());
    }

    #[rstest]
    fn malformed_address_is_invalid() {
        let mut target = user("ada", AccessRank::Regular);
        let error = setting("not-an-email", JobContext::BatchEdit, fixture_ports())
            .execute(&mut target, &mut ChangeLogSession::new())
            .expect_err("invalid");
        assert!(matches!(error, JobError::InvalidArgument { .. }));
    }

    #[rstest]
    fn standalone_change_saves_then_requests_verification() {
        let mut users = MockUserRepository::new();
        users.expect_save().times(1).returning(|_| Ok(()));
        let mut verification = MockEmailVerificationSender::new();
        verification
            .expect_send_verification()
            .withf(|_, email| email.to_string() == "ada@example.com")
            .times(1)
            .returning(|_, _| Ok(()));
        let ports = UserJobPorts {
            users: Arc::new(users),
            verification: Arc::new(verification),
            ..fixture_ports()
        };
        let mut target = user("ada", AccessRank::Regular);

        setting("ada@example.com", JobContext::Normal, ports)
            .execute(&mut target, &mut ChangeLogSession::new())
            .expect("email change");
    }

    #[rstest]
    fn observe_save_ignores_users_without_pending_email() {
        let mut verification = MockEmailVerificationSender::new();
        verification.expect_send_verification().times(0);
        let ports = UserJobPorts {
            verification: Arc::new(verification),
            ..fixture_ports()
        };

        EmailEditJob::observe_save(&ports, &user("ada", AccessRank::Regular))
            .expect("nothing to send");
    }

    #[rstest]
    fn observe_save_surfaces_delivery_failures() {
        let mut verification = MockEmailVerificationSender::new();
        verification
            .expect_send_verification()
            .returning(|_, _| Err(EmailVerificationError::delivery("smtp down")));
        let ports = UserJobPorts {
            verification: Arc::new(verification),
            ..fixture_ports()
        };
        let mut target = user("ada", AccessRank::Regular);
        target.set_pending_email(address("ada@example.com"));

        assert_eq!(
            EmailEditJob::observe_save(&ports, &target),
            Err(JobError::Notification(EmailVerificationError::delivery(
                "smtp down"
            )))
        );
    }

    #[rstest]
    fn failed_verification_still_flushes_the_saved_change() {
        let mut users = MockUserRepository::new();
        users.expect_save().times(1).returning(|_| Ok(()));
        let mut verification = MockEmailVerificationSender::new();
        verification
            .expect_send_verification()
            .times(1)
            .returning(|_, _| Err(EmailVerificationError::delivery("smtp down")));
        let mut log = MockChangeLog::new();
        log.expect_flush()
            .withf(|session| session.len() == 1)
            .times(1)
            .returning(|_| Ok(()));
        let ports = UserJobPorts {
            users: Arc::new(users),
            change_log: Arc::new(log),
            verification: Arc::new(verification),
            ..fixture_ports()
        };
        let mut target = user("ada", AccessRank::Regular);

        let error = setting("ada@example.com", JobContext::Normal, ports)
            .execute(&mut target, &mut ChangeLogSession::new())
            .expect_err("delivery fails");

        assert!(matches!(error, JobError::Notification(_)));
    }
}
