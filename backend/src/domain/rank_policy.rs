//! Rank-based authorisation policy.

use std::collections::BTreeMap;

use tracing::debug;

use super::access_rank::AccessRank;
use super::error::AccessDenied;
use super::ports::AuthorizationChecker;
use super::principal::{Principal, Privilege, PrivilegeAction, PrivilegeScope};

/// Grants a privilege when the principal's rank reaches the configured
/// minimum. Privileges missing from the table are denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankPolicyChecker {
    minimum: BTreeMap<Privilege, AccessRank>,
}

impl Default for RankPolicyChecker {
    fn default() -> Self {
        use PrivilegeAction::{ChangeAccessRank, ChangeEmail, ChangeName, ChangePassword};
        use PrivilegeScope::{Any, Own};

        let minimum = [
            (Privilege::new(ChangeAccessRank, Own), AccessRank::Moderator),
            (Privilege::new(ChangeAccessRank, Any), AccessRank::Administrator),
            (Privilege::new(ChangeName, Own), AccessRank::Regular),
            (Privilege::new(ChangeName, Any), AccessRank::Moderator),
            (Privilege::new(ChangePassword, Own), AccessRank::Regular),
            (Privilege::new(ChangePassword, Any), AccessRank::Moderator),
            (Privilege::new(ChangeEmail, Own), AccessRank::Regular),
            (Privilege::new(ChangeEmail, Any), AccessRank::Moderator),
        ]
        .into_iter()
        .collect();
        Self { minimum }
    }
}

impl RankPolicyChecker {
    /// Policy with no grants at all.
    pub fn deny_all() -> Self {
        Self {
            minimum: BTreeMap::new(),
        }
    }

    /// Override the minimum rank for one privilege.
    #[must_use]
    pub fn with_minimum(mut self, privilege: Privilege, rank: AccessRank) -> Self {
        self.minimum.insert(privilege, rank);
        self
    }

    /// Minimum rank for `privilege`, if it can be granted at all.
    pub fn minimum_rank(&self, privilege: Privilege) -> Option<AccessRank> {
        self.minimum.get(&privilege).copied()
    }
}

impl AuthorizationChecker for RankPolicyChecker {
    fn check(&self, principal: &Principal, privilege: Privilege) -> Result<(), AccessDenied> {
        match self.minimum_rank(privilege) {
            Some(minimum) if principal.rank() >= minimum => Ok(()),
            minimum => {
                debug!(
                    %privilege,
                    rank = %principal.rank(),
                    minimum = ?minimum,
                    "rank below privilege minimum"
                );
                Err(AccessDenied::missing_privilege(privilege))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn principal(rank: AccessRank) -> Principal {
        Principal::new(None, rank)
    }

    #[rstest]
    #[case(PrivilegeAction::ChangeName, PrivilegeScope::Own, AccessRank::Regular, true)]
    #[case(PrivilegeAction::ChangeName, PrivilegeScope::Own, AccessRank::Restricted, false)]
    #[case(PrivilegeAction::ChangeName, PrivilegeScope::Any, AccessRank::Power, false)]
    #[case(PrivilegeAction::ChangeName, PrivilegeScope::Any, AccessRank::Moderator, true)]
    #[case(PrivilegeAction::ChangeAccessRank, PrivilegeScope::Own, AccessRank::Moderator, true)]
    #[case(PrivilegeAction::ChangeAccessRank, PrivilegeScope::Any, AccessRank::Moderator, false)]
    #[case(
        PrivilegeAction::ChangeAccessRank,
        PrivilegeScope::Any,
        AccessRank::Administrator,
        true
    )]
    #[case(PrivilegeAction::ChangeEmail, PrivilegeScope::Own, AccessRank::Anonymous, false)]
    fn default_table_grants_by_rank(
        #[case] action: PrivilegeAction,
        #[case] scope: PrivilegeScope,
        #[case] rank: AccessRank,
        #[case] granted: bool,
    ) {
        let checker = RankPolicyChecker::default();
        let privilege = Privilege::new(action, scope);
        assert_eq!(checker.check(&principal(rank), privilege).is_ok(), granted);
    }

    #[rstest]
    fn missing_entries_are_denied() {
        let privilege = Privilege::new(PrivilegeAction::ChangeName, PrivilegeScope::Own);
        let denied = RankPolicyChecker::deny_all()
            .check(&principal(AccessRank::Administrator), privilege)
            .expect_err("empty table denies");
        assert_eq!(denied.privilege(), Some(privilege));
    }

    #[rstest]
    fn overrides_replace_defaults() {
        let privilege = Privilege::new(PrivilegeAction::ChangePassword, PrivilegeScope::Any);
        let checker = RankPolicyChecker::default().with_minimum(privilege, AccessRank::Power);
        assert_eq!(checker.minimum_rank(privilege), Some(AccessRank::Power));
        assert!(checker.check(&principal(AccessRank::Power), privilege).is_ok());
    }
}
