//! Acting principals and the privileges they may hold.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::access_rank::AccessRank;
use super::user::{User, UserId};

/// Identity on whose behalf a job runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    id: Option<UserId>,
    rank: AccessRank,
}

impl Principal {
    /// Build a principal from explicit parts.
    pub const fn new(id: Option<UserId>, rank: AccessRank) -> Self {
        Self { id, rank }
    }

    /// Caller without an account.
    pub const fn anonymous() -> Self {
        Self {
            id: None,
            rank: AccessRank::Anonymous,
        }
    }

    /// Principal acting as `user`.
    pub fn for_user(user: &User) -> Self {
        Self {
            id: Some(user.id().clone()),
            rank: user.rank(),
        }
    }

    /// Account identifier, absent for anonymous callers.
    pub fn id(&self) -> Option<&UserId> {
        self.id.as_ref()
    }

    /// Rank used for privilege checks.
    pub const fn rank(&self) -> AccessRank {
        self.rank
    }

    /// Whether this principal is the given account.
    pub fn is(&self, id: &UserId) -> bool {
        self.id.as_ref() == Some(id)
    }
}

/// Field-level edit a job may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeAction {
    ChangeAccessRank,
    ChangeName,
    ChangePassword,
    ChangeEmail,
}

impl PrivilegeAction {
    /// Every action in sub-job order.
    pub const ALL: [Self; 4] = [
        Self::ChangeAccessRank,
        Self::ChangeName,
        Self::ChangePassword,
        Self::ChangeEmail,
    ];

    const fn key_suffix(self) -> &'static str {
        match self {
            Self::ChangeAccessRank => "rank",
            Self::ChangeName => "name",
            Self::ChangePassword => "pass",
            Self::ChangeEmail => "email",
        }
    }
}

/// Whether the edit targets the acting principal or somebody else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeScope {
    Own,
    Any,
}

impl PrivilegeScope {
    const fn key_segment(self) -> &'static str {
        match self {
            Self::Own => "self",
            Self::Any => "any",
        }
    }
}

/// Capability a job requires, e.g. `users:edit:any:rank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Privilege {
    action: PrivilegeAction,
    scope: PrivilegeScope,
}

impl Privilege {
    /// Build a privilege from its parts.
    pub const fn new(action: PrivilegeAction, scope: PrivilegeScope) -> Self {
        Self { action, scope }
    }

    /// Scope the action to `target` as seen by `principal`.
    pub fn for_target(action: PrivilegeAction, principal: &Principal, target: &User) -> Self {
        let scope = if principal.is(target.id()) {
            PrivilegeScope::Own
        } else {
            PrivilegeScope::Any
        };
        Self::new(action, scope)
    }

    /// Edited field.
    pub const fn action(self) -> PrivilegeAction {
        self.action
    }

    /// Own or any account.
    pub const fn scope(self) -> PrivilegeScope {
        self.scope
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "users:edit:{}:{}",
            self.scope.key_segment(),
            self.action.key_suffix()
        )
    }
}
