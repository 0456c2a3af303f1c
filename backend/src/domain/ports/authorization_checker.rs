//! Port deciding whether a principal holds a privilege.

use crate::domain::{AccessDenied, Principal, Privilege};

/// Evaluates a principal against a privilege. Implementations must be free
/// of side effects visible to the job being checked.
#[cfg_attr(test, mockall::automock)]
pub trait AuthorizationChecker: Send + Sync {
    /// Return `Ok(())` when `principal` holds `privilege`.
    fn check(&self, principal: &Principal, privilege: Privilege) -> Result<(), AccessDenied>;
}
