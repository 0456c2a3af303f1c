//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod authorization_checker;
mod change_log;
mod email_verification;
mod user_repository;

#[cfg(test)]
pub use authorization_checker::MockAuthorizationChecker;
pub use authorization_checker::AuthorizationChecker;
#[cfg(test)]
pub use change_log::MockChangeLog;
pub use change_log::{ChangeLog, ChangeLogError, FixtureChangeLog};
#[cfg(test)]
pub use email_verification::MockEmailVerificationSender;
pub use email_verification::{
    EmailVerificationError, EmailVerificationSender, FixtureEmailVerificationSender,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
