//! Email verification delivery adapters.

use tracing::info;

use crate::domain::ports::{EmailVerificationError, EmailVerificationSender};
use crate::domain::{EmailAddress, User};

/// Logs verification requests instead of sending mail.
///
/// Stands in for a mail transport in the CLI and local runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingVerificationSender;

impl EmailVerificationSender for TracingVerificationSender {
    fn send_verification(
        &self,
        user: &User,
        email: &EmailAddress,
    ) -> Result<(), EmailVerificationError> {
        info!(
            target: "accounts::notification",
            user = %user.id(),
            name = %user.name(),
            email = %email,
            "email verification requested"
        );
        Ok(())
    }
}
