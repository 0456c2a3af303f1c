//! Port used after a save to ask a user to confirm a new email address.

use crate::domain::{EmailAddress, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised by verification delivery adapters.
    pub enum EmailVerificationError {
        /// The message could not be handed to the delivery backend.
        Delivery { message: String } => "email verification delivery failed: {message}",
    }
}

/// Delivers verification requests for pending email addresses.
#[cfg_attr(test, mockall::automock)]
pub trait EmailVerificationSender: Send + Sync {
    /// Ask `user` to confirm `email`.
    fn send_verification(
        &self,
        user: &User,
        email: &EmailAddress,
    ) -> Result<(), EmailVerificationError>;
}

/// Fixture sender that drops every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEmailVerificationSender;

impl EmailVerificationSender for FixtureEmailVerificationSender {
    fn send_verification(
        &self,
        _user: &User,
        _email: &EmailAddress,
    ) -> Result<(), EmailVerificationError> {
        Ok(())
    }
}
