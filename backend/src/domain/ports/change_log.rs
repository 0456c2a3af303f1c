//! Port for the append-only change log.
//!
//! Jobs never write to the log directly. They buffer entries in a
//! [`ChangeLogSession`] and the committing job hands the whole session to
//! [`ChangeLog::flush`] once.

use crate::domain::ChangeLogSession;

use super::define_port_error;

define_port_error! {
    /// Errors raised by change log adapters.
    pub enum ChangeLogError {
        /// The log backend could not be reached.
        Unavailable { message: String } => "change log unavailable: {message}",
        /// Entries could not be written durably.
        Write { message: String } => "change log write failed: {message}",
    }
}

/// Append-only log of user changes.
#[cfg_attr(test, mockall::automock)]
pub trait ChangeLog: Send + Sync {
    /// Start a buffered session; entries recorded into it are not durable.
    fn buffer_changes(&self) -> ChangeLogSession;

    /// Durably commit every entry held by `session`.
    fn flush(&self, session: ChangeLogSession) -> Result<(), ChangeLogError>;
}

/// Fixture log that discards every flushed session.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureChangeLog;

impl ChangeLog for FixtureChangeLog {
    fn buffer_changes(&self) -> ChangeLogSession {
        ChangeLogSession::new()
    }

    fn flush(&self, _session: ChangeLogSession) -> Result<(), ChangeLogError> {
        Ok(())
    }
}
