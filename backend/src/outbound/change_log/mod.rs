//! Change log sinks.
//!
//! [`TracingChangeLog`] emits every flushed entry as a structured `info!`
//! event, so the log lands wherever the subscriber writes. [`InMemoryChangeLog`]
//! keeps flushed batches for inspection by tests and tooling.

use std::sync::Mutex;

use tracing::info;

use crate::domain::ports::{ChangeLog, ChangeLogError};
use crate::domain::{ChangeEntry, ChangeLogSession};

/// Writes flushed entries to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingChangeLog;

impl ChangeLog for TracingChangeLog {
    fn buffer_changes(&self) -> ChangeLogSession {
        ChangeLogSession::new()
    }

    fn flush(&self, session: ChangeLogSession) -> Result<(), ChangeLogError> {
        for entry in session.into_entries() {
            info!(
                target: "accounts::change_log",
                actor = %entry
                    .actor()
                    .map_or_else(|| "anonymous".to_owned(), ToString::to_string),
                subject = %entry.subject(),
                context = ?entry.context(),
                recorded_at = %entry.recorded_at(),
                change = %entry.change(),
                "user changed"
            );
        }
        Ok(())
    }
}

/// Retains each flushed batch in memory.
#[derive(Debug, Default)]
pub struct InMemoryChangeLog {
    batches: Mutex<Vec<Vec<ChangeEntry>>>,
}

impl InMemoryChangeLog {
    /// Create a log with no flushed batches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flushed batches in flush order.
    pub fn batches(&self) -> Result<Vec<Vec<ChangeEntry>>, ChangeLogError> {
        self.batches
            .lock()
            .map(|batches| batches.clone())
            .map_err(|_| ChangeLogError::unavailable("change log lock poisoned"))
    }

    /// Every flushed entry in flush order.
    pub fn entries(&self) -> Result<Vec<ChangeEntry>, ChangeLogError> {
        Ok(self.batches()?.into_iter().flatten().collect())
    }
}

impl ChangeLog for InMemoryChangeLog {
    fn buffer_changes(&self) -> ChangeLogSession {
        ChangeLogSession::new()
    }

    fn flush(&self, session: ChangeLogSession) -> Result<(), ChangeLogError> {
        let mut batches = self
            .batches
            .lock()
            .map_err(|_| ChangeLogError::write("change log lock poisoned"))?;
        batches.push(session.into_entries());
        Ok(())
    }
}
