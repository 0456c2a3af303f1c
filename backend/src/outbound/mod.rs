//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: user stores backed by memory and JSON snapshots
//! - **change_log**: change log sinks that emit or retain flushed entries
//! - **notification**: email verification delivery
//!
//! Adapters are thin translators between domain types and their backing
//! representation. They contain no business logic.

pub mod change_log;
pub mod notification;
pub mod persistence;
