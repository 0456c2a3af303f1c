//! User persistence adapters.
//!
//! The in-memory repository serves the CLI and the behaviour tests. Its
//! contents can be exported to and imported from a JSON snapshot so a store
//! survives between runs.

mod in_memory_user_repository;

pub use in_memory_user_repository::{InMemoryUserRepository, UserStoreError};
