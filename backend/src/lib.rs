//! Account editing library: user edit jobs, their ports, and adapters.

pub mod config;
pub mod domain;
pub mod outbound;
