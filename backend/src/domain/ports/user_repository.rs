//! Port abstraction for user persistence adapters and their errors.

use crate::domain::{User, UserId, UserName};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Durable storage for user entities.
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    /// Insert or update a user record. Saving identical state twice is a no-op.
    fn save(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Save every user or none of them.
    fn save_all(&self, users: &[User]) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by name, compared case-insensitively.
    fn find_by_name(&self, name: &UserName) -> Result<Option<User>, UserPersistenceError>;
}

/// Fixture repository that stores nothing and finds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

impl UserRepository for FixtureUserRepository {
    fn save(&self, _user: &User) -> Result<(), UserPersistenceError> {
        Ok(())
    }

    fn save_all(&self, _users: &[User]) -> Result<(), UserPersistenceError> {
        Ok(())
    }

    fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    fn find_by_name(&self, _name: &UserName) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }
}
