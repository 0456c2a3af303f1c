//! Mutex-guarded user store with JSON snapshot support.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, UserId, UserName};

/// Errors raised while importing or exporting a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    /// The snapshot is not valid JSON for the user model.
    #[error("user snapshot is malformed: {0}")]
    Json(#[from] serde_json::Error),
    /// Two snapshot records share an identifier or a name.
    #[error("user snapshot holds a duplicate entry: {0}")]
    Duplicate(String),
    /// The store lock was poisoned by a panicking writer.
    #[error(transparent)]
    Persistence(#[from] UserPersistenceError),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserSnapshot {
    users: Vec<User>,
}

/// User repository kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<BTreeMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding `users`, rejecting duplicates.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Result<Self, UserStoreError> {
        let mut stored: BTreeMap<UserId, User> = BTreeMap::new();
        for user in users {
            if stored.contains_key(user.id()) {
                return Err(UserStoreError::Duplicate(user.id().to_string()));
            }
            if stored.values().any(|other| other.name().matches(user.name())) {
                return Err(UserStoreError::Duplicate(user.name().to_string()));
            }
            stored.insert(user.id().clone(), user);
        }
        Ok(Self {
            users: Mutex::new(stored),
        })
    }

    /// Load a repository from a JSON snapshot.
    pub fn from_json(snapshot: &str) -> Result<Self, UserStoreError> {
        let UserSnapshot { users } = serde_json::from_str(snapshot)?;
        Self::with_users(users)
    }

    /// Export every user as a pretty-printed JSON snapshot.
    pub fn to_json(&self) -> Result<String, UserStoreError> {
        let snapshot = UserSnapshot {
            users: self.users()?,
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Every stored user, ordered by identifier.
    pub fn users(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn name_taken(users: &BTreeMap<UserId, User>, user: &User) -> bool {
        users
            .values()
            .any(|other| other.id() != user.id() && other.name().matches(user.name()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<UserId, User>>, UserPersistenceError> {
        self.users
            .lock()
            .map_err(|_| UserPersistenceError::connection("user store lock poisoned"))
    }
}

impl UserRepository for InMemoryUserRepository {
    fn save(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.lock()?;
        if Self::name_taken(&users, user) {
            return Err(UserPersistenceError::query(format!(
                "user name {} is already used",
                user.name()
            )));
        }
        users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    fn save_all(&self, users: &[User]) -> Result<(), UserPersistenceError> {
        let mut stored = self.lock()?;
        let mut staged = stored.clone();
        for user in users {
            staged.insert(user.id().clone(), user.clone());
        }
        if let Some(clash) = users.iter().find(|user| Self::name_taken(&staged, user)) {
            return Err(UserPersistenceError::query(format!(
                "user name {} is already used",
                clash.name()
            )));
        }
        *stored = staged;
        Ok(())
    }

    fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn find_by_name(&self, name: &UserName) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .values()
            .find(|user| user.name().matches(name))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{AccessRank, PasswordHash};
    use rstest::{fixture, rstest};

    fn user(name: &str) -> User {
        User::new(
            UserId::random(),
            UserName::new(name).expect("valid name"),
            AccessRank::Regular,
            PasswordHash::generate("analytical"),
        )
    }

    #[fixture]
    fn repository() -> InMemoryUserRepository {
        InMemoryUserRepository::with_users([user("ada"), user("babbage")]).expect("unique users")
    }

    #[rstest]
    fn finds_names_case_insensitively(repository: InMemoryUserRepository) {
        let found = repository
            .find_by_name(&UserName::new("ADA").expect("valid name"))
            .expect("lookup");
        assert_eq!(found.map(|user| user.name().to_string()), Some("ada".to_owned()));
    }

    #[rstest]
    fn save_is_idempotent(repository: InMemoryUserRepository) {
        let ada = user("lovelace");
        repository.save(&ada).expect("first save");
        repository.save(&ada).expect("second save");

        assert_eq!(repository.users().expect("users").len(), 3);
        assert_eq!(repository.find_by_id(ada.id()), Ok(Some(ada)));
    }

    #[rstest]
    fn save_rejects_a_taken_name(repository: InMemoryUserRepository) {
        let error = repository.save(&user("Babbage")).expect_err("taken");
        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn save_all_writes_nothing_when_one_name_clashes(repository: InMemoryUserRepository) {
        let before = repository.users().expect("users");
        let mut first = before.first().cloned().expect("first user");
        first.set_name(UserName::new("charles").expect("valid name"));
        let mut second = before.get(1).cloned().expect("second user");
        second.set_name(UserName::new("Charles").expect("valid name"));

        let error = repository
            .save_all(&[first, second])
            .expect_err("clashing names");

        assert!(matches!(error, UserPersistenceError::Query { .. }));
        assert_eq!(repository.users().expect("users"), before);
    }

    #[rstest]
    fn save_all_accepts_swapped_names(repository: InMemoryUserRepository) {
        let before = repository.users().expect("users");
        let mut first = before.first().cloned().expect("first user");
        let mut second = before.get(1).cloned().expect("second user");
        let first_name = first.name().clone();
        first.set_name(second.name().clone());
        second.set_name(first_name);

        repository
            .save_all(&[first.clone(), second.clone()])
            .expect("swap");

        assert_eq!(repository.users().expect("users"), vec![first, second]);
    }

    #[rstest]
    fn duplicate_snapshot_names_are_rejected() {
        let result = InMemoryUserRepository::with_users([user("ada"), user("Ada")]);
        assert!(matches!(result, Err(UserStoreError::Duplicate(_))));
    }

    #[rstest]
    fn snapshot_round_trip_keeps_users(repository: InMemoryUserRepository) {
        let json = repository.to_json().expect("export");
        let restored = InMemoryUserRepository::from_json(&json).expect("import");
        assert_eq!(restored.users(), repository.users());
    }

    #[rstest]
    fn malformed_snapshot_is_reported() {
        let result = InMemoryUserRepository::from_json("{\"users\": [{}]}");
        assert!(matches!(result, Err(UserStoreError::Json(_))));
    }
}
