//! Change entries and the buffered session that holds them until flush.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access_rank::AccessRank;
use super::job::JobContext;
use super::principal::Principal;
use super::user::{EmailAddress, User, UserId, UserName};

/// Field-level change applied to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum UserChange {
    AccessRank { from: AccessRank, to: AccessRank },
    Name { from: UserName, to: UserName },
    Password,
    Email { to: EmailAddress },
}

impl fmt::Display for UserChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessRank { from, to } => write!(f, "changed access rank from {from} to {to}"),
            Self::Name { from, to } => write!(f, "renamed {from} to {to}"),
            Self::Password => write!(f, "changed password"),
            Self::Email { to } => write!(f, "changed email to {to}"),
        }
    }
}

/// One change-log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actor: Option<UserId>,
    subject: UserId,
    change: UserChange,
    context: JobContext,
    recorded_at: DateTime<Utc>,
}

impl ChangeEntry {
    /// Record `change` made by `actor` to `subject` now.
    pub fn new(actor: &Principal, subject: &User, change: UserChange, context: JobContext) -> Self {
        Self {
            actor: actor.id().cloned(),
            subject: subject.id().clone(),
            change,
            context,
            recorded_at: Utc::now(),
        }
    }

    /// Account that made the change; `None` for anonymous callers.
    pub fn actor(&self) -> Option<&UserId> {
        self.actor.as_ref()
    }

    /// Account that was changed.
    pub fn subject(&self) -> &UserId {
        &self.subject
    }

    /// What changed.
    pub fn change(&self) -> &UserChange {
        &self.change
    }

    /// Context the change was made in.
    pub const fn context(&self) -> JobContext {
        self.context
    }

    /// When the change was recorded.
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

impl fmt::Display for ChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actor {
            Some(actor) => write!(f, "{actor} {} of user {}", self.change, self.subject),
            None => write!(f, "anonymous {} of user {}", self.change, self.subject),
        }
    }
}

/// Entries buffered during one execution.
///
/// Nothing here is durable: a session is committed only by handing it to
/// [`ChangeLog::flush`](super::ports::ChangeLog::flush). Dropping it
/// discards the entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeLogSession {
    entries: Vec<ChangeEntry>,
}

impl ChangeLogSession {
    /// Empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer an entry.
    pub fn record(&mut self, entry: ChangeEntry) {
        self.entries.push(entry);
    }

    /// Move every entry of `other` to the end of this session.
    pub fn absorb(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Buffered entries in recording order.
    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    /// Number of buffered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the session, yielding its entries.
    pub fn into_entries(self) -> Vec<ChangeEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::PasswordHash;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn subject() -> User {
        User::new(
            UserId::random(),
            UserName::new("subject").expect("valid name"),
            AccessRank::Regular,
            PasswordHash::generate("secret"),
        )
    }

    #[rstest]
    fn entries_render_actor_change_and_subject(subject: User) {
        let entry = ChangeEntry::new(
            &Principal::for_user(&subject),
            &subject,
            UserChange::AccessRank {
                from: AccessRank::Regular,
                to: AccessRank::Power,
            },
            JobContext::Normal,
        );
        assert_eq!(
            entry.to_string(),
            format!(
                "{id} changed access rank from regular to power of user {id}",
                id = subject.id()
            )
        );
    }

    #[rstest]
    fn anonymous_actor_is_omitted_from_json(subject: User) {
        let entry = ChangeEntry::new(
            &Principal::anonymous(),
            &subject,
            UserChange::Password,
            JobContext::BatchAdd,
        );
        let value = serde_json::to_value(&entry).expect("serialise entry");
        assert!(value.get("actor").is_none());
        assert_eq!(value.get("change"), Some(&json!({ "field": "password" })));
        assert_eq!(value.get("context"), Some(&json!("batch_add")));
    }

    #[rstest]
    fn absorb_appends_in_order(subject: User) {
        let actor = Principal::for_user(&subject);
        let mut outer = ChangeLogSession::new();
        outer.record(ChangeEntry::new(
            &actor,
            &subject,
            UserChange::Password,
            JobContext::BatchEdit,
        ));
        let mut inner = ChangeLogSession::new();
        inner.record(ChangeEntry::new(
            &actor,
            &subject,
            UserChange::Email {
                to: EmailAddress::new("new@example.com").expect("valid email"),
            },
            JobContext::BatchEdit,
        ));

        outer.absorb(inner);

        assert_eq!(outer.len(), 2);
        assert_eq!(outer.entries()[1].change().to_string(), "changed email to new@example.com");
    }
}
