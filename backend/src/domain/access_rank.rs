//! Access ranks ordering what a user may do.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a rank name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown access rank `{value}`")]
pub struct AccessRankParseError {
    value: String,
}

impl AccessRankParseError {
    /// Raw value that failed to parse.
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

/// Ordered access rank. Later variants outrank earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRank {
    /// Callers without an account.
    Anonymous,
    /// Registered users with reduced rights.
    Restricted,
    /// Ordinary registered users.
    Regular,
    /// Trusted registered users.
    Power,
    /// Staff moderating other users.
    Moderator,
    /// Full control over every account.
    Administrator,
}

impl AccessRank {
    /// Every rank in ascending order.
    pub const ALL: [Self; 6] = [
        Self::Anonymous,
        Self::Restricted,
        Self::Regular,
        Self::Power,
        Self::Moderator,
        Self::Administrator,
    ];

    /// Stable name used in configuration and serialised records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Restricted => "restricted",
            Self::Regular => "regular",
            Self::Power => "power",
            Self::Moderator => "moderator",
            Self::Administrator => "administrator",
        }
    }

    /// Whether a stored account may hold this rank.
    #[must_use]
    pub const fn is_assignable(self) -> bool {
        !matches!(self, Self::Anonymous)
    }
}

impl fmt::Display for AccessRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessRank {
    type Err = AccessRankParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|rank| rank.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| AccessRankParseError {
                value: value.to_owned(),
            })
    }
}
