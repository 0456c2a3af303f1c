//! Account settings loaded via OrthoConfig.
//!
//! Every field is optional; accessors fall back to the built-in rules and the
//! default rank policy so an empty environment yields a working setup.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    AccessRank, AccessRankParseError, PASSWORD_MIN, Privilege, PrivilegeAction, PrivilegeScope,
    RankPolicyChecker, RulesError, USER_NAME_MAX, USER_NAME_MIN, USER_NAME_PATTERN,
    UserEditRules,
};

/// Errors raised while turning settings into domain rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// Name or password rules are inconsistent.
    #[error(transparent)]
    Rules(#[from] RulesError),
    /// A privilege override names an unknown rank.
    #[error("invalid minimum rank for {privilege}: {source}")]
    Rank {
        privilege: Privilege,
        source: AccessRankParseError,
    },
}

/// Configuration values controlling user edits.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACCOUNTS")]
pub struct AccountSettings {
    /// Shortest accepted user name.
    pub name_min_length: Option<usize>,
    /// Longest accepted user name.
    pub name_max_length: Option<usize>,
    /// Regular expression user names must match.
    pub name_pattern: Option<String>,
    /// Shortest accepted password.
    pub password_min_length: Option<usize>,
    /// Activate new email addresses without a confirmation round trip.
    #[ortho_config(default = false)]
    pub skip_email_confirmation: bool,
    /// Minimum rank for `users:edit:self:rank`.
    pub edit_own_rank: Option<String>,
    /// Minimum rank for `users:edit:any:rank`.
    pub edit_any_rank: Option<String>,
    /// Minimum rank for `users:edit:self:name`.
    pub edit_own_name: Option<String>,
    /// Minimum rank for `users:edit:any:name`.
    pub edit_any_name: Option<String>,
    /// Minimum rank for `users:edit:self:pass`.
    pub edit_own_password: Option<String>,
    /// Minimum rank for `users:edit:any:pass`.
    pub edit_any_password: Option<String>,
    /// Minimum rank for `users:edit:self:email`.
    pub edit_own_email: Option<String>,
    /// Minimum rank for `users:edit:any:email`.
    pub edit_any_email: Option<String>,
}

impl AccountSettings {
    /// Return the configured name pattern, falling back to the default.
    pub fn name_pattern(&self) -> &str {
        self.name_pattern.as_deref().unwrap_or(USER_NAME_PATTERN)
    }

    /// Build the field rules for the edit jobs.
    pub fn edit_rules(&self) -> Result<UserEditRules, SettingsError> {
        Ok(UserEditRules::new(
            self.name_min_length.unwrap_or(USER_NAME_MIN),
            self.name_max_length.unwrap_or(USER_NAME_MAX),
            self.name_pattern(),
            self.password_min_length.unwrap_or(PASSWORD_MIN),
            !self.skip_email_confirmation,
        )?)
    }

    /// Build the rank policy, applying any per-privilege overrides.
    pub fn rank_policy(&self) -> Result<RankPolicyChecker, SettingsError> {
        use PrivilegeAction::{ChangeAccessRank, ChangeEmail, ChangeName, ChangePassword};
        use PrivilegeScope::{Any, Own};

        let overrides = [
            (Privilege::new(ChangeAccessRank, Own), &self.edit_own_rank),
            (Privilege::new(ChangeAccessRank, Any), &self.edit_any_rank),
            (Privilege::new(ChangeName, Own), &self.edit_own_name),
            (Privilege::new(ChangeName, Any), &self.edit_any_name),
            (Privilege::new(ChangePassword, Own), &self.edit_own_password),
            (Privilege::new(ChangePassword, Any), &self.edit_any_password),
            (Privilege::new(ChangeEmail, Own), &self.edit_own_email),
            (Privilege::new(ChangeEmail, Any), &self.edit_any_email),
        ];

        let mut policy = RankPolicyChecker::default();
        for (privilege, raw) in overrides {
            let Some(raw) = raw else {
                continue;
            };
            let rank: AccessRank = raw
                .parse()
                .map_err(|source| SettingsError::Rank { privilege, source })?;
            policy = policy.with_minimum(privilege, rank);
        }
        Ok(policy)
    }
}
