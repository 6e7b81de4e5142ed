use std::fmt::{Display, Formatter};
use std::str::FromStr;

use dispatchdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Slug reserved for the granular role that bypasses per-key grants.
pub const ADMIN_ROLE_SLUG: &str = "admin";

/// Fixed roles stored directly on user records before granular roles existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegacyRole {
    /// Full back-office access.
    Admin,
    /// Operations manager.
    Manager,
    /// Dispatch desk operator.
    Dispatcher,
    /// Invoicing and payments.
    Accountant,
    /// Manages agent accounts.
    AgentManager,
    /// Field representative portal user.
    Rep,
    /// Supplier portal user.
    Supplier,
    /// Driver app user.
    Driver,
    /// Read-only back-office user.
    Viewer,
}

impl LegacyRole {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Dispatcher => "DISPATCHER",
            Self::Accountant => "ACCOUNTANT",
            Self::AgentManager => "AGENT_MANAGER",
            Self::Rep => "REP",
            Self::Supplier => "SUPPLIER",
            Self::Driver => "DRIVER",
            Self::Viewer => "VIEWER",
        }
    }

    /// Returns all known legacy roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[LegacyRole] = &[
            LegacyRole::Admin,
            LegacyRole::Manager,
            LegacyRole::Dispatcher,
            LegacyRole::Accountant,
            LegacyRole::AgentManager,
            LegacyRole::Rep,
            LegacyRole::Supplier,
            LegacyRole::Driver,
            LegacyRole::Viewer,
        ];

        ALL
    }

    /// Returns whether a raw role name denotes the legacy administrator.
    #[must_use]
    pub fn is_admin_name(value: &str) -> bool {
        value == Self::Admin.as_str()
    }
}

impl Display for LegacyRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for LegacyRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::all()
            .iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .copied()
            .ok_or_else(|| AppError::Validation(format!("unknown legacy role '{value}'")))
    }
}

/// URL-safe identifier derived from a granular role name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleSlug(String);

impl RoleSlug {
    /// Derives a slug from a display name.
    ///
    /// ASCII alphanumerics are lowercased; every other run of characters
    /// collapses to a single `-`.
    pub fn from_name(name: &str) -> AppResult<Self> {
        let mut slug = String::with_capacity(name.len());
        let mut pending_separator = false;

        for character in name.chars() {
            if character.is_ascii_alphanumeric() {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push(character.to_ascii_lowercase());
            } else {
                pending_separator = true;
            }
        }

        if slug.is_empty() {
            return Err(AppError::Validation(format!(
                "role name '{name}' must contain at least one letter or digit"
            )));
        }

        Ok(Self(slug))
    }

    /// Wraps a slug read back from storage.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the slug value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether this slug grants the administrator bypass.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0 == ADMIN_ROLE_SLUG
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{LegacyRole, RoleSlug};

    #[test]
    fn legacy_role_parses_case_insensitively() {
        let parsed = LegacyRole::from_str("agent_manager");
        assert_eq!(parsed.ok(), Some(LegacyRole::AgentManager));
    }

    #[test]
    fn unknown_legacy_role_is_rejected() {
        assert!(LegacyRole::from_str("PILOT").is_err());
    }

    #[test]
    fn admin_name_check_is_exact() {
        assert!(LegacyRole::is_admin_name("ADMIN"));
        assert!(!LegacyRole::is_admin_name("admin"));
        assert!(!LegacyRole::is_admin_name(" ADMIN"));
        assert!(!LegacyRole::is_admin_name("MANAGER"));
    }

    #[test]
    fn slug_collapses_separators() {
        let slug = RoleSlug::from_name("  Night Shift / Dispatch ");
        assert_eq!(
            slug.as_ref().map(RoleSlug::as_str).ok(),
            Some("night-shift-dispatch")
        );
    }

    #[test]
    fn slug_requires_alphanumerics() {
        assert!(RoleSlug::from_name("---").is_err());
    }

    #[test]
    fn admin_slug_is_detected() {
        assert!(RoleSlug::from_name("Admin").is_ok_and(|slug| slug.is_admin()));
    }
}
