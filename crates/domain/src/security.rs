use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by role administration use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a granular role is created.
    SecurityRoleCreated,
    /// Emitted when a granular role is renamed.
    SecurityRoleUpdated,
    /// Emitted when a granular role is deleted.
    SecurityRoleDeleted,
    /// Emitted when a role's grant set is replaced.
    SecurityRolePermissionsReplaced,
    /// Emitted when a user's legacy or granular role changes.
    SecurityUserRoleUpdated,
    /// Emitted when an operator clears the permission cache.
    SecurityPermissionCacheCleared,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityRoleCreated => "security.role.created",
            Self::SecurityRoleUpdated => "security.role.updated",
            Self::SecurityRoleDeleted => "security.role.deleted",
            Self::SecurityRolePermissionsReplaced => "security.role.permissions_replaced",
            Self::SecurityUserRoleUpdated => "security.user.role_updated",
            Self::SecurityPermissionCacheCleared => "security.permission_cache.cleared",
        }
    }
}
