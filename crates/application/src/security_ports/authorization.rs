use async_trait::async_trait;
use dispatchdesk_core::AppResult;
use dispatchdesk_domain::RoleSlug;

/// Granular role record referenced by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleReference {
    /// Stable role identifier.
    pub role_id: String,
    /// Role slug.
    pub slug: RoleSlug,
    /// Indicates a system-managed role.
    pub is_system: bool,
}

/// Role assignment stored on a user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleAssignment {
    /// Legacy role name as stored.
    pub legacy_role: String,
    /// Granular role identifier, if assigned.
    pub role_id: Option<String>,
    /// Resolved granular role, absent when `role_id` is unset or dangling.
    pub role: Option<RoleReference>,
}

/// Repository port for the two reads permission resolution needs.
#[async_trait]
pub trait PermissionLookupRepository: Send + Sync {
    /// Loads the role assignment of a user, or `None` for unknown users.
    async fn find_user_role_assignment(
        &self,
        user_id: &str,
    ) -> AppResult<Option<UserRoleAssignment>>;

    /// Lists permission keys explicitly granted to a granular role.
    async fn list_role_permission_keys(&self, role_id: &str) -> AppResult<Vec<String>>;
}
