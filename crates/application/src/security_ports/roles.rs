use async_trait::async_trait;
use dispatchdesk_core::AppResult;
use dispatchdesk_domain::{LegacyRole, RoleSlug};

/// Granular role definition returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Stable role identifier.
    pub role_id: String,
    /// Unique role slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Indicates a system-managed role.
    pub is_system: bool,
    /// Explicit grants, sorted.
    pub permissions: Vec<String>,
}

/// Input payload for creating granular roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Display name; the slug is derived from it.
    pub name: String,
    /// Grants to attach to the role.
    pub permissions: Vec<String>,
}

/// Input payload for updating granular roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New display name, if the role is renamed.
    pub name: Option<String>,
    /// Replacement grant set, if grants change.
    pub permissions: Option<Vec<String>>,
}

/// Input payload for changing a user's role assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignUserRoleInput {
    /// New legacy role; `None` keeps the stored value.
    pub legacy_role: Option<LegacyRole>,
    /// New granular role; `None` clears the granular assignment.
    pub role_id: Option<String>,
}

/// User role columns after an assignment change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleRecord {
    /// User identifier.
    pub user_id: String,
    /// Legacy role name.
    pub legacy_role: String,
    /// Granular role identifier.
    pub role_id: Option<String>,
}

/// Repository port for role administration writes.
#[async_trait]
pub trait RoleAdminRepository: Send + Sync {
    /// Lists all granular roles with their grants.
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>>;

    /// Finds one granular role.
    async fn find_role(&self, role_id: &str) -> AppResult<Option<RoleDefinition>>;

    /// Creates a role and its grants. Fails with a conflict on duplicate slugs.
    async fn create_role(
        &self,
        name: &str,
        slug: &RoleSlug,
        permissions: &[String],
    ) -> AppResult<RoleDefinition>;

    /// Renames a role and/or replaces its grants as one write.
    ///
    /// Either change is skipped when `None`. Nothing is stored when any part
    /// fails. Fails with a conflict on duplicate slugs.
    async fn update_role(
        &self,
        role_id: &str,
        rename: Option<(&str, &RoleSlug)>,
        permissions: Option<&[String]>,
    ) -> AppResult<RoleDefinition>;

    /// Deletes a role and its grants.
    async fn delete_role(&self, role_id: &str) -> AppResult<()>;

    /// Replaces the full grant set of a role.
    async fn replace_role_permissions(
        &self,
        role_id: &str,
        permissions: &[String],
    ) -> AppResult<RoleDefinition>;

    /// Counts users referencing a role.
    async fn count_users_with_role(&self, role_id: &str) -> AppResult<u64>;

    /// Updates the role columns of a user. Fails when the user does not exist.
    async fn update_user_role(
        &self,
        user_id: &str,
        legacy_role: Option<LegacyRole>,
        role_id: Option<&str>,
    ) -> AppResult<UserRoleRecord>;
}
