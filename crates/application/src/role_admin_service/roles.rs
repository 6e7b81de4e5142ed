use super::*;

use crate::security_ports::{CreateRoleInput, UpdateRoleInput};

impl RoleAdminService {
    /// Lists granular roles.
    pub async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        self.repository.list_roles().await
    }

    /// Returns one granular role.
    pub async fn get_role(&self, role_id: &str) -> AppResult<RoleDefinition> {
        self.require_role(role_id).await
    }

    /// Creates a granular role with validated grants.
    pub async fn create_role(
        &self,
        actor: &UserIdentity,
        input: CreateRoleInput,
    ) -> AppResult<RoleDefinition> {
        let (name, slug) = validated_name(&input.name)?;
        let permissions = self.validated_permissions(&input.permissions)?;

        let role = self
            .repository
            .create_role(name.as_str(), &slug, &permissions)
            .await?;
        self.permission_resolution_service.invalidate_all().await?;

        self.append_audit_event(
            actor,
            AuditAction::SecurityRoleCreated,
            "role",
            &role.role_id,
            format!(
                "created role '{}' with {} permission(s)",
                role.slug,
                role.permissions.len()
            ),
        )
        .await?;

        Ok(role)
    }

    /// Renames a role and/or replaces its grants.
    ///
    /// System roles keep their name; their grants remain editable.
    pub async fn update_role(
        &self,
        actor: &UserIdentity,
        role_id: &str,
        input: UpdateRoleInput,
    ) -> AppResult<RoleDefinition> {
        let existing = self.require_role(role_id).await?;

        let rename = match input.name.as_deref() {
            Some(name) => {
                let (name, slug) = validated_name(name)?;
                if existing.is_system && name.as_str() != existing.name {
                    return Err(AppError::Conflict(format!(
                        "system role '{}' cannot be renamed",
                        existing.slug
                    )));
                }
                Some((name, slug))
            }
            None => None,
        };
        let permissions = input
            .permissions
            .as_deref()
            .map(|permissions| self.validated_permissions(permissions))
            .transpose()?;

        let role = self
            .repository
            .update_role(
                role_id,
                rename.as_ref().map(|(name, slug)| (name.as_str(), slug)),
                permissions.as_deref(),
            )
            .await?;
        self.permission_resolution_service.invalidate_all().await?;

        self.append_audit_event(
            actor,
            AuditAction::SecurityRoleUpdated,
            "role",
            role_id,
            format!("updated role '{}'", role.slug),
        )
        .await?;

        Ok(role)
    }

    /// Replaces the full grant set of a role.
    pub async fn set_role_permissions(
        &self,
        actor: &UserIdentity,
        role_id: &str,
        permissions: Vec<String>,
    ) -> AppResult<RoleDefinition> {
        let permissions = self.validated_permissions(&permissions)?;
        self.require_role(role_id).await?;

        let role = self
            .repository
            .replace_role_permissions(role_id, &permissions)
            .await?;
        self.permission_resolution_service.invalidate_all().await?;

        self.append_audit_event(
            actor,
            AuditAction::SecurityRolePermissionsReplaced,
            "role",
            role_id,
            format!(
                "replaced permissions of role '{}' with {} key(s)",
                role.slug,
                role.permissions.len()
            ),
        )
        .await?;

        Ok(role)
    }

    /// Deletes a non-system role that no user references.
    pub async fn delete_role(&self, actor: &UserIdentity, role_id: &str) -> AppResult<()> {
        let role = self.require_role(role_id).await?;
        if role.is_system {
            return Err(AppError::Conflict(format!(
                "system role '{}' cannot be deleted",
                role.slug
            )));
        }

        let assigned_users = self.repository.count_users_with_role(role_id).await?;
        if assigned_users > 0 {
            return Err(AppError::Conflict(format!(
                "role '{}' is still assigned to {assigned_users} user(s)",
                role.slug
            )));
        }

        self.repository.delete_role(role_id).await?;
        self.permission_resolution_service.invalidate_all().await?;

        self.append_audit_event(
            actor,
            AuditAction::SecurityRoleDeleted,
            "role",
            role_id,
            format!("deleted role '{}'", role.slug),
        )
        .await
    }
}
