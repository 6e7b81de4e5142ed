use super::*;

use crate::security_ports::{AssignUserRoleInput, UserRoleRecord};

impl RoleAdminService {
    /// Changes a user's legacy and/or granular role.
    pub async fn update_user_role(
        &self,
        actor: &UserIdentity,
        user_id: &str,
        input: AssignUserRoleInput,
    ) -> AppResult<UserRoleRecord> {
        let role_id = input
            .role_id
            .as_deref()
            .map(str::trim)
            .filter(|role_id| !role_id.is_empty());
        if let Some(role_id) = role_id {
            self.require_role(role_id).await?;
        }

        let record = self
            .repository
            .update_user_role(user_id, input.legacy_role, role_id)
            .await?;
        self.permission_resolution_service
            .invalidate_user(user_id)
            .await?;

        self.append_audit_event(
            actor,
            AuditAction::SecurityUserRoleUpdated,
            "user",
            user_id,
            format!(
                "set role '{}' and granular role '{}'",
                record.legacy_role,
                record.role_id.as_deref().unwrap_or("none")
            ),
        )
        .await?;

        Ok(record)
    }
}
