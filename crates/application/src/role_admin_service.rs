use std::sync::Arc;

use dispatchdesk_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use dispatchdesk_domain::{AuditAction, PermissionRegistry, RoleSlug};

use crate::PermissionResolutionService;
use crate::security_ports::{AuditEvent, AuditRepository, RoleAdminRepository, RoleDefinition};

mod roles;
mod users;

/// Application service for role administration.
///
/// Every mutation invalidates cached permissions once the write has been
/// committed: role mutations clear the whole cache, user role changes only
/// the affected user.
#[derive(Clone)]
pub struct RoleAdminService {
    permission_resolution_service: PermissionResolutionService,
    repository: Arc<dyn RoleAdminRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        permission_resolution_service: PermissionResolutionService,
        repository: Arc<dyn RoleAdminRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            permission_resolution_service,
            repository,
            audit_repository,
        }
    }

    /// Returns the permission catalog roles are validated against.
    #[must_use]
    pub fn registry(&self) -> &'static PermissionRegistry {
        self.permission_resolution_service.registry()
    }

    /// Clears every cached permission set and emits an audit event.
    pub async fn clear_permission_cache(&self, actor: &UserIdentity) -> AppResult<()> {
        self.permission_resolution_service.invalidate_all().await?;

        self.append_audit_event(
            actor,
            AuditAction::SecurityPermissionCacheCleared,
            "permission_cache",
            "*",
            "cleared all cached permission sets".to_owned(),
        )
        .await
    }

    async fn require_role(&self, role_id: &str) -> AppResult<RoleDefinition> {
        self.repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    fn validated_permissions(&self, permissions: &[String]) -> AppResult<Vec<String>> {
        Ok(self
            .registry()
            .validate_keys(permissions)?
            .into_iter()
            .collect())
    }

    async fn append_audit_event(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: &str,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.user_id().to_owned(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id: resource_id.to_owned(),
                detail: Some(detail),
            })
            .await
    }
}

fn validated_name(name: &str) -> AppResult<(NonEmptyString, RoleSlug)> {
    let name = NonEmptyString::new(name)?;
    let slug = RoleSlug::from_name(name.as_str())?;
    Ok((name, slug))
}

#[cfg(test)]
mod tests;
