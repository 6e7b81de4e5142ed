use std::sync::Arc;

use dispatchdesk_core::AppResult;
use dispatchdesk_domain::{LegacyRole, PermissionRegistry, PermissionSet};
use tracing::debug;

use crate::security_ports::{PermissionCache, PermissionLookupRepository, UserRoleAssignment};

/// Computes the authoritative permission set of a user.
///
/// Resolution reads through a [`PermissionCache`]; callers that mutate roles or
/// grants must invalidate through this service after the write commits.
#[derive(Clone)]
pub struct PermissionResolutionService {
    repository: Arc<dyn PermissionLookupRepository>,
    cache: Arc<dyn PermissionCache>,
    registry: &'static PermissionRegistry,
}

impl PermissionResolutionService {
    /// Creates a service resolving against the standard permission catalog.
    #[must_use]
    pub fn new(
        repository: Arc<dyn PermissionLookupRepository>,
        cache: Arc<dyn PermissionCache>,
    ) -> Self {
        Self {
            repository,
            cache,
            registry: PermissionRegistry::standard(),
        }
    }

    /// Returns the catalog used for the administrator bypass.
    #[must_use]
    pub fn registry(&self) -> &'static PermissionRegistry {
        self.registry
    }

    /// Returns the effective permission set, served from cache when live.
    pub async fn effective_permissions(&self, user_id: &str) -> AppResult<PermissionSet> {
        if let Some(permissions) = self.cache.get_permissions(user_id).await? {
            debug!(user_id, "permission cache hit");
            return Ok(permissions);
        }

        debug!(user_id, "permission cache miss");
        let permissions = self.resolve_permissions(user_id).await?;
        self.cache
            .set_permissions(user_id, permissions.clone())
            .await?;

        Ok(permissions)
    }

    /// Resolves the permission set from storage, bypassing the cache.
    pub async fn resolve_permissions(&self, user_id: &str) -> AppResult<PermissionSet> {
        let Some(assignment) = self.repository.find_user_role_assignment(user_id).await? else {
            debug!(user_id, "unknown user resolves to an empty permission set");
            return Ok(PermissionSet::empty());
        };

        match resolution_path(&assignment) {
            ResolutionPath::AdministratorBypass => Ok(self.registry.full_permission_set()),
            ResolutionPath::GranularRole(role_id) => {
                let keys = self.repository.list_role_permission_keys(role_id).await?;
                Ok(PermissionSet::from_keys(keys))
            }
            ResolutionPath::LegacyRoleOnly => Ok(PermissionSet::empty()),
        }
    }

    /// Drops the cached set of one user.
    pub async fn invalidate_user(&self, user_id: &str) -> AppResult<()> {
        debug!(user_id, "invalidating cached permissions");
        self.cache.invalidate_user(user_id).await
    }

    /// Drops every cached set.
    pub async fn invalidate_all(&self) -> AppResult<()> {
        debug!("invalidating all cached permissions");
        self.cache.invalidate_all().await
    }
}

enum ResolutionPath<'a> {
    AdministratorBypass,
    GranularRole(&'a str),
    LegacyRoleOnly,
}

fn resolution_path(assignment: &UserRoleAssignment) -> ResolutionPath<'_> {
    if assignment.role.as_ref().is_some_and(|role| role.slug.is_admin()) {
        return ResolutionPath::AdministratorBypass;
    }

    match assignment.role_id.as_deref() {
        Some(role_id) => ResolutionPath::GranularRole(role_id),
        None if LegacyRole::is_admin_name(&assignment.legacy_role) => {
            ResolutionPath::AdministratorBypass
        }
        None => ResolutionPath::LegacyRoleOnly,
    }
}
