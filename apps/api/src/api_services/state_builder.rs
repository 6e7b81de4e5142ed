use std::sync::Arc;

use dispatchdesk_application::{
    AuditRepository, AuthorizationGuard, PermissionCache, PermissionLookupRepository,
    PermissionResolutionService, RoleAdminRepository, RoleAdminService,
};
use dispatchdesk_core::AppError;
use dispatchdesk_infrastructure::{
    PostgresAuditRepository, PostgresPermissionLookupRepository, PostgresRoleAdminRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::api_router::route_requirement_table;
use crate::state::AppState;

use super::redis::build_redis_client;

mod caches;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let redis_client = config
        .redis_url
        .as_deref()
        .map(build_redis_client)
        .transpose()?;
    let permission_cache = caches::build_permission_cache(config, redis_client)?;

    Ok(assemble_app_state(
        Arc::new(PostgresPermissionLookupRepository::new(pool.clone())),
        Arc::new(PostgresRoleAdminRepository::new(pool.clone())),
        Arc::new(PostgresAuditRepository::new(pool)),
        permission_cache,
    ))
}

/// Wires services from already constructed adapters.
pub fn assemble_app_state(
    lookup_repository: Arc<dyn PermissionLookupRepository>,
    role_admin_repository: Arc<dyn RoleAdminRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    permission_cache: Arc<dyn PermissionCache>,
) -> AppState {
    let permission_resolution_service =
        PermissionResolutionService::new(lookup_repository, permission_cache);

    AppState {
        role_admin_service: RoleAdminService::new(
            permission_resolution_service.clone(),
            role_admin_repository,
            audit_repository,
        ),
        authorization_guard: AuthorizationGuard::new(permission_resolution_service.clone()),
        permission_resolution_service,
        route_requirements: Arc::new(route_requirement_table()),
    }
}
