use std::sync::Arc;

use dispatchdesk_application::{
    AuthorizationGuard, PermissionResolutionService, RoleAdminService, RouteRequirementTable,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub role_admin_service: RoleAdminService,
    pub permission_resolution_service: PermissionResolutionService,
    pub authorization_guard: AuthorizationGuard,
    pub route_requirements: Arc<RouteRequirementTable>,
}
