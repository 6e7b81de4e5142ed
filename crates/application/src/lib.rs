//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_guard;
mod permission_resolution_service;
mod role_admin_service;
mod security_ports;

pub use authorization_guard::{
    AccessDecision, AuthorizationGuard, RouteRequirementTable, RouteRequirements,
};
pub use permission_resolution_service::PermissionResolutionService;
pub use role_admin_service::RoleAdminService;
pub use security_ports::{
    AssignUserRoleInput, AuditEvent, AuditRepository, Clock, CreateRoleInput,
    PERMISSION_CACHE_TTL_SECONDS, PermissionCache, PermissionLookupRepository, RoleAdminRepository,
    RoleDefinition, RoleReference, SystemClock, UpdateRoleInput, UserRoleAssignment,
    UserRoleRecord,
};

#[cfg(test)]
mod test_support;
