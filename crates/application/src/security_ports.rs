mod audit;
mod authorization;
mod cache;
mod roles;

pub use audit::{AuditEvent, AuditRepository};
pub use authorization::{PermissionLookupRepository, RoleReference, UserRoleAssignment};
pub use cache::{Clock, PERMISSION_CACHE_TTL_SECONDS, PermissionCache, SystemClock};
pub use roles::{
    AssignUserRoleInput, CreateRoleInput, RoleAdminRepository, RoleDefinition, UpdateRoleInput,
    UserRoleRecord,
};
