//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod permission;
mod role;
mod security;

pub use permission::{
    PermissionEntry, PermissionRegistry, PermissionSet, ancestor_keys, parent_key,
};
pub use role::{ADMIN_ROLE_SLUG, LegacyRole, RoleSlug};
pub use security::AuditAction;
