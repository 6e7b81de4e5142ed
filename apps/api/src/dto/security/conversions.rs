use dispatchdesk_application::{RoleDefinition, UserRoleRecord};
use dispatchdesk_domain::PermissionEntry;

use super::{PermissionEntryResponse, RoleResponse, UserRoleResponse};

impl From<RoleDefinition> for RoleResponse {
    fn from(value: RoleDefinition) -> Self {
        Self {
            role_id: value.role_id,
            slug: value.slug,
            name: value.name,
            is_system: value.is_system,
            permissions: value.permissions,
        }
    }
}

impl From<UserRoleRecord> for UserRoleResponse {
    fn from(value: UserRoleRecord) -> Self {
        Self {
            user_id: value.user_id,
            legacy_role: value.legacy_role,
            role_id: value.role_id,
        }
    }
}

impl From<&PermissionEntry> for PermissionEntryResponse {
    fn from(value: &PermissionEntry) -> Self {
        Self {
            key: value.key().to_owned(),
            label: value.label().to_owned(),
            parent: value.parent().map(str::to_owned),
        }
    }
}
