use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod conversions;

/// Incoming payload for granular role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Incoming payload for granular role updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub permissions: Option<Vec<String>>,
}

/// Incoming payload replacing the grant set of a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/set-role-permissions-request.ts"
)]
pub struct SetRolePermissionsRequest {
    pub permissions: Vec<String>,
}

/// Incoming payload for changing a user's role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-user-role-request.ts"
)]
pub struct UpdateUserRoleRequest {
    pub legacy_role: Option<String>,
    pub role_id: Option<String>,
}

/// API representation of a granular role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub slug: String,
    pub name: String,
    pub is_system: bool,
    pub permissions: Vec<String>,
}

/// API representation of a user's role columns.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-role-response.ts"
)]
pub struct UserRoleResponse {
    pub user_id: String,
    pub legacy_role: String,
    pub role_id: Option<String>,
}

/// API representation of one permission catalog entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-entry-response.ts"
)]
pub struct PermissionEntryResponse {
    pub key: String,
    pub label: String,
    pub parent: Option<String>,
}
