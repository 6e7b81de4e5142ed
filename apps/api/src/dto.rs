use serde::Serialize;
use ts_rs::TS;

mod security;

pub use security::{
    CreateRoleRequest, PermissionEntryResponse, RoleResponse, SetRolePermissionsRequest,
    UpdateRoleRequest, UpdateUserRoleRequest, UserRoleResponse,
};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Effective permissions of the authenticated caller.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/my-permissions-response.ts"
)]
pub struct MyPermissionsResponse {
    pub user_id: String,
    pub permissions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::{
        CreateRoleRequest, HealthResponse, MyPermissionsResponse, PermissionEntryResponse,
        RoleResponse, SetRolePermissionsRequest, UpdateRoleRequest, UpdateUserRoleRequest,
        UserRoleResponse,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        CreateRoleRequest::export(&config)?;
        UpdateRoleRequest::export(&config)?;
        SetRolePermissionsRequest::export(&config)?;
        UpdateUserRoleRequest::export(&config)?;
        RoleResponse::export(&config)?;
        UserRoleResponse::export(&config)?;
        PermissionEntryResponse::export(&config)?;
        MyPermissionsResponse::export(&config)?;
        ErrorResponse::export(&config)?;
        HealthResponse::export(&config)?;

        Ok(())
    }
}
