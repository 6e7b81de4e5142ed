use super::*;

pub async fn permission_catalog_handler(
    State(state): State<AppState>,
) -> Json<Vec<PermissionEntryResponse>> {
    Json(
        state
            .role_admin_service
            .registry()
            .entries()
            .iter()
            .map(PermissionEntryResponse::from)
            .collect(),
    )
}
