use axum::Json;
use axum::extract::{Extension, State};
use dispatchdesk_core::{AppError, UserIdentity};

use crate::dto::MyPermissionsResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Lists the caller's effective permission keys so clients can hide
/// controls the caller cannot use.
pub async fn my_permissions_handler(
    State(state): State<AppState>,
    user: Option<Extension<UserIdentity>>,
) -> ApiResult<Json<MyPermissionsResponse>> {
    let Some(Extension(user)) = user else {
        return Err(AppError::Unauthorized("authentication required".to_owned()).into());
    };

    let permissions = state
        .permission_resolution_service
        .effective_permissions(user.user_id())
        .await?;

    Ok(Json(MyPermissionsResponse {
        user_id: user.user_id().to_owned(),
        permissions: permissions.into_sorted_vec(),
    }))
}
