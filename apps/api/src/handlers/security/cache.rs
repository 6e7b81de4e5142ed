use super::*;

pub async fn invalidate_permission_cache_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<StatusCode> {
    state.role_admin_service.clear_permission_cache(&user).await?;

    Ok(StatusCode::NO_CONTENT)
}
