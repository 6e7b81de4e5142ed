use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .role_admin_service
        .list_roles()
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state.role_admin_service.get_role(role_id.as_str()).await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .role_admin_service
        .create_role(
            &user,
            CreateRoleInput {
                name: payload.name,
                permissions: payload.permissions,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_admin_service
        .update_role(
            &user,
            role_id.as_str(),
            UpdateRoleInput {
                name: payload.name,
                permissions: payload.permissions,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn set_role_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
    Json(payload): Json<SetRolePermissionsRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_admin_service
        .set_role_permissions(&user, role_id.as_str(), payload.permissions)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .role_admin_service
        .delete_role(&user, role_id.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
