use super::*;

pub async fn update_user_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRoleRequest>,
) -> ApiResult<Json<UserRoleResponse>> {
    let legacy_role = payload
        .legacy_role
        .as_deref()
        .map(LegacyRole::from_str)
        .transpose()?;

    let record = state
        .role_admin_service
        .update_user_role(
            &user,
            user_id.as_str(),
            AssignUserRoleInput {
                legacy_role,
                role_id: payload.role_id,
            },
        )
        .await?;

    Ok(Json(UserRoleResponse::from(record)))
}
