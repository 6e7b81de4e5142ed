use super::*;

impl PostgresRoleAdminRepository {
    pub(super) async fn count_users_with_role_impl(&self, role_id: &str) -> AppResult<u64> {
        let Some(role_uuid) = parse_role_id(role_id) else {
            return Ok(0);
        };

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role_id = $1")
            .bind(role_uuid)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to count users with role '{role_id}': {error}"
                ))
            })?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    pub(super) async fn update_user_role_impl(
        &self,
        user_id: &str,
        legacy_role: Option<LegacyRole>,
        role_id: Option<&str>,
    ) -> AppResult<UserRoleRecord> {
        let role_uuid = match role_id {
            Some(role_id) => Some(parse_role_id(role_id).ok_or_else(|| role_not_found(role_id))?),
            None => None,
        };

        let row = sqlx::query_as::<_, UserRoleRow>(
            r#"
            UPDATE users
            SET
                role = COALESCE($2, role),
                role_id = $3,
                updated_at = now()
            WHERE id = $1
            RETURNING id AS user_id, role AS legacy_role, role_id
            "#,
        )
        .bind(user_id)
        .bind(legacy_role.map(|role| role.as_str()))
        .bind(role_uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23503")
            {
                return AppError::NotFound(format!(
                    "role '{}' does not exist",
                    role_id.unwrap_or_default()
                ));
            }

            AppError::Internal(format!(
                "failed to update role for user '{user_id}': {error}"
            ))
        })?
        .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        Ok(UserRoleRecord {
            user_id: row.user_id,
            legacy_role: row.legacy_role,
            role_id: row.role_id.map(|value| value.to_string()),
        })
    }
}
