use super::*;

const ROLE_SELECT: &str = r#"
    SELECT
        roles.id AS role_id,
        roles.slug AS role_slug,
        roles.name AS role_name,
        roles.is_system,
        grants.permission_key
    FROM roles
    LEFT JOIN role_permissions AS grants
        ON grants.role_id = roles.id
"#;

impl PostgresRoleAdminRepository {
    pub(super) async fn list_roles_impl(&self) -> AppResult<Vec<RoleDefinition>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            "{ROLE_SELECT} ORDER BY roles.name, grants.permission_key"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        Ok(aggregate_roles(rows))
    }

    pub(super) async fn find_role_impl(&self, role_id: &str) -> AppResult<Option<RoleDefinition>> {
        let Some(role_uuid) = parse_role_id(role_id) else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            "{ROLE_SELECT} WHERE roles.id = $1 ORDER BY grants.permission_key"
        ))
        .bind(role_uuid)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role '{role_id}': {error}")))?;

        Ok(aggregate_roles(rows).into_iter().next())
    }

    pub(super) async fn create_role_impl(
        &self,
        name: &str,
        slug: &RoleSlug,
        permissions: &[String],
    ) -> AppResult<RoleDefinition> {
        let mut transaction = self.begin().await?;

        let role_id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            INSERT INTO roles (slug, name, is_system)
            VALUES ($1, $2, false)
            RETURNING id
            "#,
        )
        .bind(slug.as_str())
        .bind(name)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_role_conflict(error, slug))?;

        insert_role_permissions(&mut transaction, role_id, permissions).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        let mut permissions = permissions.to_vec();
        permissions.sort();
        permissions.dedup();

        Ok(RoleDefinition {
            role_id: role_id.to_string(),
            slug: slug.as_str().to_owned(),
            name: name.to_owned(),
            is_system: false,
            permissions,
        })
    }

    pub(super) async fn delete_role_impl(&self, role_id: &str) -> AppResult<()> {
        let role_uuid = parse_role_id(role_id).ok_or_else(|| role_not_found(role_id))?;

        let deleted = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(role_uuid)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                if let sqlx::Error::Database(database_error) = &error
                    && database_error.code().as_deref() == Some("23503")
                {
                    return AppError::Conflict(format!(
                        "role '{role_id}' is still assigned to users"
                    ));
                }

                AppError::Internal(format!("failed to delete role '{role_id}': {error}"))
            })?;

        if deleted.rows_affected() == 0 {
            return Err(role_not_found(role_id));
        }

        Ok(())
    }

    pub(super) async fn update_role_impl(
        &self,
        role_id: &str,
        rename: Option<(&str, &RoleSlug)>,
        permissions: Option<&[String]>,
    ) -> AppResult<RoleDefinition> {
        let role_uuid = parse_role_id(role_id).ok_or_else(|| role_not_found(role_id))?;
        let mut transaction = self.begin().await?;

        let touched = match rename {
            Some((name, slug)) => sqlx::query(
                r#"
                UPDATE roles
                SET name = $2, slug = $3, updated_at = now()
                WHERE id = $1
                "#,
            )
            .bind(role_uuid)
            .bind(name)
            .bind(slug.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_role_conflict(error, slug))?,
            None => sqlx::query("UPDATE roles SET updated_at = now() WHERE id = $1")
                .bind(role_uuid)
                .execute(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to touch role '{role_id}': {error}"))
                })?,
        };

        if touched.rows_affected() == 0 {
            return Err(role_not_found(role_id));
        }

        if let Some(permissions) = permissions {
            sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
                .bind(role_uuid)
                .execute(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!(
                        "failed to clear grants for role '{role_id}': {error}"
                    ))
                })?;

            insert_role_permissions(&mut transaction, role_uuid, permissions).await?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        self.find_role_impl(role_id)
            .await?
            .ok_or_else(|| role_not_found(role_id))
    }

    pub(super) async fn replace_role_permissions_impl(
        &self,
        role_id: &str,
        permissions: &[String],
    ) -> AppResult<RoleDefinition> {
        self.update_role_impl(role_id, None, Some(permissions)).await
    }
}
