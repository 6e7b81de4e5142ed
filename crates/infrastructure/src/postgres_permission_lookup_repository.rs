use async_trait::async_trait;

use dispatchdesk_application::{PermissionLookupRepository, RoleReference, UserRoleAssignment};
use dispatchdesk_core::{AppError, AppResult};
use dispatchdesk_domain::RoleSlug;

use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed repository for permission resolution reads.
#[derive(Clone)]
pub struct PostgresPermissionLookupRepository {
    pool: PgPool,
}

impl PostgresPermissionLookupRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    legacy_role: String,
    role_id: Option<uuid::Uuid>,
    role_slug: Option<String>,
    role_is_system: Option<bool>,
}

#[derive(Debug, FromRow)]
struct PermissionKeyRow {
    permission_key: String,
}

#[async_trait]
impl PermissionLookupRepository for PostgresPermissionLookupRepository {
    async fn find_user_role_assignment(
        &self,
        user_id: &str,
    ) -> AppResult<Option<UserRoleAssignment>> {
        let row = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT
                users.role AS legacy_role,
                users.role_id,
                roles.slug AS role_slug,
                roles.is_system AS role_is_system
            FROM users
            LEFT JOIN roles
                ON roles.id = users.role_id
            WHERE users.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load role assignment for user '{user_id}': {error}"
            ))
        })?;

        Ok(row.map(|row| {
            let role_id = row.role_id.map(|value| value.to_string());
            let role = match (role_id.as_ref(), row.role_slug) {
                (Some(role_id), Some(slug)) => Some(RoleReference {
                    role_id: role_id.clone(),
                    slug: RoleSlug::from_stored(slug),
                    is_system: row.role_is_system.unwrap_or(false),
                }),
                _ => None,
            };

            UserRoleAssignment {
                legacy_role: row.legacy_role,
                role_id,
                role,
            }
        }))
    }

    async fn list_role_permission_keys(&self, role_id: &str) -> AppResult<Vec<String>> {
        let Ok(role_uuid) = uuid::Uuid::parse_str(role_id) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, PermissionKeyRow>(
            r#"
            SELECT permission_key
            FROM role_permissions
            WHERE role_id = $1
            ORDER BY permission_key
            "#,
        )
        .bind(role_uuid)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load permissions for role '{role_id}': {error}"
            ))
        })?;

        Ok(rows.into_iter().map(|row| row.permission_key).collect())
    }
}
