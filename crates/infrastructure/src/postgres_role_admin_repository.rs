use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use dispatchdesk_application::{RoleAdminRepository, RoleDefinition, UserRoleRecord};
use dispatchdesk_core::{AppError, AppResult};
use dispatchdesk_domain::{LegacyRole, RoleSlug};

mod roles;
mod users;


/// PostgreSQL-backed repository for granular role administration.
#[derive(Clone)]
pub struct PostgresRoleAdminRepository {
    pool: PgPool,
}

impl PostgresRoleAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'_, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role_id: uuid::Uuid,
    role_slug: String,
    role_name: String,
    is_system: bool,
    permission_key: Option<String>,
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    user_id: String,
    legacy_role: String,
    role_id: Option<uuid::Uuid>,
}

#[async_trait]
impl RoleAdminRepository for PostgresRoleAdminRepository {
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        self.list_roles_impl().await
    }

    async fn find_role(&self, role_id: &str) -> AppResult<Option<RoleDefinition>> {
        self.find_role_impl(role_id).await
    }

    async fn create_role(
        &self,
        name: &str,
        slug: &RoleSlug,
        permissions: &[String],
    ) -> AppResult<RoleDefinition> {
        self.create_role_impl(name, slug, permissions).await
    }

    async fn update_role(
        &self,
        role_id: &str,
        rename: Option<(&str, &RoleSlug)>,
        permissions: Option<&[String]>,
    ) -> AppResult<RoleDefinition> {
        self.update_role_impl(role_id, rename, permissions).await
    }

    async fn delete_role(&self, role_id: &str) -> AppResult<()> {
        self.delete_role_impl(role_id).await
    }

    async fn replace_role_permissions(
        &self,
        role_id: &str,
        permissions: &[String],
    ) -> AppResult<RoleDefinition> {
        self.replace_role_permissions_impl(role_id, permissions)
            .await
    }

    async fn count_users_with_role(&self, role_id: &str) -> AppResult<u64> {
        self.count_users_with_role_impl(role_id).await
    }

    async fn update_user_role(
        &self,
        user_id: &str,
        legacy_role: Option<LegacyRole>,
        role_id: Option<&str>,
    ) -> AppResult<UserRoleRecord> {
        self.update_user_role_impl(user_id, legacy_role, role_id)
            .await
    }
}

fn aggregate_roles(rows: Vec<RoleRow>) -> Vec<RoleDefinition> {
    let mut by_id: BTreeMap<uuid::Uuid, RoleDefinition> = BTreeMap::new();

    for row in rows {
        let role = by_id.entry(row.role_id).or_insert_with(|| RoleDefinition {
            role_id: row.role_id.to_string(),
            slug: row.role_slug.clone(),
            name: row.role_name.clone(),
            is_system: row.is_system,
            permissions: Vec::new(),
        });

        if let Some(permission_key) = row.permission_key {
            role.permissions.push(permission_key);
        }
    }

    let mut roles = by_id.into_values().collect::<Vec<_>>();
    for role in &mut roles {
        role.permissions.sort();
    }
    roles.sort_by(|left, right| left.name.cmp(&right.name));
    roles
}

fn parse_role_id(role_id: &str) -> Option<uuid::Uuid> {
    uuid::Uuid::parse_str(role_id).ok()
}

fn role_not_found(role_id: &str) -> AppError {
    AppError::NotFound(format!("role '{role_id}' does not exist"))
}

fn map_role_conflict(error: sqlx::Error, slug: &RoleSlug) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("role '{}' already exists", slug.as_str()));
    }

    AppError::Internal(format!("failed to persist role: {error}"))
}

async fn insert_role_permissions(
    transaction: &mut Transaction<'_, Postgres>,
    role_id: uuid::Uuid,
    permissions: &[String],
) -> AppResult<()> {
    for permission_key in permissions {
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_key)
            VALUES ($1, $2)
            ON CONFLICT (role_id, permission_key) DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(permission_key.as_str())
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist role grants: {error}")))?;
    }

    Ok(())
}
