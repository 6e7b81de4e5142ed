use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use dispatchdesk_application::{
    AuditEvent, AuditRepository, PermissionLookupRepository, RoleAdminRepository, RoleDefinition,
    RoleReference, UserRoleAssignment, UserRoleRecord,
};
use dispatchdesk_core::{AppError, AppResult};
use dispatchdesk_domain::{ADMIN_ROLE_SLUG, LegacyRole, RoleSlug};

#[derive(Debug, Clone)]
struct StoredRole {
    slug: RoleSlug,
    name: String,
    is_system: bool,
    permissions: BTreeSet<String>,
}

impl StoredRole {
    fn definition(&self, role_id: &str) -> RoleDefinition {
        RoleDefinition {
            role_id: role_id.to_owned(),
            slug: self.slug.as_str().to_owned(),
            name: self.name.clone(),
            is_system: self.is_system,
            permissions: self.permissions.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredUser {
    legacy_role: String,
    role_id: Option<String>,
}

#[derive(Debug, Default)]
struct SecurityState {
    roles: BTreeMap<String, StoredRole>,
    users: HashMap<String, StoredUser>,
    audit_events: Vec<AuditEvent>,
}

/// In-memory user, role, and audit store for local runs and tests.
///
/// Mirrors the relational constraints of the PostgreSQL schema: slugs are
/// unique, roles referenced by users cannot be deleted, and the system
/// `admin` role is seeded on construction.
pub struct InMemorySecurityStore {
    state: RwLock<SecurityState>,
    admin_role_id: String,
}

impl Default for InMemorySecurityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySecurityStore {
    /// Creates a store holding only the seeded system admin role.
    #[must_use]
    pub fn new() -> Self {
        let admin_role_id = uuid::Uuid::new_v4().to_string();
        let mut state = SecurityState::default();
        state.roles.insert(
            admin_role_id.clone(),
            StoredRole {
                slug: RoleSlug::from_stored(ADMIN_ROLE_SLUG),
                name: "Administrator".to_owned(),
                is_system: true,
                permissions: BTreeSet::new(),
            },
        );

        Self {
            state: RwLock::new(state),
            admin_role_id,
        }
    }

    /// Returns the identifier of the seeded system admin role.
    #[must_use]
    pub fn admin_role_id(&self) -> &str {
        self.admin_role_id.as_str()
    }

    /// Inserts or replaces a user with a legacy role and no granular role.
    pub async fn insert_user(&self, user_id: impl Into<String>, legacy_role: LegacyRole) {
        self.state.write().await.users.insert(
            user_id.into(),
            StoredUser {
                legacy_role: legacy_role.as_str().to_owned(),
                role_id: None,
            },
        );
    }

    /// Returns every audit event appended so far, oldest first.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.read().await.audit_events.clone()
    }
}

fn role_not_found(role_id: &str) -> AppError {
    AppError::NotFound(format!("role '{role_id}' does not exist"))
}

fn ensure_unique_slug(state: &SecurityState, slug: &RoleSlug, except: Option<&str>) -> AppResult<()> {
    let taken = state
        .roles
        .iter()
        .any(|(role_id, role)| Some(role_id.as_str()) != except && &role.slug == slug);

    if taken {
        return Err(AppError::Conflict(format!(
            "role '{}' already exists",
            slug.as_str()
        )));
    }

    Ok(())
}

#[async_trait]
impl PermissionLookupRepository for InMemorySecurityStore {
    async fn find_user_role_assignment(
        &self,
        user_id: &str,
    ) -> AppResult<Option<UserRoleAssignment>> {
        let state = self.state.read().await;

        Ok(state.users.get(user_id).map(|user| {
            let role = user.role_id.as_ref().and_then(|role_id| {
                state.roles.get(role_id).map(|role| RoleReference {
                    role_id: role_id.clone(),
                    slug: role.slug.clone(),
                    is_system: role.is_system,
                })
            });

            UserRoleAssignment {
                legacy_role: user.legacy_role.clone(),
                role_id: user.role_id.clone(),
                role,
            }
        }))
    }

    async fn list_role_permission_keys(&self, role_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .get(role_id)
            .map(|role| role.permissions.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl RoleAdminRepository for InMemorySecurityStore {
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        let state = self.state.read().await;
        let mut roles = state
            .roles
            .iter()
            .map(|(role_id, role)| role.definition(role_id))
            .collect::<Vec<_>>();
        roles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(roles)
    }

    async fn find_role(&self, role_id: &str) -> AppResult<Option<RoleDefinition>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .get(role_id)
            .map(|role| role.definition(role_id)))
    }

    async fn create_role(
        &self,
        name: &str,
        slug: &RoleSlug,
        permissions: &[String],
    ) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;
        ensure_unique_slug(&state, slug, None)?;

        let role_id = uuid::Uuid::new_v4().to_string();
        let role = StoredRole {
            slug: slug.clone(),
            name: name.to_owned(),
            is_system: false,
            permissions: permissions.iter().cloned().collect(),
        };
        let definition = role.definition(role_id.as_str());
        state.roles.insert(role_id, role);

        Ok(definition)
    }

    async fn update_role(
        &self,
        role_id: &str,
        rename: Option<(&str, &RoleSlug)>,
        permissions: Option<&[String]>,
    ) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;
        if let Some((_, slug)) = rename {
            ensure_unique_slug(&state, slug, Some(role_id))?;
        }

        let role = state
            .roles
            .get_mut(role_id)
            .ok_or_else(|| role_not_found(role_id))?;
        if let Some((name, slug)) = rename {
            role.name = name.to_owned();
            role.slug = slug.clone();
        }
        if let Some(permissions) = permissions {
            role.permissions = permissions.iter().cloned().collect();
        }

        Ok(role.definition(role_id))
    }

    async fn delete_role(&self, role_id: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|user| user.role_id.as_deref() == Some(role_id))
        {
            return Err(AppError::Conflict(format!(
                "role '{role_id}' is still assigned to users"
            )));
        }

        state
            .roles
            .remove(role_id)
            .map(|_| ())
            .ok_or_else(|| role_not_found(role_id))
    }

    async fn replace_role_permissions(
        &self,
        role_id: &str,
        permissions: &[String],
    ) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;
        let role = state
            .roles
            .get_mut(role_id)
            .ok_or_else(|| role_not_found(role_id))?;
        role.permissions = permissions.iter().cloned().collect();

        Ok(role.definition(role_id))
    }

    async fn count_users_with_role(&self, role_id: &str) -> AppResult<u64> {
        let count = self
            .state
            .read()
            .await
            .users
            .values()
            .filter(|user| user.role_id.as_deref() == Some(role_id))
            .count();

        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn update_user_role(
        &self,
        user_id: &str,
        legacy_role: Option<LegacyRole>,
        role_id: Option<&str>,
    ) -> AppResult<UserRoleRecord> {
        let mut state = self.state.write().await;
        if let Some(role_id) = role_id
            && !state.roles.contains_key(role_id)
        {
            return Err(role_not_found(role_id));
        }

        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        if let Some(legacy_role) = legacy_role {
            user.legacy_role = legacy_role.as_str().to_owned();
        }
        user.role_id = role_id.map(str::to_owned);

        Ok(UserRoleRecord {
            user_id: user_id.to_owned(),
            legacy_role: user.legacy_role.clone(),
            role_id: user.role_id.clone(),
        })
    }
}

#[async_trait]
impl AuditRepository for InMemorySecurityStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.write().await.audit_events.push(event);
        Ok(())
    }
}
