use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dispatchdesk_core::{AppError, AppResult, UserIdentity};
use dispatchdesk_domain::{AuditAction, LegacyRole, PermissionSet, RoleSlug};
use tokio::sync::Mutex;

use crate::security_ports::{
    AssignUserRoleInput, CreateRoleInput, RoleAdminRepository, RoleDefinition, UpdateRoleInput,
    UserRoleRecord,
};
use crate::test_support::{
    FakeAuditRepository, FakePermissionCache, FakePermissionLookupRepository, resolution_service,
};
use crate::PermissionCache;

use super::RoleAdminService;

#[derive(Default)]
struct FakeRoleAdminRepository {
    roles: Mutex<Vec<RoleDefinition>>,
    users: Mutex<HashMap<String, UserRoleRecord>>,
    fail_grant_writes: Mutex<bool>,
}

impl FakeRoleAdminRepository {
    async fn seed_role(&self, role_id: &str, slug: &str, is_system: bool) {
        self.roles.lock().await.push(RoleDefinition {
            role_id: role_id.to_owned(),
            slug: slug.to_owned(),
            name: slug.to_owned(),
            is_system,
            permissions: Vec::new(),
        });
    }

    async fn seed_user(&self, user_id: &str, role_id: Option<&str>) {
        self.users.lock().await.insert(
            user_id.to_owned(),
            UserRoleRecord {
                user_id: user_id.to_owned(),
                legacy_role: "VIEWER".to_owned(),
                role_id: role_id.map(str::to_owned),
            },
        );
    }
}

#[async_trait]
impl RoleAdminRepository for FakeRoleAdminRepository {
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        Ok(self.roles.lock().await.clone())
    }

    async fn find_role(&self, role_id: &str) -> AppResult<Option<RoleDefinition>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.role_id == role_id)
            .cloned())
    }

    async fn create_role(
        &self,
        name: &str,
        slug: &RoleSlug,
        permissions: &[String],
    ) -> AppResult<RoleDefinition> {
        let mut roles = self.roles.lock().await;
        if roles.iter().any(|role| role.slug == slug.as_str()) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                slug.as_str()
            )));
        }

        let role = RoleDefinition {
            role_id: format!("r-{}", roles.len() + 1),
            slug: slug.as_str().to_owned(),
            name: name.to_owned(),
            is_system: false,
            permissions: permissions.to_vec(),
        };
        roles.push(role.clone());
        Ok(role)
    }

    async fn update_role(
        &self,
        role_id: &str,
        rename: Option<(&str, &RoleSlug)>,
        permissions: Option<&[String]>,
    ) -> AppResult<RoleDefinition> {
        let mut roles = self.roles.lock().await;
        if let Some((_, slug)) = rename
            && roles
                .iter()
                .any(|role| role.slug == slug.as_str() && role.role_id != role_id)
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                slug.as_str()
            )));
        }
        if permissions.is_some() && *self.fail_grant_writes.lock().await {
            return Err(AppError::Internal("grant write failed".to_owned()));
        }

        let role = roles
            .iter_mut()
            .find(|role| role.role_id == role_id)
            .ok_or_else(|| AppError::NotFound(role_id.to_owned()))?;
        if let Some((name, slug)) = rename {
            role.name = name.to_owned();
            role.slug = slug.as_str().to_owned();
        }
        if let Some(permissions) = permissions {
            role.permissions = permissions.to_vec();
        }
        Ok(role.clone())
    }

    async fn delete_role(&self, role_id: &str) -> AppResult<()> {
        self.roles
            .lock()
            .await
            .retain(|role| role.role_id != role_id);
        Ok(())
    }

    async fn replace_role_permissions(
        &self,
        role_id: &str,
        permissions: &[String],
    ) -> AppResult<RoleDefinition> {
        let mut roles = self.roles.lock().await;
        let role = roles
            .iter_mut()
            .find(|role| role.role_id == role_id)
            .ok_or_else(|| AppError::NotFound(role_id.to_owned()))?;
        role.permissions = permissions.to_vec();
        Ok(role.clone())
    }

    async fn count_users_with_role(&self, role_id: &str) -> AppResult<u64> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .filter(|user| user.role_id.as_deref() == Some(role_id))
            .count() as u64)
    }

    async fn update_user_role(
        &self,
        user_id: &str,
        legacy_role: Option<LegacyRole>,
        role_id: Option<&str>,
    ) -> AppResult<UserRoleRecord> {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;
        if let Some(legacy_role) = legacy_role {
            user.legacy_role = legacy_role.as_str().to_owned();
        }
        user.role_id = role_id.map(str::to_owned);
        Ok(user.clone())
    }
}

struct Harness {
    service: RoleAdminService,
    repository: Arc<FakeRoleAdminRepository>,
    cache: Arc<FakePermissionCache>,
    audit_repository: Arc<FakeAuditRepository>,
}

fn harness() -> Harness {
    let repository = Arc::new(FakeRoleAdminRepository::default());
    let cache = Arc::new(FakePermissionCache::default());
    let audit_repository = Arc::new(FakeAuditRepository::default());
    let service = RoleAdminService::new(
        resolution_service(
            Arc::new(FakePermissionLookupRepository::default()),
            cache.clone(),
        ),
        repository.clone(),
        audit_repository.clone(),
    );

    Harness {
        service,
        repository,
        cache,
        audit_repository,
    }
}

fn actor() -> UserIdentity {
    UserIdentity::new("u-admin", "ADMIN", None)
}

#[tokio::test]
async fn create_role_derives_slug_and_audits() {
    let harness = harness();

    let role = harness
        .service
        .create_role(
            &actor(),
            CreateRoleInput {
                name: "Night Dispatch".to_owned(),
                permissions: vec!["dispatch".to_owned(), "dispatch.dayView".to_owned()],
            },
        )
        .await;

    assert_eq!(
        role.as_ref().map(|role| role.slug.as_str()).ok(),
        Some("night-dispatch")
    );
    let events = harness.audit_repository.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::SecurityRoleCreated);
}

#[tokio::test]
async fn create_role_rejects_unknown_permission_key() {
    let harness = harness();

    let result = harness
        .service
        .create_role(
            &actor(),
            CreateRoleInput {
                name: "Ops".to_owned(),
                permissions: vec!["dispatch.teleport".to_owned()],
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(harness.repository.roles.lock().await.is_empty());
}

#[tokio::test]
async fn create_role_rejects_blank_name() {
    let harness = harness();

    let result = harness
        .service
        .create_role(
            &actor(),
            CreateRoleInput {
                name: "   ".to_owned(),
                permissions: Vec::new(),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn set_role_permissions_replaces_grants_and_clears_cache() {
    let harness = harness();
    harness.repository.seed_role("r-1", "reporting", false).await;
    assert!(
        harness
            .cache
            .set_permissions("u-9", PermissionSet::from_keys(["reports"]))
            .await
            .is_ok()
    );

    let role = harness
        .service
        .set_role_permissions(
            &actor(),
            "r-1",
            vec![
                "invoices".to_owned(),
                "invoices.export".to_owned(),
                "invoices".to_owned(),
            ],
        )
        .await;

    assert_eq!(
        role.map(|role| role.permissions).ok(),
        Some(vec!["invoices".to_owned(), "invoices.export".to_owned()])
    );
    assert!(harness.cache.entries.lock().await.is_empty());
    assert_eq!(*harness.cache.clear_count.lock().await, 1);
}

#[tokio::test]
async fn set_role_permissions_on_missing_role_is_not_found() {
    let harness = harness();

    let result = harness
        .service
        .set_role_permissions(&actor(), "r-404", vec!["reports".to_owned()])
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn system_role_cannot_be_renamed() {
    let harness = harness();
    harness.repository.seed_role("r-admin", "admin", true).await;

    let result = harness
        .service
        .update_role(
            &actor(),
            "r-admin",
            UpdateRoleInput {
                name: Some("Superuser".to_owned()),
                permissions: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn update_role_renames_and_replaces_grants() {
    let harness = harness();
    harness.repository.seed_role("r-1", "ops", false).await;

    let role = harness
        .service
        .update_role(
            &actor(),
            "r-1",
            UpdateRoleInput {
                name: Some("Ops Leads".to_owned()),
                permissions: Some(vec!["drivers".to_owned()]),
            },
        )
        .await;

    let role = role.unwrap_or_else(|error| panic!("update should succeed: {error}"));
    assert_eq!(role.slug, "ops-leads");
    assert_eq!(role.permissions, vec!["drivers".to_owned()]);
}

#[tokio::test]
async fn failed_grant_write_keeps_the_old_name() {
    let harness = harness();
    harness.repository.seed_role("r-1", "ops", false).await;
    *harness.repository.fail_grant_writes.lock().await = true;

    let result = harness
        .service
        .update_role(
            &actor(),
            "r-1",
            UpdateRoleInput {
                name: Some("Ops Leads".to_owned()),
                permissions: Some(vec!["drivers".to_owned()]),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    let stored = harness.repository.find_role("r-1").await;
    assert!(matches!(
        stored,
        Ok(Some(role)) if role.slug == "ops" && role.permissions.is_empty()
    ));
    assert_eq!(*harness.cache.clear_count.lock().await, 0);
    assert!(harness.audit_repository.events.lock().await.is_empty());
}

#[tokio::test]
async fn rename_onto_existing_slug_changes_nothing() {
    let harness = harness();
    harness.repository.seed_role("r-1", "ops", false).await;
    harness.repository.seed_role("r-2", "fleet", false).await;

    let result = harness
        .service
        .update_role(
            &actor(),
            "r-1",
            UpdateRoleInput {
                name: Some("Fleet".to_owned()),
                permissions: Some(vec!["drivers".to_owned()]),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    let stored = harness.repository.find_role("r-1").await;
    assert!(matches!(
        stored,
        Ok(Some(role)) if role.slug == "ops" && role.permissions.is_empty()
    ));
    assert!(harness.audit_repository.events.lock().await.is_empty());
}

#[tokio::test]
async fn system_role_cannot_be_deleted() {
    let harness = harness();
    harness.repository.seed_role("r-admin", "admin", true).await;

    let result = harness.service.delete_role(&actor(), "r-admin").await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn assigned_role_cannot_be_deleted() {
    let harness = harness();
    harness.repository.seed_role("r-1", "ops", false).await;
    harness.repository.seed_user("u-1", Some("r-1")).await;

    let result = harness.service.delete_role(&actor(), "r-1").await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn delete_unused_role_clears_cache() {
    let harness = harness();
    harness.repository.seed_role("r-1", "ops", false).await;

    let result = harness.service.delete_role(&actor(), "r-1").await;

    assert!(result.is_ok());
    assert!(harness.repository.roles.lock().await.is_empty());
    assert_eq!(*harness.cache.clear_count.lock().await, 1);
}

#[tokio::test]
async fn update_user_role_invalidates_only_that_user() {
    let harness = harness();
    harness.repository.seed_role("r-1", "ops", false).await;
    harness.repository.seed_user("u-1", None).await;
    for user_id in ["u-1", "u-2"] {
        assert!(
            harness
                .cache
                .set_permissions(user_id, PermissionSet::empty())
                .await
                .is_ok()
        );
    }

    let record = harness
        .service
        .update_user_role(
            &actor(),
            "u-1",
            AssignUserRoleInput {
                legacy_role: Some(LegacyRole::Dispatcher),
                role_id: Some("r-1".to_owned()),
            },
        )
        .await;

    assert_eq!(
        record.ok(),
        Some(UserRoleRecord {
            user_id: "u-1".to_owned(),
            legacy_role: "DISPATCHER".to_owned(),
            role_id: Some("r-1".to_owned()),
        })
    );
    let entries = harness.cache.entries.lock().await;
    assert!(!entries.contains_key("u-1"));
    assert!(entries.contains_key("u-2"));
}

#[tokio::test]
async fn update_user_role_rejects_unknown_role() {
    let harness = harness();
    harness.repository.seed_user("u-1", None).await;

    let result = harness
        .service
        .update_user_role(
            &actor(),
            "u-1",
            AssignUserRoleInput {
                legacy_role: None,
                role_id: Some("r-missing".to_owned()),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn clear_permission_cache_is_audited() {
    let harness = harness();

    assert!(harness.service.clear_permission_cache(&actor()).await.is_ok());

    assert_eq!(*harness.cache.clear_count.lock().await, 1);
    assert_eq!(
        harness.audit_repository.events.lock().await[0].action,
        AuditAction::SecurityPermissionCacheCleared
    );
}
