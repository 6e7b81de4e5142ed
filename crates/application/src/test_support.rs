use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dispatchdesk_core::AppResult;
use dispatchdesk_domain::{PermissionSet, RoleSlug};
use tokio::sync::Mutex;

use crate::security_ports::{
    AuditEvent, AuditRepository, PermissionCache, PermissionLookupRepository, RoleReference,
    UserRoleAssignment,
};
use crate::PermissionResolutionService;

#[derive(Default)]
pub(crate) struct FakePermissionLookupRepository {
    pub(crate) users: Mutex<HashMap<String, UserRoleAssignment>>,
    pub(crate) grants: Mutex<HashMap<String, Vec<String>>>,
    pub(crate) user_reads: Mutex<usize>,
}

impl FakePermissionLookupRepository {
    pub(crate) async fn add_legacy_user(&self, user_id: &str, legacy_role: &str) {
        self.users.lock().await.insert(
            user_id.to_owned(),
            UserRoleAssignment {
                legacy_role: legacy_role.to_owned(),
                role_id: None,
                role: None,
            },
        );
    }

    pub(crate) async fn add_granular_user(
        &self,
        user_id: &str,
        legacy_role: &str,
        role_id: &str,
        slug: &str,
    ) {
        self.users.lock().await.insert(
            user_id.to_owned(),
            UserRoleAssignment {
                legacy_role: legacy_role.to_owned(),
                role_id: Some(role_id.to_owned()),
                role: Some(RoleReference {
                    role_id: role_id.to_owned(),
                    slug: RoleSlug::from_stored(slug),
                    is_system: false,
                }),
            },
        );
    }

    pub(crate) async fn grant(&self, role_id: &str, keys: &[&str]) {
        self.grants.lock().await.insert(
            role_id.to_owned(),
            keys.iter().map(|key| (*key).to_owned()).collect(),
        );
    }

    pub(crate) async fn user_reads(&self) -> usize {
        *self.user_reads.lock().await
    }
}

#[async_trait]
impl PermissionLookupRepository for FakePermissionLookupRepository {
    async fn find_user_role_assignment(
        &self,
        user_id: &str,
    ) -> AppResult<Option<UserRoleAssignment>> {
        *self.user_reads.lock().await += 1;
        Ok(self.users.lock().await.get(user_id).cloned())
    }

    async fn list_role_permission_keys(&self, role_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .grants
            .lock()
            .await
            .get(role_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub(crate) struct FakePermissionCache {
    pub(crate) entries: Mutex<HashMap<String, PermissionSet>>,
    pub(crate) clear_count: Mutex<usize>,
}

#[async_trait]
impl PermissionCache for FakePermissionCache {
    async fn get_permissions(&self, user_id: &str) -> AppResult<Option<PermissionSet>> {
        Ok(self.entries.lock().await.get(user_id).cloned())
    }

    async fn set_permissions(&self, user_id: &str, permissions: PermissionSet) -> AppResult<()> {
        self.entries
            .lock()
            .await
            .insert(user_id.to_owned(), permissions);
        Ok(())
    }

    async fn invalidate_user(&self, user_id: &str) -> AppResult<()> {
        self.entries.lock().await.remove(user_id);
        Ok(())
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        self.entries.lock().await.clear();
        *self.clear_count.lock().await += 1;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub(crate) events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

pub(crate) fn resolution_service(
    repository: Arc<FakePermissionLookupRepository>,
    cache: Arc<FakePermissionCache>,
) -> PermissionResolutionService {
    PermissionResolutionService::new(repository, cache)
}
