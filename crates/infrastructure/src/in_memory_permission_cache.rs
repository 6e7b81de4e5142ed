use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dispatchdesk_application::{Clock, PERMISSION_CACHE_TTL_SECONDS, PermissionCache, SystemClock};
use dispatchdesk_core::AppResult;
use dispatchdesk_domain::PermissionSet;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct PermissionCacheEntry {
    permissions: PermissionSet,
    expires_at: DateTime<Utc>,
}

/// Process-local permission cache with a fixed time-to-live per entry.
pub struct InMemoryPermissionCache {
    entries: RwLock<HashMap<String, PermissionCacheEntry>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl Default for InMemoryPermissionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPermissionCache {
    /// Creates an empty cache using the wall clock and the standard lifetime.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache driven by the provided clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, PERMISSION_CACHE_TTL_SECONDS)
    }

    /// Creates an empty cache with a custom entry lifetime.
    #[must_use]
    pub fn with_ttl(clock: Arc<dyn Clock>, ttl_seconds: u32) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            ttl: Duration::seconds(i64::from(ttl_seconds)),
        }
    }
}

#[async_trait]
impl PermissionCache for InMemoryPermissionCache {
    async fn get_permissions(&self, user_id: &str) -> AppResult<Option<PermissionSet>> {
        let now = self.clock.now();

        {
            let entries = self.entries.read().await;
            match entries.get(user_id) {
                Some(entry) if entry.expires_at > now => {
                    return Ok(Some(entry.permissions.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(user_id)
            .is_some_and(|entry| entry.expires_at <= now)
        {
            entries.remove(user_id);
            tracing::debug!(user_id, "evicted expired permission cache entry");
        }

        Ok(None)
    }

    async fn set_permissions(&self, user_id: &str, permissions: PermissionSet) -> AppResult<()> {
        if self.ttl <= Duration::zero() {
            return Ok(());
        }

        let expires_at = self.clock.now() + self.ttl;
        self.entries.write().await.insert(
            user_id.to_owned(),
            PermissionCacheEntry {
                permissions,
                expires_at,
            },
        );

        Ok(())
    }

    async fn invalidate_user(&self, user_id: &str) -> AppResult<()> {
        self.entries.write().await.remove(user_id);
        Ok(())
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}
