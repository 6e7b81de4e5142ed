use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dispatchdesk_core::AppResult;
use dispatchdesk_domain::PermissionSet;

/// Lifetime of a cached permission set.
pub const PERMISSION_CACHE_TTL_SECONDS: u32 = 60;

/// Cache port for resolved permission sets keyed by user id.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Returns the live cached set for a user, if any.
    async fn get_permissions(&self, user_id: &str) -> AppResult<Option<PermissionSet>>;

    /// Stores a freshly resolved set with a new expiry.
    async fn set_permissions(&self, user_id: &str, permissions: PermissionSet) -> AppResult<()>;

    /// Drops the cached set for one user.
    async fn invalidate_user(&self, user_id: &str) -> AppResult<()>;

    /// Drops every cached set.
    async fn invalidate_all(&self) -> AppResult<()>;
}

/// Time source for expiry bookkeeping.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
