use std::sync::Arc;

use dispatchdesk_application::PermissionCache;
use dispatchdesk_core::{AppError, AppResult};
use dispatchdesk_infrastructure::{InMemoryPermissionCache, RedisPermissionCache};

use crate::api_config::{ApiConfig, PermissionCacheBackend};

pub(super) fn build_permission_cache(
    config: &ApiConfig,
    redis_client: Option<redis::Client>,
) -> AppResult<Arc<dyn PermissionCache>> {
    match config.permission_cache_backend {
        PermissionCacheBackend::InMemory => Ok(Arc::new(InMemoryPermissionCache::new())),
        PermissionCacheBackend::Redis => {
            let redis_client = redis_client.ok_or_else(|| {
                AppError::Validation(
                    "REDIS_URL is required when PERMISSION_CACHE_BACKEND=redis".to_owned(),
                )
            })?;
            Ok(Arc::new(RedisPermissionCache::new(
                redis_client,
                "dispatchdesk:permissions",
            )))
        }
    }
}
