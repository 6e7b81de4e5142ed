//! Redis-backed permission cache shared across API instances.

use async_trait::async_trait;
use dispatchdesk_application::{PERMISSION_CACHE_TTL_SECONDS, PermissionCache};
use dispatchdesk_core::{AppError, AppResult};
use dispatchdesk_domain::PermissionSet;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

/// Redis implementation of the permission cache port.
///
/// Entries are keyed by a generation counter so that a global invalidation
/// is a single `INCR` instead of a key scan. Orphaned entries from older
/// generations expire on their own TTL.
#[derive(Clone)]
pub struct RedisPermissionCache {
    client: redis::Client,
    key_prefix: String,
    ttl_seconds: u32,
}

impl RedisPermissionCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
            ttl_seconds: PERMISSION_CACHE_TTL_SECONDS,
        }
    }

    fn generation_key(&self) -> String {
        format!("{}:generation", self.key_prefix)
    }

    fn entry_key(&self, generation: u64, user_id: &str) -> String {
        format!("{}:gen={generation}:user={user_id}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }

    async fn current_generation(&self, connection: &mut MultiplexedConnection) -> AppResult<u64> {
        let generation: Option<u64> =
            connection
                .get(self.generation_key())
                .await
                .map_err(|error| {
                    AppError::Internal(format!(
                        "failed to read permission cache generation: {error}"
                    ))
                })?;

        Ok(generation.unwrap_or(0))
    }

    fn encode_permissions(permissions: &PermissionSet) -> AppResult<String> {
        serde_json::to_string(permissions).map_err(|error| {
            AppError::Internal(format!("failed to encode permission cache entry: {error}"))
        })
    }

    fn decode_permissions(value: &str) -> AppResult<PermissionSet> {
        serde_json::from_str(value).map_err(|error| {
            AppError::Internal(format!(
                "invalid permission cache entry '{value}': {error}"
            ))
        })
    }
}

#[async_trait]
impl PermissionCache for RedisPermissionCache {
    async fn get_permissions(&self, user_id: &str) -> AppResult<Option<PermissionSet>> {
        let mut connection = self.connection().await?;
        let generation = self.current_generation(&mut connection).await?;

        let encoded: Option<String> = connection
            .get(self.entry_key(generation, user_id))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to read permission cache entry: {error}"))
            })?;

        encoded.as_deref().map(Self::decode_permissions).transpose()
    }

    async fn set_permissions(&self, user_id: &str, permissions: PermissionSet) -> AppResult<()> {
        if self.ttl_seconds == 0 {
            return Ok(());
        }

        let value = Self::encode_permissions(&permissions)?;
        let mut connection = self.connection().await?;
        let generation = self.current_generation(&mut connection).await?;

        connection
            .set_ex(
                self.entry_key(generation, user_id),
                value,
                u64::from(self.ttl_seconds),
            )
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write permission cache entry: {error}"))
            })
    }

    async fn invalidate_user(&self, user_id: &str) -> AppResult<()> {
        let mut connection = self.connection().await?;
        let generation = self.current_generation(&mut connection).await?;

        connection
            .del(self.entry_key(generation, user_id))
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to delete permission cache entry: {error}"
                ))
            })
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        let mut connection = self.connection().await?;

        let generation: u64 = connection
            .incr(self.generation_key(), 1_u64)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to advance permission cache generation: {error}"
                ))
            })?;

        tracing::info!(generation, "advanced permission cache generation");
        Ok(())
    }
}
