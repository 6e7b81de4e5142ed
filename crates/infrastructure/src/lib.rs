//! Infrastructure adapters for the authorization core.

#![forbid(unsafe_code)]

mod in_memory_permission_cache;
mod in_memory_security_store;
mod postgres_audit_repository;
mod postgres_permission_lookup_repository;
mod postgres_role_admin_repository;
mod redis_permission_cache;

pub use in_memory_permission_cache::InMemoryPermissionCache;
pub use in_memory_security_store::InMemorySecurityStore;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_permission_lookup_repository::PostgresPermissionLookupRepository;
pub use postgres_role_admin_repository::PostgresRoleAdminRepository;
pub use redis_permission_cache::RedisPermissionCache;
