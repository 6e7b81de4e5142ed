use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use dispatchdesk_application::{AssignUserRoleInput, CreateRoleInput, UpdateRoleInput};
use dispatchdesk_core::UserIdentity;
use dispatchdesk_domain::LegacyRole;

use crate::dto::{
    CreateRoleRequest, PermissionEntryResponse, RoleResponse, SetRolePermissionsRequest,
    UpdateRoleRequest, UpdateUserRoleRequest, UserRoleResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod cache;
mod catalog;
mod roles;
mod users;


pub use cache::invalidate_permission_cache_handler;
pub use catalog::permission_catalog_handler;
pub use roles::{
    create_role_handler, delete_role_handler, get_role_handler, list_roles_handler,
    set_role_permissions_handler, update_role_handler,
};
pub use users::update_user_role_handler;
