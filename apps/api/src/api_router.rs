use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use dispatchdesk_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;
mod requirements;

pub use requirements::route_requirement_table;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(frontend_url)?;

    Ok(routes(app_state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}

fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(api_routes(app_state))
}

fn api_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/me/permissions",
            get(handlers::me::my_permissions_handler),
        )
        .route(
            "/api/security/permission-catalog",
            get(handlers::security::permission_catalog_handler),
        )
        .route(
            "/api/security/roles",
            get(handlers::security::list_roles_handler)
                .post(handlers::security::create_role_handler),
        )
        .route(
            "/api/security/roles/{role_id}",
            get(handlers::security::get_role_handler)
                .put(handlers::security::update_role_handler)
                .delete(handlers::security::delete_role_handler),
        )
        .route(
            "/api/security/roles/{role_id}/permissions",
            put(handlers::security::set_role_permissions_handler),
        )
        .route(
            "/api/security/users/{user_id}/role",
            put(handlers::security::update_user_role_handler),
        )
        .route(
            "/api/security/permission-cache/invalidate",
            post(handlers::security::invalidate_permission_cache_handler),
        )
        .route_layer(from_fn_with_state(app_state, middleware::authorize_route))
        .route_layer(from_fn(middleware::attach_identity))
}
