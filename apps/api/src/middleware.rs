use axum::extract::{MatchedPath, Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use dispatchdesk_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::warn;

use crate::error::ApiResult;
use crate::state::AppState;

/// Session key under which the upstream login flow stores the identity.
pub const SESSION_USER_KEY: &str = "user_identity";

/// Attaches the session identity, when present, as a request extension.
pub async fn attach_identity(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;

    if let Some(identity) = identity {
        request.extensions_mut().insert(identity);
    }

    Ok(next.run(request).await)
}

/// Applies the declared requirements of the matched operation.
pub async fn authorize_route(
    State(state): State<AppState>,
    matched_path: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let path = matched_path
        .as_ref()
        .map(MatchedPath::as_str)
        .unwrap_or_else(|| request.uri().path());
    let operation = operation_key(request.method(), path);
    let identity = request.extensions().get::<UserIdentity>().cloned();

    authorize_operation(&state, identity.as_ref(), operation.as_str()).await?;

    Ok(next.run(request).await)
}

pub(crate) fn operation_key(method: &Method, path: &str) -> String {
    format!("{} {path}", method.as_str())
}

pub(crate) async fn authorize_operation(
    state: &AppState,
    identity: Option<&UserIdentity>,
    operation: &str,
) -> ApiResult<()> {
    let requirements = state.route_requirements.requirements_for(operation);
    let decision = state
        .authorization_guard
        .authorize(identity, requirements)
        .await?;

    if !decision.is_allowed() {
        warn!(
            user_id = identity.map(UserIdentity::user_id),
            operation, "request denied by authorization guard"
        );
        return Err(AppError::Forbidden("forbidden".to_owned()).into());
    }

    Ok(())
}
