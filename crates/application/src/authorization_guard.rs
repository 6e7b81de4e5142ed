use dispatchdesk_core::{AppResult, UserIdentity};
use tracing::{debug, warn};

use crate::PermissionResolutionService;

mod requirements;

pub use requirements::{RouteRequirementTable, RouteRequirements};

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The request may proceed.
    Allow,
    /// The request must be rejected with a generic forbidden response.
    Deny,
}

impl AccessDecision {
    /// Returns whether the request may proceed.
    #[must_use]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Two-stage request guard combining legacy roles and granular permissions.
///
/// Stage one checks declared legacy roles, deferring entirely to stage two
/// for callers that carry a granular role. Stage two checks declared
/// permission keys against the caller's effective set under the
/// hierarchical grant rule.
#[derive(Clone)]
pub struct AuthorizationGuard {
    permission_resolution_service: PermissionResolutionService,
}

impl AuthorizationGuard {
    /// Creates a guard resolving permissions through the given service.
    #[must_use]
    pub fn new(permission_resolution_service: PermissionResolutionService) -> Self {
        Self {
            permission_resolution_service,
        }
    }

    /// Decides whether a caller may invoke an operation.
    ///
    /// Only data store failures surface as errors; every authorization
    /// failure is a [`AccessDecision::Deny`].
    pub async fn authorize(
        &self,
        identity: Option<&UserIdentity>,
        requirements: &RouteRequirements,
    ) -> AppResult<AccessDecision> {
        if requirements.is_empty() {
            return Ok(AccessDecision::Allow);
        }

        let Some(identity) = identity else {
            debug!("anonymous caller denied on guarded operation");
            return Ok(AccessDecision::Deny);
        };

        if Self::legacy_role_pre_guard(identity, requirements) == AccessDecision::Deny {
            warn!(
                user_id = identity.user_id(),
                role = identity.role(),
                "legacy role requirement not met"
            );
            return Ok(AccessDecision::Deny);
        }

        self.permission_stage(identity, requirements).await
    }

    /// Evaluates the declared legacy roles.
    ///
    /// Callers with any granular role pass unconditionally so that stale role
    /// declarations never block them; the permission stage decides instead.
    #[must_use]
    pub fn legacy_role_pre_guard(
        identity: &UserIdentity,
        requirements: &RouteRequirements,
    ) -> AccessDecision {
        let required_roles = requirements.required_roles();
        if required_roles.is_empty() {
            return AccessDecision::Allow;
        }

        if identity.has_granular_role() {
            debug!(
                user_id = identity.user_id(),
                role_id = identity.role_id(),
                "granular role defers legacy role check"
            );
            return AccessDecision::Allow;
        }

        let caller_role = identity.role().trim();
        if required_roles
            .iter()
            .any(|role| role.eq_ignore_ascii_case(caller_role))
        {
            AccessDecision::Allow
        } else {
            AccessDecision::Deny
        }
    }

    async fn permission_stage(
        &self,
        identity: &UserIdentity,
        requirements: &RouteRequirements,
    ) -> AppResult<AccessDecision> {
        let required_permissions = requirements.required_permissions();
        if required_permissions.is_empty() {
            return Ok(AccessDecision::Allow);
        }

        let permissions = self
            .permission_resolution_service
            .effective_permissions(identity.user_id())
            .await?;

        if permissions.grants_any(required_permissions) {
            Ok(AccessDecision::Allow)
        } else {
            warn!(
                user_id = identity.user_id(),
                "permission requirement not met"
            );
            Ok(AccessDecision::Deny)
        }
    }
}
