use serde::{Deserialize, Serialize};

/// Caller identity attached to a request by the upstream authentication layer.
///
/// The legacy `role` is always present. `role_id` references a granular role
/// and, when set, takes precedence over the legacy role for permission checks.
///
/// Decoding accepts the user identifier as `id`, `sub`, or both. `id` wins
/// when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IdentityClaims")]
pub struct UserIdentity {
    #[serde(rename = "id")]
    user_id: String,
    role: String,
    #[serde(rename = "roleId", default, skip_serializing_if = "Option::is_none")]
    role_id: Option<String>,
}

#[derive(Deserialize)]
struct IdentityClaims {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    role: String,
    #[serde(rename = "roleId", default)]
    role_id: Option<String>,
}

impl TryFrom<IdentityClaims> for UserIdentity {
    type Error = String;

    fn try_from(claims: IdentityClaims) -> Result<Self, Self::Error> {
        let user_id = claims
            .id
            .or(claims.sub)
            .ok_or_else(|| "identity requires an id or sub claim".to_owned())?;

        Ok(Self::new(user_id, claims.role, claims.role_id))
    }
}

impl UserIdentity {
    /// Creates an identity from resolved authentication claims.
    #[must_use]
    pub fn new(user_id: impl Into<String>, role: impl Into<String>, role_id: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
            role_id,
        }
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    /// Returns the legacy role name carried by the identity.
    #[must_use]
    pub fn role(&self) -> &str {
        self.role.as_str()
    }

    /// Returns the granular role identifier, if one is assigned.
    #[must_use]
    pub fn role_id(&self) -> Option<&str> {
        self.role_id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    /// Returns whether the caller is governed by the granular role model.
    #[must_use]
    pub fn has_granular_role(&self) -> bool {
        self.role_id().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::UserIdentity;

    #[test]
    fn identity_accepts_sub_claim_and_role_id() {
        let identity: Result<UserIdentity, _> =
            serde_json::from_str(r#"{"sub":"u-7","role":"DISPATCHER","roleId":"r1"}"#);
        let identity = identity.unwrap_or_else(|error| panic!("identity should decode: {error}"));

        assert_eq!(identity.user_id(), "u-7");
        assert_eq!(identity.role(), "DISPATCHER");
        assert_eq!(identity.role_id(), Some("r1"));
    }

    #[test]
    fn identity_accepts_both_id_and_sub_claims() {
        let identity: Result<UserIdentity, _> =
            serde_json::from_str(r#"{"id":"u-7","sub":"u-7","role":"DISPATCHER"}"#);
        let identity = identity.unwrap_or_else(|error| panic!("identity should decode: {error}"));

        assert_eq!(identity.user_id(), "u-7");
        assert!(!identity.has_granular_role());
    }

    #[test]
    fn id_claim_wins_over_sub_claim() {
        let identity: Result<UserIdentity, _> =
            serde_json::from_str(r#"{"sub":"u-sub","id":"u-id","role":"VIEWER"}"#);

        assert_eq!(
            identity.ok().as_ref().map(UserIdentity::user_id),
            Some("u-id")
        );
    }

    #[test]
    fn identity_without_user_identifier_is_rejected() {
        let identity: Result<UserIdentity, _> = serde_json::from_str(r#"{"role":"VIEWER"}"#);
        assert!(identity.is_err());
    }

    #[test]
    fn serialized_identity_decodes_back() {
        let identity = UserIdentity::new("u-3", "MANAGER", Some("r-2".to_owned()));
        let encoded = serde_json::to_value(&identity)
            .unwrap_or_else(|error| panic!("identity should encode: {error}"));

        assert_eq!(encoded["id"], "u-3");
        assert_eq!(
            serde_json::from_value::<UserIdentity>(encoded).ok(),
            Some(identity)
        );
    }

    #[test]
    fn blank_role_id_is_treated_as_absent() {
        let identity = UserIdentity::new("u-1", "VIEWER", Some("  ".to_owned()));
        assert!(!identity.has_granular_role());
    }
}
