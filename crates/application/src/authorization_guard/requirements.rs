use std::collections::HashMap;

/// Legacy roles and permission keys declared on one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRequirements {
    required_permissions: Vec<String>,
    required_roles: Vec<String>,
}

impl RouteRequirements {
    /// Declares an unguarded operation.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Declares an operation requiring at least one of the permission keys.
    #[must_use]
    pub fn permissions<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::none().with_permissions(keys)
    }

    /// Declares an operation restricted to the legacy roles.
    #[must_use]
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::none().with_roles(roles)
    }

    /// Adds permission keys to the declaration.
    #[must_use]
    pub fn with_permissions<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_permissions
            .extend(keys.into_iter().map(Into::into));
        self
    }

    /// Adds legacy roles to the declaration.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Returns declared permission keys.
    #[must_use]
    pub fn required_permissions(&self) -> &[String] {
        &self.required_permissions
    }

    /// Returns declared legacy role names.
    #[must_use]
    pub fn required_roles(&self) -> &[String] {
        &self.required_roles
    }

    /// Returns whether nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required_permissions.is_empty() && self.required_roles.is_empty()
    }
}

/// Registration table mapping operation identifiers to their requirements.
///
/// Operations without an entry are unguarded.
#[derive(Debug, Clone, Default)]
pub struct RouteRequirementTable {
    routes: HashMap<String, RouteRequirements>,
    unguarded: RouteRequirements,
}

impl RouteRequirementTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares requirements for an operation, replacing earlier declarations.
    #[must_use]
    pub fn declare(mut self, operation: impl Into<String>, requirements: RouteRequirements) -> Self {
        self.routes.insert(operation.into(), requirements);
        self
    }

    /// Returns the requirements declared for an operation.
    #[must_use]
    pub fn requirements_for(&self, operation: &str) -> &RouteRequirements {
        self.routes.get(operation).unwrap_or(&self.unguarded)
    }

    /// Iterates declared operations.
    pub fn operations(&self) -> impl Iterator<Item = (&str, &RouteRequirements)> {
        self.routes
            .iter()
            .map(|(operation, requirements)| (operation.as_str(), requirements))
    }
}
