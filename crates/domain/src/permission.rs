use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use dispatchdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Permission keys shipped with the dispatch back office, with their labels.
///
/// Keys are dot-delimited (`module.section.action`). Every key except the
/// module roots must have its parent listed as well.
const STANDARD_CATALOG: &[(&str, &str)] = &[
    ("dashboard", "Dashboard"),
    ("dashboard.statistics", "Dashboard statistics"),
    ("agents", "Agents"),
    ("agents.addButton", "Add agent"),
    ("agents.editButton", "Edit agent"),
    ("agents.deleteButton", "Delete agent"),
    ("agents.detail", "Agent detail"),
    ("agents.detail.contracts", "Agent contracts"),
    ("agents.detail.contracts.upload", "Upload agent contract"),
    ("agents.detail.users", "Agent portal users"),
    ("customers", "Customers"),
    ("customers.addButton", "Add customer"),
    ("customers.editButton", "Edit customer"),
    ("customers.deleteButton", "Delete customer"),
    ("customers.detail", "Customer detail"),
    ("customers.detail.importTemplates", "Customer import templates"),
    (
        "customers.detail.importTemplates.upload",
        "Upload customer import template",
    ),
    (
        "customers.detail.importTemplates.delete",
        "Delete customer import template",
    ),
    ("suppliers", "Suppliers"),
    ("suppliers.addButton", "Add supplier"),
    ("suppliers.editButton", "Edit supplier"),
    ("suppliers.deleteButton", "Delete supplier"),
    ("suppliers.detail", "Supplier detail"),
    ("suppliers.detail.vehicles", "Supplier vehicles"),
    ("suppliers.detail.pricing", "Supplier pricing"),
    ("drivers", "Drivers"),
    ("drivers.addButton", "Add driver"),
    ("drivers.editButton", "Edit driver"),
    ("drivers.deleteButton", "Delete driver"),
    ("drivers.documents", "Driver documents"),
    ("reps", "Reps"),
    ("reps.addButton", "Add rep"),
    ("reps.editButton", "Edit rep"),
    ("reps.deleteButton", "Delete rep"),
    ("vehicles", "Vehicles"),
    ("vehicles.addButton", "Add vehicle"),
    ("vehicles.editButton", "Edit vehicle"),
    ("vehicles.deleteButton", "Delete vehicle"),
    ("vehicles.types", "Vehicle types"),
    ("trafficJobs", "Traffic jobs"),
    ("trafficJobs.addButton", "Add traffic job"),
    ("trafficJobs.editButton", "Edit traffic job"),
    ("trafficJobs.cancelButton", "Cancel traffic job"),
    ("trafficJobs.import", "Import traffic jobs"),
    ("trafficJobs.export", "Export traffic jobs"),
    ("dispatch", "Dispatch"),
    ("dispatch.dayView", "Dispatch day view"),
    ("dispatch.dayView.assignDriver", "Assign driver"),
    ("dispatch.dayView.assignVehicle", "Assign vehicle"),
    ("dispatch.dayView.assignRep", "Assign rep"),
    ("invoices", "Invoices"),
    ("invoices.create", "Create invoice"),
    ("invoices.edit", "Edit invoice"),
    ("invoices.markPaid", "Mark invoice paid"),
    ("invoices.export", "Export invoices"),
    ("reports", "Reports"),
    ("reports.revenue", "Revenue report"),
    ("reports.driverPerformance", "Driver performance report"),
    ("reports.supplierStatements", "Supplier statements"),
    ("reports.export", "Export reports"),
    ("settings", "Settings"),
    ("settings.company", "Company settings"),
    ("settings.users", "Users"),
    ("settings.users.create", "Create user"),
    ("settings.users.edit", "Edit user"),
    ("settings.users.changeRole", "Change user role"),
    ("settings.users.deactivate", "Deactivate user"),
    ("settings.roles", "Roles"),
    ("settings.roles.create", "Create role"),
    ("settings.roles.edit", "Edit role"),
    ("settings.roles.delete", "Delete role"),
];

static STANDARD_REGISTRY: LazyLock<PermissionRegistry> =
    LazyLock::new(|| PermissionRegistry::from_catalog(STANDARD_CATALOG));

/// Returns the parent of a permission key, or `None` for a root key.
#[must_use]
pub fn parent_key(key: &str) -> Option<&str> {
    key.rsplit_once('.').map(|(parent, _)| parent)
}

/// Returns every proper ancestor of a key, root first.
///
/// The computation is syntactic; keys absent from any registry still yield
/// their ancestors.
#[must_use]
pub fn ancestor_keys(key: &str) -> Vec<String> {
    let mut ancestors = ancestors(key).map(str::to_owned).collect::<Vec<_>>();
    ancestors.reverse();
    ancestors
}

/// Walks the proper ancestors of a key, nearest parent first.
fn ancestors(key: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(parent_key(key), |current| parent_key(current))
}

/// Static metadata for one permission key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionEntry {
    key: &'static str,
    label: &'static str,
    parent: Option<&'static str>,
}

impl PermissionEntry {
    /// Returns the dot-delimited permission key.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Returns the parent key, or `None` for roots.
    #[must_use]
    pub fn parent(&self) -> Option<&'static str> {
        self.parent
    }
}

/// Immutable catalog of valid permission keys.
#[derive(Debug, Clone)]
pub struct PermissionRegistry {
    entries: Vec<PermissionEntry>,
    index: BTreeMap<&'static str, usize>,
}

impl PermissionRegistry {
    /// Returns the process-wide catalog shipped with the back office.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD_REGISTRY
    }

    /// Builds a registry from `(key, label)` pairs. Later duplicates are ignored.
    #[must_use]
    pub fn from_catalog(catalog: &[(&'static str, &'static str)]) -> Self {
        let mut entries = Vec::with_capacity(catalog.len());
        let mut index = BTreeMap::new();

        for &(key, label) in catalog {
            if index.contains_key(key) {
                continue;
            }
            index.insert(key, entries.len());
            entries.push(PermissionEntry {
                key,
                label,
                parent: parent_key(key),
            });
        }

        Self { entries, index }
    }

    /// Returns catalog entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[PermissionEntry] {
        &self.entries
    }

    /// Finds the entry registered for a key.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&PermissionEntry> {
        self.index.get(key).map(|position| &self.entries[*position])
    }

    /// Returns whether the key is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Returns every registered key.
    #[must_use]
    pub fn all_permission_keys(&self) -> BTreeSet<String> {
        self.index.keys().map(|key| (*key).to_owned()).collect()
    }

    /// Returns the full catalog as a grant set.
    #[must_use]
    pub fn full_permission_set(&self) -> PermissionSet {
        PermissionSet::from_keys(self.all_permission_keys())
    }

    /// Validates requested keys and returns them deduplicated.
    pub fn validate_keys<I, S>(&self, keys: I) -> AppResult<BTreeSet<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut validated = BTreeSet::new();
        for key in keys {
            let key = key.as_ref().trim();
            if !self.contains(key) {
                return Err(AppError::Validation(format!(
                    "unknown permission key '{key}'"
                )));
            }
            validated.insert(key.to_owned());
        }

        Ok(validated)
    }

    /// Lists registered keys whose parent is missing from the registry.
    #[must_use]
    pub fn orphaned_keys(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|entry| entry.parent.is_some_and(|parent| !self.contains(parent)))
            .map(|entry| entry.key)
            .collect()
    }
}

/// Set of permission keys granted to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    /// Creates an empty grant set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a grant set from raw keys.
    #[must_use]
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Returns whether the key itself was granted, ignoring ancestors.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    /// Returns whether the key and every one of its ancestors are granted.
    #[must_use]
    pub fn grants(&self, key: &str) -> bool {
        self.contains(key) && ancestors(key).all(|ancestor| self.contains(ancestor))
    }

    /// Returns whether at least one of the keys is effectively granted.
    #[must_use]
    pub fn grants_any<S: AsRef<str>>(&self, keys: &[S]) -> bool {
        keys.iter().any(|key| self.grants(key.as_ref()))
    }

    /// Returns the number of granted keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether nothing is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates granted keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns granted keys in sorted order.
    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<String> {
        self.0.into_iter().collect()
    }
}

impl FromIterator<String> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{PermissionRegistry, PermissionSet, ancestor_keys, parent_key};

    #[test]
    fn standard_catalog_has_no_orphaned_keys() {
        let registry = PermissionRegistry::standard();
        assert!(registry.orphaned_keys().is_empty());
        assert_eq!(registry.entries().len(), registry.all_permission_keys().len());
    }

    #[test]
    fn ancestors_of_nested_key_are_complete() {
        assert_eq!(
            ancestor_keys("customers.detail.importTemplates.upload"),
            vec![
                "customers".to_owned(),
                "customers.detail".to_owned(),
                "customers.detail.importTemplates".to_owned(),
            ]
        );
    }

    #[test]
    fn root_key_has_no_ancestors() {
        assert!(ancestor_keys("agents").is_empty());
        assert_eq!(parent_key("agents"), None);
    }

    #[test]
    fn unknown_key_still_yields_syntactic_ancestors() {
        let registry = PermissionRegistry::standard();
        assert!(!registry.contains("fleet.fuel"));
        assert_eq!(ancestor_keys("fleet.fuel"), vec!["fleet".to_owned()]);
    }

    #[test]
    fn entry_exposes_parent_and_label() {
        let registry = PermissionRegistry::standard();
        let entry = registry.entry("agents.addButton");
        assert_eq!(entry.and_then(|entry| entry.parent()), Some("agents"));
        assert_eq!(entry.map(|entry| entry.label()), Some("Add agent"));
    }

    #[test]
    fn validate_keys_rejects_unknown_key() {
        let registry = PermissionRegistry::standard();
        let result = registry.validate_keys(["agents", "agents.launchRocket"]);
        assert!(result.is_err());
    }

    #[test]
    fn validate_keys_collapses_duplicates() {
        let registry = PermissionRegistry::standard();
        let keys = registry.validate_keys(["agents", "agents", " agents.addButton "]);
        assert_eq!(keys.map(|keys| keys.len()).ok(), Some(2));
    }

    #[test]
    fn grant_requires_every_ancestor() {
        let only_child = PermissionSet::from_keys(["agents.addButton"]);
        assert!(!only_child.grants("agents.addButton"));

        let with_parent = PermissionSet::from_keys(["agents", "agents.addButton"]);
        assert!(with_parent.grants("agents.addButton"));
    }

    #[test]
    fn grant_fails_when_middle_ancestor_is_missing() {
        let keys = PermissionSet::from_keys([
            "customers",
            "customers.detail.importTemplates",
            "customers.detail.importTemplates.upload",
        ]);
        assert!(!keys.grants("customers.detail.importTemplates.upload"));
    }

    #[test]
    fn full_permission_set_grants_every_registered_key() {
        let registry = PermissionRegistry::standard();
        let full = registry.full_permission_set();
        assert!(
            registry
                .entries()
                .iter()
                .all(|entry| full.grants(entry.key()))
        );
    }

    proptest! {
        #[test]
        fn ancestors_are_strict_prefixes(segments in prop::collection::vec("[a-z]{1,6}", 1..6)) {
            let key = segments.join(".");
            let ancestors = ancestor_keys(&key);

            prop_assert_eq!(ancestors.len(), segments.len() - 1);
            for (depth, ancestor) in ancestors.iter().enumerate() {
                prop_assert_eq!(ancestor, &segments[..=depth].join("."));
            }
        }

        #[test]
        fn key_with_all_ancestors_is_granted(segments in prop::collection::vec("[a-z]{1,6}", 1..6)) {
            let key = segments.join(".");
            let mut keys = ancestor_keys(&key);
            keys.push(key.clone());
            let granted = PermissionSet::from_keys(keys);

            prop_assert!(granted.grants(&key));
        }

        #[test]
        fn grant_matches_key_and_ancestor_membership(
            segments in prop::collection::vec("[a-z]{1,3}", 1..5),
            held in prop::collection::vec(any::<bool>(), 5),
        ) {
            let key = segments.join(".");
            let mut chain = ancestor_keys(&key);
            chain.push(key.clone());
            let granted = PermissionSet::from_keys(
                chain
                    .iter()
                    .zip(held.iter())
                    .filter(|(_, keep)| **keep)
                    .map(|(entry, _)| entry.clone()),
            );

            let expected = granted.contains(&key)
                && ancestor_keys(&key).iter().all(|ancestor| granted.contains(ancestor));
            prop_assert_eq!(granted.grants(&key), expected);
        }
    }
}
