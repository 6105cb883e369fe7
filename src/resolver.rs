use std::collections::HashMap;

use crate::model::C2Category;

/// Maps sub-category resolution keys (name, label or id) to stable ids.
///
/// Built once per composition from the full sub-category collection. When two
/// categories share a key the later one wins.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    ids_by_key: HashMap<String, String>,
}

impl NameResolver {
    pub fn from_categories(categories: &[C2Category]) -> Self {
        let mut ids_by_key = HashMap::with_capacity(categories.len());
        for category in categories {
            let key = category.resolution_key();
            if key.is_empty() {
                continue;
            }
            if let Some(previous) = ids_by_key.insert(key.to_string(), category.id().to_string())
            {
                log::debug!(key, previous = previous.as_str(), id = category.id(); "Duplicate sub-category key, later entry wins");
            }
        }
        Self { ids_by_key }
    }

    /// Returns the id registered under `candidate`, or `candidate` itself when
    /// no category uses it as a key.
    pub fn resolve<'a>(&'a self, candidate: &'a str) -> &'a str {
        self.ids_by_key
            .get(candidate)
            .map(String::as_str)
            .unwrap_or(candidate)
    }

    pub fn len(&self) -> usize {
        self.ids_by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids_by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(id: &str, name: &str) -> C2Category {
        let mut category = C2Category::new(id, "c1");
        category.name = Some(name.to_string());
        category
    }

    #[test]
    fn resolves_names_and_passes_unknown_through() {
        let categories = vec![named("c2-x", "Billing"), C2Category::new("c2-y", "c1")];
        let resolver = NameResolver::from_categories(&categories);
        assert_eq!(resolver.resolve("Billing"), "c2-x");
        assert_eq!(resolver.resolve("Billing"), "c2-x");
        assert_eq!(resolver.resolve("c2-y"), "c2-y");
        assert_eq!(resolver.resolve("nowhere"), "nowhere");
    }

    #[test]
    fn label_is_used_when_name_is_missing() {
        let mut category = C2Category::new("c2-x", "c1");
        category.node.label = Some("Billing".to_string());
        let resolver = NameResolver::from_categories(&[category]);
        assert_eq!(resolver.resolve("Billing"), "c2-x");
        // The id is not a key once a label exists, but still passes through.
        assert_eq!(resolver.resolve("c2-x"), "c2-x");
    }

    #[test]
    fn later_duplicate_name_wins() {
        let categories = vec![named("c2-a", "Shared"), named("c2-b", "Shared")];
        let resolver = NameResolver::from_categories(&categories);
        assert_eq!(resolver.resolve("Shared"), "c2-b");
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn empty_candidate_stays_empty() {
        let resolver = NameResolver::from_categories(&[C2Category::new("", "c1")]);
        assert!(resolver.is_empty());
        assert_eq!(resolver.resolve(""), "");
    }
}
