use std::collections::{BTreeSet, HashMap};

use crate::domain::Tag;

/// Resolve an item's tag keys against the catalog, dropping unknown keys.
pub fn derive_tag_list(keys: &BTreeSet<String>, catalog: &HashMap<String, Tag>) -> Vec<Tag> {
    keys.iter()
        .filter_map(|key| catalog.get(key).cloned())
        .collect()
}
