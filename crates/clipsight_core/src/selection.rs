use std::collections::BTreeSet;

/// User-selected subset of the catalog's asset keys.
///
/// Invariant: always a subset of the current catalog key set. After any
/// catalog change, members absent from the new catalog are dropped; when that
/// would leave nothing selected, the selection resets to the full key set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    selected: BTreeSet<String>,
}

impl SelectionSet {
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.selected.contains(key)
    }

    pub fn is_all_selected(&self, catalog_len: usize) -> bool {
        catalog_len != 0 && self.selected.len() == catalog_len
    }

    /// Re-synchronize against a changed catalog.
    pub fn resync(&mut self, catalog_keys: &[String]) {
        self.selected.retain(|key| catalog_keys.contains(key));
        if self.selected.is_empty() {
            self.selected = catalog_keys.iter().cloned().collect();
        }
    }

    pub fn toggle_one(&mut self, key: &str) {
        if !self.selected.remove(key) {
            self.selected.insert(key.to_string());
        }
    }

    /// Flips between empty and full; never produces a partial selection.
    pub fn toggle_all(&mut self, catalog_keys: &[String]) {
        if self.is_all_selected(catalog_keys.len()) {
            self.selected.clear();
        } else {
            self.selected = catalog_keys.iter().cloned().collect();
        }
    }

    /// Selected keys in the order the catalog lists them.
    pub fn ordered_keys(&self, catalog_keys: &[String]) -> Vec<String> {
        catalog_keys
            .iter()
            .filter(|key| self.selected.contains(*key))
            .cloned()
            .collect()
    }
}
