use clipsight_core::SelectionSet;

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn selection_of(names: &[&str], catalog: &[String]) -> SelectionSet {
    let mut selection = SelectionSet::default();
    selection.resync(catalog);
    // Start from everything selected, then drop what the test leaves out.
    for key in catalog {
        if !names.contains(&key.as_str()) {
            selection.toggle_one(key);
        }
    }
    selection
}

#[test]
fn resync_drops_keys_missing_from_the_new_catalog() {
    let old_catalog = keys(&["a", "b", "c"]);
    let mut selection = selection_of(&["a", "b"], &old_catalog);

    selection.resync(&keys(&["b", "c"]));

    assert!(selection.contains("b"));
    assert!(!selection.contains("a"));
    assert_eq!(selection.len(), 1);
}

#[test]
fn resync_resets_to_full_when_emptied() {
    let old_catalog = keys(&["a", "b"]);
    let mut selection = selection_of(&["a", "b"], &old_catalog);

    let new_catalog = keys(&["x", "y"]);
    selection.resync(&new_catalog);

    assert!(selection.is_all_selected(new_catalog.len()));
    assert!(selection.contains("x"));
    assert!(selection.contains("y"));
}

#[test]
fn resync_on_empty_selection_defaults_to_everything() {
    let catalog = keys(&["a", "b", "c"]);
    let mut selection = SelectionSet::default();
    selection.resync(&catalog);
    assert!(selection.is_all_selected(catalog.len()));
}

#[test]
fn toggle_all_twice_is_identity() {
    let catalog = keys(&["a", "b", "c"]);
    let mut selection = SelectionSet::default();
    selection.resync(&catalog);
    let full = selection.clone();

    selection.toggle_all(&catalog);
    assert!(selection.is_empty());
    selection.toggle_all(&catalog);
    assert_eq!(selection, full);

    // And from the empty side.
    selection.toggle_all(&catalog);
    let empty = selection.clone();
    selection.toggle_all(&catalog);
    selection.toggle_all(&catalog);
    assert_eq!(selection, empty);
}

#[test]
fn toggle_all_never_produces_a_partial_selection() {
    let catalog = keys(&["a", "b", "c"]);
    let mut selection = selection_of(&["a", "c"], &catalog);

    selection.toggle_all(&catalog);
    assert!(selection.is_all_selected(catalog.len()));
    selection.toggle_all(&catalog);
    assert!(selection.is_empty());
}

#[test]
fn all_selected_requires_a_non_empty_catalog() {
    let selection = SelectionSet::default();
    assert!(!selection.is_all_selected(0));
}

#[test]
fn ordered_keys_follow_the_catalog() {
    let catalog = keys(&["z_first", "a_second", "m_third"]);
    let mut selection = SelectionSet::default();
    selection.resync(&catalog);

    assert_eq!(selection.ordered_keys(&catalog), catalog);
}
