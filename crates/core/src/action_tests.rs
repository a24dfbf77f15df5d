// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn link_resolves_subaction_ids_to_indices() {
    let mut reg = ActionRegistry::new();
    reg.insert(Action::new("leaf"));
    reg.insert(Action::new("root").with_subactions(vec!["leaf".to_string()]));
    reg.link();

    let root = reg.get("root").unwrap();
    assert_eq!(root.resolved_subactions().len(), 1);
    let leaf_idx = root.resolved_subactions()[0];
    assert_eq!(reg.get_by_index(leaf_idx).id, "leaf");
}

#[test]
fn link_drops_unresolved_subaction_references() {
    let mut reg = ActionRegistry::new();
    reg.insert(Action::new("root").with_subactions(vec!["ghost".to_string()]));
    reg.link();

    assert!(reg.get("root").unwrap().resolved_subactions().is_empty());
}

#[test]
fn insert_replaces_an_existing_action_by_id() {
    let mut reg = ActionRegistry::new();
    reg.insert(Action::new("a"));
    reg.insert(Action::new("a").with_subactions(vec!["b".to_string()]));
    reg.insert(Action::new("b"));
    reg.link();

    assert_eq!(reg.len(), 2);
    let a = reg.get("a").unwrap();
    assert_eq!(a.resolved_subactions().len(), 1);
}

#[test]
fn cycles_are_representable_and_not_rejected() {
    let mut reg = ActionRegistry::new();
    reg.insert(Action::new("a").with_subactions(vec!["b".to_string()]));
    reg.insert(Action::new("b").with_subactions(vec!["a".to_string()]));
    reg.link();

    let a = reg.get("a").unwrap();
    let b_idx = a.resolved_subactions()[0];
    let b = reg.get_by_index(b_idx);
    assert_eq!(b.id, "b");
    assert_eq!(b.resolved_subactions().len(), 1);
}
