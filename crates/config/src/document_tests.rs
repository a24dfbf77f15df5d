// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn get_list_splits_on_semicolon_and_drops_empties() {
    let mut group = Group::default();
    group.insert("Actions", "a;b;;c");
    assert_eq!(group.get_list("Actions"), vec!["a", "b", "c"]);
}

#[test]
fn get_list_on_missing_key_is_empty() {
    let group = Group::default();
    assert!(group.get_list("Nope").is_empty());
}

#[test]
fn merge_onto_overrides_existing_group_entries() {
    let mut base_group = Group::default();
    base_group.insert("Importance", "0");
    base_group.insert("Actions", "base-action");
    let mut base = Document::new();
    base.push_group("app ping".to_string(), base_group);

    let mut child_group = Group::default();
    child_group.insert("Actions", "child-action");
    let mut child = Document::new();
    child.push_group("app ping".to_string(), child_group);

    let merged = child.merge_onto(base);
    let group = merged.get("app ping").unwrap();
    assert_eq!(group.get("Importance"), Some("0"));
    assert_eq!(group.get("Actions"), Some("child-action"));
}

#[test]
fn merge_onto_appends_new_groups() {
    let base = Document::new();
    let mut child_group = Group::default();
    child_group.insert("Importance", "5");
    let mut child = Document::new();
    child.push_group("app ping".to_string(), child_group);

    let merged = child.merge_onto(base);
    assert!(merged.get("app ping").is_some());
}
