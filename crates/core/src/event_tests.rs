// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn builder_generates_a_fresh_uuid_per_event() {
    let a = Event::builder("app", "ping").build();
    let b = Event::builder("app", "ping").build();
    assert_ne!(a.uuid(), b.uuid());
}

#[test]
fn builder_preserves_an_explicit_uuid() {
    let id = Uuid::new_v4();
    let e = Event::builder("app", "ping").uuid(id).build();
    assert_eq!(e.uuid(), id);
}

#[test]
fn internal_events_have_a_leading_dot_category() {
    let internal = Event::builder(".notification", "dismiss").build();
    let external = Event::builder("app", "ping").build();
    assert!(internal.is_internal());
    assert!(!external.is_internal());
}

#[test]
fn full_key_joins_category_and_name_with_a_space() {
    let e = Event::builder("app", "ping").build();
    assert_eq!(e.full_key(), "app ping");
}

#[test]
fn data_lookup_reflects_builder_adds() {
    let e = Event::builder("app", "ping").data("urgent", true).build();
    assert!(e.has_data("urgent"));
    assert_eq!(e.get_data("urgent"), Some(&Value::Bool(true)));
    assert!(!e.has_data("missing"));
    assert_eq!(e.get_data("missing"), None);
}

#[test]
fn default_timeout_is_zero_meaning_none() {
    let e = Event::builder("app", "ping").build();
    assert_eq!(e.timeout(), 0);
}
