// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::action::{Action, ActionRegistry};
use std::sync::Arc;

fn registry_with(ids: &[&str]) -> ActionRegistry {
    let mut reg = ActionRegistry::new();
    for id in ids {
        reg.insert(Action::new(*id));
    }
    reg.link();
    reg
}

#[test]
fn exact_key_wins_over_category_only() {
    let mut router = Router::new(Arc::new(FlagInterner::new()));
    router
        .parse_event_match("app", EventMatchSpec::new(vec!["cat-action".to_string()]))
        .unwrap();
    router
        .parse_event_match("app ping", EventMatchSpec::new(vec!["exact-action".to_string()]))
        .unwrap();
    let reg = registry_with(&["cat-action", "exact-action"]);
    router.link(&reg);

    let event = Event::builder("app", "ping").build();
    let actions = router.match_event(&event, &FlagSet::new()).unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(reg.get_by_index(actions[0]).id, "exact-action");
}

#[test]
fn category_only_matches_any_name_in_category() {
    let mut router = Router::new(Arc::new(FlagInterner::new()));
    router
        .parse_event_match("app", EventMatchSpec::new(vec!["cat-action".to_string()]))
        .unwrap();
    let reg = registry_with(&["cat-action"]);
    router.link(&reg);

    let event = Event::builder("app", "whatever").build();
    let actions = router.match_event(&event, &FlagSet::new()).unwrap();
    assert_eq!(reg.get_by_index(actions[0]).id, "cat-action");
}

#[test]
fn star_suffix_is_equivalent_to_bare_category() {
    let mut router = Router::new(Arc::new(FlagInterner::new()));
    router
        .parse_event_match("app *", EventMatchSpec::new(vec!["cat-action".to_string()]))
        .unwrap();
    let reg = registry_with(&["cat-action"]);
    router.link(&reg);

    let event = Event::builder("app", "anything").build();
    assert!(router.match_event(&event, &FlagSet::new()).is_some());
}

#[test]
fn malformed_header_with_embedded_star_is_rejected() {
    let mut router = Router::new(Arc::new(FlagInterner::new()));
    let err = router
        .parse_event_match("app ping*", EventMatchSpec::new(vec![]))
        .unwrap_err();
    assert_eq!(err, RouterError::MalformedHeader("app ping*".to_string()));
}

#[test]
fn ascending_importance_order_with_predicate_tiebreak() {
    let mut router = Router::new(Arc::new(FlagInterner::new()));
    let mut low = EventMatchSpec::new(vec!["low".to_string()]);
    low.importance = Some(10);
    let mut high = EventMatchSpec::new(vec!["high".to_string()]);
    high.importance = Some(5);
    router.parse_event_match("app ping", low).unwrap();
    router.parse_event_match("app ping", high).unwrap();
    let reg = registry_with(&["low", "high"]);
    router.link(&reg);

    let event = Event::builder("app", "ping").build();
    let actions = router.match_event(&event, &FlagSet::new()).unwrap();
    assert_eq!(reg.get_by_index(actions[0]).id, "high");
}

#[test]
fn default_importance_is_max_without_predicates_and_zero_with() {
    let mut router = Router::new(Arc::new(FlagInterner::new()));
    router
        .parse_event_match("app ping", EventMatchSpec::new(vec!["bare".to_string()]))
        .unwrap();
    let mut predicated = EventMatchSpec::new(vec!["predicated".to_string()]);
    predicated.if_data_keys.push("urgent".to_string());
    router.parse_event_match("app ping", predicated).unwrap();
    let reg = registry_with(&["bare", "predicated"]);
    router.link(&reg);

    let event = Event::builder("app", "ping").data("urgent", true).build();
    let actions = router.match_event(&event, &FlagSet::new()).unwrap();
    // predicated (importance 0) sorts before bare (importance i64::MAX)
    assert_eq!(reg.get_by_index(actions[0]).id, "predicated");
}

#[test]
fn if_data_keys_requires_presence() {
    let mut router = Router::new(Arc::new(FlagInterner::new()));
    let mut spec = EventMatchSpec::new(vec!["a".to_string()]);
    spec.if_data_keys.push("urgent".to_string());
    router.parse_event_match("app ping", spec).unwrap();
    let reg = registry_with(&["a"]);
    router.link(&reg);

    let without = Event::builder("app", "ping").build();
    assert!(router.match_event(&without, &FlagSet::new()).is_none());

    let with = Event::builder("app", "ping").data("urgent", true).build();
    assert!(router.match_event(&with, &FlagSet::new()).is_some());
}

#[test]
fn if_data_matches_is_skipped_when_data_name_absent() {
    let mut router = Router::new(Arc::new(FlagInterner::new()));
    let mut spec = EventMatchSpec::new(vec!["a".to_string()]);
    spec.if_data_matches.push(("level".to_string(), None, MatchOp::Eq, Value::Int64(5)));
    router.parse_event_match("app ping", spec).unwrap();
    let reg = registry_with(&["a"]);
    router.link(&reg);

    let event = Event::builder("app", "ping").build();
    assert!(router.match_event(&event, &FlagSet::new()).is_some());
}

#[test]
fn if_data_matches_type_mismatch_is_false() {
    let mut router = Router::new(Arc::new(FlagInterner::new()));
    let mut spec = EventMatchSpec::new(vec!["a".to_string()]);
    spec.if_data_matches.push(("level".to_string(), None, MatchOp::Eq, Value::Int64(5)));
    router.parse_event_match("app ping", spec).unwrap();
    let reg = registry_with(&["a"]);
    router.link(&reg);

    let event = Event::builder("app", "ping").data("level", "five").build();
    assert!(router.match_event(&event, &FlagSet::new()).is_none());
}

#[test]
fn if_data_matches_dictionary_key_lookup() {
    let mut router = Router::new(Arc::new(FlagInterner::new()));
    let mut spec = EventMatchSpec::new(vec!["a".to_string()]);
    spec.if_data_matches.push((
        "meta".to_string(),
        Some("priority".to_string()),
        MatchOp::Ge,
        Value::Int64(3),
    ));
    router.parse_event_match("app ping", spec).unwrap();
    let reg = registry_with(&["a"]);
    router.link(&reg);

    let mut map = indexmap::IndexMap::new();
    map.insert("priority".to_string(), Value::Int64(4));
    let event = Event::builder("app", "ping").data("meta", Value::Map(map)).build();
    assert!(router.match_event(&event, &FlagSet::new()).is_some());
}

#[test]
fn if_data_regexes_false_on_non_string() {
    let mut router = Router::new(Arc::new(FlagInterner::new()));
    let mut spec = EventMatchSpec::new(vec!["a".to_string()]);
    spec.if_data_regexes.push(("msg".to_string(), "^hi".to_string()));
    router.parse_event_match("app ping", spec).unwrap();
    let reg = registry_with(&["a"]);
    router.link(&reg);

    let event = Event::builder("app", "ping").data("msg", 5i64).build();
    assert!(router.match_event(&event, &FlagSet::new()).is_none());

    let event2 = Event::builder("app", "ping").data("msg", "hi there").build();
    assert!(router.match_event(&event2, &FlagSet::new()).is_some());
}

#[test]
fn flag_allow_and_deny_lists_gate_the_match() {
    let interner = Arc::new(FlagInterner::new());
    let mut router = Router::new(Arc::clone(&interner));
    let mut spec = EventMatchSpec::new(vec!["a".to_string()]);
    spec.flag_allow_list.push("vip".to_string());
    spec.flag_deny_list.push("muted".to_string());
    router.parse_event_match("app ping", spec).unwrap();
    let reg = registry_with(&["a"]);
    router.link(&reg);

    let event = Event::builder("app", "ping").build();

    let mut flags = FlagSet::new();
    assert!(router.match_event(&event, &flags).is_none());

    flags.add(interner.intern("vip"));
    assert!(router.match_event(&event, &flags).is_some());

    flags.add(interner.intern("muted"));
    assert!(router.match_event(&event, &flags).is_none());
}

#[test]
fn link_drops_unresolved_action_reference() {
    let mut router = Router::new(Arc::new(FlagInterner::new()));
    router
        .parse_event_match("app ping", EventMatchSpec::new(vec!["ghost".to_string()]))
        .unwrap();
    let reg = ActionRegistry::new();
    router.link(&reg);

    let event = Event::builder("app", "ping").build();
    let actions = router.match_event(&event, &FlagSet::new()).unwrap();
    assert!(actions.is_empty());
}
