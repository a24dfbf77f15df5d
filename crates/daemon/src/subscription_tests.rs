// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use evd_core::event::Event;

fn ev(category: &str) -> Event {
    Event::builder(category, "n").build()
}

#[test]
fn all_scope_matches_every_category() {
    let mut reg = SubscriptionRegistry::new();
    let session = SessionId::new_v4();
    reg.subscribe(session, SubscribeScope::All);

    assert_eq!(reg.interested_in(&ev("app")), vec![session]);
}

#[test]
fn category_scope_matches_only_listed_categories() {
    let mut reg = SubscriptionRegistry::new();
    let session = SessionId::new_v4();
    reg.subscribe(session, SubscribeScope::Categories(vec!["app".to_string()]));

    assert_eq!(reg.interested_in(&ev("app")), vec![session]);
    assert!(reg.interested_in(&ev("other")).is_empty());
}

#[test]
fn unsubscribe_removes_the_session() {
    let mut reg = SubscriptionRegistry::new();
    let session = SessionId::new_v4();
    reg.subscribe(session, SubscribeScope::All);
    reg.unsubscribe(session);

    assert!(reg.interested_in(&ev("app")).is_empty());
    assert!(reg.is_empty());
}
