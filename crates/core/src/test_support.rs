// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for downstream crates, mirroring the teacher's
//! `oj-core::test_support` convention. Gated behind `cfg(test)` or the
//! `test-support` feature so it never ships in a release build.

use crate::action::{Action, ActionRegistry};
use crate::event::Event;
use crate::flags::FlagInterner;
use crate::router::{EventMatchSpec, Router};
use std::sync::Arc;

/// A minimal event with no data, for tests that don't care about the
/// payload.
pub fn sample_event(category: &str, name: &str) -> Event {
    Event::builder(category, name).build()
}

/// An `ActionRegistry` containing a single action with no plugin handles
/// and no sub-actions, already linked.
pub fn single_action_registry(id: &str) -> ActionRegistry {
    let mut reg = ActionRegistry::new();
    reg.insert(Action::new(id));
    reg.link();
    reg
}

/// A `Router` with one unconditional exact-key match for
/// `"<category> <name>"`, linked against `registry`.
pub fn unconditional_router(
    category: &str,
    name: &str,
    action_id: &str,
    registry: &ActionRegistry,
) -> Router {
    let mut router = Router::new(Arc::new(FlagInterner::new()));
    router
        .parse_event_match(&format!("{category} {name}"), EventMatchSpec::new(vec![action_id.to_string()]))
        .expect("unconditional header is always well-formed");
    router.link(registry);
    router
}

#[cfg(any(test, feature = "test-support"))]
pub mod strategies {
    use crate::value::Value;
    use proptest::prelude::*;

    /// A `proptest` strategy generating non-`Map` [`Value`]s, since maps
    /// deliberately have no total order and would make comparison-law
    /// properties vacuous.
    pub fn orderable_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int64),
            any::<u64>().prop_map(Value::UInt64),
            any::<String>().prop_map(Value::Str),
        ]
    }
}
