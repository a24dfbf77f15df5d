// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action triggering: spec §4.2's `trigger` operation.
//!
//! Grounded on `original_source/server/eventd/src/actions.c` and
//! `events.c`'s caller, which applies an action's flag mutations before
//! invoking its plugin handles, then recurses into sub-actions in
//! configured order.

use crate::action::{Action, ActionRegistry};
use crate::event::Event;
use crate::flags::FlagSet;
use crate::plugin::Plugin;

/// Trigger `action_indices` against `event`, applying flag mutations and
/// invoking every plugin handle, then recursing depth-first into each
/// action's resolved sub-actions.
///
/// `flags` is mutated in place: `flags_add` then `flags_remove`, matching
/// the original's `eventd_flags_add`/`eventd_flags_remove` call order. A
/// sub-action sees the flag state left by its parent and any earlier
/// sibling's plugin handles, per spec §4.2.
pub async fn trigger(
    registry: &ActionRegistry,
    plugins: &[Box<dyn Plugin>],
    action_indices: &[usize],
    event: &Event,
    flags: &mut FlagSet,
) {
    for &idx in action_indices {
        let action = registry.get_by_index(idx);
        trigger_one(registry, plugins, action, event, flags).await;
    }
}

async fn trigger_one(
    registry: &ActionRegistry,
    plugins: &[Box<dyn Plugin>],
    action: &Action,
    event: &Event,
    flags: &mut FlagSet,
) {
    for flag in &action.flags_add {
        flags.add(flag.clone());
    }
    for flag in &action.flags_remove {
        flags.remove(flag);
    }

    for handle in &action.plugin_actions {
        let Some(plugin) = plugins.iter().find(|p| p.id() == handle.plugin_id()) else {
            tracing::warn!(plugin = handle.plugin_id(), action = %action.id, "action references an unknown plugin");
            continue;
        };
        if let Err(err) = plugin.event_action(handle, event).await {
            tracing::warn!(plugin = handle.plugin_id(), action = %action.id, error = %err, "plugin action failed");
        }
    }

    for &sub_idx in action.resolved_subactions() {
        let sub = registry.get_by_index(sub_idx);
        // `Box::pin` breaks the otherwise-infinite async fn recursion size.
        Box::pin(trigger_one(registry, plugins, sub, event, flags)).await;
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
