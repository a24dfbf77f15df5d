// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Actions: named bundles of plugin handles, flag mutations and ordered
//! sub-actions.
//!
//! Sub-actions reference each other by string ID while parsing, then get
//! resolved to stable arena indices at [`ActionRegistry::link`] time
//! (design note 9.2: "use an arena with stable indices"). Cycles between
//! actions are not rejected — the executor in `dispatch::trigger` simply
//! recurses the configured graph; an operator-configured loop causes
//! revisits, which is the configurer's responsibility per spec.

use crate::flags::Flag;
use crate::value::Value;
use std::collections::HashMap;

/// Opaque handle bound to one plugin's parsed action config.
///
/// Produced by [`crate::plugin::Plugin::action_parse`], handed back
/// verbatim to [`crate::plugin::Plugin::event_action`] on the same plugin.
#[derive(Debug, Clone)]
pub struct PluginActionHandle {
    plugin_id: String,
    config: Value,
}

impl PluginActionHandle {
    pub fn new(plugin_id: impl Into<String>, config: Value) -> Self {
        Self { plugin_id: plugin_id.into(), config }
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn config(&self) -> &Value {
        &self.config
    }
}

/// String ID of an [`Action`], unique within the registry.
pub type ActionId = String;

/// A named bundle of plugin handles, flag mutations and ordered
/// sub-actions.
#[derive(Debug, Clone, Default)]
pub struct Action {
    pub id: ActionId,
    pub plugin_actions: Vec<PluginActionHandle>,
    pub flags_add: Vec<Flag>,
    pub flags_remove: Vec<Flag>,
    subaction_ids: Vec<ActionId>,
    resolved_subactions: Vec<usize>,
}

impl Action {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Default::default() }
    }

    pub fn with_subactions(mut self, ids: Vec<ActionId>) -> Self {
        self.subaction_ids = ids;
        self
    }

    pub fn with_plugin_action(mut self, handle: PluginActionHandle) -> Self {
        self.plugin_actions.push(handle);
        self
    }

    pub fn with_flags_add(mut self, flags: Vec<Flag>) -> Self {
        self.flags_add = flags;
        self
    }

    pub fn with_flags_remove(mut self, flags: Vec<Flag>) -> Self {
        self.flags_remove = flags;
        self
    }

    /// Arena indices of this action's sub-actions, valid after `link`.
    pub fn resolved_subactions(&self) -> &[usize] {
        &self.resolved_subactions
    }
}

/// A frozen-after-link arena of [`Action`]s, keyed by string ID.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    arena: Vec<Action>,
    index: HashMap<ActionId, usize>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an action by ID, mirroring `g_hash_table_replace`.
    pub fn insert(&mut self, action: Action) {
        match self.index.get(&action.id).copied() {
            Some(idx) => self.arena[idx] = action,
            None => {
                let idx = self.arena.len();
                self.index.insert(action.id.clone(), idx);
                self.arena.push(action);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Action> {
        self.index.get(id).map(|&idx| &self.arena[idx])
    }

    pub fn get_by_index(&self, idx: usize) -> &Action {
        &self.arena[idx]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Resolve every action's sub-action string IDs into arena indices.
    /// Unresolved references are dropped with a warning (spec §4.1/§7).
    pub fn link(&mut self) {
        let resolved: Vec<Vec<usize>> = self
            .arena
            .iter()
            .map(|action| {
                action
                    .subaction_ids
                    .iter()
                    .filter_map(|id| match self.index.get(id) {
                        Some(&idx) => Some(idx),
                        None => {
                            tracing::warn!(
                                action = %action.id,
                                subaction = %id,
                                "dropping unresolved sub-action reference"
                            );
                            None
                        }
                    })
                    .collect()
            })
            .collect();
        for (action, subs) in self.arena.iter_mut().zip(resolved) {
            action.resolved_subactions = subs;
        }
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
