// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event router: keyed index of `EventMatch` entries and the ordered
//! evaluation that selects the action list for an inbound event.
//!
//! Grounded on `original_source/server/eventd/src/events.c`
//! (`_eventd_events_get_event`, `_eventd_events_get_best_match`,
//! `_eventd_events_event_matches`).

use crate::event::Event;
use crate::flags::{Flag, FlagInterner, FlagSet};
use crate::value::Value;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Comparison operator for `if_data_matches` predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl MatchOp {
    fn accepts(self, ord: Ordering) -> bool {
        use Ordering::*;
        match self {
            MatchOp::Lt => ord == Less,
            MatchOp::Le => matches!(ord, Less | Equal),
            MatchOp::Eq => ord == Equal,
            MatchOp::Ne => matches!(ord, Less | Greater),
            MatchOp::Ge => matches!(ord, Equal | Greater),
            MatchOp::Gt => ord == Greater,
        }
    }

    pub fn parse(s: &str) -> Option<MatchOp> {
        match s {
            "<" => Some(MatchOp::Lt),
            "<=" => Some(MatchOp::Le),
            "=" => Some(MatchOp::Eq),
            "!=" => Some(MatchOp::Ne),
            ">=" => Some(MatchOp::Ge),
            ">" => Some(MatchOp::Gt),
            _ => None,
        }
    }
}

/// A single `if_data_matches` predicate: `(data-name[, key], op, literal)`.
#[derive(Debug, Clone)]
pub struct DataMatch {
    pub name: String,
    pub key: Option<String>,
    pub op: MatchOp,
    pub literal: Value,
}

/// A single `if_data_regexes` predicate.
#[derive(Debug, Clone)]
pub struct DataRegex {
    pub name: String,
    pub regex: Regex,
}

/// A router rule: importance, predicates, and the action list it selects.
#[derive(Debug, Clone)]
pub struct EventMatch {
    pub importance: i64,
    pub if_data_keys: Vec<String>,
    pub if_data_matches: Vec<DataMatch>,
    pub if_data_regexes: Vec<DataRegex>,
    pub flag_allow_list: Vec<Flag>,
    pub flag_deny_list: Vec<Flag>,
    action_ids: Vec<String>,
    resolved_actions: Vec<usize>,
}

impl EventMatch {
    fn has_predicates(&self) -> bool {
        !self.if_data_keys.is_empty()
            || !self.if_data_matches.is_empty()
            || !self.if_data_regexes.is_empty()
            || !self.flag_allow_list.is_empty()
            || !self.flag_deny_list.is_empty()
    }

    /// Spec §4.1: all predicates must hold for a match to apply.
    pub fn matches(&self, event: &Event, flags: &FlagSet) -> bool {
        for key in &self.if_data_keys {
            if !event.has_data(key) {
                return false;
            }
        }

        for dm in &self.if_data_matches {
            let Some(stored) = event.get_data(&dm.name) else {
                continue; // absent data name: predicate is skipped (true)
            };
            let value = match &dm.key {
                Some(k) => match stored.get(k) {
                    Some(v) => v,
                    None => return false,
                },
                None => stored,
            };
            match value.compare(&dm.literal) {
                Some(ord) if dm.op.accepts(ord) => {}
                _ => return false,
            }
        }

        for dr in &self.if_data_regexes {
            let Some(stored) = event.get_data(&dr.name) else {
                continue; // absent data name: predicate is skipped (true)
            };
            match stored.as_str() {
                Some(s) if dr.regex.is_match(s) => {}
                _ => return false,
            }
        }

        if !flags.allows(&self.flag_allow_list) {
            return false;
        }
        if !flags.denies(&self.flag_deny_list) {
            return false;
        }

        true
    }

    pub fn resolved_actions(&self) -> &[usize] {
        &self.resolved_actions
    }
}

/// Raw input to [`Router::parse_event_match`], produced by the config
/// loader.
pub struct EventMatchSpec {
    pub importance: Option<i64>,
    pub action_ids: Vec<String>,
    pub if_data_keys: Vec<String>,
    pub if_data_matches: Vec<(String, Option<String>, MatchOp, Value)>,
    /// `(data-name, regex source)` — compiled at parse time; an
    /// uncompilable pattern drops just this one predicate (spec §4.1).
    pub if_data_regexes: Vec<(String, String)>,
    pub flag_allow_list: Vec<String>,
    pub flag_deny_list: Vec<String>,
}

impl EventMatchSpec {
    pub fn new(action_ids: Vec<String>) -> Self {
        Self {
            importance: None,
            action_ids,
            if_data_keys: Vec::new(),
            if_data_matches: Vec::new(),
            if_data_regexes: Vec::new(),
            flag_allow_list: Vec::new(),
            flag_deny_list: Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("malformed event-match header `{0}`: `*` must be the sole second token")]
    MalformedHeader(String),
    #[error("event-match header `{0}` is empty")]
    EmptyHeader(String),
}

enum MatchTarget {
    Exact(String, String),
    CategoryOnly(String),
}

fn parse_header(header: &str) -> Result<MatchTarget, RouterError> {
    let header = header.trim();
    if header.is_empty() {
        return Err(RouterError::EmptyHeader(header.to_string()));
    }
    let mut parts = header.splitn(2, ' ');
    let category = parts.next().unwrap_or_default().to_string();
    match parts.next() {
        None => Ok(MatchTarget::CategoryOnly(category)),
        Some("*") => Ok(MatchTarget::CategoryOnly(category)),
        Some(rest) if rest.contains('*') => Err(RouterError::MalformedHeader(header.to_string())),
        Some(name) => Ok(MatchTarget::Exact(category, name.to_string())),
    }
}

/// The routing table: `"<category> <name>"` and `"<category>"` indices
/// over ascending-importance-sorted [`EventMatch`] lists.
pub struct Router {
    exact: HashMap<String, Vec<EventMatch>>,
    by_category: HashMap<String, Vec<EventMatch>>,
    interner: Arc<FlagInterner>,
}

impl Router {
    pub fn new(interner: Arc<FlagInterner>) -> Self {
        Self { exact: HashMap::new(), by_category: HashMap::new(), interner }
    }

    /// Parse and index one `EventMatch`. `header` is the config group's
    /// pattern (`"<category>"`, `"<category> <name>"`, `"<category> *"`).
    pub fn parse_event_match(&mut self, header: &str, spec: EventMatchSpec) -> Result<(), RouterError> {
        let target = parse_header(header)?;

        let if_data_regexes = spec
            .if_data_regexes
            .into_iter()
            .filter_map(|(name, pattern)| match Regex::new(&pattern) {
                Ok(regex) => Some(DataRegex { name, regex }),
                Err(err) => {
                    tracing::warn!(%name, %pattern, error = %err, "dropping uncompilable regex predicate");
                    None
                }
            })
            .collect();

        let if_data_matches = spec
            .if_data_matches
            .into_iter()
            .map(|(name, key, op, literal)| DataMatch { name, key, op, literal })
            .collect();

        let flag_allow_list: Vec<Flag> =
            spec.flag_allow_list.iter().map(|f| self.interner.intern(f)).collect();
        let flag_deny_list: Vec<Flag> =
            spec.flag_deny_list.iter().map(|f| self.interner.intern(f)).collect();

        let mut entry = EventMatch {
            importance: 0,
            if_data_keys: spec.if_data_keys,
            if_data_matches,
            if_data_regexes,
            flag_allow_list,
            flag_deny_list,
            action_ids: spec.action_ids,
            resolved_actions: Vec::new(),
        };
        entry.importance = spec.importance.unwrap_or_else(|| {
            if entry.has_predicates() { 0 } else { i64::MAX }
        });

        let (key, list) = match target {
            MatchTarget::Exact(cat, name) => (format!("{cat} {name}"), &mut self.exact),
            MatchTarget::CategoryOnly(cat) => (cat, &mut self.by_category),
        };
        let bucket = list.entry(key).or_default();
        let pos = bucket.iter().position(|m| m.importance > entry.importance).unwrap_or(bucket.len());
        bucket.insert(pos, entry);
        Ok(())
    }

    /// Resolve every match's action-ID references against `registry`,
    /// dropping unresolved ones with a warning (spec §4.1).
    pub fn link(&mut self, registry: &crate::action::ActionRegistry) {
        for bucket in self.exact.values_mut().chain(self.by_category.values_mut()) {
            for entry in bucket.iter_mut() {
                entry.resolved_actions = entry
                    .action_ids
                    .iter()
                    .filter_map(|id| match registry.index_of(id) {
                        Some(idx) => Some(idx),
                        None => {
                            tracing::warn!(action = %id, "dropping unresolved action reference in event match");
                            None
                        }
                    })
                    .collect();
            }
        }
    }

    /// Spec §4.1 matching algorithm: exact key first, then category-only,
    /// each evaluated in ascending-importance order.
    pub fn match_event(&self, event: &Event, flags: &FlagSet) -> Option<&[usize]> {
        if let Some(bucket) = self.exact.get(&event.full_key()) {
            if let Some(found) = bucket.iter().find(|m| m.matches(event, flags)) {
                return Some(found.resolved_actions());
            }
        }
        if let Some(bucket) = self.by_category.get(event.category()) {
            if let Some(found) = bucket.iter().find(|m| m.matches(event, flags)) {
                return Some(found.resolved_actions());
            }
        }
        None
    }

    /// Control-channel `dump event <header>` support: describe the
    /// unconditional (predicate-free) entries indexed under `header`,
    /// without needing a live `Event` to match against.
    pub fn match_event_by_header(&self, header: &str) -> Option<String> {
        let bucket = self.exact.get(header).or_else(|| self.by_category.get(header))?;
        if bucket.is_empty() {
            return None;
        }
        let summary = bucket
            .iter()
            .map(|m| format!("importance={} actions={:?}", m.importance, m.resolved_actions()))
            .collect::<Vec<_>>()
            .join("; ");
        Some(summary)
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
