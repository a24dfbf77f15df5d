// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The parsed keyfile document: an ordered list of groups, each an
//! ordered list of raw key/value entries.

use indexmap::IndexMap;

/// One `[Header]` stanza's raw entries, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    entries: IndexMap<String, String>,
}

impl Group {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Split a `;`-separated value into its list elements. Absent keys
    /// yield an empty list, matching the original's
    /// `g_key_file_get_string_list` on a missing key.
    pub fn get_list(&self, key: &str) -> Vec<&str> {
        self.get(key).map(|v| v.split(';').filter(|s| !s.is_empty()).collect()).unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn merge_from(&mut self, other: &Group) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }
}

/// A fully parsed config file: an ordered sequence of `(header, group)`
/// pairs. Headers are the dequoted literal text (`"app"`, `"app ping"`,
/// `"app *"`, `"File"`), so a header can be handed straight to
/// `evd_core::router::Router::parse_event_match`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    groups: Vec<(String, Group)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_group(&mut self, header: String, group: Group) {
        self.groups.push((header, group));
    }

    /// First group matching `header`, if any.
    pub fn get(&self, header: &str) -> Option<&Group> {
        self.groups.iter().find(|(h, _)| h == header).map(|(_, g)| g)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Group)> {
        self.groups.iter().map(|(h, g)| (h.as_str(), g))
    }

    /// Overlay `self`'s groups on top of `base`: `base`'s groups are kept,
    /// `self`'s groups merge into (or append onto) the base's by header,
    /// entry by entry, so a child can override one key without losing
    /// its parent's others (spec §6 `[File] Extends=` semantics).
    pub fn merge_onto(self, mut base: Document) -> Document {
        for (header, group) in self.groups {
            match base.groups.iter_mut().find(|(h, _)| *h == header) {
                Some((_, existing)) => existing.merge_from(&group),
                None => base.groups.push((header, group)),
            }
        }
        base
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
