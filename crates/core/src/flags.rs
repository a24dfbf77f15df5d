// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide interned flag tokens.
//!
//! The original implementation uses `GQuark`, GLib's interned-string
//! handle: a flag compares by pointer, not by string contents. We get the
//! same property with an `Arc<str>` interner — two `Flag`s for the same
//! text are `Arc::ptr_eq`, so [`FlagSet`] membership tests are pointer
//! comparisons rather than string comparisons.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// An interned flag token. Cheap to clone and compare.
#[derive(Debug, Clone, Eq)]
pub struct Flag(Arc<str>);

impl Flag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Flag {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl std::hash::Hash for Flag {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Process-wide string interner for flag tokens.
#[derive(Default)]
pub struct FlagInterner {
    table: Mutex<HashSet<Arc<str>>>,
}

impl FlagInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning the same backing allocation for repeat calls.
    pub fn intern(&self, name: &str) -> Flag {
        let mut table = self.table.lock();
        if let Some(existing) = table.get(name) {
            return Flag(Arc::clone(existing));
        }
        let arc: Arc<str> = Arc::from(name);
        table.insert(Arc::clone(&arc));
        Flag(arc)
    }
}

/// Process-wide ordered set of active flags.
///
/// Insertion order is preserved (matches the original's `GQuark` array
/// semantics) with set semantics on add.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    order: Vec<Flag>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, flag: &Flag) -> bool {
        self.order.contains(flag)
    }

    pub fn add(&mut self, flag: Flag) {
        if !self.order.contains(&flag) {
            self.order.push(flag);
        }
    }

    pub fn remove(&mut self, flag: &Flag) {
        self.order.retain(|f| f != flag);
    }

    pub fn reset(&mut self) {
        self.order.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every flag in `required` must be present.
    pub fn allows(&self, required: &[Flag]) -> bool {
        required.iter().all(|f| self.contains(f))
    }

    /// None of the flags in `forbidden` may be present.
    pub fn denies(&self, forbidden: &[Flag]) -> bool {
        !forbidden.iter().any(|f| self.contains(f))
    }
}

#[cfg(test)]
#[path = "flags_tests.rs"]
mod tests;
