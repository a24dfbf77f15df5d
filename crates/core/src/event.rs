// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Event` value: an immutable-after-build `(uuid, category, name,
//! timeout, data)` tuple dispatched by a producer.

use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event pushed into the dispatcher.
///
/// Immutable once built: the producer (a local action caller, the protocol
/// parser, or a relay receiver) adds all data during construction via
/// [`EventBuilder`]; after that the event is read-only for the rest of its
/// lifetime (router matching, action triggering, wire encoding).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    uuid: Uuid,
    category: String,
    name: String,
    /// Milliseconds; `<= 0` means "no timeout".
    timeout: i64,
    data: IndexMap<String, Value>,
}

impl Event {
    pub fn builder(category: impl Into<String>, name: impl Into<String>) -> EventBuilder {
        EventBuilder::new(category, name)
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timeout(&self) -> i64 {
        self.timeout
    }

    pub fn data(&self) -> &IndexMap<String, Value> {
        &self.data
    }

    pub fn has_data(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Internal lifecycle events are marked by a leading `.` on the
    /// category and bypass the router (spec §4.3).
    pub fn is_internal(&self) -> bool {
        self.category.starts_with('.')
    }

    /// The router's full key: `"<category> <name>"`.
    pub fn full_key(&self) -> String {
        format!("{} {}", self.category, self.name)
    }
}

/// Builder for [`Event`]; the only place event data may be added.
pub struct EventBuilder {
    uuid: Uuid,
    category: String,
    name: String,
    timeout: i64,
    data: IndexMap<String, Value>,
}

impl EventBuilder {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            category: category.into(),
            name: name.into(),
            timeout: 0,
            data: IndexMap::new(),
        }
    }

    /// Override the generated UUID — used when re-constructing an `Event`
    /// received over the wire, which already carries its producer's UUID.
    pub fn uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = uuid;
        self
    }

    pub fn timeout(mut self, timeout: i64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Event {
        Event {
            uuid: self.uuid,
            category: self.category,
            name: self.name,
            timeout: self.timeout,
            data: self.data,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
