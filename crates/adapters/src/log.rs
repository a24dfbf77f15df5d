// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `log` plugin: the simplest legitimate [`Plugin`] impl, logging
//! every triggered action via `tracing`. Minimal by design (spec
//! Non-goal: leaf-action bodies are thin glue, not full feature parity).

use async_trait::async_trait;
use evd_core::action::PluginActionHandle;
use evd_core::event::Event;
use evd_core::plugin::{Plugin, PluginError};
use evd_core::value::Value;

#[derive(Debug, Default)]
pub struct LogPlugin;

impl LogPlugin {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for LogPlugin {
    fn id(&self) -> &str {
        "log"
    }

    fn supports_actions(&self) -> bool {
        true
    }

    fn action_parse(&self, config: &Value) -> Option<PluginActionHandle> {
        Some(PluginActionHandle::new(self.id(), config.clone()))
    }

    async fn event_action(&self, handle: &PluginActionHandle, event: &Event) -> Result<(), PluginError> {
        let level = handle.config().get("level").and_then(Value::as_str).unwrap_or("info");
        match level {
            "warn" => tracing::warn!(category = event.category(), name = event.name(), "event"),
            "error" => tracing::error!(category = event.category(), name = event.name(), "event"),
            _ => tracing::info!(category = event.category(), name = event.name(), "event"),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
