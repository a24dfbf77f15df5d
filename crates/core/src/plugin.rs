// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The plugin capability set.
//!
//! The original exposes a GLib function-vtable per plugin
//! (`EventdPluginInterface`); here a plugin is a value implementing a
//! trait with default (no-op) methods, so an implementor only overrides
//! the capabilities it actually has. The core drives every plugin by this
//! interface — never the other way around.

use crate::action::PluginActionHandle;
use crate::event::Event;
use crate::value::Value;
use async_trait::async_trait;

/// Outcome of a forwarded control-channel command (spec §4.8,
/// `<plugin-id> <args…>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlStatus {
    pub code: u64,
    pub message: Option<String>,
}

impl ControlStatus {
    pub fn ok() -> Self {
        Self { code: 0, message: None }
    }

    pub fn error(code: u64, message: impl Into<String>) -> Self {
        Self { code, message: Some(message.into()) }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("plugin `{plugin}` failed: {message}")]
    Failed { plugin: String, message: String },
}

/// A loadable plugin's capability set.
///
/// Spec §9: "A plugin that supplies `action_parse` must also supply
/// `event_action`; the bootstrap validates this and refuses to load
/// otherwise." That pairing is expressed by [`Plugin::supports_actions`]:
/// a plugin returning `true` promises a non-default `action_parse` *and*
/// `event_action`; the bootstrap checks this at load time (see
/// `evd-daemon::lifecycle::validate_plugin`).
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Stable plugin identifier, used as the config-group prefix and as
    /// the `<plugin-id>` in forwarded control commands.
    fn id(&self) -> &str;

    /// Whether this plugin supplies `action_parse`/`event_action`.
    fn supports_actions(&self) -> bool {
        false
    }

    /// One-time setup after configuration is loaded.
    fn init(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Start the plugin's own background work (sockets, timers, …).
    async fn start(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Stop the plugin. Spec's Open Question: whether `stop` drains
    /// best-effort or cancels in-flight work is a per-plugin decision —
    /// see each adapter's doc comment for the policy it picked.
    async fn stop(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Handle a control-channel command forwarded to this plugin
    /// (`<plugin-id> <args…>`). `None` means "unrecognized command",
    /// mapped by the control channel to `UNKNOWN_COMMAND`.
    fn control_command(&self, _args: &[String]) -> Option<ControlStatus> {
        None
    }

    /// Parse one action's plugin-specific config block into an opaque
    /// handle this plugin will later receive back via `event_action`.
    fn action_parse(&self, _config: &Value) -> Option<PluginActionHandle> {
        None
    }

    /// Informational fan-out: every plugin sees every event that reaches
    /// the dispatcher, independent of routing (spec §4.3's
    /// `plugin_dispatch_all`).
    fn dispatch(&self, _event: &Event) {}

    /// Execute one of this plugin's action handles against `event`.
    async fn event_action(
        &self,
        _handle: &PluginActionHandle,
        _event: &Event,
    ) -> Result<(), PluginError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "plugin_tests.rs"]
mod tests;
