// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `sound` plugin: a stub leaf adapter. The original's `sound` plugin
//! decodes and mixes audio through PulseAudio/libcanberra; reproducing that
//! pipeline is out of scope here (SPEC_FULL.md names `sound-stub`), so this
//! adapter only validates its config and logs what it would have played.

use async_trait::async_trait;
use evd_core::action::PluginActionHandle;
use evd_core::event::Event;
use evd_core::plugin::{Plugin, PluginError};
use evd_core::value::Value;

#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("`sound` action config missing required `file`")]
    MissingFile,
}

#[derive(Debug, Default)]
pub struct SoundStubPlugin;

impl SoundStubPlugin {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for SoundStubPlugin {
    fn id(&self) -> &str {
        "sound"
    }

    fn supports_actions(&self) -> bool {
        true
    }

    fn action_parse(&self, config: &Value) -> Option<PluginActionHandle> {
        if config.get("file").and_then(Value::as_str).is_none() {
            tracing::warn!(error = %SoundError::MissingFile, "dropping malformed `sound` action");
            return None;
        }
        Some(PluginActionHandle::new(self.id(), config.clone()))
    }

    async fn event_action(&self, handle: &PluginActionHandle, event: &Event) -> Result<(), PluginError> {
        let file = handle.config().get("file").and_then(Value::as_str).unwrap_or("<unknown>");
        tracing::info!(file, category = event.category(), name = event.name(), "would play sound (stub)");
        Ok(())
    }
}

#[cfg(test)]
#[path = "sound_tests.rs"]
mod tests;
