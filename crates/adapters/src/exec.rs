// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `exec` plugin: spawns a configured command per triggered action,
//! with each argument rendered against the event through the same
//! [`Format`] engine the `file` and notify bridges use. Fire-and-forget:
//! the child's exit status is logged, never propagated, matching the
//! original's "exec is an external side effect, not a pipeline stage"
//! treatment.

use async_trait::async_trait;
use evd_core::action::PluginActionHandle;
use evd_core::event::Event;
use evd_core::format::Format;
use evd_core::plugin::{Plugin, PluginError};
use evd_core::value::Value;
use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("`exec` action config missing required `command`")]
    MissingCommand,
    #[error("`exec` action config has a malformed argument template: {0}")]
    BadTemplate(#[from] evd_core::format::FormatError),
}

#[derive(Debug, Clone)]
struct ExecActionConfig {
    command: String,
    args: Vec<Format>,
}

#[derive(Debug, Default)]
pub struct ExecPlugin;

impl ExecPlugin {
    pub fn new() -> Self {
        Self
    }

    fn parse_config(config: &Value) -> Result<ExecActionConfig, ExecError> {
        let command = config.get("command").and_then(Value::as_str).ok_or(ExecError::MissingCommand)?.to_string();
        let raw_args = match config.get("args") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
            _ => Vec::new(),
        };
        let args = raw_args.iter().map(|a: &String| Format::parse(a)).collect::<Result<Vec<_>, _>>()?;
        Ok(ExecActionConfig { command, args })
    }
}

#[async_trait]
impl Plugin for ExecPlugin {
    fn id(&self) -> &str {
        "exec"
    }

    fn supports_actions(&self) -> bool {
        true
    }

    fn action_parse(&self, config: &Value) -> Option<PluginActionHandle> {
        match Self::parse_config(config) {
            Ok(_) => Some(PluginActionHandle::new(self.id(), config.clone())),
            Err(error) => {
                tracing::warn!(%error, "dropping malformed `exec` action");
                None
            }
        }
    }

    async fn event_action(&self, handle: &PluginActionHandle, event: &Event) -> Result<(), PluginError> {
        let config = Self::parse_config(handle.config()).map_err(|error| PluginError::Failed {
            plugin: self.id().to_string(),
            message: error.to_string(),
        })?;

        let mut data = event.data().clone();
        data.entry("category".to_string()).or_insert_with(|| Value::Str(event.category().to_string()));
        data.entry("name".to_string()).or_insert_with(|| Value::Str(event.name().to_string()));
        let rendered_args: Vec<String> = config.args.iter().map(|fmt| fmt.render(&data)).collect();

        let status = Command::new(&config.command)
            .args(&rendered_args)
            .status()
            .await
            .map_err(|error| PluginError::Failed { plugin: self.id().to_string(), message: error.to_string() })?;

        if !status.success() {
            tracing::warn!(command = %config.command, ?status, "exec action exited non-zero");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
