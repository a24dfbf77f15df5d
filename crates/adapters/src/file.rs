// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `file` plugin: appends a formatted line per triggered action to a
//! configured path, creating it if missing. Grounded on the original's
//! `exec`/`file`-style leaf plugins, which all reduce to "render a
//! [`Format`] template against the event and hand the bytes to an I/O
//! sink" — here the sink is an append-mode file instead of a pipe.

use async_trait::async_trait;
use evd_core::action::PluginActionHandle;
use evd_core::event::Event;
use evd_core::format::Format;
use evd_core::plugin::{Plugin, PluginError};
use evd_core::value::Value;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("`file` action config missing required `path`")]
    MissingPath,
    #[error("`file` action config has a malformed `line` template: {0}")]
    BadTemplate(#[from] evd_core::format::FormatError),
}

#[derive(Debug, Clone)]
struct FileActionConfig {
    path: String,
    line: Format,
}

#[derive(Debug, Default)]
pub struct FileAppendPlugin;

impl FileAppendPlugin {
    pub fn new() -> Self {
        Self
    }

    fn parse_config(config: &Value) -> Result<FileActionConfig, FileError> {
        let path = config.get("path").and_then(Value::as_str).ok_or(FileError::MissingPath)?.to_string();
        let template = config.get("line").and_then(Value::as_str).unwrap_or("${category} ${name}");
        let line = Format::parse(template)?;
        Ok(FileActionConfig { path, line })
    }
}

#[async_trait]
impl Plugin for FileAppendPlugin {
    fn id(&self) -> &str {
        "file"
    }

    fn supports_actions(&self) -> bool {
        true
    }

    fn action_parse(&self, config: &Value) -> Option<PluginActionHandle> {
        match Self::parse_config(config) {
            Ok(_) => Some(PluginActionHandle::new(self.id(), config.clone())),
            Err(error) => {
                tracing::warn!(%error, "dropping malformed `file` action");
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
        let rendered = config.line.render(&data);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)
            .await
            .map_err(|error| PluginError::Failed { plugin: self.id().to_string(), message: error.to_string() })?;
        file.write_all(rendered.as_bytes())
            .await
            .map_err(|error| PluginError::Failed { plugin: self.id().to_string(), message: error.to_string() })?;
        file.write_all(b"\n")
            .await
            .map_err(|error| PluginError::Failed { plugin: self.id().to_string(), message: error.to_string() })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
