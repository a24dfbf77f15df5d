// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment/default access for the daemon crate
//! (SPEC_FULL.md §6: control socket under `XDG_RUNTIME_DIR`, TCP service
//! default port).

use std::path::PathBuf;
use std::time::Duration;

/// `eventd`'s legacy assigned TCP port, kept as our default.
pub const DEFAULT_BIND_PORT: u16 = 8271;

/// Default keepalive interval for both accepted sessions and relay peers.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("could not determine a runtime directory (XDG_RUNTIME_DIR and HOME both unset)")]
    NoRuntimeDir,
}

/// `$XDG_RUNTIME_DIR/evd`, falling back to `~/.cache/evd` when unset
/// (matching the teacher's `dirs`-crate fallback chain for its own state
/// directory).
pub fn runtime_dir() -> Result<PathBuf, EnvError> {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        return Ok(PathBuf::from(dir).join("evd"));
    }
    dirs::cache_dir().map(|dir| dir.join("evd")).ok_or(EnvError::NoRuntimeDir)
}

/// Control socket path: `$XDG_RUNTIME_DIR/evd/private`.
pub fn control_socket_path() -> Result<PathBuf, EnvError> {
    Ok(runtime_dir()?.join("private"))
}

/// TCP bind port, overridable via `EVD_BIND_PORT`.
pub fn bind_port() -> u16 {
    std::env::var("EVD_BIND_PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_BIND_PORT)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
