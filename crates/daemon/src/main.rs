// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `evdd`: the event-dispatching daemon binary. Loads a config file path
//! from argv (or `EVD_CONFIG`, defaulting to `/etc/evd/evd.conf`),
//! bootstraps [`evd_daemon::lifecycle`], and runs until a control-channel
//! `stop` or a process signal shuts it down.

use std::path::PathBuf;
use std::process::ExitCode;

fn config_path() -> PathBuf {
    if let Some(arg) = std::env::args().nth(1) {
        return PathBuf::from(arg);
    }
    if let Ok(env_path) = std::env::var("EVD_CONFIG") {
        return PathBuf::from(env_path);
    }
    PathBuf::from("/etc/evd/evd.conf")
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if rustls::crypto::CryptoProvider::install_default(rustls::crypto::ring::default_provider()).is_err() {
        tracing::debug!("a rustls crypto provider was already installed");
    }

    let path = config_path();
    let daemon = match evd_daemon::lifecycle::bootstrap(&path).await {
        Ok(daemon) => daemon,
        Err(err) => {
            tracing::error!(config = %path.display(), error = %err, "failed to bootstrap evd");
            return ExitCode::FAILURE;
        }
    };

    daemon.run().await;
    ExitCode::SUCCESS
}
