// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `evdctl`: a thin control-channel client. Out of scope per spec.md but
//! carried as ambient stack — it sends one argv request over the control
//! socket and prints the daemon's response, nothing more.

use clap::Parser;
use evd_wire::control::{read_response, write_request, ControlRequest};
use std::process::ExitCode;
use tokio::net::UnixStream;

#[derive(Debug, Parser)]
#[command(name = "evdctl", about = "Send a control command to a running evd daemon")]
struct Cli {
    /// Command and arguments, forwarded verbatim to the daemon's control
    /// channel (e.g. `evdctl version`, `evdctl flags list`).
    #[arg(required = true, trailing_var_arg = true)]
    argv: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let socket_path = match evd_daemon::env::control_socket_path() {
        Ok(path) => path,
        Err(err) => {
            eprintln!("evdctl: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut stream = match UnixStream::connect(&socket_path).await {
        Ok(stream) => stream,
        Err(err) => {
            eprintln!("evdctl: connecting to {}: {err}", socket_path.display());
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = write_request(&mut stream, &ControlRequest::new(cli.argv)).await {
        eprintln!("evdctl: sending request: {err}");
        return ExitCode::FAILURE;
    }

    match read_response(&mut stream).await {
        Ok(response) => {
            if let Some(message) = &response.message {
                println!("{message}");
            }
            if response.code == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(response.code.min(u64::from(u8::MAX)) as u8)
            }
        }
        Err(err) => {
            eprintln!("evdctl: reading response: {err}");
            ExitCode::FAILURE
        }
    }
}
