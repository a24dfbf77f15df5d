// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The control-channel command table (spec §4.8), grounded on
//! `original_source/server/eventd/src/control.c`'s
//! `_eventd_service_private_connection_handler` dispatch chain.
//!
//! Commands: `start` (noop), `stop` (deferred — awaits every plugin's
//! `stop()` before responding and signalling the loop to quit), `reload`
//! (stops then restarts every plugin, in that order; the lifecycle loop
//! additionally re-reads the config file and swaps in the rebuilt router
//! and action table around this call — see
//! `evd_daemon::lifecycle::Daemon::run`), `version`, `dump event <header>`,
//! `dump action <id>`, `flags add|remove|test|reset|list [flag]`, and the
//! `<plugin-id> <args…>` forwarding path that tries a loaded plugin's own
//! `control_command` before failing `UNKNOWN_COMMAND`.

use crate::dispatcher::Dispatcher;
use evd_core::flags::Flag;
use evd_wire::control::ControlResponse;
use tokio_util::sync::CancellationToken;

const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const OK: u64 = 0;
pub const COMMAND_ERROR: u64 = 1;
pub const UNKNOWN_COMMAND: u64 = 20;
pub const UNKNOWN_PLUGIN: u64 = 21;
const FLAG_TEST_NO: u64 = 30;

fn ok(message: impl Into<String>) -> ControlResponse {
    ControlResponse { code: OK, message: Some(message.into()) }
}

fn ok_silent() -> ControlResponse {
    ControlResponse { code: OK, message: None }
}

fn error(code: u64, message: impl Into<String>) -> ControlResponse {
    ControlResponse { code, message: Some(message.into()) }
}

/// Handle one control-channel request. `shutdown` is cancelled once
/// `stop` has finished draining every plugin, signalling the owning
/// lifecycle loop to exit.
pub async fn handle(dispatcher: &mut Dispatcher, argv: &[String], shutdown: &CancellationToken) -> ControlResponse {
    let Some(command) = argv.first() else {
        return error(COMMAND_ERROR, "missing command");
    };

    match command.as_str() {
        "start" => ok_silent(),
        "stop" => {
            for plugin in dispatcher.plugins() {
                if let Err(err) = plugin.stop().await {
                    tracing::warn!(error = %err, "plugin failed to stop cleanly");
                }
            }
            shutdown.cancel();
            ok_silent()
        }
        "reload" => {
            for plugin in dispatcher.plugins() {
                if let Err(err) = plugin.stop().await {
                    tracing::warn!(error = %err, "plugin failed to stop cleanly during reload");
                }
            }
            for plugin in dispatcher.plugins() {
                if let Err(err) = plugin.start().await {
                    tracing::warn!(error = %err, "plugin failed to start cleanly during reload");
                }
            }
            ok_silent()
        }
        "version" => ok(format!("evd {PKG_VERSION}")),
        "dump" => dump(dispatcher, &argv[1..]),
        "flags" => flags(dispatcher, &argv[1..]),
        plugin_id => forward(dispatcher, plugin_id, &argv[1..]),
    }
}

fn dump(dispatcher: &Dispatcher, args: &[String]) -> ControlResponse {
    match args {
        [] => error(COMMAND_ERROR, "missing dump command"),
        [kind, header] if kind == "event" => match dispatcher.router().match_event_by_header(header) {
            Some(summary) => ok(summary),
            None => error(COMMAND_ERROR, format!("unknown event '{header}'")),
        },
        [kind] if kind == "event" => error(COMMAND_ERROR, "missing event"),
        [kind, id] if kind == "action" => match dispatcher.registry().get(id) {
            Some(action) => ok(format!("{action:?}")),
            None => error(COMMAND_ERROR, format!("unknown action '{id}'")),
        },
        [kind] if kind == "action" => error(COMMAND_ERROR, "missing action"),
        _ => error(COMMAND_ERROR, "unknown dump command"),
    }
}

fn flags(dispatcher: &mut Dispatcher, args: &[String]) -> ControlResponse {
    match args {
        [] => error(COMMAND_ERROR, "missing flags command"),
        [cmd, flag_name] if cmd == "add" => {
            let flag = dispatcher.intern_flag(flag_name);
            dispatcher.flags_mut().add(flag);
            ok_silent()
        }
        [cmd] if cmd == "add" => error(COMMAND_ERROR, "missing flag"),
        [cmd, flag_name] if cmd == "remove" => {
            let flag = dispatcher.intern_flag(flag_name);
            dispatcher.flags_mut().remove(&flag);
            ok_silent()
        }
        [cmd] if cmd == "remove" => error(COMMAND_ERROR, "missing flag"),
        [cmd, flag_name] if cmd == "test" => {
            let flag = dispatcher.intern_flag(flag_name);
            if dispatcher.flags().contains(&flag) {
                ok("yes")
            } else {
                error(FLAG_TEST_NO, "no")
            }
        }
        [cmd] if cmd == "test" => error(COMMAND_ERROR, "missing flag"),
        [cmd] if cmd == "reset" => {
            dispatcher.flags_mut().reset();
            ok_silent()
        }
        [cmd] if cmd == "list" => {
            let names: Vec<&str> = dispatcher.flags().iter().map(Flag::as_str).collect();
            ok(names.join(";"))
        }
        [cmd, ..] => error(COMMAND_ERROR, format!("unknown command '{cmd}'")),
    }
}

fn forward(dispatcher: &Dispatcher, plugin_id: &str, args: &[String]) -> ControlResponse {
    let Some(plugin) = dispatcher.plugins().iter().find(|p| p.id() == plugin_id) else {
        return error(UNKNOWN_PLUGIN, format!("unknown plugin '{plugin_id}'"));
    };
    match plugin.control_command(args) {
        Some(status) => ControlResponse::from(status),
        None => error(UNKNOWN_COMMAND, format!("unknown command for plugin '{plugin_id}'")),
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
