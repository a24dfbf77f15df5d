// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use evd_core::event::Event;
use indexmap::IndexMap;

fn config(command: &str, args: &[&str]) -> Value {
    let mut map = IndexMap::new();
    map.insert("command".to_string(), Value::Str(command.to_string()));
    map.insert("args".to_string(), Value::Array(args.iter().map(|a| Value::Str(a.to_string())).collect()));
    Value::Map(map)
}

#[tokio::test]
async fn event_action_runs_the_configured_command_with_rendered_args() {
    let plugin = ExecPlugin::new();
    let handle = plugin.action_parse(&config("true", &["${category}"])).unwrap();
    let event = Event::builder("app", "started").build();

    assert!(plugin.event_action(&handle, &event).await.is_ok());
}

#[tokio::test]
async fn event_action_logs_but_does_not_error_on_non_zero_exit() {
    let plugin = ExecPlugin::new();
    let handle = plugin.action_parse(&config("false", &[])).unwrap();
    let event = Event::builder("app", "started").build();

    assert!(plugin.event_action(&handle, &event).await.is_ok());
}

#[test]
fn action_parse_rejects_missing_command() {
    let plugin = ExecPlugin::new();
    let mut map = IndexMap::new();
    map.insert("args".to_string(), Value::Array(vec![]));
    assert!(plugin.action_parse(&Value::Map(map)).is_none());
}

#[test]
fn action_parse_rejects_bad_argument_template() {
    let plugin = ExecPlugin::new();
    assert!(plugin.action_parse(&config("true", &["${unterminated"])).is_none());
}
