// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::dispatcher::Dispatcher;
use async_trait::async_trait;
use evd_core::action::{Action, ActionRegistry};
use evd_core::flags::FlagInterner;
use evd_core::plugin::{ControlStatus, Plugin, PluginError};
use evd_core::router::{EventMatchSpec, Router};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct EchoPlugin {
    stopped: Arc<AtomicBool>,
    started: Arc<AtomicBool>,
    order: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl Plugin for EchoPlugin {
    fn id(&self) -> &str {
        "echo"
    }

    async fn start(&self) -> Result<(), PluginError> {
        self.started.store(true, Ordering::SeqCst);
        self.order.lock().push("start");
        Ok(())
    }

    async fn stop(&self) -> Result<(), PluginError> {
        self.stopped.store(true, Ordering::SeqCst);
        self.order.lock().push("stop");
        Ok(())
    }

    fn control_command(&self, args: &[String]) -> Option<ControlStatus> {
        match args {
            [cmd] if cmd == "ping" => Some(ControlStatus::ok()),
            _ => None,
        }
    }
}

fn make_dispatcher(stopped: Arc<AtomicBool>) -> Dispatcher {
    make_dispatcher_with_started(stopped, Arc::new(AtomicBool::new(false)))
}

fn make_dispatcher_with_started(stopped: Arc<AtomicBool>, started: Arc<AtomicBool>) -> Dispatcher {
    make_dispatcher_full(stopped, started, Arc::new(Mutex::new(Vec::new())))
}

fn make_dispatcher_full(
    stopped: Arc<AtomicBool>,
    started: Arc<AtomicBool>,
    order: Arc<Mutex<Vec<&'static str>>>,
) -> Dispatcher {
    let interner = Arc::new(FlagInterner::new());
    let mut router = Router::new(interner.clone());
    router.parse_event_match("app notify", EventMatchSpec::new(vec!["noop".to_string()])).unwrap();
    let mut registry = ActionRegistry::new();
    registry.insert(Action::new("noop"));
    router.link(&registry);
    let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(EchoPlugin { stopped, started, order })];
    Dispatcher::new(router, registry, interner, plugins)
}

#[tokio::test]
async fn start_is_a_silent_noop() {
    let mut dispatcher = make_dispatcher(Arc::new(AtomicBool::new(false)));
    let shutdown = CancellationToken::new();
    let response = handle(&mut dispatcher, &["start".to_string()], &shutdown).await;
    assert_eq!(response.code, OK);
    assert!(response.message.is_none());
    assert!(!shutdown.is_cancelled());
}

#[tokio::test]
async fn stop_drains_plugins_then_cancels_the_shutdown_token() {
    let stopped = Arc::new(AtomicBool::new(false));
    let mut dispatcher = make_dispatcher(stopped.clone());
    let shutdown = CancellationToken::new();
    let response = handle(&mut dispatcher, &["stop".to_string()], &shutdown).await;
    assert_eq!(response.code, OK);
    assert!(stopped.load(Ordering::SeqCst));
    assert!(shutdown.is_cancelled());
}

#[tokio::test]
async fn reload_stops_then_starts_every_plugin() {
    let stopped = Arc::new(AtomicBool::new(false));
    let started = Arc::new(AtomicBool::new(false));
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut dispatcher = make_dispatcher_full(stopped.clone(), started.clone(), order.clone());
    let shutdown = CancellationToken::new();
    let response = handle(&mut dispatcher, &["reload".to_string()], &shutdown).await;
    assert_eq!(response.code, OK);
    assert!(stopped.load(Ordering::SeqCst));
    assert!(started.load(Ordering::SeqCst));
    assert_eq!(*order.lock(), vec!["stop", "start"]);
    assert!(!shutdown.is_cancelled());
}

#[tokio::test]
async fn version_reports_the_package_version() {
    let mut dispatcher = make_dispatcher(Arc::new(AtomicBool::new(false)));
    let shutdown = CancellationToken::new();
    let response = handle(&mut dispatcher, &["version".to_string()], &shutdown).await;
    assert_eq!(response.code, OK);
    assert!(response.message.unwrap().starts_with("evd "));
}

#[tokio::test]
async fn dump_event_reports_a_known_header_and_errors_on_an_unknown_one() {
    let mut dispatcher = make_dispatcher(Arc::new(AtomicBool::new(false)));
    let shutdown = CancellationToken::new();

    let ok_resp = handle(
        &mut dispatcher,
        &["dump".to_string(), "event".to_string(), "app notify".to_string()],
        &shutdown,
    )
    .await;
    assert_eq!(ok_resp.code, OK);

    let err_resp = handle(
        &mut dispatcher,
        &["dump".to_string(), "event".to_string(), "nope".to_string()],
        &shutdown,
    )
    .await;
    assert_eq!(err_resp.code, COMMAND_ERROR);
}

#[tokio::test]
async fn dump_action_reports_a_known_id_and_errors_on_an_unknown_one() {
    let mut dispatcher = make_dispatcher(Arc::new(AtomicBool::new(false)));
    let shutdown = CancellationToken::new();

    let ok_resp = handle(
        &mut dispatcher,
        &["dump".to_string(), "action".to_string(), "noop".to_string()],
        &shutdown,
    )
    .await;
    assert_eq!(ok_resp.code, OK);

    let err_resp = handle(
        &mut dispatcher,
        &["dump".to_string(), "action".to_string(), "nope".to_string()],
        &shutdown,
    )
    .await;
    assert_eq!(err_resp.code, COMMAND_ERROR);
}

#[tokio::test]
async fn flags_add_test_remove_round_trip() {
    let mut dispatcher = make_dispatcher(Arc::new(AtomicBool::new(false)));
    let shutdown = CancellationToken::new();

    let add = handle(
        &mut dispatcher,
        &["flags".to_string(), "add".to_string(), "night".to_string()],
        &shutdown,
    )
    .await;
    assert_eq!(add.code, OK);

    let test_yes = handle(
        &mut dispatcher,
        &["flags".to_string(), "test".to_string(), "night".to_string()],
        &shutdown,
    )
    .await;
    assert_eq!(test_yes.code, OK);
    assert_eq!(test_yes.message.as_deref(), Some("yes"));

    let remove = handle(
        &mut dispatcher,
        &["flags".to_string(), "remove".to_string(), "night".to_string()],
        &shutdown,
    )
    .await;
    assert_eq!(remove.code, OK);

    let test_no = handle(
        &mut dispatcher,
        &["flags".to_string(), "test".to_string(), "night".to_string()],
        &shutdown,
    )
    .await;
    assert_eq!(test_no.code, FLAG_TEST_NO);
}

#[tokio::test]
async fn flags_list_reports_active_flags() {
    let mut dispatcher = make_dispatcher(Arc::new(AtomicBool::new(false)));
    let shutdown = CancellationToken::new();
    handle(&mut dispatcher, &["flags".to_string(), "add".to_string(), "night".to_string()], &shutdown).await;
    let response = handle(&mut dispatcher, &["flags".to_string(), "list".to_string()], &shutdown).await;
    assert_eq!(response.message.as_deref(), Some("night"));
}

#[tokio::test]
async fn flags_reset_clears_all_flags() {
    let mut dispatcher = make_dispatcher(Arc::new(AtomicBool::new(false)));
    let shutdown = CancellationToken::new();
    handle(&mut dispatcher, &["flags".to_string(), "add".to_string(), "night".to_string()], &shutdown).await;
    handle(&mut dispatcher, &["flags".to_string(), "reset".to_string()], &shutdown).await;
    let response = handle(&mut dispatcher, &["flags".to_string(), "list".to_string()], &shutdown).await;
    assert_eq!(response.message.as_deref(), Some(""));
}

#[tokio::test]
async fn unknown_plugin_is_rejected() {
    let mut dispatcher = make_dispatcher(Arc::new(AtomicBool::new(false)));
    let shutdown = CancellationToken::new();
    let response = handle(&mut dispatcher, &["ghost".to_string(), "ping".to_string()], &shutdown).await;
    assert_eq!(response.code, UNKNOWN_PLUGIN);
}

#[tokio::test]
async fn a_known_plugin_command_is_forwarded() {
    let mut dispatcher = make_dispatcher(Arc::new(AtomicBool::new(false)));
    let shutdown = CancellationToken::new();
    let response = handle(&mut dispatcher, &["echo".to_string(), "ping".to_string()], &shutdown).await;
    assert_eq!(response.code, OK);
}

#[tokio::test]
async fn an_unknown_plugin_command_reports_unknown_command() {
    let mut dispatcher = make_dispatcher(Arc::new(AtomicBool::new(false)));
    let shutdown = CancellationToken::new();
    let response = handle(&mut dispatcher, &["echo".to_string(), "blargh".to_string()], &shutdown).await;
    assert_eq!(response.code, UNKNOWN_COMMAND);
}
