// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `notify` plugin: bridges triggered actions into
//! [`evd_notify::Compositor`] and mirrors dismissals back into the
//! dispatcher as synthetic `.notification dismiss` events.
//!
//! Grounded on `crates/adapters/src/notify.rs`'s `NotifyAdapter` trait and
//! `DesktopNotifyAdapter`/`FakeNotifyAdapter` pair, recast as a concrete
//! [`Plugin`] since this codebase's plugin capability set is `Plugin`
//! itself rather than a narrow per-concern trait. Spec §4.7/§9: "the
//! pattern of the compositor emitting `.notification dismiss/timeout`
//! events into the dispatcher ... is load-bearing" — this plugin is where
//! that emission actually happens, since `Compositor` itself never calls
//! back into the core except through `BackendAdapter`'s measurement/draw
//! callbacks.

use async_trait::async_trait;
use evd_core::action::PluginActionHandle;
use evd_core::event::Event;
use evd_core::plugin::{ControlStatus, Plugin, PluginError};
use evd_core::value::Value;
use evd_notify::{BackendAdapter, Compositor, DismissTarget};
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

const DEFAULT_QUEUE: &str = "default";

pub struct NotifyBridgePlugin<B: BackendAdapter> {
    compositor: Mutex<Compositor<B>>,
    events: UnboundedSender<Event>,
}

impl<B: BackendAdapter> NotifyBridgePlugin<B> {
    pub fn new(compositor: Compositor<B>, events: UnboundedSender<Event>) -> Self {
        Self { compositor: Mutex::new(compositor), events }
    }

    fn queue_name(config: &Value) -> &str {
        config.get("queue").and_then(Value::as_str).unwrap_or(DEFAULT_QUEUE)
    }

    fn emit_dismiss(&self, ids: &[Uuid]) {
        for id in ids {
            let event = Event::builder(".notification", "dismiss").data("source-event", id.to_string()).build();
            if self.events.send(event).is_err() {
                tracing::warn!("dropping synthetic .notification dismiss event: dispatcher channel closed");
            }
        }
    }

    /// Dismiss against `queue_name` per `target`, emitting one synthetic
    /// `.notification dismiss` event per notification removed.
    /// `target == DismissTarget::AllQueues` ignores `queue_name` and
    /// spans every queue the compositor owns.
    pub fn dismiss(&self, queue_name: &str, target: DismissTarget) -> usize {
        let mut compositor = self.compositor.lock();
        let ids = compositor.ids_for(queue_name, target);
        let removed = compositor.dismiss_target(queue_name, target);
        drop(compositor);
        self.emit_dismiss(&ids);
        removed
    }
}

#[async_trait]
impl<B: BackendAdapter + 'static> Plugin for NotifyBridgePlugin<B> {
    fn id(&self) -> &str {
        "notify"
    }

    fn supports_actions(&self) -> bool {
        true
    }

    fn action_parse(&self, config: &Value) -> Option<PluginActionHandle> {
        Some(PluginActionHandle::new(self.id(), config.clone()))
    }

    async fn event_action(&self, handle: &PluginActionHandle, event: &Event) -> Result<(), PluginError> {
        let queue_name = Self::queue_name(handle.config()).to_string();
        self.compositor.lock().new_notification(&queue_name, event.clone());
        Ok(())
    }

    /// Forwarded control command `notify dismiss <queue> <target>`
    /// (spec §4.8's `<plugin-id> <args…>` path), where `<target>` is
    /// `all`, `none`, `oldest`, `newest`, or a notification uuid. Passing
    /// `*` as `<queue>` with `all` dismisses across every queue.
    fn control_command(&self, args: &[String]) -> Option<ControlStatus> {
        let [cmd, queue, which] = args else {
            return Some(ControlStatus::error(1, "usage: notify dismiss <queue|*> <all|none|oldest|newest|uuid>"));
        };
        if cmd != "dismiss" {
            return None;
        }
        let target = match which.as_str() {
            "all" if queue == "*" => DismissTarget::AllQueues,
            "all" => DismissTarget::All,
            "none" => DismissTarget::None,
            "oldest" => DismissTarget::Oldest,
            "newest" => DismissTarget::Newest,
            _ => match which.parse::<Uuid>() {
                Ok(id) => DismissTarget::One(id),
                Err(_) => return Some(ControlStatus::error(1, "malformed notification id")),
            },
        };
        let removed = self.dismiss(queue, target);
        Some(ControlStatus { code: 0, message: Some(format!("dismissed {removed} notification(s)")) })
    }
}

#[cfg(test)]
#[path = "notify_bridge_tests.rs"]
mod tests;
