// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatcher: the single owner of router/flag/action state (spec §5's
//! single-threaded cooperative loop), grounded on `eventd.c`'s
//! `eventd_core_push_event`.
//!
//! `push_event` does three things, in order: (1) fan the event out to every
//! subscribed session; (2) unless the event is internal, match it against
//! the router and trigger the resolved actions; (3) fan every event,
//! including internal ones, out to every plugin's informational `dispatch`
//! hook (spec §4.3's `plugin_dispatch_all`). Session/relay fan-out and
//! routed actions always run ahead of the generic dispatch hooks.

use crate::subscription::{SessionId, SubscriptionRegistry};
use evd_core::action::ActionRegistry;
use evd_core::dispatch::trigger;
use evd_core::event::Event;
use evd_core::flags::{Flag, FlagInterner, FlagSet};
use evd_core::plugin::Plugin;
use evd_core::router::Router;
use evd_wire::evp::SubscribeScope;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

pub struct Dispatcher {
    router: Router,
    registry: ActionRegistry,
    flags: FlagSet,
    interner: Arc<FlagInterner>,
    plugins: Vec<Box<dyn Plugin>>,
    subscriptions: SubscriptionRegistry,
    outboxes: HashMap<SessionId, UnboundedSender<Event>>,
}

impl Dispatcher {
    pub fn new(
        router: Router,
        registry: ActionRegistry,
        interner: Arc<FlagInterner>,
        plugins: Vec<Box<dyn Plugin>>,
    ) -> Self {
        Self {
            router,
            registry,
            flags: FlagSet::new(),
            interner,
            plugins,
            subscriptions: SubscriptionRegistry::new(),
            outboxes: HashMap::new(),
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn plugins(&self) -> &[Box<dyn Plugin>] {
        &self.plugins
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn flags_mut(&mut self) -> &mut FlagSet {
        &mut self.flags
    }

    pub fn intern_flag(&self, name: &str) -> Flag {
        self.interner.intern(name)
    }

    pub fn interner(&self) -> Arc<FlagInterner> {
        self.interner.clone()
    }

    /// Swap in a freshly loaded router/action table, e.g. after a control
    /// channel `reload` re-reads the config file. Flags, subscriptions and
    /// session outboxes are untouched: only the routing/action state that
    /// `config_load::load` produces is replaced.
    pub fn replace_routing(&mut self, router: Router, registry: ActionRegistry) {
        self.router = router;
        self.registry = registry;
    }

    pub fn register_session(&mut self, id: SessionId, outbox: UnboundedSender<Event>) {
        self.outboxes.insert(id, outbox);
    }

    pub fn remove_session(&mut self, id: SessionId) {
        self.outboxes.remove(&id);
        self.subscriptions.unsubscribe(id);
    }

    pub fn subscribe(&mut self, id: SessionId, scope: SubscribeScope) {
        self.subscriptions.subscribe(id, scope);
    }

    /// `origin` is the session that delivered `event`, if any (a local
    /// producer or a relay peer has none). It is excluded from the
    /// fan-out: the echo guard of spec §4.5/§4.6.
    ///
    /// Returns whether the event matched: always `true` for an internal
    /// (`.`-prefixed) event, which bypasses the router entirely, otherwise
    /// whether the router resolved at least one action to trigger.
    pub async fn push_event(&mut self, event: Event, origin: Option<SessionId>) -> bool {
        for session in self.subscriptions.interested_in(&event) {
            if Some(session) == origin {
                continue;
            }
            if let Some(outbox) = self.outboxes.get(&session) {
                if outbox.send(event.clone()).is_err() {
                    tracing::debug!(%session, "dropping fan-out to a session whose outbox is gone");
                }
            }
        }

        let did_match = if event.is_internal() {
            true
        } else {
            let matched = self.router.match_event(&event, &self.flags).map(<[usize]>::to_vec);
            let did_match = matched.is_some();
            if let Some(indices) = matched {
                trigger(&self.registry, &self.plugins, &indices, &event, &mut self.flags).await;
            }
            did_match
        };

        for plugin in &self.plugins {
            plugin.dispatch(&event);
        }

        did_match
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
