// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription registry: tracks which connected sessions asked to receive
//! a fan-out copy of which event categories (spec §2/§4.3).

use evd_core::event::Event;
use evd_wire::evp::SubscribeScope;
use std::collections::HashMap;
use uuid::Uuid;

pub type SessionId = Uuid;

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    scopes: HashMap<SessionId, SubscribeScope>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, session: SessionId, scope: SubscribeScope) {
        self.scopes.insert(session, scope);
    }

    pub fn unsubscribe(&mut self, session: SessionId) {
        self.scopes.remove(&session);
    }

    /// Sessions whose subscription scope includes `event`'s category,
    /// in no particular order.
    pub fn interested_in(&self, event: &Event) -> Vec<SessionId> {
        self.scopes
            .iter()
            .filter(|(_, scope)| match scope {
                SubscribeScope::All => true,
                SubscribeScope::Categories(categories) => {
                    categories.iter().any(|c| c == event.category())
                }
            })
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
