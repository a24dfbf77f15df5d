// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The notification queue: a wait list feeding a bounded visible list,
//! grounded on `original_source/plugins/nd/src/notification.c`'s
//! `_eventd_nd_notification_refresh_list`.
//!
//! Invariant (spec §8): `limit == 0 || visible_without_more().len() <=
//! limit`. The optional trailing "more" indicator is one additional slot
//! on top of `limit`, matching the original's queue-then-more ordering —
//! it is popped off and re-appended on every refresh, never counted
//! against the limit itself.

use evd_core::event::Event;
use std::collections::VecDeque;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub event: Option<Event>,
    pub visible: bool,
    /// Border-box `(width, height)` set by the compositor after
    /// measuring; `(0, 0)` until then.
    pub size: (i32, i32),
}

impl Notification {
    pub fn new(event: Event) -> Self {
        Self { id: event.uuid(), event: Some(event), visible: false, size: (0, 0) }
    }

    fn more_indicator() -> Self {
        Self { id: Uuid::nil(), event: None, visible: false, size: (0, 0) }
    }

    pub fn with_size(mut self, size: (i32, i32)) -> Self {
        self.size = size;
        self
    }

    pub fn is_more_indicator(&self) -> bool {
        self.event.is_none()
    }
}

/// What a [`Queue::dismiss_target`] call applies to (spec §4.7
/// `dismiss_target(target, queue?)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTarget {
    /// No-op.
    None,
    /// Every in-flight and waiting notification in the given queue.
    All,
    /// Every in-flight and waiting notification across every queue,
    /// independent of which queue is named in the call — distinct from
    /// [`DismissTarget::All`], which is scoped to one queue.
    AllQueues,
    /// The longest-waiting visible notification, accounting for `reverse`.
    Oldest,
    /// The most recently arrived visible notification, accounting for
    /// `reverse`.
    Newest,
    /// One specific notification by id.
    One(Uuid),
}

/// A single named notification queue.
#[derive(Debug, Clone)]
pub struct Queue {
    pub name: String,
    /// `0` means unlimited.
    pub limit: usize,
    /// New arrivals join the tail of the visible list instead of the head.
    pub reverse: bool,
    pub more_indicator: bool,
    wait: VecDeque<Notification>,
    visible: Vec<Notification>,
    has_more: bool,
}

impl Queue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            limit: 1,
            reverse: false,
            more_indicator: true,
            wait: VecDeque::new(),
            visible: Vec::new(),
            has_more: false,
        }
    }

    /// Push a new notification and re-run layout.
    pub fn push(&mut self, notification: Notification) {
        self.wait.push_back(notification);
        self.refresh_list();
    }

    /// Remove one notification, every notification, or none at all (spec
    /// §4.7 `dismiss_target`, `control.c`'s `EVENTD_ND_DISMISS_ALL`).
    /// [`DismissTarget::AllQueues`] is handled by the owning compositor,
    /// which fans it out as [`DismissTarget::All`] to every queue; reached
    /// here it is treated the same as a plain `All` on this one queue.
    pub fn dismiss_target(&mut self, target: DismissTarget) -> usize {
        let removed = match target {
            DismissTarget::None => 0,
            DismissTarget::All | DismissTarget::AllQueues => {
                let n = self.wait.len() + self.visible.iter().filter(|v| !v.is_more_indicator()).count();
                self.wait.clear();
                self.visible.clear();
                self.has_more = false;
                n
            }
            DismissTarget::One(id) => self.remove_by_id(id),
            DismissTarget::Oldest => self.edge_id(false).map(|id| self.remove_by_id(id)).unwrap_or(0),
            DismissTarget::Newest => self.edge_id(true).map(|id| self.remove_by_id(id)).unwrap_or(0),
        };
        self.refresh_list();
        removed
    }

    fn remove_by_id(&mut self, id: Uuid) -> usize {
        if let Some(pos) = self.visible.iter().position(|n| n.id == id) {
            self.visible.remove(pos);
            1
        } else if let Some(pos) = self.wait.iter().position(|n| n.id == id) {
            self.wait.remove(pos);
            1
        } else {
            0
        }
    }

    /// The id of the oldest (`newest == false`) or newest (`newest ==
    /// true`) real notification currently visible, accounting for
    /// `reverse`'s effect on arrival order within `visible`. New arrivals
    /// join the head when `!reverse`, the tail when `reverse`; `Queue`
    /// never reorders the wait list, so this is well-defined.
    fn edge_id(&self, newest: bool) -> Option<Uuid> {
        let real: Vec<&Notification> = self.visible.iter().filter(|n| !n.is_more_indicator()).collect();
        let want_first = newest != self.reverse;
        let picked = if want_first { real.first() } else { real.last() };
        picked.map(|n| n.id)
    }

    /// UUIDs of the real (non-more-indicator) notifications that a call to
    /// `dismiss_target(target)` would remove — queried before the call so
    /// a caller can emit one synthetic `.notification dismiss` event per
    /// removed notification (spec §4.7).
    pub fn ids_for(&self, target: DismissTarget) -> Vec<Uuid> {
        match target {
            DismissTarget::None => Vec::new(),
            DismissTarget::All | DismissTarget::AllQueues => {
                self.wait.iter().chain(self.visible.iter()).filter(|n| !n.is_more_indicator()).map(|n| n.id).collect()
            }
            DismissTarget::One(id) => {
                let present = self.visible.iter().any(|n| n.id == id) || self.wait.iter().any(|n| n.id == id);
                if present {
                    vec![id]
                } else {
                    Vec::new()
                }
            }
            DismissTarget::Oldest => self.edge_id(false).into_iter().collect(),
            DismissTarget::Newest => self.edge_id(true).into_iter().collect(),
        }
    }

    /// Spec §4.7: fill the visible list up to `limit` from the wait
    /// queue, then re-append a "more" indicator if anything still waits.
    pub fn refresh_list(&mut self) {
        if self.has_more {
            self.visible.pop();
            self.has_more = false;
        }

        while (self.limit == 0 || self.visible_count() < self.limit) && !self.wait.is_empty() {
            let mut notification = self.wait.pop_front().expect("checked non-empty above");
            notification.visible = true;
            if self.reverse {
                self.visible.push(notification);
            } else {
                self.visible.insert(0, notification);
            }
        }

        if self.more_indicator && !self.wait.is_empty() {
            let mut more = Notification::more_indicator();
            more.visible = true;
            self.visible.push(more);
            self.has_more = true;
        }
    }

    fn visible_count(&self) -> usize {
        self.visible.iter().filter(|n| !n.is_more_indicator()).count()
    }

    pub fn visible(&self) -> &[Notification] {
        &self.visible
    }

    pub fn pending(&self) -> usize {
        self.wait.len()
    }

    pub fn has_more_indicator(&self) -> bool {
        self.has_more
    }

    /// Update the measured size of an already-visible notification, e.g.
    /// after a content re-measure.
    pub fn set_size(&mut self, id: Uuid, size: (i32, i32)) {
        if let Some(n) = self.visible.iter_mut().find(|n| n.id == id) {
            n.size = size;
        }
    }

    /// Set the more-indicator's own border-box size, used by the
    /// compositor since it measures that pseudo-notification separately.
    pub fn set_more_indicator_size(&mut self, size: (i32, i32)) {
        if let Some(n) = self.visible.last_mut().filter(|n| n.is_more_indicator()) {
            n.size = size;
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
