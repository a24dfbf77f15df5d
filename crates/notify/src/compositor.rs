// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The notification compositor: owns every named [`Queue`] and drives a
//! [`BackendAdapter`] through surface lifecycle and placement.
//!
//! `BackendAdapter` is the Rust expression of
//! `original_source/plugins/nd/src/backend.h`'s function-pointer table
//! (`show`/`update`/`move_`/`hide`) — injected as a trait object so the
//! compositor never depends on a concrete rendering backend.

use crate::queue::{DismissTarget, Notification, Queue};
use crate::style::{layout, Geometry, Style};
use evd_core::event::Event;
use std::collections::HashMap;
use uuid::Uuid;

/// Measurement/draw callback surface the compositor drives per
/// notification (spec §9: "never calling back into the core except
/// through the two measurement/draw callbacks").
pub trait BackendAdapter: Send + Sync {
    /// Measure the rendered content size for `event` under `style`,
    /// before a surface is created.
    fn measure(&self, event: Option<&Event>, style: &Style) -> (i32, i32);

    fn surface_new(&self, id: Uuid, width: i32, height: i32);
    fn surface_update(&self, id: Uuid, width: i32, height: i32);
    fn surface_free(&self, id: Uuid);
    fn move_surface(&self, id: Uuid, x: i32, y: i32);
}

/// Owns every named queue and the style/geometry each one lays out
/// against.
pub struct Compositor<B: BackendAdapter> {
    backend: B,
    queues: HashMap<String, Queue>,
    styles: HashMap<String, Style>,
    geometry: Geometry,
}

impl<B: BackendAdapter> Compositor<B> {
    pub fn new(backend: B, geometry: Geometry) -> Self {
        let mut queues = HashMap::new();
        queues.insert("default".to_string(), Queue::new("default"));
        Self { backend, queues, styles: HashMap::new(), geometry }
    }

    pub fn set_style(&mut self, queue_name: impl Into<String>, style: Style) {
        self.styles.insert(queue_name.into(), style);
    }

    /// Install a pre-configured queue, replacing any queue already
    /// registered under the same name (including the default one
    /// `new` seeds).
    pub fn add_queue(&mut self, queue: Queue) {
        self.queues.insert(queue.name.clone(), queue);
    }

    fn queue_mut(&mut self, name: &str) -> &mut Queue {
        self.queues.entry(name.to_string()).or_insert_with(|| Queue::new(name))
    }

    fn style_for(&self, name: &str) -> Style {
        self.styles.get(name).copied().unwrap_or_default()
    }

    /// Spec §4.7 `new`: queue the event, measure and create its surface,
    /// then re-lay-out the whole queue.
    pub fn new_notification(&mut self, queue_name: &str, event: Event) -> Uuid {
        let id = event.uuid();
        let style = self.style_for(queue_name);
        let (w, h) = self.backend.measure(Some(&event), &style);
        let size = style.border_size(w, h);
        self.backend.surface_new(id, size.0, size.1);

        self.queue_mut(queue_name).push(Notification::new(event).with_size(size));
        self.relayout(queue_name);
        id
    }

    /// Spec §4.7 `update`: re-measure in place, no surface teardown.
    pub fn update_notification(&mut self, queue_name: &str, event: Event) {
        let style = self.style_for(queue_name);
        let id = event.uuid();
        let (w, h) = self.backend.measure(Some(&event), &style);
        let size = style.border_size(w, h);
        self.backend.surface_update(id, size.0, size.1);
        self.queue_mut(queue_name).set_size(id, size);
        self.relayout(queue_name);
    }

    /// UUIDs a call to `dismiss_target(queue_name, target)` would remove,
    /// queried up front so a caller can emit one synthetic
    /// `.notification dismiss` event per removal. [`DismissTarget::AllQueues`]
    /// ignores `queue_name` and spans every queue the compositor owns.
    pub fn ids_for(&self, queue_name: &str, target: DismissTarget) -> Vec<Uuid> {
        match target {
            DismissTarget::AllQueues => self.queues.values().flat_map(|q| q.ids_for(DismissTarget::All)).collect(),
            _ => self.queues.get(queue_name).map(|q| q.ids_for(target)).unwrap_or_default(),
        }
    }

    /// Spec §4.7 `dismiss`/`dismiss_target`. [`DismissTarget::AllQueues`]
    /// ignores `queue_name` and fans out as [`DismissTarget::All`] to
    /// every queue the compositor owns (the spec's queue-omitted `ALL`
    /// case); every other target is scoped to `queue_name`.
    pub fn dismiss_target(&mut self, queue_name: &str, target: DismissTarget) -> usize {
        if target == DismissTarget::AllQueues {
            let names: Vec<String> = self.queues.keys().cloned().collect();
            return names.iter().map(|name| self.dismiss_target(name, DismissTarget::All)).sum();
        }

        let removed = match target {
            DismissTarget::None => 0,
            DismissTarget::All => {
                for notification in self.queue_mut(queue_name).visible() {
                    if !notification.is_more_indicator() {
                        self.backend.surface_free(notification.id);
                    }
                }
                self.queue_mut(queue_name).dismiss_target(target)
            }
            DismissTarget::One(_) | DismissTarget::Oldest | DismissTarget::Newest => {
                if let Some(id) = self.queue_mut(queue_name).ids_for(target).first().copied() {
                    self.backend.surface_free(id);
                }
                self.queue_mut(queue_name).dismiss_target(target)
            }
            DismissTarget::AllQueues => unreachable!("handled above"),
        };
        self.relayout(queue_name);
        removed
    }

    /// Re-run the queue's fill algorithm and push fresh positions to the
    /// backend for every currently visible bubble.
    fn relayout(&mut self, queue_name: &str) {
        let style = self.style_for(queue_name);
        if self.queue_mut(queue_name).has_more_indicator() {
            let more_size = style.border_size(style.min_width, 0);
            self.queue_mut(queue_name).set_more_indicator_size(more_size);
        }
        let queue = self.queue_mut(queue_name);
        let sizes: Vec<(i32, i32)> = queue.visible().iter().map(|n| n.size).collect();
        let positions = layout(&style, self.geometry, &sizes);
        for (notification, (x, y)) in queue.visible().iter().zip(positions) {
            self.backend.move_surface(notification.id, x, y);
        }
    }

    pub fn queue(&self, name: &str) -> Option<&Queue> {
        self.queues.get(name)
    }
}

#[cfg(test)]
#[path = "compositor_tests.rs"]
mod tests;
