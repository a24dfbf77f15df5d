// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use evd_core::event::Event;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct RecordedCalls {
    created: Vec<Uuid>,
    updated: Vec<Uuid>,
    freed: Vec<Uuid>,
    moved: Vec<(Uuid, i32, i32)>,
}

struct FakeBackend {
    calls: Arc<Mutex<RecordedCalls>>,
}

impl BackendAdapter for FakeBackend {
    fn measure(&self, _event: Option<&Event>, _style: &Style) -> (i32, i32) {
        (120, 40)
    }

    fn surface_new(&self, id: Uuid, _w: i32, _h: i32) {
        self.calls.lock().created.push(id);
    }

    fn surface_update(&self, id: Uuid, _w: i32, _h: i32) {
        self.calls.lock().updated.push(id);
    }

    fn surface_free(&self, id: Uuid) {
        self.calls.lock().freed.push(id);
    }

    fn move_surface(&self, id: Uuid, x: i32, y: i32) {
        self.calls.lock().moved.push((id, x, y));
    }
}

fn ev(n: u32) -> Event {
    Event::builder("app", format!("n{n}")).build()
}

#[test]
fn new_notification_creates_and_positions_a_surface() {
    let calls = Arc::new(Mutex::new(RecordedCalls::default()));
    let backend = FakeBackend { calls: Arc::clone(&calls) };
    let mut compositor = Compositor::new(backend, Geometry { width: 800, height: 600 });

    let event = ev(1);
    let id = event.uuid();
    compositor.new_notification("default", event);

    assert_eq!(calls.lock().created, vec![id]);
    assert_eq!(calls.lock().moved.len(), 1);
}

#[test]
fn dismiss_frees_the_surface() {
    let calls = Arc::new(Mutex::new(RecordedCalls::default()));
    let backend = FakeBackend { calls: Arc::clone(&calls) };
    let mut compositor = Compositor::new(backend, Geometry { width: 800, height: 600 });

    let event = ev(1);
    let id = compositor.new_notification("default", event);
    compositor.dismiss_target("default", DismissTarget::One(id));

    assert_eq!(calls.lock().freed, vec![id]);
    assert!(compositor.queue("default").unwrap().visible().is_empty());
}

#[test]
fn update_notification_reuses_the_surface_without_recreating_it() {
    let calls = Arc::new(Mutex::new(RecordedCalls::default()));
    let backend = FakeBackend { calls: Arc::clone(&calls) };
    let mut compositor = Compositor::new(backend, Geometry { width: 800, height: 600 });

    let event = ev(1);
    let id = event.uuid();
    compositor.new_notification("default", event.clone());
    compositor.update_notification("default", event);

    assert_eq!(calls.lock().created, vec![id]);
    assert_eq!(calls.lock().updated, vec![id]);
}

#[test]
fn all_queues_target_clears_every_queue_ignoring_the_name_argument() {
    let calls = Arc::new(Mutex::new(RecordedCalls::default()));
    let backend = FakeBackend { calls: Arc::clone(&calls) };
    let mut compositor = Compositor::new(backend, Geometry { width: 800, height: 600 });

    compositor.new_notification("default", ev(1));
    compositor.new_notification("alerts", ev(2));

    let removed = compositor.dismiss_target("default", DismissTarget::AllQueues);

    assert_eq!(removed, 2);
    assert!(compositor.queue("default").unwrap().visible().is_empty());
    assert!(compositor.queue("alerts").unwrap().visible().is_empty());
}

#[test]
fn default_queue_limit_shows_more_indicator_beyond_one() {
    let calls = Arc::new(Mutex::new(RecordedCalls::default()));
    let backend = FakeBackend { calls: Arc::clone(&calls) };
    let mut compositor = Compositor::new(backend, Geometry { width: 800, height: 600 });

    compositor.new_notification("default", ev(1));
    compositor.new_notification("default", ev(2));

    let queue = compositor.queue("default").unwrap();
    assert!(queue.has_more_indicator());
    assert_eq!(queue.pending(), 1);
}
