// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use evd_core::event::Event;
use evd_notify::Style;

#[test]
fn fake_backend_records_every_callback() {
    let backend = FakeBackendAdapter::new();
    let event = Event::builder("app", "started").build();
    let id = event.uuid();

    let size = backend.measure(Some(&event), &Style::default());
    backend.surface_new(id, size.0, size.1);
    backend.move_surface(id, 10, 20);
    backend.surface_update(id, size.0, size.1);
    backend.surface_free(id);

    let calls = backend.calls();
    assert_eq!(calls.created, vec![id]);
    assert_eq!(calls.updated, vec![id]);
    assert_eq!(calls.freed, vec![id]);
    assert_eq!(calls.moved, vec![(id, 10, 20)]);
}
