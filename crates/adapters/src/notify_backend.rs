// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop rendering backend for [`evd_notify::Compositor`], grounded on
//! `crates/adapters/src/notify.rs`'s `DesktopNotifyAdapter`: the same
//! macOS bundle-id workaround and `spawn_blocking` fire-and-forget pattern
//! for the synchronous `notify-rust` call, now expressed against
//! [`BackendAdapter`]'s four-callback surface instead of a single
//! `notify()` method.
//!
//! `notify-rust` gives no cross-platform handle we can use later to move
//! or resize an already-shown bubble, so `surface_update`/`move_surface`
//! are no-ops here; only creation and dismissal have an observable
//! desktop-side effect.

use evd_core::event::Event;
use evd_notify::{BackendAdapter, Style};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopBackendAdapter;

impl DesktopBackendAdapter {
    pub fn new() -> Self {
        #[cfg(target_os = "macos")]
        {
            let _ = mac_notification_sys::set_application("com.apple.Terminal");
        }
        Self
    }
}

impl BackendAdapter for DesktopBackendAdapter {
    fn measure(&self, event: Option<&Event>, style: &Style) -> (i32, i32) {
        let body_len = event.and_then(|e| e.get_data_str("text")).map(str::len).unwrap_or(0) as i32;
        let width = style.clamp_width(body_len.clamp(style.min_width, style.min_width.max(body_len)));
        (width, 48)
    }

    fn surface_new(&self, id: Uuid, _width: i32, _height: i32) {
        tracing::info!(%id, "sending desktop notification");
        tokio::task::spawn_blocking(move || match notify_rust::Notification::new().summary(&id.to_string()).show() {
            Ok(_) => tracing::info!(%id, "desktop notification sent"),
            Err(error) => tracing::warn!(%id, %error, "desktop notification failed"),
        });
    }

    fn surface_update(&self, _id: Uuid, _width: i32, _height: i32) {}

    fn surface_free(&self, _id: Uuid) {}

    fn move_surface(&self, _id: Uuid, _x: i32, _y: i32) {}
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use evd_core::event::Event;
    use evd_notify::{BackendAdapter, Style};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use uuid::Uuid;

    #[derive(Debug, Clone, Default)]
    pub struct RecordedCalls {
        pub created: Vec<Uuid>,
        pub updated: Vec<Uuid>,
        pub freed: Vec<Uuid>,
        pub moved: Vec<(Uuid, i32, i32)>,
    }

    /// Backend test double recording every callback without touching the
    /// desktop notification system.
    #[derive(Clone, Default)]
    pub struct FakeBackendAdapter {
        inner: Arc<Mutex<RecordedCalls>>,
    }

    impl FakeBackendAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> RecordedCalls {
            self.inner.lock().clone()
        }
    }

    impl BackendAdapter for FakeBackendAdapter {
        fn measure(&self, _event: Option<&Event>, _style: &Style) -> (i32, i32) {
            (120, 40)
        }

        fn surface_new(&self, id: Uuid, _width: i32, _height: i32) {
            self.inner.lock().created.push(id);
        }

        fn surface_update(&self, id: Uuid, _width: i32, _height: i32) {
            self.inner.lock().updated.push(id);
        }

        fn surface_free(&self, id: Uuid) {
            self.inner.lock().freed.push(id);
        }

        fn move_surface(&self, id: Uuid, x: i32, y: i32) {
            self.inner.lock().moved.push((id, x, y));
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeBackendAdapter, RecordedCalls};

#[cfg(test)]
#[path = "notify_backend_tests.rs"]
mod tests;
