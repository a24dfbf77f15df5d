// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! evd-notify: the notification queue and compositor core (spec §4.7),
//! independent of any concrete rendering backend.

pub mod compositor;
pub mod queue;
pub mod style;

pub use compositor::{BackendAdapter, Compositor};
pub use queue::{DismissTarget, Notification, Queue};
pub use style::{layout, Anchor, Geometry, Style};
