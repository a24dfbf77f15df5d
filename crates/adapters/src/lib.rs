// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! evd-adapters: concrete leaf [`evd_core::plugin::Plugin`] implementations
//! (spec §4's plugin capability set) — `log`, `file`, `exec`, `sound`
//! (stub) and a `notify` bridge into [`evd_notify::Compositor`].

pub mod exec;
pub mod file;
pub mod log;
pub mod notify_backend;
pub mod notify_bridge;
pub mod sound;

pub use exec::ExecPlugin;
pub use file::FileAppendPlugin;
pub use log::LogPlugin;
pub use notify_backend::DesktopBackendAdapter;
pub use notify_bridge::NotifyBridgePlugin;
pub use sound::SoundStubPlugin;

#[cfg(any(test, feature = "test-support"))]
pub use notify_backend::FakeBackendAdapter;
