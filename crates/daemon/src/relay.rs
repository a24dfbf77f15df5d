// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One configured outbound peer (spec §4.6), grounded on
//! `original_source/server/eventd/src/relay/server.c`
//! (`_eventd_relay_server_disconnected`, `_eventd_relay_reconnect_callback`)
//! and `relay.c`'s per-peer map/start-stop fan-out.
//!
//! `Backoff` is an idiomatic reimplementation of
//! `libeventd-helpers-reconnect`'s `LibeventdReconnectHandler`: exponential,
//! `min=5s`/`max=10s` (spec §4.6).

use crate::config_load::RelayPeerConfig;
use crate::session::SessionCommand;
use crate::subscription::SessionId;
use evd_core::event::Event;
use evd_wire::evp::{read_frame, write_frame, Frame, SubscribeScope, PROTOCOL_VERSION};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Exponential reconnection backoff, `min=5s`/`max=10s`.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    min: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max, current: min }
    }

    pub fn reset(&mut self) {
        self.current = self.min;
    }

    /// The delay to wait before the next attempt; doubles for next time,
    /// capped at `max`.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(10))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("protocol error: {0}")]
    Protocol(#[from] evd_wire::evp::ProtocolError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A configured outbound peer: connection lifecycle plus the forward
/// filter of spec §4.6.
pub struct RelayServer {
    config: RelayPeerConfig,
    ping_interval: Duration,
    backoff: Backoff,
    session_id: SessionId,
    started: bool,
    cancel: Option<CancellationToken>,
}

impl RelayServer {
    pub fn new(config: RelayPeerConfig, ping_interval: Duration) -> Self {
        Self {
            config,
            ping_interval,
            backoff: Backoff::default(),
            session_id: Uuid::new_v4(),
            started: false,
            cancel: None,
        }
    }

    /// The echo-guard identity this peer's received events carry as
    /// `origin` into `Dispatcher::push_event` (mirrors spec §4.5 for
    /// relay connections, per §4.6's "echo guard, mirror of §4.5").
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn has_address(&self) -> bool {
        !self.config.address.is_empty()
    }

    pub fn set_address(&mut self, address: String) {
        self.config.address = address;
    }

    pub fn is_connected(&self) -> bool {
        self.cancel.is_some()
    }

    /// `send`'s forward filter: events the local dispatcher fans out to
    /// this relay's registered subscription get one more gate before
    /// actually crossing the wire.
    /// Strip the `evp://` scheme, if present, down to a bare `host:port`
    /// suitable for `TcpStream::connect`.
    fn connect_addr(&self) -> &str {
        self.config.address.strip_prefix("evp://").unwrap_or(&self.config.address)
    }

    pub fn should_forward(&self, event: &Event) -> bool {
        if event.is_internal() {
            return true;
        }
        self.config.forward_all || self.config.forward_categories.iter().any(|c| c == event.category())
    }

    pub fn stop(&mut self) {
        self.started = false;
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }

    /// Drive the connect/reconnect loop until `stop()` cancels it.
    /// `force_reset` resets the backoff before the first attempt (spec
    /// §4.6: `start(force=true)`).
    pub async fn run(
        &mut self,
        force_reset: bool,
        commands: UnboundedSender<(SessionId, SessionCommand)>,
        mut outbound: UnboundedReceiver<Event>,
    ) {
        self.started = true;
        if force_reset {
            self.backoff.reset();
        }
        let cancel = CancellationToken::new();
        self.cancel = Some(cancel.clone());

        loop {
            if cancel.is_cancelled() {
                return;
            }
            match TcpStream::connect(self.connect_addr()).await {
                Ok(stream) => {
                    self.backoff.reset();
                    let (read_half, write_half) = stream.into_split();
                    let reader = tokio::io::BufReader::new(read_half);
                    let result = tokio::select! {
                        result = connection_loop(
                            self.session_id,
                            reader,
                            write_half,
                            self.ping_interval,
                            self.config.subscribe,
                            self.config.subscribe_categories.clone(),
                            commands.clone(),
                            &mut outbound,
                            |event| self.should_forward(event),
                        ) => result,
                        () = cancel.cancelled() => return,
                    };
                    if let Err(err) = result {
                        tracing::warn!(peer = %self.config.name, error = %err, "relay connection dropped");
                    }
                }
                Err(err) => {
                    tracing::warn!(peer = %self.config.name, error = %err, "relay connect failed");
                }
            }
            if !self.started {
                return;
            }
            let delay = self.backoff.next_delay();
            tokio::select! {
                _ = sleep(delay) => {}
                () = cancel.cancelled() => return,
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn connection_loop<R, W>(
    session_id: SessionId,
    mut reader: R,
    mut writer: W,
    ping_interval: Duration,
    subscribe: bool,
    subscribe_categories: Vec<String>,
    commands: UnboundedSender<(SessionId, SessionCommand)>,
    outbound: &mut UnboundedReceiver<Event>,
    should_forward: impl Fn(&Event) -> bool,
) -> Result<(), RelayError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match read_frame(&mut reader).await? {
        Some(Frame::Hello(_)) => {}
        _ => return Err(RelayError::Protocol(evd_wire::evp::ProtocolError::Eof)),
    }
    write_frame(&mut writer, &Frame::Hello(PROTOCOL_VERSION.to_string())).await?;

    if subscribe {
        let scope = if subscribe_categories.is_empty() {
            SubscribeScope::All
        } else {
            SubscribeScope::Categories(subscribe_categories)
        };
        write_frame(&mut writer, &Frame::Subscribe(scope)).await?;
    }

    let mut ticker = tokio::time::interval(if ping_interval.is_zero() {
        Duration::from_secs(3600)
    } else {
        ping_interval
    });

    loop {
        tokio::select! {
            biased;
            frame = read_frame(&mut reader) => {
                match frame? {
                    Some(Frame::Bye) | None => return Ok(()),
                    Some(Frame::Ping) => write_frame(&mut writer, &Frame::Pong).await?,
                    Some(Frame::Pong) | Some(Frame::Hello(_)) | Some(Frame::Subscribe(_)) => {}
                    Some(Frame::Event(event)) => {
                        let _ = commands.send((session_id, SessionCommand::Event(event)));
                    }
                }
            }
            _ = ticker.tick(), if !ping_interval.is_zero() => {
                write_frame(&mut writer, &Frame::Ping).await?;
            }
            maybe_event = outbound.recv() => {
                match maybe_event {
                    Some(event) if should_forward(&event) => {
                        write_frame(&mut writer, &Frame::Event(event)).await?;
                    }
                    Some(_) => {}
                    None => return Ok(()),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
