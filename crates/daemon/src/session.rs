// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One accepted inbound connection's state machine (spec §4.5), grounded
//! on the teacher's `listener/mod.rs` accept/handle idiom: generic
//! `AsyncRead`/`AsyncWrite` handler, `tokio::select!` racing read against
//! outbound fan-out, and a `log_connection_error` categorization at the
//! boundary.

use crate::env::DEFAULT_PING_INTERVAL;
use crate::subscription::SessionId;
use evd_core::event::Event;
use evd_wire::evp::{read_frame, write_frame, Frame, ProtocolError, SubscribeScope, PROTOCOL_VERSION};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval, Instant, MissedTickBehavior};
use uuid::Uuid;

/// Commands a session emits toward the loop that owns the dispatcher.
#[derive(Debug)]
pub enum SessionCommand {
    /// A complete, locally-received event ready for `Dispatcher::push_event`.
    Event(Event),
    Subscribe(SubscribeScope),
    Disconnected,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("peer missed {0} consecutive keepalive windows")]
    KeepaliveTimeout(u32),
}

/// Handle for the owning loop to push a fan-out event at this session and
/// to remove it from bookkeeping on disconnect.
pub struct SessionHandle {
    pub id: SessionId,
    pub outbox: UnboundedSender<Event>,
}

/// Run one session to completion: reads frames, forwards them to
/// `commands`, and writes any event handed to it over `fan_out` — until
/// `BYE`, a protocol error, or a missed keepalive window closes it.
///
/// `ping_interval`: `Duration::ZERO` disables keepalive entirely (spec
/// §4.5: "if `ping_interval > 0`").
pub async fn run<R, W>(
    id: SessionId,
    mut reader: R,
    mut writer: W,
    commands: UnboundedSender<(SessionId, SessionCommand)>,
    mut fan_out: UnboundedReceiver<Event>,
    ping_interval: Duration,
) -> Result<(), SessionError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write_frame(&mut writer, &Frame::Hello(PROTOCOL_VERSION.to_string())).await?;

    let keepalive_enabled = !ping_interval.is_zero();
    let mut ticker = interval(if keepalive_enabled { ping_interval } else { Duration::from_secs(3600) });
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_activity = Instant::now();

    let result = loop {
        tokio::select! {
            biased;
            frame = read_frame(&mut reader) => {
                match frame {
                    Ok(Some(Frame::Bye)) => {
                        write_frame(&mut writer, &Frame::Bye).await?;
                        break Ok(());
                    }
                    Ok(Some(Frame::Ping)) => {
                        last_activity = Instant::now();
                        write_frame(&mut writer, &Frame::Pong).await?;
                    }
                    Ok(Some(Frame::Pong)) => {
                        last_activity = Instant::now();
                    }
                    Ok(Some(Frame::Hello(_))) => {
                        // A re-sent HELLO mid-session is ignored rather than treated as an error.
                        last_activity = Instant::now();
                    }
                    Ok(Some(Frame::Subscribe(scope))) => {
                        last_activity = Instant::now();
                        let _ = commands.send((id, SessionCommand::Subscribe(scope)));
                    }
                    Ok(Some(Frame::Event(event))) => {
                        last_activity = Instant::now();
                        let _ = commands.send((id, SessionCommand::Event(event)));
                    }
                    Ok(None) => break Ok(()),
                    Err(err) => break Err(err.into()),
                }
            }
            _ = ticker.tick(), if keepalive_enabled => {
                if last_activity.elapsed() > ping_interval * 2 {
                    break Err(SessionError::KeepaliveTimeout(2));
                }
                write_frame(&mut writer, &Frame::Ping).await?;
            }
            maybe_event = fan_out.recv() => {
                if let Some(event) = maybe_event {
                    write_frame(&mut writer, &Frame::Event(event)).await?;
                }
            }
        }
    };

    let _ = commands.send((id, SessionCommand::Disconnected));
    result
}

pub fn new_session_id() -> SessionId {
    Uuid::new_v4()
}

pub fn channel() -> (UnboundedSender<Event>, UnboundedReceiver<Event>) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
