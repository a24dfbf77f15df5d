// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket transport for the EVP protocol (spec §4.4 supplement): each
//! text message carries exactly one complete EVP frame at path `/` with
//! protocol name `evp`; a binary message is a protocol violation.
//!
//! Bridges a `tokio_tungstenite` `WebSocketStream` to the same
//! `AsyncBufRead`/`AsyncWrite` shape [`crate::session::run`] already
//! drives over raw sockets, via an in-process `tokio::io::duplex` pipe
//! pumped by two small forwarding tasks — so the session state machine
//! itself never needs a WebSocket-specific code path.

use base64::Engine;
use evd_wire::evp::encode_frame;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{split, AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};
pub use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

const PIPE_CAPACITY: usize = 64 * 1024;

/// Spec §7: "bad Basic credentials on WebSocket → 401 and close". The
/// decoded `user:password` string of an `Authorization: Basic <b64>`
/// header is compared verbatim against the configured shared secret —
/// `GlobalServer`'s `WsSharedSecret` names one shared credential, not a
/// user database.
fn basic_auth_matches(request: &Request, secret: &str) -> bool {
    let Some(header) = request.headers().get(tokio_tungstenite::tungstenite::http::header::AUTHORIZATION) else {
        return false;
    };
    let Some(encoded) = header.to_str().ok().and_then(|v| v.strip_prefix("Basic ")) else {
        return false;
    };
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .is_some_and(|creds| creds == secret)
}

fn unauthorized_response() -> ErrorResponse {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .body(Some("Unauthorized".to_string()))
        .unwrap_or_else(|_| Response::new(None))
}

/// Reject the upgrade with 401 before it completes when `shared_secret` is
/// configured and the request's Basic credentials don't match it. No
/// configured secret means the WebSocket leg is open to anyone, same as
/// the raw-EVP leg without TLS.
pub fn check_auth(request: &Request, response: Response, shared_secret: Option<&str>) -> Result<Response, ErrorResponse> {
    match shared_secret {
        Some(secret) if !basic_auth_matches(request, secret) => Err(unauthorized_response()),
        _ => Ok(response),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("websocket carried a binary message, which is unsupported data for this protocol")]
    UnsupportedData,
    #[error("websocket error: {0}")]
    Tungstenite(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Spawn the two pump tasks and return the session-facing ends: a
/// `BufReader` to pass as `session::run`'s reader and a plain write half
/// to pass as its writer.
pub fn bridge<S>(
    ws: WebSocketStream<S>,
) -> (BufReader<ReadHalf<DuplexStream>>, WriteHalf<DuplexStream>)
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let (session_side, ws_side) = tokio::io::duplex(PIPE_CAPACITY);
    let (session_read, session_write) = split(session_side);
    let (ws_read, ws_write) = split(ws_side);

    let (mut sink, mut stream) = ws.split();

    // Outbound: bytes the session writes into its half of the duplex
    // (EVP frame text) get wrapped as a WS text message.
    tokio::spawn(async move {
        let mut ws_read = ws_read;
        let mut buf = vec![0u8; 8192];
        loop {
            match ws_read.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = sink.close().await;
    });

    // Inbound: each WS text message is written verbatim into the
    // session's read half (it already ends in the frame's own `\n`s).
    tokio::spawn(async move {
        let mut ws_write = ws_write;
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    if ws_write.write_all(text.as_bytes()).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Binary(_)) => break,
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    });

    (BufReader::new(session_read), session_write)
}

/// Encode a single frame the way a WS client would send it: as the text
/// of one complete EVP frame (used by tests and by the relay's WS leg).
pub fn frame_to_text(frame: &evd_wire::evp::Frame) -> String {
    String::from_utf8_lossy(&encode_frame(frame)).into_owned()
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
