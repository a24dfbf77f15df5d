// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The EVP line-framed wire protocol (spec §4.4), grounded on
//! `original_source/server/eventd/src/evp/evp.c`'s frame grammar
//! (`EVENT`/`DATA`/`DATAL`/`.`/`SUBSCRIBE`/`BYE`/`PING`/`PONG`).
//!
//! Supplement (spec §4.4/§9): a `HELLO <proto-version>` preamble frame,
//! required as the first frame on a new connection so version skew is
//! caught before any event crosses the wire.

use evd_core::event::{Event, EventBuilder};
use evd_core::value::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

pub const PROTOCOL_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq)]
pub enum SubscribeScope {
    All,
    Categories(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Hello(String),
    Event(Event),
    Subscribe(SubscribeScope),
    Bye,
    Ping,
    Pong,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("connection closed before a complete frame was read")]
    Eof,
    #[error("malformed frame line: `{0}`")]
    MalformedLine(String),
    #[error("malformed EVENT header: `{0}`")]
    MalformedEventHeader(String),
    #[error("malformed DATAL payload for key `{0}`")]
    MalformedDataL(String),
    #[error("EVENT block missing its terminating `.`")]
    UnterminatedEvent,
    #[error("unknown frame keyword `{0}`")]
    UnknownKeyword(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ProtocolError {
    fn from(err: std::io::Error) -> Self {
        ProtocolError::Io(err.to_string())
    }
}

/// Read one logical frame from `reader`. Returns `Ok(None)` on a clean
/// EOF between frames (no partial line read).
pub async fn read_frame(
    reader: &mut (impl AsyncBufRead + Unpin),
) -> Result<Option<Frame>, ProtocolError> {
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(None);
    }
    let line = line.trim_end_matches(['\n', '\r']);
    if line.is_empty() {
        return Ok(None);
    }

    let (keyword, rest) = line.split_once(' ').unwrap_or((line, ""));
    match keyword {
        "HELLO" => Ok(Some(Frame::Hello(rest.to_string()))),
        "BYE" => Ok(Some(Frame::Bye)),
        "PING" => Ok(Some(Frame::Ping)),
        "PONG" => Ok(Some(Frame::Pong)),
        "SUBSCRIBE" => Ok(Some(Frame::Subscribe(parse_subscribe(rest)))),
        "EVENT" => Ok(Some(Frame::Event(read_event_body(rest, reader).await?))),
        other => Err(ProtocolError::UnknownKeyword(other.to_string())),
    }
}

fn parse_subscribe(rest: &str) -> SubscribeScope {
    if rest.trim().is_empty() {
        return SubscribeScope::All;
    }
    SubscribeScope::Categories(rest.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect())
}

async fn read_event_body(
    header: &str,
    reader: &mut (impl AsyncBufRead + Unpin),
) -> Result<Event, ProtocolError> {
    let mut parts = header.split(' ');
    let category = parts.next().ok_or_else(|| ProtocolError::MalformedEventHeader(header.to_string()))?;
    let name = parts.next().ok_or_else(|| ProtocolError::MalformedEventHeader(header.to_string()))?;
    let uuid_str = parts.next().ok_or_else(|| ProtocolError::MalformedEventHeader(header.to_string()))?;
    let timeout = parts.next().and_then(|s| s.parse::<i64>().ok()).unwrap_or(0);
    let uuid = Uuid::parse_str(uuid_str).map_err(|_| ProtocolError::MalformedEventHeader(header.to_string()))?;

    let mut builder: EventBuilder = Event::builder(category, name).uuid(uuid).timeout(timeout);

    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(ProtocolError::UnterminatedEvent);
        }
        let line = line.trim_end_matches(['\n', '\r']);
        if line == "." {
            break;
        }
        if let Some(rest) = line.strip_prefix("DATAL ") {
            let (key, payload) =
                rest.split_once(' ').ok_or_else(|| ProtocolError::MalformedLine(rest.to_string()))?;
            let value = decode_variant_text(payload).ok_or_else(|| ProtocolError::MalformedLine(rest.to_string()))?;
            builder = builder.data(key, value);
        } else if let Some(key) = line.strip_prefix("DATA ") {
            let key = key.trim();

            let mut payload_line = String::new();
            let n = reader.read_line(&mut payload_line).await?;
            if n == 0 {
                return Err(ProtocolError::UnterminatedEvent);
            }
            let payload = payload_line.trim_end_matches(['\n', '\r']);
            let value = decode_variant_text(payload).ok_or_else(|| ProtocolError::MalformedDataL(key.to_string()))?;

            let mut terminator = String::new();
            let n = reader.read_line(&mut terminator).await?;
            if n == 0 {
                return Err(ProtocolError::UnterminatedEvent);
            }
            if terminator.trim_end_matches(['\n', '\r']) != "DATA." {
                return Err(ProtocolError::MalformedDataL(key.to_string()));
            }

            builder = builder.data(key, value);
        } else {
            return Err(ProtocolError::MalformedLine(line.to_string()));
        }
    }

    Ok(builder.build())
}

/// Serialize one `Value` to the single line of "variant-text" carried by a
/// `DATA`/`DATAL` block. Scalars use a trailing `:<type>` tag mirroring the
/// config-syntax typed literal; byte strings are base64; arrays and maps
/// fall back to a tagged JSON rendering since the wire grammar only
/// specifies the line framing, not a nested variant syntax.
fn encode_variant_text(value: &Value) -> String {
    match value {
        Value::Bool(b) => format!("{b}:bool"),
        Value::Int64(n) => format!("{n}:i64"),
        Value::UInt64(n) => format!("{n}:u64"),
        Value::Double(n) => format!("{n}:double"),
        Value::Str(s) => format!("{s}:string"),
        Value::Bytes(bytes) => {
            format!("{}:bytes", base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes))
        }
        Value::Array(_) | Value::Map(_) => {
            format!("{}:json", serde_json::to_string(value).expect("Value serializes to JSON"))
        }
    }
}

fn decode_variant_text(text: &str) -> Option<Value> {
    let (lit, ty) = text.rsplit_once(':')?;
    match ty {
        "bool" => lit.parse::<bool>().ok().map(Value::Bool),
        "i64" => lit.parse::<i64>().ok().map(Value::Int64),
        "u64" => lit.parse::<u64>().ok().map(Value::UInt64),
        "double" => lit.parse::<f64>().ok().map(Value::Double),
        "string" => Some(Value::Str(lit.to_string())),
        "bytes" => base64::Engine::decode(&base64::engine::general_purpose::STANDARD, lit).ok().map(Value::Bytes),
        "json" => serde_json::from_str(lit).ok(),
        _ => None,
    }
}

/// Whether `value` fits the single-line `DATAL` form, as opposed to the
/// multi-line `DATA` block: scalars with no embedded newline do, bytes,
/// arrays and maps go through the block form.
fn fits_single_line(value: &Value) -> bool {
    match value {
        Value::Bool(_) | Value::Int64(_) | Value::UInt64(_) | Value::Double(_) => true,
        Value::Str(s) => !s.contains('\n'),
        Value::Bytes(_) | Value::Array(_) | Value::Map(_) => false,
    }
}

/// Serialize a frame as it goes out over the wire.
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let mut out = String::new();
    match frame {
        Frame::Hello(version) => out.push_str(&format!("HELLO {version}\n")),
        Frame::Bye => out.push_str("BYE\n"),
        Frame::Ping => out.push_str("PING\n"),
        Frame::Pong => out.push_str("PONG\n"),
        Frame::Subscribe(SubscribeScope::All) => out.push_str("SUBSCRIBE\n"),
        Frame::Subscribe(SubscribeScope::Categories(cats)) => {
            out.push_str("SUBSCRIBE ");
            out.push_str(&cats.join(","));
            out.push('\n');
        }
        Frame::Event(event) => {
            out.push_str(&format!(
                "EVENT {} {} {} {}\n",
                event.category(),
                event.name(),
                event.uuid(),
                event.timeout()
            ));
            for (key, value) in event.data() {
                if fits_single_line(value) {
                    out.push_str(&format!("DATAL {key} {}\n", encode_variant_text(value)));
                } else {
                    out.push_str(&format!("DATA {key}\n{}\nDATA.\n", encode_variant_text(value)));
                }
            }
            out.push_str(".\n");
        }
    }
    out.into_bytes()
}

pub async fn write_frame(
    writer: &mut (impl AsyncWrite + Unpin),
    frame: &Frame,
) -> Result<(), ProtocolError> {
    writer.write_all(&encode_frame(frame)).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "evp_tests.rs"]
mod tests;
