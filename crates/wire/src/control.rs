// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The control-channel binary framing (spec §4.8): a request is a `u64`
//! argc in little-endian order followed by argc NUL-terminated UTF-8
//! argument strings; a response is a `u64` return code followed by a
//! NUL-terminated UTF-8 status string, present only when there is
//! message text to report.
//!
//! Grounded on `original_source/server/eventd/src/control.c` for the
//! request/response shape (`<command> <args…>` in, a numeric status code
//! and optional message out) and its wire-level framing.

use evd_core::plugin::ControlStatus;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum accepted argc, guarding against a corrupted count forcing an
/// unbounded number of reads.
const MAX_ARGC: u64 = 4096;

/// Maximum accepted length for a single NUL-terminated string, guarding
/// against a missing terminator forcing an unbounded allocation.
const MAX_STRING_LEN: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRequest {
    pub argv: Vec<String>,
}

impl ControlRequest {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlResponse {
    pub code: u64,
    pub message: Option<String>,
}

impl From<ControlStatus> for ControlResponse {
    fn from(status: ControlStatus) -> Self {
        Self { code: status.code, message: status.message }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("argc {0} exceeds the {MAX_ARGC}-entry limit")]
    ArgcTooLarge(u64),
    #[error("string exceeds the {MAX_STRING_LEN}-byte limit before a NUL terminator")]
    StringTooLarge,
    #[error("connection closed while reading a frame")]
    Eof,
    #[error("argument is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn encode_request(req: &ControlRequest) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(req.argv.len() as u64).to_le_bytes());
    for arg in &req.argv {
        buf.extend_from_slice(arg.as_bytes());
        buf.push(0);
    }
    buf
}

pub fn encode_response(resp: &ControlResponse) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&resp.code.to_le_bytes());
    if let Some(message) = &resp.message {
        buf.extend_from_slice(message.as_bytes());
        buf.push(0);
    }
    buf
}

async fn read_u64_le(reader: &mut (impl AsyncRead + Unpin)) -> Result<u64, ControlError> {
    let mut buf = [0u8; 8];
    match reader.read_exact(&mut buf).await {
        Ok(_) => Ok(u64::from_le_bytes(buf)),
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => Err(ControlError::Eof),
        Err(err) => Err(err.into()),
    }
}

/// Read one NUL-terminated UTF-8 string, a byte at a time. Control-channel
/// frames are small and infrequent; throughput is not a concern here.
async fn read_nul_string(reader: &mut (impl AsyncRead + Unpin)) -> Result<String, ControlError> {
    let mut bytes = Vec::new();
    loop {
        let mut byte = [0u8; 1];
        match reader.read_exact(&mut byte).await {
            Ok(_) => {}
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Err(ControlError::Eof),
            Err(err) => return Err(err.into()),
        }
        if byte[0] == 0 {
            return Ok(String::from_utf8(bytes)?);
        }
        if bytes.len() >= MAX_STRING_LEN {
            return Err(ControlError::StringTooLarge);
        }
        bytes.push(byte[0]);
    }
}

pub async fn read_request(reader: &mut (impl AsyncRead + Unpin)) -> Result<ControlRequest, ControlError> {
    let argc = read_u64_le(reader).await?;
    if argc > MAX_ARGC {
        return Err(ControlError::ArgcTooLarge(argc));
    }
    let mut argv = Vec::with_capacity(argc as usize);
    for _ in 0..argc {
        argv.push(read_nul_string(reader).await?);
    }
    Ok(ControlRequest { argv })
}

pub async fn write_request(
    writer: &mut (impl AsyncWrite + Unpin),
    req: &ControlRequest,
) -> Result<(), ControlError> {
    writer.write_all(&encode_request(req)).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_response(reader: &mut (impl AsyncRead + Unpin)) -> Result<ControlResponse, ControlError> {
    let code = read_u64_le(reader).await?;
    let message = match read_nul_string(reader).await {
        Ok(text) => Some(text),
        Err(ControlError::Eof) => None,
        Err(err) => return Err(err),
    };
    Ok(ControlResponse { code, message })
}

pub async fn write_response(
    writer: &mut (impl AsyncWrite + Unpin),
    resp: &ControlResponse,
) -> Result<(), ControlError> {
    writer.write_all(&encode_response(resp)).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
