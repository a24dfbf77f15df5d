// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! evd-wire: the EVP line protocol and the control-channel binary
//! framing that `evd-daemon` and `evd-cli` speak to each other.

pub mod control;
pub mod evp;

pub use control::{
    read_request, read_response, write_request, write_response, ControlError, ControlRequest,
    ControlResponse,
};
pub use evp::{read_frame, write_frame, Frame, ProtocolError, SubscribeScope, PROTOCOL_VERSION};
