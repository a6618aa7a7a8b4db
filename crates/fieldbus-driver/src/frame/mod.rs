// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Wire frame construction and validation.
//!
//! - [`pdu`]: function-code level request images and response checks,
//!   shared by every Modbus flavor
//! - [`mbap`]: binary MBAP envelope for TCP/UDP
//! - [`ascii`]: `:` hex LRC CRLF envelope for serial ASCII
//! - [`mewtocol`]: Panasonic Mewtocol command frames

pub mod ascii;
pub mod mbap;
pub mod mewtocol;
pub mod pdu;
