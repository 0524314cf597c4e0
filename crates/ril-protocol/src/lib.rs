//! Radio Interface Layer wire protocol
//!
//! This crate provides the binary codec spoken between the telephony stack
//! and the modem process: a parcel reader/writer, protocol constants, the
//! typed records the modem reports, the decoders that build them, and the
//! encoders for outgoing requests.
//!
//! # Protocol Overview
//!
//! Messages are flat parcels of little-endian integers, length-prefixed
//! strings and length-prefixed byte blobs. They are either:
//!
//! - **Requests** (host → modem): `[code][serial]<body>`
//! - **Solicited responses** (modem → host): `[serial][error]<body>`
//! - **Unsolicited notifications** (modem → host): `[event]<body>`
//!
//! Body layouts are fixed per code; nothing on the wire describes them.
//!
//! # Example
//!
//! ```rust,ignore
//! use ril_protocol::{decode_signal_strength, Request, WireCursor};
//!
//! // Build a request
//! let bytes = Request::SignalStrength.encode(serial);
//!
//! // Decode a response body
//! let mut cursor = WireCursor::new(&body);
//! let strength = decode_signal_strength(&mut cursor)?;
//! ```

mod constants;
mod error;
mod parcel;
mod requests;
mod responses;
mod types;

pub use constants::*;
pub use error::*;
pub use parcel::*;
pub use requests::*;
pub use responses::*;
pub use types::*;
