//! Quarry RPC Framing
//!
//! Blocking TCP plumbing for the binary RPC protocol.
//!
//! # Wire Format
//!
//! Every message is a 4-byte big-endian length prefix followed by a
//! postcard-encoded [`RestRequest`](crate::RestRequest) or
//! [`RestResponse`](crate::RestResponse):
//!
//! ```text
//! [4-byte length] [postcard data]
//! ```
//!
//! Frames larger than [`MAX_MESSAGE_SIZE`] are rejected before any buffer is
//! allocated.

pub mod tcp;

pub use tcp::{TcpFraming, MAX_MESSAGE_SIZE};
