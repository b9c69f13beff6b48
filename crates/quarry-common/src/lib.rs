//! Quarry Common Types and Wire Protocol
//!
//! This crate provides the leaf building blocks shared by the quarry search
//! client and anything that speaks its RPC protocol.
//!
//! # Overview
//!
//! Quarry is a blocking client for document-oriented search engines. A request
//! is addressed by a hierarchical resource path (`index/type/id/_action`),
//! carries an optional JSON body, and travels over either plain HTTP or a
//! length-prefixed binary RPC connection. This crate holds everything that does
//! not depend on a concrete transport:
//!
//! - **[`path`]**: joining and normalizing resource path segments
//! - **[`endpoint`]**: parsing `[scheme://]host[:port][/path]` base URLs
//! - **[`value`]**: the document tree used for request and response bodies
//! - **[`codec`]**: pluggable body encoders/decoders and the RPC frame codec
//! - **[`protocol`]**: request envelopes, responses, the error taxonomy and the
//!   RPC wire messages
//! - **`transport`**: blocking TCP framing used by the RPC transport (`rpc`
//!   feature only)
//!
//! # RPC Support
//!
//! The binary protocol is behind the `rpc` cargo feature (enabled by default).
//! [`RPC_SUPPORTED`] reports whether it was compiled in so callers can fail
//! fast instead of discovering the gap mid-request.
//!
//! # Example
//!
//! ```
//! use quarry_common::{Endpoint, ResourcePath, Scheme};
//!
//! let (endpoint, prefix) = Endpoint::parse("localhost:9550/logs").unwrap();
//! assert_eq!(endpoint.scheme, Scheme::Rpc);
//! assert_eq!(prefix.join("event").join(42).as_str(), "logs/event/42");
//! ```

pub mod codec;
pub mod endpoint;
pub mod path;
pub mod protocol;
#[cfg(feature = "rpc")]
pub mod transport;
pub mod value;

pub use codec::{
    DateEncoder, IsoTimestampEncoder, JsonDecoder, JsonEncoder, StandardDecoder, TimestampDecoder,
};
pub use endpoint::{Endpoint, Scheme, DEFAULT_RPC_PORT, RPC_PORT_RANGE};
pub use path::{join, PathSegment, ResourcePath};
pub use protocol::*;
pub use value::Value;

/// Whether the binary RPC protocol was compiled into this build.
pub const RPC_SUPPORTED: bool = cfg!(feature = "rpc");
