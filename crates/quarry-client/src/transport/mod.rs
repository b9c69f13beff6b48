//! Protocol-specific request executors.
//!
//! A [`Transport`] owns the connection state for one [`Endpoint`] and turns a
//! [`RequestEnvelope`] into a [`RawResponse`]. Decoding and failure handling
//! are shared and live in the provided [`Transport::send`].

pub mod http;
#[cfg(feature = "rpc")]
pub mod rpc;

use std::sync::Arc;
use std::time::Duration;

use quarry_common::{
    Endpoint, JsonDecoder, RawResponse, RequestEnvelope, ResponseResult, Result, Scheme,
};

pub use http::HttpTransport;
#[cfg(feature = "rpc")]
pub use rpc::RpcTransport;

pub trait Transport: Send + Sync {
    /// The endpoint this transport talks to.
    fn endpoint(&self) -> &Endpoint;

    /// Performs one request/response exchange.
    ///
    /// # Errors
    ///
    /// I/O failures surface as timeout, connection or transport errors. A response
    /// with a failure status is not an error at this level.
    fn execute(&self, request: &RequestEnvelope) -> Result<RawResponse>;

    /// Executes the request and decodes the response.
    fn send(
        &self,
        request: &RequestEnvelope,
        decoder: &dyn JsonDecoder,
        raise_on_error: bool,
    ) -> Result<ResponseResult> {
        self.execute(request)?.into_result(decoder, raise_on_error)
    }
}

/// Opens the transport matching the endpoint's scheme.
///
/// # Errors
///
/// Returns a configuration error for an RPC endpoint when RPC support
/// is not compiled in, and a connection error if an RPC endpoint refuses the
/// initial connection.
pub fn connect(endpoint: Endpoint, timeout: Duration) -> Result<Arc<dyn Transport>> {
    match endpoint.scheme {
        Scheme::Http | Scheme::Https => Ok(Arc::new(HttpTransport::new(endpoint, timeout)?)),
        Scheme::Rpc if !quarry_common::RPC_SUPPORTED => Err(rpc_unsupported(&endpoint)),
        Scheme::Rpc => connect_rpc(endpoint, timeout),
    }
}

fn rpc_unsupported(endpoint: &Endpoint) -> quarry_common::QuarryError {
    quarry_common::QuarryError::Configuration(format!(
        "RPC support is not compiled in; cannot connect to {}",
        endpoint
    ))
}

#[cfg(feature = "rpc")]
fn connect_rpc(endpoint: Endpoint, timeout: Duration) -> Result<Arc<dyn Transport>> {
    Ok(Arc::new(RpcTransport::connect(endpoint, timeout)?))
}

#[cfg(not(feature = "rpc"))]
fn connect_rpc(endpoint: Endpoint, _timeout: Duration) -> Result<Arc<dyn Transport>> {
    Err(rpc_unsupported(&endpoint))
}
