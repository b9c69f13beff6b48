use std::net::TcpStream;
use std::sync::Mutex;
use std::time::Duration;

use quarry_common::transport::TcpFraming;
use quarry_common::{Endpoint, QuarryError, RawResponse, RequestEnvelope, RestRequest, Result};

/// Binary RPC transport over one long-lived TCP connection.
///
/// The connection is opened when the transport is created. Calls are
/// serialized on it through a mutex. If an exchange fails the socket is
/// dropped, since a half-read frame leaves the stream unusable, and the next
/// call opens a fresh one.
pub struct RpcTransport {
    endpoint: Endpoint,
    framing: TcpFraming,
    stream: Mutex<Option<TcpStream>>,
}

impl RpcTransport {
    /// Connects to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::Connection`] if the endpoint does not accept the
    /// connection.
    pub fn connect(endpoint: Endpoint, timeout: Duration) -> Result<Self> {
        let framing = TcpFraming::new(timeout);
        let stream = framing.connect(&endpoint.authority())?;
        tracing::debug!(endpoint = %endpoint, "RPC connection established");

        Ok(Self {
            endpoint,
            framing,
            stream: Mutex::new(Some(stream)),
        })
    }

    /// Whether a socket is currently held.
    pub fn is_connected(&self) -> bool {
        self.stream
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }
}

impl super::Transport for RpcTransport {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn execute(&self, request: &RequestEnvelope) -> Result<RawResponse> {
        let wire = RestRequest::from_envelope(request)?;

        // Sockets reject a zero timeout; the call has no time left to run.
        if request.timeout.is_zero() {
            return Err(QuarryError::Timeout(0));
        }

        let mut guard = self
            .stream
            .lock()
            .map_err(|_| QuarryError::Transport("RPC connection lock poisoned".to_string()))?;

        if guard.is_none() {
            tracing::debug!(endpoint = %self.endpoint, "Reconnecting RPC transport");
            *guard = Some(self.framing.connect(&self.endpoint.authority())?);
        }

        let framing = TcpFraming::new(request.timeout);
        let result = match guard.as_mut() {
            Some(stream) => framing
                .apply_timeouts(stream)
                .and_then(|_| framing.exchange(stream, &wire)),
            None => Err(QuarryError::Connection(format!(
                "No connection to {}",
                self.endpoint
            ))),
        };

        match result {
            Ok(response) => Ok(response.into()),
            Err(e) => {
                tracing::debug!(endpoint = %self.endpoint, error = %e, "Dropping RPC connection");
                *guard = None;
                Err(e)
            }
        }
    }
}
