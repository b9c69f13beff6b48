use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::codec::RpcCodec;
use crate::protocol::error::{QuarryError, Result};
use crate::protocol::rpc::{RestRequest, RestResponse};

/// Largest frame accepted from a peer (100 MB).
pub const MAX_MESSAGE_SIZE: usize = 100 * 1024 * 1024;

/// Length-prefixed framing over blocking TCP streams.
///
/// The framing carries a timeout that is applied to connects, reads and
/// writes, and that is reported back in [`QuarryError::Timeout`] when an
/// operation runs out of time.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use quarry_common::transport::TcpFraming;
/// use quarry_common::{RestRequest, RpcMethod};
///
/// let framing = TcpFraming::new(Duration::from_secs(30));
/// let mut stream = framing.connect("127.0.0.1:9500").unwrap();
///
/// let request = RestRequest {
///     method: RpcMethod::Get,
///     uri: "_cluster/health".to_string(),
///     parameters: Default::default(),
///     headers: Default::default(),
///     body: None,
/// };
/// let response = framing.exchange(&mut stream, &request).unwrap();
/// println!("{}", response.status);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TcpFraming {
    timeout: Duration,
}

impl TcpFraming {
    pub fn new(timeout: Duration) -> Self {
        TcpFraming { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Connects to a remote endpoint.
    ///
    /// The address may resolve to several socket addresses; each is tried in
    /// turn until one accepts.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::Connection`] if the address cannot be resolved
    /// or no resolved address accepts the connection.
    pub fn connect(&self, addr: &str) -> Result<TcpStream> {
        let socket_addrs = addr
            .to_socket_addrs()
            .map_err(|e| QuarryError::Connection(format!("Invalid address '{}': {}", addr, e)))?;

        let mut last_err = None;
        for socket_addr in socket_addrs {
            match TcpStream::connect_timeout(&socket_addr, self.timeout) {
                Ok(stream) => {
                    self.apply_timeouts(&stream)?;
                    stream.set_nodelay(true).map_err(|e| {
                        QuarryError::Connection(format!("Failed to set nodelay: {}", e))
                    })?;
                    return Ok(stream);
                }
                Err(e) => {
                    last_err = Some(e);
                }
            }
        }

        Err(QuarryError::Connection(format!(
            "Failed to connect to {}: {}",
            addr,
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no addresses resolved".to_string())
        )))
    }

    /// Sets read and write timeouts on a stream.
    pub fn apply_timeouts(&self, stream: &TcpStream) -> Result<()> {
        stream
            .set_read_timeout(Some(self.timeout))
            .map_err(|e| QuarryError::Connection(format!("Failed to set read timeout: {}", e)))?;
        stream
            .set_write_timeout(Some(self.timeout))
            .map_err(|e| QuarryError::Connection(format!("Failed to set write timeout: {}", e)))?;
        Ok(())
    }

    /// Sends a request frame and waits for the matching response frame.
    pub fn exchange<S: Read + Write>(
        &self,
        stream: &mut S,
        request: &RestRequest,
    ) -> Result<RestResponse> {
        let encoded = RpcCodec::encode_request(request)?;
        self.send_message(stream, &encoded)?;
        let data = self.receive_message(stream)?;
        RpcCodec::decode_response(&data)
    }

    /// Writes one frame: `[u32 big-endian length] + [data]`.
    pub fn send_message<W: Write>(&self, stream: &mut W, data: &[u8]) -> Result<()> {
        if data.len() > MAX_MESSAGE_SIZE {
            return Err(QuarryError::InvalidRequest(format!(
                "Message too large: {} bytes (max {} bytes)",
                data.len(),
                MAX_MESSAGE_SIZE
            )));
        }
        let len = data.len() as u32;

        stream
            .write_all(&len.to_be_bytes())
            .map_err(|e| self.map_io_error(e, "writing length prefix"))?;
        stream
            .write_all(data)
            .map_err(|e| self.map_io_error(e, "writing data"))?;
        stream
            .flush()
            .map_err(|e| self.map_io_error(e, "flushing stream"))?;

        Ok(())
    }

    /// Reads one frame.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::InvalidResponse`] if the announced length
    /// exceeds [`MAX_MESSAGE_SIZE`], and a timeout, connection or I/O error if
    /// the stream fails.
    pub fn receive_message<R: Read>(&self, stream: &mut R) -> Result<Vec<u8>> {
        let mut len_buf = [0u8; 4];
        stream
            .read_exact(&mut len_buf)
            .map_err(|e| self.map_io_error(e, "reading length prefix"))?;

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_MESSAGE_SIZE {
            return Err(QuarryError::InvalidResponse(format!(
                "Message too large: {} bytes (max {} bytes)",
                len, MAX_MESSAGE_SIZE
            )));
        }

        let mut buf = vec![0u8; len];
        stream
            .read_exact(&mut buf)
            .map_err(|e| self.map_io_error(e, "reading data"))?;

        Ok(buf)
    }

    fn map_io_error(&self, err: std::io::Error, context: &str) -> QuarryError {
        match err.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => {
                QuarryError::Timeout(self.timeout.as_millis() as u64)
            }
            ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof => {
                QuarryError::Connection(format!("{}: Connection lost", context))
            }
            _ => QuarryError::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::rpc::RpcMethod;
    use std::collections::BTreeMap;
    use std::io::Cursor;
    use std::net::TcpListener;
    use std::thread;

    fn framing() -> TcpFraming {
        TcpFraming::new(Duration::from_secs(2))
    }

    #[test]
    fn test_frame_layout() {
        let mut out = Vec::new();
        framing().send_message(&mut out, b"abc").unwrap();
        assert_eq!(out, vec![0, 0, 0, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn test_receive_reads_one_frame() {
        let mut input = Cursor::new(vec![0, 0, 0, 2, b'h', b'i', 0, 0, 0, 0]);
        let first = framing().receive_message(&mut input).unwrap();
        assert_eq!(first, b"hi");
        let second = framing().receive_message(&mut input).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let len = (MAX_MESSAGE_SIZE as u32 + 1).to_be_bytes();
        let mut input = Cursor::new(len.to_vec());
        let err = framing().receive_message(&mut input).unwrap_err();
        assert!(matches!(err, QuarryError::InvalidResponse(_)));
    }

    #[test]
    fn test_truncated_frame_is_connection_error() {
        let mut input = Cursor::new(vec![0, 0, 0, 9, 1, 2]);
        let err = framing().receive_message(&mut input).unwrap_err();
        assert!(matches!(err, QuarryError::Connection(_)));
    }

    #[test]
    fn test_timeout_reports_configured_millis() {
        let err = framing().map_io_error(ErrorKind::TimedOut.into(), "reading data");
        assert!(matches!(err, QuarryError::Timeout(2000)));
    }

    #[test]
    fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = framing().connect(&addr.to_string()).unwrap_err();
        assert!(matches!(err, QuarryError::Connection(_)));
    }

    #[test]
    fn test_exchange_over_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let framing = framing();
            let data = framing.receive_message(&mut stream).unwrap();
            let request = RpcCodec::decode_request(&data).unwrap();
            let body = format!(r#"{{"uri":"{}"}}"#, request.uri);
            let response = RpcCodec::encode_response(&RestResponse::new(200, body)).unwrap();
            framing.send_message(&mut stream, &response).unwrap();
        });

        let framing = framing();
        let mut stream = framing.connect(&addr.to_string()).unwrap();
        let request = RestRequest {
            method: RpcMethod::Get,
            uri: "idx/_search".to_string(),
            parameters: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
        };
        let response = framing.exchange(&mut stream, &request).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body.as_deref(), Some(r#"{"uri":"idx/_search"}"#));

        server.join().unwrap();
    }
}
