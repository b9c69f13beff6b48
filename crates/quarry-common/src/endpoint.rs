//! Base URL parsing.
//!
//! A base URL has the shape `[scheme://]host[:port][/path]`. When the scheme
//! is missing it is derived from the port: ports in [`RPC_PORT_RANGE`] speak
//! the binary RPC protocol, everything else speaks HTTP.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use url::Url;

use crate::path::ResourcePath;
use crate::protocol::error::{QuarryError, Result};

/// Ports that imply the RPC scheme when no scheme is given.
pub const RPC_PORT_RANGE: RangeInclusive<u16> = 9500..=9600;

/// Port used for `rpc://` URLs without an explicit port.
pub const DEFAULT_RPC_PORT: u16 = 9500;

/// Wire protocol spoken with an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
    Rpc,
}

impl Scheme {
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
            Scheme::Rpc => DEFAULT_RPC_PORT,
        }
    }

    /// Scheme implied by a bare port.
    pub fn from_port(port: u16) -> Self {
        if RPC_PORT_RANGE.contains(&port) {
            Scheme::Rpc
        } else {
            Scheme::Http
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Rpc => "rpc",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            "rpc" => Ok(Scheme::Rpc),
            other => Err(QuarryError::Configuration(format!(
                "Unsupported scheme '{}'",
                other
            ))),
        }
    }
}

/// A resolved connection target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(scheme: Scheme, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme,
            host: host.into(),
            port,
        }
    }

    /// Parses a base URL into its endpoint and the path prefix it carries.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::Configuration`] if the URL is empty, cannot be
    /// parsed, names an unknown scheme, has no host or has port 0.
    ///
    /// # Example
    ///
    /// ```
    /// use quarry_common::{Endpoint, Scheme};
    ///
    /// let (endpoint, path) = Endpoint::parse("localhost:9200").unwrap();
    /// assert_eq!(endpoint, Endpoint::new(Scheme::Http, "localhost", 9200));
    /// assert!(path.is_empty());
    /// ```
    pub fn parse(url: &str) -> Result<(Endpoint, ResourcePath)> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(QuarryError::Configuration("Base URL is empty".to_string()));
        }

        let (explicit_scheme, rest) = match trimmed.split_once("://") {
            Some((scheme, rest)) => (Some(scheme.parse::<Scheme>()?), rest),
            None => (None, trimmed),
        };

        // Only the authority goes through the url crate; the path is kept
        // verbatim so it is neither percent-encoded nor dot-normalized.
        let (authority, raw_path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };

        // A non-special scheme keeps the url crate from eliding default ports,
        // so `port()` reports exactly what the caller wrote.
        let parsed = Url::parse(&format!("quarry://{}", authority)).map_err(|e| {
            QuarryError::Configuration(format!("Invalid base URL '{}': {}", url, e))
        })?;

        let host = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| QuarryError::Configuration(format!("No host in base URL '{}'", url)))?
            .to_string();

        let explicit_port = parsed.port();
        let scheme = explicit_scheme
            .unwrap_or_else(|| explicit_port.map(Scheme::from_port).unwrap_or(Scheme::Http));
        let port = explicit_port.unwrap_or_else(|| scheme.default_port());
        if port == 0 {
            return Err(QuarryError::Configuration(format!(
                "Port must be positive in base URL '{}'",
                url
            )));
        }

        let path = ResourcePath::new(raw_path.trim_matches('/'));
        Ok((Endpoint { scheme, host, port }, path))
    }

    /// `scheme://host:port`, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// `host:port`, suitable for socket address resolution.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}
