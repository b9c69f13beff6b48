use std::time::Duration;

use quarry_common::{Endpoint, QuarryError, RawResponse, RequestEnvelope, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

/// HTTP(S) transport backed by one keep-alive `reqwest` session.
///
/// The session is internally synchronized, so a single transport can serve
/// many threads at once.
pub struct HttpTransport {
    endpoint: Endpoint,
    session: Client,
}

impl HttpTransport {
    /// Creates the session for `endpoint`. No connection is opened until the
    /// first request.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::Configuration`] if the TLS backend cannot be
    /// initialized.
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Result<Self> {
        let session = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QuarryError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { endpoint, session })
    }

    /// Full URL for a resource path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.base_url(), path.trim_start_matches('/'))
    }

    fn map_error(err: reqwest::Error, timeout: Duration) -> QuarryError {
        if err.is_timeout() {
            QuarryError::Timeout(timeout.as_millis() as u64)
        } else if err.is_connect() {
            QuarryError::Connection(err.to_string())
        } else if err.is_builder() {
            QuarryError::InvalidRequest(err.to_string())
        } else {
            QuarryError::Transport(err.to_string())
        }
    }
}

impl super::Transport for HttpTransport {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn execute(&self, request: &RequestEnvelope) -> Result<RawResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| QuarryError::InvalidRequest(e.to_string()))?;
        let url = self.url_for(request.path.as_str());

        let mut builder = self
            .session
            .request(method, &url)
            .timeout(request.timeout);

        let params: Vec<(String, String)> = request.string_params().into_iter().collect();
        if !params.is_empty() {
            builder = builder.query(&params);
        }

        let headers = request.string_headers();
        let has_content_type = headers
            .keys()
            .any(|key| key.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
        for (key, value) in headers {
            builder = builder.header(key, value);
        }

        if let Some(body) = &request.body {
            if !has_content_type {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .map_err(|e| Self::map_error(e, request.timeout))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| Self::map_error(e, request.timeout))?;

        Ok(RawResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_common::Scheme;

    fn transport(scheme: Scheme, port: u16) -> HttpTransport {
        HttpTransport::new(Endpoint::new(scheme, "localhost", port), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_url_for_joins_with_single_slash() {
        let http = transport(Scheme::Http, 9200);
        assert_eq!(http.url_for("idx/type/1"), "http://localhost:9200/idx/type/1");
        assert_eq!(http.url_for("/idx"), "http://localhost:9200/idx");
        assert_eq!(http.url_for(""), "http://localhost:9200/");
    }

    #[test]
    fn test_url_for_https() {
        let https = transport(Scheme::Https, 443);
        assert_eq!(https.url_for("_cluster/health"), "https://localhost:443/_cluster/health");
    }
}
