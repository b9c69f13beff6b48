use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use quarry_common::{Body, JsonDecoder, JsonEncoder, Value};

/// Per-call overrides.
///
/// Everything is optional. Unset codecs and timeout fall back to the client's
/// defaults; params and headers are stringified on the way out.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use quarry_client::RequestOptions;
/// use serde_json::json;
///
/// let options = RequestOptions::new()
///     .with_data(json!({"query": {"match_all": {}}}))
///     .with_param("size", 10)
///     .with_param("refresh", true)
///     .with_timeout(Duration::from_secs(5));
/// assert!(options.data.is_some());
/// ```
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub data: Option<Body>,
    pub params: BTreeMap<String, Value>,
    pub headers: BTreeMap<String, Value>,
    pub timeout: Option<Duration>,
    pub json_encoder: Option<Arc<dyn JsonEncoder>>,
    pub json_decoder: Option<Arc<dyn JsonDecoder>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, data: impl Into<Body>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_json_encoder(mut self, encoder: impl JsonEncoder + 'static) -> Self {
        self.json_encoder = Some(Arc::new(encoder));
        self
    }

    pub fn with_json_decoder(mut self, decoder: impl JsonDecoder + 'static) -> Self {
        self.json_decoder = Some(Arc::new(decoder));
        self
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("data", &self.data)
            .field("params", &self.params)
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("json_encoder", &self.json_encoder.is_some())
            .field("json_decoder", &self.json_decoder.is_some())
            .finish()
    }
}
