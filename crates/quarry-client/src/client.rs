use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use quarry_common::codec::BodyCodec;
use quarry_common::{
    Body, Endpoint, IsoTimestampEncoder, JsonDecoder, JsonEncoder, Method, PathSegment,
    QuarryError, RequestEnvelope, ResourcePath, ResponseResult, Result, StandardDecoder,
};

use crate::options::RequestOptions;
use crate::pool::ConnectionPool;
use crate::transport::{self, Transport};

/// Base URL used when none is configured.
pub const DEFAULT_URL: &str = "localhost:9200";

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Search engine client.
///
/// A client is an immutable view: a resource path prefix plus a shared
/// connection pool and codec configuration. [`at`](Self::at) derives a deeper
/// view without touching the network, and clones are cheap.
///
/// # Example
///
/// ```rust,no_run
/// use quarry_client::{Client, RequestOptions};
/// use serde_json::json;
///
/// let client = Client::new("localhost:9200").unwrap();
/// let tweets = client.at("tweets").at("tweet");
///
/// tweets.put(1, RequestOptions::new().with_data(json!({"user": "dan"}))).unwrap();
/// let doc = tweets.get(1, RequestOptions::new()).unwrap();
/// println!("{}", doc["_source"]["user"]);
/// ```
#[derive(Clone)]
pub struct Client {
    path: ResourcePath,
    inner: Arc<ClientInner>,
}

struct ClientInner {
    pool: ConnectionPool,
    timeout: Duration,
    json_encoder: Arc<dyn JsonEncoder>,
    json_decoder: Arc<dyn JsonDecoder>,
    raise_on_error: bool,
}

impl Client {
    /// Connects to a single base URL with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::Configuration`] for a malformed URL, and a
    /// connection error when an RPC endpoint is unreachable.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::builder().url(url).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Returns a view one segment deeper. Performs no I/O.
    pub fn at(&self, segment: impl PathSegment) -> Client {
        Client {
            path: self.path.join(segment),
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn get(&self, path: impl PathSegment, options: RequestOptions) -> Result<ResponseResult> {
        self.request(Method::Get, path, options)
    }

    pub fn put(&self, path: impl PathSegment, options: RequestOptions) -> Result<ResponseResult> {
        self.request(Method::Put, path, options)
    }

    pub fn post(&self, path: impl PathSegment, options: RequestOptions) -> Result<ResponseResult> {
        self.request(Method::Post, path, options)
    }

    pub fn delete(&self, path: impl PathSegment, options: RequestOptions) -> Result<ResponseResult> {
        self.request(Method::Delete, path, options)
    }

    pub fn head(&self, path: impl PathSegment, options: RequestOptions) -> Result<ResponseResult> {
        self.request(Method::Head, path, options)
    }

    /// Issues a request relative to this view's path.
    ///
    /// Per-call codecs and timeout in `options` override the client's. The
    /// next transport is taken from the pool; nothing is retried.
    ///
    /// # Errors
    ///
    /// - Body encoding errors from the effective encoder
    /// - Timeout, connection and transport errors from the selected transport
    /// - [`QuarryError::Application`] for a failure status when the client
    ///   raises on error
    pub fn request(
        &self,
        method: Method,
        path: impl PathSegment,
        options: RequestOptions,
    ) -> Result<ResponseResult> {
        let encoder: &dyn JsonEncoder = match &options.json_encoder {
            Some(encoder) => &**encoder,
            None => &*self.inner.json_encoder,
        };
        let decoder: &dyn JsonDecoder = match &options.json_decoder {
            Some(decoder) => &**decoder,
            None => &*self.inner.json_decoder,
        };

        let mut envelope = RequestEnvelope::new(
            method,
            self.path.join(path),
            options.timeout.unwrap_or(self.inner.timeout),
        );
        envelope.params = options.params;
        envelope.headers = options.headers;
        envelope.body = match &options.data {
            Some(Body::Json(value)) => Some(BodyCodec::encode(value, encoder)?),
            Some(Body::Raw(raw)) => Some(raw.clone()),
            None => None,
        };

        let transport = self.inner.pool.select();
        tracing::debug!(
            method = %envelope.method,
            path = %envelope.path,
            endpoint = %transport.endpoint(),
            "Dispatching request"
        );
        transport.send(&envelope, decoder, self.inner.raise_on_error)
    }

    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    pub fn raise_on_error(&self) -> bool {
        self.inner.raise_on_error
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.inner.pool
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("path", &self.path)
            .field("pool", &self.inner.pool)
            .field("timeout", &self.inner.timeout)
            .field("raise_on_error", &self.inner.raise_on_error)
            .finish()
    }
}

/// Configures and builds a [`Client`].
///
/// Transports come from exactly one source, checked in this order: an
/// injected pool, injected transports, or base URLs (falling back to
/// [`DEFAULT_URL`]).
pub struct ClientBuilder {
    urls: Vec<String>,
    path: ResourcePath,
    timeout: Duration,
    json_encoder: Arc<dyn JsonEncoder>,
    json_decoder: Arc<dyn JsonDecoder>,
    raise_on_error: bool,
    transports: Vec<Arc<dyn Transport>>,
    pool: Option<ConnectionPool>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            path: ResourcePath::root(),
            timeout: DEFAULT_TIMEOUT,
            json_encoder: Arc::new(IsoTimestampEncoder),
            json_decoder: Arc::new(StandardDecoder),
            raise_on_error: false,
            transports: Vec::new(),
            pool: None,
        }
    }
}

impl ClientBuilder {
    /// Adds a base URL, `[scheme://]host[:port][/path]`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(url.into());
        self
    }

    pub fn urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls.extend(urls.into_iter().map(Into::into));
        self
    }

    /// Path prefix, joined after any path carried by a single base URL.
    pub fn path(mut self, path: impl PathSegment) -> Self {
        self.path = self.path.join(path);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn json_encoder(mut self, encoder: impl JsonEncoder + 'static) -> Self {
        self.json_encoder = Arc::new(encoder);
        self
    }

    pub fn json_decoder(mut self, decoder: impl JsonDecoder + 'static) -> Self {
        self.json_decoder = Arc::new(decoder);
        self
    }

    pub fn raise_on_error(mut self, raise_on_error: bool) -> Self {
        self.raise_on_error = raise_on_error;
        self
    }

    /// Adds a pre-built transport; URLs are then ignored.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transports.push(transport);
        self
    }

    /// Uses a pre-built pool; URLs and transports are then ignored.
    pub fn pool(mut self, pool: ConnectionPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// # Errors
    ///
    /// Returns [`QuarryError::Configuration`] when a URL is malformed, when
    /// several URLs are given and one carries a path, or when an RPC URL is
    /// used without RPC support. RPC endpoints are connected here, so an
    /// unreachable one fails the build.
    pub fn build(self) -> Result<Client> {
        let (pool, prefix) = match self.pool {
            Some(pool) => (pool, ResourcePath::root()),
            None if !self.transports.is_empty() => {
                (ConnectionPool::new(self.transports)?, ResourcePath::root())
            }
            None => {
                let urls = if self.urls.is_empty() {
                    vec![DEFAULT_URL.to_string()]
                } else {
                    self.urls
                };
                pool_from_urls(&urls, self.timeout)?
            }
        };

        let endpoints: Vec<String> = pool.endpoints().iter().map(Endpoint::to_string).collect();
        tracing::info!(hosts = pool.len(), ?endpoints, "Built connection pool");

        Ok(Client {
            path: prefix.join(&self.path),
            inner: Arc::new(ClientInner {
                pool,
                timeout: self.timeout,
                json_encoder: self.json_encoder,
                json_decoder: self.json_decoder,
                raise_on_error: self.raise_on_error,
            }),
        })
    }
}

fn pool_from_urls(urls: &[String], timeout: Duration) -> Result<(ConnectionPool, ResourcePath)> {
    let parsed = urls
        .iter()
        .map(|url| Endpoint::parse(url))
        .collect::<Result<Vec<_>>>()?;

    if parsed.len() > 1 {
        if let Some((endpoint, path)) = parsed.iter().find(|(_, path)| !path.is_empty()) {
            return Err(QuarryError::Configuration(format!(
                "Base URL path '{}' on {} is ambiguous with multiple hosts",
                path, endpoint
            )));
        }
    }

    let prefix = match parsed.as_slice() {
        [(_, path)] => path.clone(),
        _ => ResourcePath::root(),
    };

    let transports = parsed
        .into_iter()
        .map(|(endpoint, _)| transport::connect(endpoint, timeout))
        .collect::<Result<Vec<_>>>()?;

    Ok((ConnectionPool::new(transports)?, prefix))
}
