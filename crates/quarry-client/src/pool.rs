use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use quarry_common::{Endpoint, QuarryError, Result};

use crate::transport::Transport;

/// Fixed, ordered set of transports served round-robin.
///
/// Every call to [`select`](Self::select) hands out the next transport in
/// order, wrapping at the end of the list. The cursor is advanced atomically,
/// so the `k`-th selection returns transport `k mod N` no matter how many
/// threads share the pool.
///
/// # Routing
///
/// There is no health tracking. A transport that failed on its last turn is
/// still handed out on its next one, and nothing is retried.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use quarry_client::transport::{HttpTransport, Transport};
/// use quarry_client::ConnectionPool;
/// use quarry_common::{Endpoint, Scheme};
///
/// let transports: Vec<Arc<dyn Transport>> = ["search-1", "search-2"]
///     .iter()
///     .map(|host| {
///         let endpoint = Endpoint::new(Scheme::Http, *host, 9200);
///         Arc::new(HttpTransport::new(endpoint, Duration::from_secs(30)).unwrap()) as Arc<dyn Transport>
///     })
///     .collect();
///
/// let pool = ConnectionPool::new(transports).unwrap();
/// assert_eq!(pool.select().endpoint().host, "search-1");
/// assert_eq!(pool.select().endpoint().host, "search-2");
/// assert_eq!(pool.select().endpoint().host, "search-1");
/// ```
pub struct ConnectionPool {
    transports: Vec<Arc<dyn Transport>>,
    cursor: AtomicUsize,
}

impl ConnectionPool {
    /// Creates a pool over `transports`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::Configuration`] if `transports` is empty.
    pub fn new(transports: Vec<Arc<dyn Transport>>) -> Result<Self> {
        if transports.is_empty() {
            return Err(QuarryError::Configuration(
                "Connection pool needs at least one transport".to_string(),
            ));
        }

        Ok(Self {
            transports,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Returns the next transport in round-robin order.
    pub fn select(&self) -> Arc<dyn Transport> {
        let len = self.transports.len();
        let index = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some((current + 1) % len)
            })
            .unwrap_or_else(|current| current);

        let transport = &self.transports[index];
        tracing::debug!(index, endpoint = %transport.endpoint(), "Selected transport");
        Arc::clone(transport)
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    /// Always false; an empty pool cannot be built.
    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.transports
            .iter()
            .map(|transport| transport.endpoint().clone())
            .collect()
    }
}

impl fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("endpoints", &self.endpoints())
            .field("cursor", &self.cursor.load(Ordering::Relaxed))
            .finish()
    }
}
