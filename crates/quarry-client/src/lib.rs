//! Quarry Client
//!
//! Blocking client for document-oriented search engines. A [`Client`] is an
//! immutable view over a resource path; requests go out through a round-robin
//! [`ConnectionPool`] of HTTP or RPC [`transport`]s.
//!
//! # Example
//!
//! ```rust,no_run
//! use quarry_client::{Client, RequestOptions};
//! use serde_json::json;
//!
//! let client = Client::builder()
//!     .urls(["search-1:9200", "search-2:9200"])
//!     .raise_on_error(true)
//!     .build()
//!     .unwrap();
//!
//! let hits = client
//!     .at("tweets")
//!     .get("_search", RequestOptions::new().with_data(json!({"query": {"match_all": {}}})))
//!     .unwrap();
//! println!("{}", hits["hits"]["total"]);
//! ```

pub mod client;
pub mod options;
pub mod pool;
pub mod resources;
pub mod transport;

pub use client::{Client, ClientBuilder, DEFAULT_TIMEOUT, DEFAULT_URL};
pub use options::RequestOptions;
pub use pool::ConnectionPool;
pub use resources::{IndexHandle, NameList, TypeHandle};
pub use transport::Transport;

pub use quarry_common::{Body, Method, QuarryError, ResponseResult, Result, Value};
