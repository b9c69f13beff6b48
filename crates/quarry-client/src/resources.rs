//! Index and type handles.
//!
//! Thin helpers over [`Client`] for the common document operations. Each
//! handle is just a client view positioned at `index` or `index/type`, so
//! everything the raw client can do is still reachable through
//! [`IndexHandle::client`] and [`TypeHandle::client`].

use quarry_common::{Body, PathSegment, QuarryError, ResponseResult, Result};

use crate::client::Client;
use crate::options::RequestOptions;

/// One or more index or type names, rendered comma-separated.
pub trait NameList {
    fn to_names(&self) -> String;
}

impl NameList for str {
    fn to_names(&self) -> String {
        self.to_string()
    }
}

impl NameList for String {
    fn to_names(&self) -> String {
        self.clone()
    }
}

impl<S: AsRef<str>> NameList for [S] {
    fn to_names(&self) -> String {
        self.iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<S: AsRef<str>, const N: usize> NameList for [S; N] {
    fn to_names(&self) -> String {
        self.as_slice().to_names()
    }
}

impl<S: AsRef<str>> NameList for Vec<S> {
    fn to_names(&self) -> String {
        self.as_slice().to_names()
    }
}

impl<T: NameList + ?Sized> NameList for &T {
    fn to_names(&self) -> String {
        (**self).to_names()
    }
}

impl Client {
    /// Handle for one or more indices.
    pub fn index(&self, names: impl NameList) -> IndexHandle {
        IndexHandle {
            client: self.at(names.to_names()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexHandle {
    client: Client,
}

impl IndexHandle {
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Creates the index, with optional settings and mappings.
    pub fn create(&self, body: Option<Body>) -> Result<ResponseResult> {
        let mut options = RequestOptions::new();
        options.data = body;
        self.client.put("", options)
    }

    pub fn delete(&self) -> Result<ResponseResult> {
        self.client.delete("", RequestOptions::new())
    }

    /// Whether the index exists. A 404 answers `false` even when the client
    /// raises on error.
    pub fn exists(&self) -> Result<bool> {
        match self.client.head("", RequestOptions::new()) {
            Ok(result) => Ok(result.as_bool().unwrap_or(false)),
            Err(QuarryError::Application {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn refresh(&self) -> Result<ResponseResult> {
        self.client.post("_refresh", RequestOptions::new())
    }

    /// Handle for one or more types within these indices.
    pub fn types(&self, names: impl NameList) -> TypeHandle {
        TypeHandle {
            client: self.client.at(names.to_names()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeHandle {
    client: Client,
}

impl TypeHandle {
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn search(&self, query: impl Into<Body>, options: RequestOptions) -> Result<ResponseResult> {
        self.client.get("_search", options.with_data(query))
    }

    /// Indexes a document under a server-assigned id.
    pub fn index(&self, doc: impl Into<Body>, options: RequestOptions) -> Result<ResponseResult> {
        self.client.post("", options.with_data(doc))
    }

    /// Indexes a document under `id`, replacing any existing one.
    pub fn index_with_id(
        &self,
        id: impl PathSegment,
        doc: impl Into<Body>,
        options: RequestOptions,
    ) -> Result<ResponseResult> {
        self.client.put(id, options.with_data(doc))
    }

    pub fn get(&self, id: impl PathSegment, options: RequestOptions) -> Result<ResponseResult> {
        self.client.get(id, options)
    }

    pub fn multi_get(&self, data: impl Into<Body>, options: RequestOptions) -> Result<ResponseResult> {
        self.client.get("_mget", options.with_data(data))
    }

    pub fn delete(&self, id: impl PathSegment, options: RequestOptions) -> Result<ResponseResult> {
        self.client.delete(id, options)
    }

    pub fn update(
        &self,
        id: impl PathSegment,
        data: impl Into<Body>,
        options: RequestOptions,
    ) -> Result<ResponseResult> {
        self.client
            .at(id)
            .post("_update", options.with_data(data))
    }
}
