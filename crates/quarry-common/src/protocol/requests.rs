use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::path::ResourcePath;
use crate::protocol::error::{QuarryError, Result};
use crate::value::Value;

/// HTTP-style verb of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Head,
    Options,
    Patch,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "PUT" => Ok(Method::Put),
            "POST" => Ok(Method::Post),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            "PATCH" => Ok(Method::Patch),
            other => Err(QuarryError::Configuration(format!(
                "Unsupported method '{}'",
                other
            ))),
        }
    }
}

/// Request body as supplied by the caller.
///
/// `Json` bodies are serialized with the effective encoder; `Raw` bodies
/// (pre-serialized JSON, newline-delimited bulk payloads) are sent untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Raw(String),
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Json(Value::from(value))
    }
}

impl From<String> for Body {
    fn from(raw: String) -> Self {
        Body::Raw(raw)
    }
}

impl From<&str> for Body {
    fn from(raw: &str) -> Self {
        Body::Raw(raw.to_string())
    }
}

/// A fully resolved request, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub method: Method,
    pub path: ResourcePath,
    pub body: Option<String>,
    pub params: BTreeMap<String, Value>,
    pub headers: BTreeMap<String, Value>,
    pub timeout: Duration,
}

impl RequestEnvelope {
    pub fn new(method: Method, path: impl Into<ResourcePath>, timeout: Duration) -> Self {
        RequestEnvelope {
            method,
            path: path.into(),
            body: None,
            params: BTreeMap::new(),
            headers: BTreeMap::new(),
            timeout,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
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

    /// Query parameters flattened to strings.
    pub fn string_params(&self) -> BTreeMap<String, String> {
        stringify(&self.params)
    }

    /// Headers flattened to strings.
    pub fn string_headers(&self) -> BTreeMap<String, String> {
        stringify(&self.headers)
    }
}

fn stringify(map: &BTreeMap<String, Value>) -> BTreeMap<String, String> {
    map.iter()
        .map(|(key, value)| (key.clone(), value.to_param_string()))
        .collect()
}
