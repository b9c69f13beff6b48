//! RPC wire messages.
//!
//! Each call is one [`RestRequest`] frame answered by one [`RestResponse`]
//! frame. Parameters and headers travel as string-to-string maps; the
//! protocol has no other value types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{QuarryError, Result};
use super::requests::{Method, RequestEnvelope};
use super::responses::RawResponse;

/// Verbs the RPC protocol understands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RpcMethod {
    Get,
    Put,
    Post,
    Delete,
    Head,
    Options,
}

impl TryFrom<Method> for RpcMethod {
    type Error = QuarryError;

    fn try_from(method: Method) -> Result<Self> {
        match method {
            Method::Get => Ok(RpcMethod::Get),
            Method::Put => Ok(RpcMethod::Put),
            Method::Post => Ok(RpcMethod::Post),
            Method::Delete => Ok(RpcMethod::Delete),
            Method::Head => Ok(RpcMethod::Head),
            Method::Options => Ok(RpcMethod::Options),
            Method::Patch => Err(QuarryError::Configuration(format!(
                "Method {} has no RPC equivalent",
                method
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestRequest {
    pub method: RpcMethod,
    pub uri: String,
    pub parameters: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl RestRequest {
    /// Builds the wire request for an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::Configuration`] if the verb has no RPC mapping.
    pub fn from_envelope(envelope: &RequestEnvelope) -> Result<Self> {
        Ok(RestRequest {
            method: RpcMethod::try_from(envelope.method)?,
            uri: envelope.path.as_str().to_string(),
            parameters: envelope.string_params(),
            headers: envelope.string_headers(),
            body: envelope.body.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl RestResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        RestResponse {
            status,
            headers: BTreeMap::new(),
            body: Some(body.into()),
        }
    }

    pub fn empty(status: u16) -> Self {
        RestResponse {
            status,
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

impl From<RestResponse> for RawResponse {
    fn from(response: RestResponse) -> Self {
        RawResponse::new(response.status, response.body.unwrap_or_default())
    }
}
