//! Response decoding and error translation.
//!
//! Both transports reduce a reply to a [`RawResponse`] (status plus body text).
//! From there the rules are shared:
//!
//! - An empty body becomes `Bool(status < 300)`, whatever the decoder.
//! - A non-empty body goes through the decoder; if the decoder fails the
//!   result is `Bool(false)`.
//! - With raise-on-error enabled, a status of 400 or above becomes
//!   [`QuarryError::Application`] carrying the decoded body. Otherwise the
//!   decoded body is returned as-is, even when it describes a failure.

use crate::codec::JsonDecoder;
use crate::protocol::error::{QuarryError, Result};
use crate::value::Value;

/// Decoded response body: a document, or an existence/success flag when the
/// body was empty.
pub type ResponseResult = Value;

/// Status and body text as received from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        RawResponse {
            status,
            body: body.into(),
        }
    }

    pub fn empty(status: u16) -> Self {
        RawResponse::new(status, String::new())
    }

    pub fn is_failure(&self) -> bool {
        self.status >= 400
    }

    /// Decodes the body without looking at the failure mode.
    pub fn decode(&self, decoder: &dyn JsonDecoder) -> ResponseResult {
        if self.body.is_empty() {
            return Value::Bool(self.status < 300);
        }
        match decoder.decode(&self.body) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(
                    status = self.status,
                    error = %e,
                    "Response body failed to decode, treating as false"
                );
                Value::Bool(false)
            }
        }
    }

    /// Decodes the body and applies the failure mode.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::Application`] when `raise_on_error` is set and
    /// the status is 400 or above.
    pub fn into_result(
        self,
        decoder: &dyn JsonDecoder,
        raise_on_error: bool,
    ) -> Result<ResponseResult> {
        let result = self.decode(decoder);
        if raise_on_error && self.is_failure() {
            let message = if self.body.is_empty() {
                format!("Request failed with status {}", self.status)
            } else {
                format!("Request failed with status {}: {}", self.status, self.body)
            };
            return Err(QuarryError::Application {
                message,
                result,
                status_code: self.status,
            });
        }
        Ok(result)
    }
}
