//! Payload codecs.
//!
//! Request bodies are [`Value`] trees. Everything in a tree maps onto JSON
//! except timestamps, which are handed to a [`JsonEncoder`] to pick their wire
//! representation. Response bodies go the other way through a [`JsonDecoder`].
//! Both are traits so callers can swap them per client or per request; plain
//! closures implement them too.
//!
//! With the `rpc` feature, [`RpcCodec`] encodes the binary RPC messages.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::protocol::error::Result;
use crate::value::Value;

#[cfg(feature = "rpc")]
use crate::protocol::rpc::{RestRequest, RestResponse};

/// Renders values that have no native JSON form.
pub trait JsonEncoder: Send + Sync {
    fn encode_timestamp(&self, ts: &DateTime<Utc>) -> Result<serde_json::Value>;
}

impl<F> JsonEncoder for F
where
    F: Fn(&DateTime<Utc>) -> Result<serde_json::Value> + Send + Sync,
{
    fn encode_timestamp(&self, ts: &DateTime<Utc>) -> Result<serde_json::Value> {
        self(ts)
    }
}

/// Default encoder: UTC, second precision, `2012-11-12T14:30:03Z`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoTimestampEncoder;

impl JsonEncoder for IsoTimestampEncoder {
    fn encode_timestamp(&self, ts: &DateTime<Utc>) -> Result<serde_json::Value> {
        Ok(serde_json::Value::String(
            ts.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        ))
    }
}

/// Day precision encoder: `2012-11-12`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateEncoder;

impl JsonEncoder for DateEncoder {
    fn encode_timestamp(&self, ts: &DateTime<Utc>) -> Result<serde_json::Value> {
        Ok(serde_json::Value::String(ts.format("%Y-%m-%d").to_string()))
    }
}

/// Parses a non-empty response body.
pub trait JsonDecoder: Send + Sync {
    fn decode(&self, text: &str) -> Result<Value>;
}

impl<F> JsonDecoder for F
where
    F: Fn(&str) -> Result<Value> + Send + Sync,
{
    fn decode(&self, text: &str) -> Result<Value> {
        self(text)
    }
}

/// Default decoder: plain JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDecoder;

impl JsonDecoder for StandardDecoder {
    fn decode(&self, text: &str) -> Result<Value> {
        let parsed: serde_json::Value = serde_json::from_str(text)?;
        Ok(Value::from(parsed))
    }
}

/// JSON decoder that turns date-like strings into [`Value::Timestamp`].
///
/// RFC 3339 timestamps keep their instant; bare `YYYY-MM-DD` dates become
/// midnight UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampDecoder;

impl TimestampDecoder {
    fn coerce(value: Value) -> Value {
        match value {
            Value::String(s) => match parse_timestamp(&s) {
                Some(ts) => Value::Timestamp(ts),
                None => Value::String(s),
            },
            Value::Array(items) => Value::Array(items.into_iter().map(Self::coerce).collect()),
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::coerce(value)))
                    .collect(),
            ),
            other => other,
        }
    }
}

impl JsonDecoder for TimestampDecoder {
    fn decode(&self, text: &str) -> Result<Value> {
        Ok(Self::coerce(StandardDecoder.decode(text)?))
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    if s.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

/// Serializes request bodies.
pub struct BodyCodec;

impl BodyCodec {
    /// Lowers a [`Value`] tree to JSON, asking `encoder` about timestamps.
    pub fn to_json(value: &Value, encoder: &dyn JsonEncoder) -> Result<serde_json::Value> {
        Ok(match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(ts) => encoder.encode_timestamp(ts)?,
            Value::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| Self::to_json(item, encoder))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Object(map) => {
                let mut out = serde_json::Map::new();
                for (key, item) in map {
                    out.insert(key.clone(), Self::to_json(item, encoder)?);
                }
                serde_json::Value::Object(out)
            }
        })
    }

    /// Encodes a body to its wire text.
    pub fn encode(value: &Value, encoder: &dyn JsonEncoder) -> Result<String> {
        Ok(serde_json::to_string(&Self::to_json(value, encoder)?)?)
    }
}

/// Binary codec for RPC messages.
#[cfg(feature = "rpc")]
pub struct RpcCodec;

#[cfg(feature = "rpc")]
impl RpcCodec {
    pub fn encode_request(request: &RestRequest) -> Result<Vec<u8>> {
        Ok(postcard::to_allocvec(request)?)
    }

    pub fn decode_request(data: &[u8]) -> Result<RestRequest> {
        Ok(postcard::from_bytes(data)?)
    }

    pub fn encode_response(response: &RestResponse) -> Result<Vec<u8>> {
        Ok(postcard::to_allocvec(response)?)
    }

    pub fn decode_response(data: &[u8]) -> Result<RestResponse> {
        Ok(postcard::from_bytes(data)?)
    }
}
