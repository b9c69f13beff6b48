//! Tests for the protocol module
//!
//! These cover response decoding, error translation, verb parsing and the
//! flattening of parameters for the wire.

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::codec::{JsonDecoder, StandardDecoder, TimestampDecoder};
    use crate::value::Value;
    use serde_json::json;
    use std::time::Duration;

    fn always_fails(_: &str) -> Result<Value> {
        Err(QuarryError::InvalidResponse("nope".into()))
    }

    #[test]
    fn test_empty_body_success_range_is_true() {
        for status in [200u16, 201, 204, 299] {
            assert_eq!(RawResponse::empty(status).decode(&StandardDecoder), Value::Bool(true));
        }
    }

    #[test]
    fn test_empty_body_other_statuses_are_false() {
        for status in [300u16, 302, 404, 500] {
            assert_eq!(RawResponse::empty(status).decode(&StandardDecoder), Value::Bool(false));
        }
    }

    #[test]
    fn test_empty_body_ignores_decoder() {
        let decoder: &dyn JsonDecoder = &always_fails;
        assert_eq!(RawResponse::empty(200).decode(decoder), Value::Bool(true));
        assert_eq!(RawResponse::empty(404).decode(decoder), Value::Bool(false));
    }

    #[test]
    fn test_undecodable_body_is_false() {
        let response = RawResponse::new(200, "No handler found for uri");
        assert_eq!(response.decode(&StandardDecoder), Value::Bool(false));
    }

    #[test]
    fn test_decoder_is_used_for_body() {
        let response = RawResponse::new(200, r#"{"updated": "2013-07-04"}"#);
        let decoded = response.decode(&TimestampDecoder);
        assert!(decoded["updated"].as_timestamp().is_some());
    }

    #[test]
    fn test_raise_on_error_translates_failure() {
        let response = RawResponse::new(404, r#"{"exists": false}"#);
        let err = response.into_result(&StandardDecoder, true).unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.result(), Some(&Value::from(json!({"exists": false}))));
        assert!(!err.is_transport());
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_non_raising_returns_body() {
        let response = RawResponse::new(404, r#"{"exists": false}"#);
        let result = response.into_result(&StandardDecoder, false).unwrap();
        assert_eq!(result, json!({"exists": false}));
    }

    #[test]
    fn test_raise_on_error_passes_success_through() {
        let response = RawResponse::new(201, r#"{"ok": true}"#);
        let result = response.into_result(&StandardDecoder, true).unwrap();
        assert_eq!(result["ok"], true);
    }

    #[test]
    fn test_raise_on_error_with_empty_body() {
        let err = RawResponse::empty(404)
            .into_result(&StandardDecoder, true)
            .unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.result(), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_redirect_is_not_raised() {
        let result = RawResponse::empty(301)
            .into_result(&StandardDecoder, true)
            .unwrap();
        assert_eq!(result, Value::Bool(false));
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("DELETE".parse::<Method>().unwrap(), Method::Delete);
        assert_eq!(Method::Head.to_string(), "HEAD");
        assert!(matches!(
            "TRACE".parse::<Method>(),
            Err(QuarryError::Configuration(_))
        ));
    }

    #[test]
    fn test_envelope_flattens_params_and_headers() {
        let envelope = RequestEnvelope::new(Method::Get, "idx/_search", Duration::from_secs(1))
            .with_param("refresh", true)
            .with_param("size", 2)
            .with_param("q", "user:dan")
            .with_header("X-Trace", false);

        let params = envelope.string_params();
        assert_eq!(params["refresh"], "true");
        assert_eq!(params["size"], "2");
        assert_eq!(params["q"], "user:dan");
        assert_eq!(envelope.string_headers()["X-Trace"], "false");
    }

    #[test]
    fn test_body_conversions() {
        assert_eq!(Body::from("{\"a\":1}"), Body::Raw("{\"a\":1}".to_string()));
        assert_eq!(Body::from(json!({"a": 1})), Body::Json(Value::from(json!({"a": 1}))));
    }

    #[cfg(feature = "rpc")]
    #[test]
    fn test_rest_request_from_envelope() {
        let envelope = RequestEnvelope::new(Method::Post, "idx/type/1/_update", Duration::from_secs(1))
            .with_body(r#"{"doc":{}}"#)
            .with_param("refresh", true);

        let request = RestRequest::from_envelope(&envelope).unwrap();
        assert_eq!(request.method, RpcMethod::Post);
        assert_eq!(request.uri, "idx/type/1/_update");
        assert_eq!(request.parameters["refresh"], "true");
        assert_eq!(request.body.as_deref(), Some(r#"{"doc":{}}"#));
    }

    #[cfg(feature = "rpc")]
    #[test]
    fn test_rest_request_rejects_unmapped_verb() {
        let envelope = RequestEnvelope::new(Method::Patch, "idx", Duration::from_secs(1));
        let err = RestRequest::from_envelope(&envelope).unwrap_err();
        assert!(matches!(err, QuarryError::Configuration(_)));
    }

    #[cfg(feature = "rpc")]
    #[test]
    fn test_rest_response_to_raw() {
        let raw: RawResponse = RestResponse::empty(404).into();
        assert_eq!(raw, RawResponse::empty(404));

        let raw: RawResponse = RestResponse::new(200, "{}").into();
        assert_eq!(raw.body, "{}");
    }
}
