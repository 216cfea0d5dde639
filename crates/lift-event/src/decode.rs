//! Inbound event decoding.
//!
//! Parsing is explicit and total: every optional field has one
//! deterministic default, and values of the wrong JSON type are either a
//! [`MalformedEvent`] (top-level fields) or skipped (individual entries
//! inside a header or query map). Nothing is coerced.
//!
//! Optional map fields may be absent, `null`, or an empty JSON array (the
//! way some producers encode an empty map); all three decode as empty.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};
use tracing::debug;

use lift_http::{HeaderMap, QueryParams, Request};

use crate::error::{CodecResult, MalformedEvent};
use crate::trigger::EventShape;

/// A decoded invocation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub request: Request,
    pub shape: EventShape,
}

/// Parse a raw invocation payload into JSON.
pub fn parse(payload: &[u8]) -> CodecResult<Value> {
    serde_json::from_slice(payload).map_err(|e| MalformedEvent::InvalidJson(e.to_string()))
}

/// Decode a raw event into a normalized request and its response shape.
pub fn decode(event: &Value) -> CodecResult<DecodedEvent> {
    let obj = event.as_object().ok_or(MalformedEvent::NotAnObject)?;
    let shape = EventShape::of(obj);

    let method = required_string(obj, "httpMethod")?;
    let path = required_string(obj, "path")?;

    let headers: HeaderMap = pick_pairs(obj, "multiValueHeaders", "headers")?
        .into_iter()
        .collect();
    let query: QueryParams = pick_pairs(
        obj,
        "multiValueQueryStringParameters",
        "queryStringParameters",
    )?
    .into_iter()
    .collect();
    let body = decode_body(obj)?;

    debug!(
        %method,
        %path,
        trigger = %shape.trigger,
        multi_value = shape.multi_value,
        headers = headers.len(),
        query = query.len(),
        body_len = body.len(),
        "decoded event"
    );

    Ok(DecodedEvent {
        request: Request::new(method, path)
            .with_headers(headers)
            .with_query(query)
            .with_body(body),
        shape,
    })
}

/// The response shape for an event, even one that fails to decode.
///
/// Returns `None` only when the event is not a JSON object at all.
pub fn shape_of(event: &Value) -> Option<EventShape> {
    event.as_object().map(EventShape::of)
}

fn required_string(obj: &Map<String, Value>, field: &'static str) -> CodecResult<String> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(MalformedEvent::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(MalformedEvent::WrongType {
            field,
            expected: "a string",
        }),
    }
}

/// Use the multi-value field when the event supplies it, otherwise the
/// single-value field.
fn pick_pairs(
    obj: &Map<String, Value>,
    multi_field: &'static str,
    single_field: &'static str,
) -> CodecResult<Vec<(String, String)>> {
    match obj.get(multi_field) {
        Some(v) if !v.is_null() => multi_value_pairs(v, multi_field),
        _ => single_value_pairs(obj.get(single_field), single_field),
    }
}

/// An empty map, `null`, or `[]`; anything else is the wrong type.
fn as_map<'a>(
    value: Option<&'a Value>,
    field: &'static str,
) -> CodecResult<Option<&'a Map<String, Value>>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Array(items)) if items.is_empty() => Ok(None),
        Some(_) => Err(MalformedEvent::WrongType {
            field,
            expected: "an object",
        }),
    }
}

fn single_value_pairs(
    value: Option<&Value>,
    field: &'static str,
) -> CodecResult<Vec<(String, String)>> {
    let Some(map) = as_map(value, field)? else {
        return Ok(Vec::new());
    };
    Ok(map
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect())
}

fn multi_value_pairs(value: &Value, field: &'static str) -> CodecResult<Vec<(String, String)>> {
    let Some(map) = as_map(Some(value), field)? else {
        return Ok(Vec::new());
    };
    let mut pairs = Vec::new();
    for (key, values) in map {
        match values {
            Value::Array(items) => {
                for item in items {
                    if let Some(s) = item.as_str() {
                        pairs.push((key.clone(), s.to_string()));
                    }
                }
            }
            Value::Null => {}
            _ => {
                return Err(MalformedEvent::WrongType {
                    field,
                    expected: "an object of string arrays",
                });
            }
        }
    }
    Ok(pairs)
}

fn decode_body(obj: &Map<String, Value>) -> CodecResult<Vec<u8>> {
    let text = match obj.get("body") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) => s,
        Some(_) => {
            return Err(MalformedEvent::WrongType {
                field: "body",
                expected: "a string",
            });
        }
    };
    let base64 = matches!(obj.get("isBase64Encoded"), Some(Value::Bool(true)));
    if base64 {
        STANDARD
            .decode(text)
            .map_err(|e| MalformedEvent::InvalidBase64(e.to_string()))
    } else {
        Ok(text.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::TriggerKind;
    use serde_json::json;

    #[test]
    fn minimal_api_router_event() {
        let decoded = decode(&json!({
            "httpMethod": "GET",
            "path": "/",
            "body": "",
        }))
        .unwrap();

        assert_eq!(decoded.request.method(), "GET");
        assert_eq!(decoded.request.path(), "/");
        assert!(decoded.request.body().is_empty());
        assert!(decoded.request.headers().is_empty());
        assert_eq!(decoded.shape, EventShape::new(TriggerKind::ApiRouter, false));
    }

    #[test]
    fn load_balancer_event_with_empty_array_context() {
        let decoded = decode(&json!({
            "requestContext": [],
            "httpMethod": "POST",
            "path": "/",
            "headers": {"content-type": "application/x-www-form-urlencoded; charset=UTF-8"},
            "body": "foo=bar&bar=foo",
        }))
        .unwrap();

        assert_eq!(decoded.shape.trigger, TriggerKind::LoadBalancer);
        assert_eq!(decoded.request.form().get("foo"), Some("bar"));
    }

    #[test]
    fn missing_method_is_malformed() {
        let err = decode(&json!({"path": "/", "body": ""})).unwrap_err();
        assert_eq!(err, MalformedEvent::MissingField("httpMethod"));
    }

    #[test]
    fn non_string_path_is_malformed() {
        let err = decode(&json!({"httpMethod": "GET", "path": 7})).unwrap_err();
        assert_eq!(
            err,
            MalformedEvent::WrongType {
                field: "path",
                expected: "a string"
            }
        );
    }

    #[test]
    fn non_object_event_is_malformed() {
        assert_eq!(decode(&json!([1, 2])).unwrap_err(), MalformedEvent::NotAnObject);
        assert_eq!(shape_of(&json!("x")), None);
    }

    #[test]
    fn unparseable_payload_is_malformed() {
        assert!(matches!(parse(b"{not json"), Err(MalformedEvent::InvalidJson(_))));
        assert_eq!(parse(br#"{"a":1}"#).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn missing_body_defaults_to_empty() {
        let decoded = decode(&json!({"httpMethod": "GET", "path": "/"})).unwrap();
        assert!(decoded.request.body().is_empty());
    }

    #[test]
    fn multi_value_headers_are_authoritative_and_ordered() {
        let decoded = decode(&json!({
            "httpMethod": "GET",
            "path": "/multi-value-header",
            "headers": {"Test": "ignored"},
            "multiValueHeaders": {"Test": ["foo", "bar"]},
            "body": "",
        }))
        .unwrap();

        let headers = decoded.request.headers();
        assert_eq!(headers.get_all("test"), vec!["foo", "bar"]);
        assert_eq!(headers.get("Test"), Some("foo"));
        assert!(decoded.shape.multi_value);
    }

    #[test]
    fn single_value_headers_used_without_multi_field() {
        let decoded = decode(&json!({
            "httpMethod": "GET",
            "path": "/",
            "headers": {"Accept": "text/html", "X-Num": 5},
        }))
        .unwrap();

        let headers = decoded.request.headers();
        assert_eq!(headers.get("accept"), Some("text/html"));
        assert!(!headers.contains("x-num"));
    }

    #[test]
    fn multi_value_query_preferred_over_single() {
        let decoded = decode(&json!({
            "httpMethod": "GET",
            "path": "/echo",
            "queryStringParameters": {"a": "bar"},
            "multiValueQueryStringParameters": {"a": ["foo", "bar"], "b[]": ["x", "y"]},
        }))
        .unwrap();

        let query = decoded.request.query();
        assert_eq!(query.get_all("a"), vec!["foo", "bar"]);
        assert_eq!(query.get_all("b[]"), vec!["x", "y"]);
    }

    #[test]
    fn declaration_order_survives_parse() {
        let payload = br#"{
            "httpMethod": "GET",
            "path": "/echo",
            "multiValueHeaders": {"Zeta": ["1"], "Alpha": ["2"], "Mid": ["3"]},
            "multiValueQueryStringParameters": {"z": ["1"], "a": ["2"], "m[k]": ["3"]},
            "body": ""
        }"#;
        let decoded = decode(&parse(payload).unwrap()).unwrap();

        let names: Vec<&str> = decoded
            .request
            .headers()
            .iter()
            .map(|h| h.name.as_str())
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);

        let keys: Vec<&str> = decoded.request.query().iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m[k]"]);
        let structured: Vec<String> = decoded.request.query().structured().into_keys().collect();
        assert_eq!(structured, vec!["z", "a", "m"]);
    }

    #[test]
    fn null_query_parameters_are_empty() {
        let decoded = decode(&json!({
            "httpMethod": "GET",
            "path": "/",
            "queryStringParameters": null,
            "multiValueQueryStringParameters": null,
        }))
        .unwrap();
        assert!(decoded.request.query().is_empty());
    }

    #[test]
    fn scalar_in_multi_value_map_is_wrong_type() {
        let err = decode(&json!({
            "httpMethod": "GET",
            "path": "/",
            "multiValueHeaders": {"Test": "foo"},
        }))
        .unwrap_err();
        assert!(matches!(err, MalformedEvent::WrongType { field: "multiValueHeaders", .. }));
    }

    #[test]
    fn base64_body_is_decoded() {
        let decoded = decode(&json!({
            "httpMethod": "POST",
            "path": "/upload",
            "body": "AAEC/w==",
            "isBase64Encoded": true,
        }))
        .unwrap();
        assert_eq!(decoded.request.body().as_ref(), &[0u8, 1, 2, 255]);
    }

    #[test]
    fn invalid_base64_is_malformed() {
        let err = decode(&json!({
            "httpMethod": "POST",
            "path": "/",
            "body": "not base64!",
            "isBase64Encoded": true,
        }))
        .unwrap_err();
        assert!(matches!(err, MalformedEvent::InvalidBase64(_)));
    }
}
