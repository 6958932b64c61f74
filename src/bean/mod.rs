//! Bean marshaling between typed request/response values and wire text.
//!
//! Beans are plain Rust types deriving `serde::Serialize`/`Deserialize`. Their
//! wire field names are whatever serde produces, so a contract that talks
//! snake_case declares `#[serde(rename_all = "snake_case")]` (or per-field
//! `rename`) on the bean.
//!
//! Besides serde, every type that crosses a contract boundary implements
//! [`WireType`], which reports its structural [`TypeShape`]. The contract
//! validator works exclusively on shapes, so it never needs to look at values.
//!
//! # Encodings
//!
//! - [`encode_query`] flattens a bean into ordered `name=value` pairs for
//!   `GET`/`DELETE` calls.
//! - [`encode_body`] serializes a bean (or list of beans) to a JSON body.
//! - [`encode_path_value`] renders a scalar or enum as a single path segment.
//! - [`decode`] turns a response body back into the declared return type.

mod shape;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

pub use shape::{ScalarKind, TypeShape, WireType, short_type_name};

/// Content type of every body written by [`encode_body`].
pub const APPLICATION_JSON: &str = "application/json";

/// Errors raised while encoding or decoding beans.
#[derive(Debug, Error)]
pub enum BeanError {
    #[error("failed to serialize bean: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to decode response body into {shape}: {source}")]
    Decode {
        shape: TypeShape,
        #[source]
        source: serde_json::Error,
    },

    #[error("response body is empty, but {0} requires a value")]
    EmptyBody(TypeShape),

    #[error("query param bean must serialize to an object, got {0}")]
    NotAnObject(&'static str),

    #[error("query param field must be a scalar or enum value, field={0}")]
    UnsupportedQueryValue(String),

    #[error("path param must be a scalar or enum value, got {0}")]
    UnsupportedPathValue(&'static str),
}

/// An encoded request body together with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Converts any serializable value into the erased JSON form carried by stubs.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, BeanError> {
    serde_json::to_value(value).map_err(BeanError::Serialize)
}

/// Flattens a query bean into `(wire name, text)` pairs, in field order.
///
/// Absent optional fields (`null`) are skipped. Nested objects and arrays have
/// no canonical single-value text form and are rejected.
pub fn encode_query(bean: &Value) -> Result<Vec<(String, String)>, BeanError> {
    let Value::Object(fields) = bean else {
        return Err(BeanError::NotAnObject(json_kind(bean)));
    };

    let mut params = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        match value {
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => return Err(BeanError::UnsupportedQueryValue(name.clone())),
            scalar => {
                if let Some(text) = scalar_text(scalar) {
                    params.push((name.clone(), text));
                }
            },
        }
    }
    Ok(params)
}

/// Serializes a request bean to a JSON body.
pub fn encode_body(bean: &Value) -> Result<EncodedBody, BeanError> {
    let bytes = serde_json::to_vec(bean).map_err(BeanError::Serialize)?;
    Ok(EncodedBody {
        bytes,
        content_type: APPLICATION_JSON,
    })
}

/// Renders a path-bound value as the text of one path segment.
pub fn encode_path_value(value: &Value) -> Result<String, BeanError> {
    scalar_text(value).ok_or(BeanError::UnsupportedPathValue(json_kind(value)))
}

/// Decodes a response body into `T`, guided by the declared return shape.
///
/// An empty body decodes to `()` for `void`, `None` for `Optional<T>` and an
/// empty list for `List<T>`; any other shape requires a body.
pub fn decode<T: DeserializeOwned>(body: &[u8], shape: &TypeShape) -> Result<T, BeanError> {
    let decode_error = |source| BeanError::Decode {
        shape: shape.clone(),
        source,
    };

    if matches!(shape, TypeShape::Void) {
        return serde_json::from_value(Value::Null).map_err(decode_error);
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        let empty = match shape {
            TypeShape::Optional(_) => Value::Null,
            TypeShape::List(_) => Value::Array(Vec::new()),
            _ => return Err(BeanError::EmptyBody(shape.clone())),
        };
        return serde_json::from_value(empty).map_err(decode_error);
    }

    serde_json::from_slice(body).map_err(decode_error)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "snake_case")]
    enum Status {
        Active,
        OnHold,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "snake_case")]
    struct SearchRequest {
        int_field: Option<i32>,
        status: Option<Status>,
        #[serde(rename = "q")]
        query: String,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct View {
        id: u64,
        #[serde(default)]
        note: Option<String>,
    }

    #[test]
    fn test_encode_query_uses_wire_names_and_skips_absent_fields() {
        let bean = to_value(&SearchRequest {
            int_field: Some(23),
            status: None,
            query: "rust lang".to_string(),
        })
        .unwrap();

        let params = encode_query(&bean).unwrap();

        assert_eq!(
            params,
            vec![
                ("int_field".to_string(), "23".to_string()),
                ("q".to_string(), "rust lang".to_string())
            ]
        );
    }

    #[test]
    fn test_encode_query_writes_enum_wire_token() {
        let bean = to_value(&SearchRequest {
            int_field: None,
            status: Some(Status::OnHold),
            query: String::new(),
        })
        .unwrap();

        let params = encode_query(&bean).unwrap();

        assert!(params.contains(&("status".to_string(), "on_hold".to_string())));
    }

    #[test]
    fn test_encode_query_rejects_nested_values() {
        let err = encode_query(&json!({"ids": [1, 2]})).unwrap_err();
        assert!(matches!(err, BeanError::UnsupportedQueryValue(field) if field == "ids"));

        let err = encode_query(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, BeanError::NotAnObject("array")));
    }

    #[test]
    fn test_encode_body_is_json() {
        let body = encode_body(&json!({"id": 1})).unwrap();
        assert_eq!(body.bytes, br#"{"id":1}"#.to_vec());
        assert_eq!(body.content_type, APPLICATION_JSON);
    }

    #[test]
    fn test_encode_path_value() {
        assert_eq!(encode_path_value(&json!(42)).unwrap(), "42");
        assert_eq!(encode_path_value(&json!("a b")).unwrap(), "a b");
        assert_eq!(encode_path_value(&to_value(&Status::Active).unwrap()).unwrap(), "active");
        assert!(matches!(
            encode_path_value(&json!({"id": 1})),
            Err(BeanError::UnsupportedPathValue("object"))
        ));
    }

    #[test]
    fn test_decode_empty_body_by_shape() {
        let bean = TypeShape::Bean("View".to_string());

        decode::<()>(b"", &TypeShape::Void).unwrap();
        assert_eq!(decode::<Option<View>>(b"", &TypeShape::Optional(Box::new(bean.clone()))).unwrap(), None);
        assert!(decode::<Vec<View>>(b"", &TypeShape::List(Box::new(bean.clone()))).unwrap().is_empty());
        assert!(matches!(decode::<View>(b"", &bean), Err(BeanError::EmptyBody(_))));
    }

    #[test]
    fn test_decode_tolerates_missing_optional_fields() {
        let view: View = decode(br#"{"id":7}"#, &TypeShape::Bean("View".to_string())).unwrap();
        assert_eq!(view, View { id: 7, note: None });
    }

    #[test]
    fn test_decode_fails_on_type_mismatch() {
        let err = decode::<View>(br#"{"id":"seven"}"#, &TypeShape::Bean("View".to_string())).unwrap_err();
        assert!(matches!(err, BeanError::Decode { .. }));
    }
}
