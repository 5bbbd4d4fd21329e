//! Request payloads built from parsed parameter values

use reqwest::RequestBuilder;
use serde_json::Value;
use std::str::FromStr;

use crate::common::{Error, Result};

/// How parsed parameters are attached to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadKind {
    /// Form-encoded body
    #[default]
    Form,
    /// JSON body
    Json,
    /// URL query string
    Query,
}

impl FromStr for PayloadKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "form" | "data" => Ok(PayloadKind::Form),
            "json" => Ok(PayloadKind::Json),
            "query" | "params" => Ok(PayloadKind::Query),
            other => Err(Error::invalid_field("payload_type", other)),
        }
    }
}

/// Parsed parameters ready to be sent
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    None,
    Form(Value),
    Json(Value),
    Query(Value),
}

impl Payload {
    pub fn new(kind: PayloadKind, value: Option<Value>) -> Self {
        match (kind, value) {
            (_, None) | (_, Some(Value::Null)) => Payload::None,
            (PayloadKind::Form, Some(v)) => Payload::Form(v),
            (PayloadKind::Json, Some(v)) => Payload::Json(v),
            (PayloadKind::Query, Some(v)) => Payload::Query(v),
        }
    }

    /// Attach the payload to a request
    pub fn apply(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self {
            Payload::None => request,
            Payload::Json(value) => request.json(value),
            Payload::Form(value) => match form_body(value) {
                FormBody::Pairs(pairs) => request.form(&pairs),
                FormBody::Raw(raw) => request.body(raw),
            },
            Payload::Query(value) => match form_body(value) {
                FormBody::Pairs(pairs) => request.query(&pairs),
                FormBody::Raw(raw) => {
                    return Err(Error::Request(format!(
                        "query parameters must be a mapping or a list of pairs, got {}",
                        raw
                    )))
                }
            },
        })
    }
}

/// A form body: encoded key/value pairs or a raw string
#[derive(Debug, Clone, PartialEq)]
pub enum FormBody {
    Pairs(Vec<(String, String)>),
    Raw(String),
}

/// Flatten a parameter value into form fields
///
/// Mappings become pairs, with list members repeating the key and null
/// members dropped. A list of two-element lists is taken as explicit
/// pairs. Anything else is sent as-is.
pub fn form_body(value: &Value) -> FormBody {
    match value {
        Value::Object(map) => {
            let mut pairs = Vec::new();
            for (key, value) in map {
                match value {
                    Value::Null => {}
                    Value::Array(items) => {
                        pairs.extend(items.iter().map(|item| (key.clone(), field_text(item))))
                    }
                    other => pairs.push((key.clone(), field_text(other))),
                }
            }
            FormBody::Pairs(pairs)
        }
        Value::Array(items) if items.iter().all(is_pair) => FormBody::Pairs(
            items
                .iter()
                .filter_map(Value::as_array)
                .map(|pair| (field_text(&pair[0]), field_text(&pair[1])))
                .collect(),
        ),
        Value::String(raw) => FormBody::Raw(raw.clone()),
        other => FormBody::Raw(other.to_string()),
    }
}

fn is_pair(value: &Value) -> bool {
    matches!(value, Value::Array(pair) if pair.len() == 2)
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> FormBody {
        FormBody::Pairs(
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_payload_kind_parsing() {
        assert_eq!("".parse::<PayloadKind>().unwrap(), PayloadKind::Form);
        assert_eq!("JSON".parse::<PayloadKind>().unwrap(), PayloadKind::Json);
        assert_eq!("query".parse::<PayloadKind>().unwrap(), PayloadKind::Query);
        assert!("xml".parse::<PayloadKind>().is_err());
    }

    #[test]
    fn test_missing_value_means_no_payload() {
        assert_eq!(Payload::new(PayloadKind::Json, None), Payload::None);
        assert_eq!(
            Payload::new(PayloadKind::Form, Some(Value::Null)),
            Payload::None
        );
    }

    #[test]
    fn test_form_body_from_mapping() {
        let body = form_body(&json!({"user": "a", "age": 3, "tags": ["x", "y"], "skip": null}));
        assert_eq!(
            body,
            pairs(&[("user", "a"), ("age", "3"), ("tags", "x"), ("tags", "y")])
        );
    }

    #[test]
    fn test_form_body_from_pair_list() {
        let body = form_body(&json!([["user", "a"], ["user", "b"]]));
        assert_eq!(body, pairs(&[("user", "a"), ("user", "b")]));
    }

    #[test]
    fn test_form_body_raw() {
        assert_eq!(
            form_body(&json!("a=1&b=2")),
            FormBody::Raw("a=1&b=2".to_string())
        );
        assert_eq!(form_body(&json!([1, 2, 3])), FormBody::Raw("[1,2,3]".to_string()));
    }
}
