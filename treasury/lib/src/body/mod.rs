//! Request body encodings.
//!
//! A call carries exactly one of three encodings, picked by the endpoint code
//! when the call is constructed: a JSON document, a multipart form (file
//! uploads), or query parameters appended to the URL.

mod multipart;
mod query;

pub use multipart::{FilePart, MultipartForm, ToMultipart};
pub use query::{ArrayFormat, QueryParams, ToQuery};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// The payload of a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// No body and no parameters.
    #[default]
    Empty,
    /// A JSON document sent as `application/json`.
    Json(Value),
    /// A form sent as `multipart/form-data`.
    Multipart(MultipartForm),
    /// Parameters appended to the URL query; no body is sent.
    Query(QueryParams),
}

impl Body {
    /// Serializes `value` as a JSON body.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Serialize`] if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ConfigError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Encodes `value` as a multipart form.
    pub fn multipart<T: ToMultipart + ?Sized>(value: &T) -> Result<Self, ConfigError> {
        Ok(Self::Multipart(value.to_multipart()?))
    }

    /// Encodes `value` as query parameters.
    pub fn query<T: ToQuery + ?Sized>(value: &T) -> Result<Self, ConfigError> {
        Ok(Self::Query(value.to_query()?))
    }

    /// Returns the `Content-Type` for bodies whose type is fixed.
    ///
    /// Multipart bodies get their content type (with boundary) from the form
    /// itself, so this returns `None` for them.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Json(_) => Some("application/json"),
            _ => None,
        }
    }

    /// Sets `value` at a dotted `path` inside a JSON body.
    ///
    /// An empty body becomes a JSON object first. Intermediate objects are
    /// created as needed.
    pub fn json_set(&mut self, path: &str, value: Value) -> Result<(), ConfigError> {
        if matches!(self, Self::Empty) {
            *self = Self::Json(Value::Object(Map::new()));
        }
        let Self::Json(root) = self else {
            return Err(ConfigError::invalid_json_path(path, "body is not JSON"));
        };

        let segments = split_path(path)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ConfigError::invalid_json_path(path, "empty path"))?;

        let mut node = root;
        for segment in parents {
            let object = node
                .as_object_mut()
                .ok_or_else(|| ConfigError::invalid_json_path(path, "parent is not an object"))?;
            node = object
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        let object = node
            .as_object_mut()
            .ok_or_else(|| ConfigError::invalid_json_path(path, "parent is not an object"))?;
        object.insert(last.to_string(), value);
        Ok(())
    }

    /// Removes the value at a dotted `path` inside a JSON body.
    ///
    /// Removing a path that does not exist is not an error.
    pub fn json_del(&mut self, path: &str) -> Result<(), ConfigError> {
        let root = match self {
            Self::Empty => return Ok(()),
            Self::Json(root) => root,
            _ => return Err(ConfigError::invalid_json_path(path, "body is not JSON")),
        };

        let segments = split_path(path)?;
        let Some((last, parents)) = segments.split_last() else {
            return Err(ConfigError::invalid_json_path(path, "empty path"));
        };

        let mut node = root;
        for segment in parents {
            match node.get_mut(*segment) {
                Some(child) => node = child,
                None => return Ok(()),
            }
        }
        if let Some(object) = node.as_object_mut() {
            object.remove(*last);
        }
        Ok(())
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, ConfigError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::invalid_json_path(path, "empty path segment"));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_set_nested() {
        let mut body = Body::json(&json!({"amount": 1000})).unwrap();
        body.json_set("metadata.source", json!("import")).unwrap();
        body.json_set("amount", json!(2000)).unwrap();

        assert_eq!(
            body,
            Body::Json(json!({"amount": 2000, "metadata": {"source": "import"}}))
        );
    }

    #[test]
    fn test_json_set_on_empty_body() {
        let mut body = Body::Empty;
        body.json_set("description", json!("hello")).unwrap();
        assert_eq!(body, Body::Json(json!({"description": "hello"})));
        assert_eq!(body.content_type(), Some("application/json"));
    }

    #[test]
    fn test_json_del() {
        let mut body = Body::json(&json!({"a": {"b": 1, "c": 2}})).unwrap();
        body.json_del("a.b").unwrap();
        body.json_del("missing.path").unwrap();
        assert_eq!(body, Body::Json(json!({"a": {"c": 2}})));
    }

    #[test]
    fn test_json_edit_rejects_query_body() {
        let mut body = Body::Query(QueryParams::new());
        let result = body.json_set("a", json!(1));
        assert!(matches!(result, Err(ConfigError::InvalidJsonPath { .. })));
    }

    #[test]
    fn test_json_edit_rejects_empty_segment() {
        let mut body = Body::Empty;
        assert!(body.json_set("a..b", json!(1)).is_err());
    }
}
