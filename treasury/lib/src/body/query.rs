//! URL query string encoding.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::field::Field;

/// How array parameters are spelled in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayFormat {
    /// `ids=a&ids=b`
    Repeat,
    /// `ids[]=a&ids[]=b`
    #[default]
    Brackets,
    /// `ids=a,b`
    Comma,
}

/// Types that encode themselves as URL query parameters.
///
/// Implemented by the `...ListParams` structs of each resource.
pub trait ToQuery {
    /// Encodes the parameters.
    ///
    /// ## Errors
    ///
    /// Returns an error if a parameter value cannot be represented as a
    /// scalar string.
    fn to_query(&self) -> Result<QueryParams, ConfigError>;
}

/// An ordered list of query parameters.
///
/// Keys may repeat. Values are percent-encoded only when the query string is
/// rendered, so bracketed keys such as `metadata[Type]` go out as
/// `metadata%5BType%5D`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter, keeping existing values for the same key.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Replaces every value for `key` with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        self.remove(&key);
        self.pairs.push((key, value.into()));
        self
    }

    /// Removes every value for `key`.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.pairs.retain(|(k, _)| k != key);
        self
    }

    /// Returns the first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Appends a scalar field. `Unset` is skipped, `Null` encodes as an empty value.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::UnsupportedQueryValue`] if the value serializes
    /// to an array or object.
    pub fn push_field<T: Serialize>(
        &mut self,
        key: &str,
        field: &Field<T>,
    ) -> Result<&mut Self, ConfigError> {
        match field {
            Field::Unset => {}
            Field::Null => {
                self.push(key, "");
            }
            Field::Value(v) => {
                let value = scalar(key, v)?;
                self.push(key, value);
            }
        }
        Ok(self)
    }

    /// Appends a map as bracketed keys: `metadata[key]=value`.
    ///
    /// Entries are emitted in key order so the query string is stable.
    pub fn push_map<T: Serialize>(
        &mut self,
        key: &str,
        field: &Field<HashMap<String, T>>,
    ) -> Result<&mut Self, ConfigError> {
        match field {
            Field::Unset => {}
            Field::Null => {
                self.push(key, "");
            }
            Field::Value(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                for (name, v) in entries {
                    let nested = format!("{key}[{name}]");
                    let value = scalar(&nested, v)?;
                    self.push(nested, value);
                }
            }
        }
        Ok(self)
    }

    /// Appends an array using the given format.
    pub fn push_array<T: Serialize>(
        &mut self,
        key: &str,
        field: &Field<Vec<T>>,
        format: ArrayFormat,
    ) -> Result<&mut Self, ConfigError> {
        let items = match field {
            Field::Unset => return Ok(self),
            Field::Null => {
                self.push(key, "");
                return Ok(self);
            }
            Field::Value(items) => items,
        };

        let values = items
            .iter()
            .map(|v| scalar(key, v))
            .collect::<Result<Vec<_>, _>>()?;

        match format {
            ArrayFormat::Repeat => {
                for value in values {
                    self.push(key, value);
                }
            }
            ArrayFormat::Brackets => {
                let bracketed = format!("{key}[]");
                for value in values {
                    self.push(bracketed.as_str(), value);
                }
            }
            ArrayFormat::Comma => {
                self.push(key, values.join(","));
            }
        }
        Ok(self)
    }

    /// Appends every parameter of `other`.
    pub fn extend(&mut self, other: QueryParams) -> &mut Self {
        self.pairs.extend(other.pairs);
        self
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates over the parameters in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renders the `application/x-www-form-urlencoded` query string.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

impl ToQuery for QueryParams {
    fn to_query(&self) -> Result<QueryParams, ConfigError> {
        Ok(self.clone())
    }
}

/// Renders a value as a single query string scalar.
///
/// Strings and string enums pass through, numbers and booleans use their
/// JSON spelling, dates and timestamps use their serde (ISO 8601) form.
fn scalar<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, ConfigError> {
    match serde_json::to_value(value)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(ConfigError::UnsupportedQueryValue {
            key: key.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_push_field_states() {
        let mut query = QueryParams::new();
        query
            .push_field("after_cursor", &Field::<String>::Unset)
            .unwrap()
            .push_field("per_page", &Field::Value(25))
            .unwrap()
            .push_field("counterparty_id", &Field::<String>::Null)
            .unwrap();

        assert_eq!(query.encode(), "per_page=25&counterparty_id=");
    }

    #[test]
    fn test_metadata_brackets_are_encoded() {
        let mut metadata = HashMap::new();
        metadata.insert("Type".to_string(), "Loan".to_string());
        metadata.insert("Bucket".to_string(), "A B".to_string());

        let mut query = QueryParams::new();
        query.push_map("metadata", &Field::Value(metadata)).unwrap();

        assert_eq!(
            query.encode(),
            "metadata%5BBucket%5D=A+B&metadata%5BType%5D=Loan"
        );
    }

    #[test]
    fn test_array_formats() {
        let ids = Field::Value(vec!["a".to_string(), "b".to_string()]);

        let mut repeat = QueryParams::new();
        repeat.push_array("id", &ids, ArrayFormat::Repeat).unwrap();
        assert_eq!(repeat.encode(), "id=a&id=b");

        let mut brackets = QueryParams::new();
        brackets.push_array("id", &ids, ArrayFormat::Brackets).unwrap();
        assert_eq!(brackets.encode(), "id%5B%5D=a&id%5B%5D=b");

        let mut comma = QueryParams::new();
        comma.push_array("id", &ids, ArrayFormat::Comma).unwrap();
        assert_eq!(comma.encode(), "id=a%2Cb");
    }

    #[test]
    fn test_dates_use_iso_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut query = QueryParams::new();
        query.push_field("effective_date_start", &Field::Value(date)).unwrap();
        assert_eq!(query.get("effective_date_start"), Some("2024-03-01"));
    }

    #[test]
    fn test_set_replaces_all_values() {
        let mut query = QueryParams::new();
        query.push("after_cursor", "one").push("after_cursor", "two");
        query.set("after_cursor", "three");
        assert_eq!(query.encode(), "after_cursor=three");

        query.remove("after_cursor");
        assert!(query.is_empty());
    }

    #[test]
    fn test_nested_value_rejected() {
        let mut query = QueryParams::new();
        let result = query.push_field("filter", &Field::Value(vec![1, 2]));
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedQueryValue { .. })
        ));
    }
}
