//! Three-state request parameter values.
//!
//! Partial updates need to tell apart "leave this alone" from "clear this".
//! [`Field`] keeps that distinction on the wire: an `Unset` field is omitted
//! from the request entirely, a `Null` field is sent as an explicit `null`,
//! and a `Value` field is sent as its value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A request parameter that may be omitted, explicitly null, or set.
///
/// Struct fields of this type should be declared with
/// `#[serde(default, skip_serializing_if = "Field::is_unset")]` so that
/// `Unset` disappears from the serialized body.
///
/// ## Examples
///
/// ```rust
/// use treasury_lib::Field;
///
/// let description: Field<String> = "Rent".to_string().into();
/// assert_eq!(description.value().map(String::as_str), Some("Rent"));
///
/// let cleared: Field<String> = Field::null();
/// assert!(cleared.is_null());
/// assert!(Field::<String>::default().is_unset());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field<T> {
    /// Omitted from the request.
    Unset,
    /// Sent as an explicit `null`.
    Null,
    /// Sent as the wrapped value.
    Value(T),
}

impl<T> Field<T> {
    /// Creates an explicitly null field.
    pub fn null() -> Self {
        Self::Null
    }

    /// Converts an `Option`, mapping `None` to an explicit null.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::Null,
        }
    }

    /// Returns `true` if the field is omitted.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns `true` if the field is an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the field carries a value.
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Returns the value, if present.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Converts into an `Option`, collapsing `Unset` and `Null`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Borrows the wrapped value.
    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Self::Unset => Field::Unset,
            Self::Null => Field::Null,
            Self::Value(v) => Field::Value(v),
        }
    }

    /// Maps the wrapped value, preserving `Unset` and `Null`.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Self::Unset => Field::Unset,
            Self::Null => Field::Null,
            Self::Value(v) => Field::Value(f(v)),
        }
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Field<String> {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            // Unset is normally skipped by the containing struct
            Self::Unset | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_option(Option::<T>::deserialize(deserializer)?))
    }
}
