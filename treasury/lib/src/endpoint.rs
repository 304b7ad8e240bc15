//! Endpoint definition with type-state builder pattern.
//!
//! The [`Endpoint`] struct describes one API operation: its method, its path
//! template, and the decode destination for its response. The
//! [`EndpointBuilder`] uses a type-state pattern to ensure all required
//! fields are set at compile time.

use std::marker::PhantomData;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::ConfigError;
use crate::method::RestMethod;
use crate::response::ResponseFormat;

/// Characters escaped when a value is substituted into a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Marker traits for builder state tracking.
pub mod builder_state {
    /// Marker for a field that has not been set.
    pub struct Missing;
    /// Marker for a field that has been set.
    pub struct Present;
}

use builder_state::{Missing, Present};

/// An API operation.
///
/// Endpoints are parameterized by their response format, enabling type-safe
/// response handling at compile time.
///
/// ## Type Parameters
///
/// - `F`: The [`ResponseFormat`] implementation for this endpoint's response.
///
/// ## Examples
///
/// ```rust,ignore
/// use treasury_lib::{Endpoint, RestMethod};
/// use treasury_lib::response::JsonFormat;
///
/// let endpoint: Endpoint<JsonFormat<ExpectedPayment>> = Endpoint::builder()
///     .id("expected_payments.get")
///     .method(RestMethod::Get)
///     .path("api/expected_payments/{id}")
///     .description("get expected payment")
///     .build();
/// ```
#[derive(Debug)]
pub struct Endpoint<F: ResponseFormat> {
    id: String,
    method: RestMethod,
    /// Path template relative to the base URL (may contain `{param}` placeholders).
    path: String,
    description: Option<String>,
    _format: PhantomData<F>,
}

// PhantomData<F> is always Clone, so no `F: Clone` bound is wanted
impl<F: ResponseFormat> Clone for Endpoint<F> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            method: self.method,
            path: self.path.clone(),
            description: self.description.clone(),
            _format: PhantomData,
        }
    }
}

impl<F: ResponseFormat> Endpoint<F> {
    /// Creates a new endpoint builder.
    pub fn builder() -> EndpointBuilder<Missing, Missing, Missing, F> {
        EndpointBuilder::new()
    }

    /// Returns the endpoint's identifier, such as `payment_orders.create`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> RestMethod {
        self.method
    }

    /// Returns the path template.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the optional description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Substitutes path parameters in the template.
    ///
    /// Values are percent-encoded as path segments, so an id containing `/`
    /// cannot escape its segment.
    pub fn substitute_params(&self, params: &[(&str, &str)]) -> String {
        let mut path = self.path.clone();
        for (key, value) in params {
            let encoded = utf8_percent_encode(value, PATH_SEGMENT).to_string();
            path = path.replace(&format!("{{{key}}}"), &encoded);
        }
        path
    }

    /// Substitutes path parameters and checks that none are left over.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidPathTemplate`] if the template is
    /// malformed or a placeholder has no value.
    pub fn resolve_path(&self, params: &[(&str, &str)]) -> Result<String, ConfigError> {
        self.validate()?;
        if let Some(missing) = self
            .path_params()
            .into_iter()
            .find(|name| !params.iter().any(|(key, _)| key == name))
        {
            return Err(ConfigError::invalid_path(format!(
                "no value for {{{missing}}} in {}",
                self.path
            )));
        }
        Ok(self.substitute_params(params))
    }

    /// Extracts path parameter names from the template.
    ///
    /// Returns parameter names in the order they appear in the path.
    pub fn path_params(&self) -> Vec<&str> {
        self.path
            .split('{')
            .skip(1)
            .filter_map(|rest| rest.split_once('}').map(|(name, _)| name))
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Checks that every `{` has a matching `}` and placeholders are not nested.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut open = false;
        for c in self.path.chars() {
            match (c, open) {
                ('{', false) => open = true,
                ('}', true) => open = false,
                ('{', true) => {
                    return Err(ConfigError::invalid_path(format!(
                        "nested brace in {}",
                        self.path
                    )));
                }
                ('}', false) => {
                    return Err(ConfigError::invalid_path(format!(
                        "unmatched closing brace in {}",
                        self.path
                    )));
                }
                _ => {}
            }
        }
        if open {
            return Err(ConfigError::invalid_path(format!(
                "unclosed brace in {}",
                self.path
            )));
        }
        Ok(())
    }
}

/// Type-state builder for [`Endpoint`].
///
/// The builder uses phantom type parameters to track which required fields
/// have been set, preventing construction until all required fields are present.
///
/// ## Type Parameters
///
/// - `Id`: State of the ID field (`Missing` or `Present`).
/// - `Method`: State of the method field (`Missing` or `Present`).
/// - `Path`: State of the path field (`Missing` or `Present`).
/// - `F`: The response format type.
pub struct EndpointBuilder<Id, Method, Path, F: ResponseFormat> {
    id: String,
    method: RestMethod,
    path: String,
    description: Option<String>,
    _phantom: PhantomData<(Id, Method, Path, F)>,
}

impl<F: ResponseFormat> EndpointBuilder<Missing, Missing, Missing, F> {
    /// Creates a new endpoint builder with no fields set.
    pub fn new() -> Self {
        Self {
            id: String::new(),
            method: RestMethod::Get,
            path: String::new(),
            description: None,
            _phantom: PhantomData,
        }
    }
}

impl<F: ResponseFormat> Default for EndpointBuilder<Missing, Missing, Missing, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, P, F: ResponseFormat> EndpointBuilder<Missing, M, P, F> {
    /// Sets the endpoint ID.
    pub fn id(self, id: impl Into<String>) -> EndpointBuilder<Present, M, P, F> {
        EndpointBuilder {
            id: id.into(),
            method: self.method,
            path: self.path,
            description: self.description,
            _phantom: PhantomData,
        }
    }
}

impl<I, P, F: ResponseFormat> EndpointBuilder<I, Missing, P, F> {
    /// Sets the HTTP method for this endpoint.
    pub fn method(self, method: RestMethod) -> EndpointBuilder<I, Present, P, F> {
        EndpointBuilder {
            id: self.id,
            method,
            path: self.path,
            description: self.description,
            _phantom: PhantomData,
        }
    }
}

impl<I, M, F: ResponseFormat> EndpointBuilder<I, M, Missing, F> {
    /// Sets the path template, relative to the base URL.
    ///
    /// The path may contain parameter placeholders like `{id}`.
    pub fn path(self, path: impl Into<String>) -> EndpointBuilder<I, M, Present, F> {
        EndpointBuilder {
            id: self.id,
            method: self.method,
            path: path.into(),
            description: self.description,
            _phantom: PhantomData,
        }
    }
}

impl<I, M, P, F: ResponseFormat> EndpointBuilder<I, M, P, F> {
    /// Sets an optional description for this endpoint.
    pub fn description(self, description: impl Into<String>) -> Self {
        EndpointBuilder {
            description: Some(description.into()),
            ..self
        }
    }
}

impl<F: ResponseFormat> EndpointBuilder<Present, Present, Present, F> {
    /// Builds the endpoint.
    ///
    /// Only available once id, method and path have been set.
    pub fn build(self) -> Endpoint<F> {
        Endpoint {
            id: self.id,
            method: self.method,
            path: self.path,
            description: self.description,
            _format: PhantomData,
        }
    }
}
