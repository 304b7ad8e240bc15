//! HTTP methods used by the Modern Treasury API.

use strum::{Display, EnumIter, EnumString};

/// HTTP methods the API exposes.
///
/// ## Examples
///
/// ```rust
/// use treasury_lib::RestMethod;
///
/// let method = RestMethod::Patch;
/// assert!(method.has_body());
/// assert!(method.is_mutating());
///
/// let parsed: RestMethod = "DELETE".parse().unwrap();
/// assert_eq!(parsed, RestMethod::Delete);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RestMethod {
    /// Retrieve a resource or a page of resources.
    Get,
    /// Create a resource or trigger an action.
    Post,
    /// Replace a resource entirely.
    Put,
    /// Partially update a resource.
    Patch,
    /// Remove or archive a resource.
    Delete,
}

impl RestMethod {
    /// Returns `true` if this method carries a request body.
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// Returns `true` if repeating the call has the same effect as calling once.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Self::Post | Self::Patch)
    }

    /// Returns `true` if this method is read-only.
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Get)
    }

    /// Returns `true` if the call may change server state.
    ///
    /// Mutating calls receive an `Idempotency-Key` by default.
    pub fn is_mutating(&self) -> bool {
        !self.is_safe()
    }

    /// Converts to the equivalent `reqwest::Method`.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl From<RestMethod> for reqwest::Method {
    fn from(method: RestMethod) -> Self {
        method.to_reqwest()
    }
}
