//! Layered error types for the Modern Treasury client.
//!
//! The error hierarchy is structured for actionable diagnostics:
//! - [`TreasuryError`] - Top-level error type for every client operation
//! - [`ClientError`] - Transport failures, timeouts and cancellation
//! - [`ApiError`] - A completed HTTP exchange the server answered with status > 399
//! - [`ValidationError`] - Response decoding failures and caller-contract violations
//! - [`AuthError`] - Missing or unusable credentials
//! - [`ConfigError`] - Invalid client, option or request configuration

mod api_error;
mod auth_error;
mod client_error;
mod config_error;
mod treasury_error;
mod validation_error;

pub use api_error::{ApiError, ErrorDetail, RequestSnapshot};
pub use auth_error::AuthError;
pub use client_error::ClientError;
pub use config_error::ConfigError;
pub use treasury_error::TreasuryError;
pub use validation_error::ValidationError;
