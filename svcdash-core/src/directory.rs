//! Service directory trait
//!
//! A directory is the only way the dashboard talks to the control plane:
//! one read operation for the full service list and one control operation
//! per service. Implementations hold no dashboard state.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::model::{ControlResult, Service, ServiceAction};

/// Failures of a directory call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectoryError {
    /// The backend could not be reached at all (refused, timed out, reset)
    Transport { message: String },
    /// The backend answered, but not with the expected JSON document
    Protocol { message: String },
    /// The backend answered with a non-success status code
    Http { status: u16 },
}

impl DirectoryError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { message } => write!(f, "cannot reach backend: {}", message),
            Self::Protocol { message } => write!(f, "unexpected response from backend: {}", message),
            Self::Http { status } => write!(f, "HTTP error! status: {}", status),
        }
    }
}

impl std::error::Error for DirectoryError {}

impl From<serde_json::Error> for DirectoryError {
    fn from(e: serde_json::Error) -> Self {
        DirectoryError::protocol(e.to_string())
    }
}

/// The backend contract the dashboard polls and controls.
///
/// - `fetch_services` returns the list exactly as reported, in order.
/// - `control_service` returns the backend's verdict; a `success: false`
///   result is a normal return value, not an error.
#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    /// Human-readable name of this directory implementation
    fn name(&self) -> &'static str;

    async fn fetch_services(&self) -> Result<Vec<Service>, DirectoryError>;

    async fn control_service(
        &self,
        name: &str,
        action: ServiceAction,
    ) -> Result<ControlResult, DirectoryError>;
}

/// Decode a JSON response body, enforcing the `application/json` content type.
///
/// Parameters such as `; charset=utf-8` are ignored.
pub fn decode_json<T: DeserializeOwned>(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<T, DirectoryError> {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .unwrap_or_default();

    if !essence.eq_ignore_ascii_case("application/json") {
        let shown = if essence.is_empty() { "none" } else { essence };
        return Err(DirectoryError::protocol(format!(
            "expected application/json, got {}",
            shown
        )));
    }

    Ok(serde_json::from_slice(body)?)
}
