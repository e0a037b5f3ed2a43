use std::fmt;

use serde::{Deserialize, Serialize};

pub type ServiceName = String;

/// Coarse status category reported by the backend for each unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Active,
    Inactive,
    Failed,
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 3] = [Self::Active, Self::Inactive, Self::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One managed background unit as reported by `GET /services`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: ServiceName,
    pub description: String,
    pub status: ServiceStatus,
    /// Raw init-system active state (e.g. "active", "activating")
    pub active_state: String,
    /// Raw init-system sub state (e.g. "running", "dead", "exited")
    pub sub_state: String,
}

impl Service {
    /// Actions offered for this service in the dashboard.
    ///
    /// Running units can be stopped or restarted, stopped units started or
    /// restarted, failed units only started.
    pub fn available_actions(&self) -> &'static [ServiceAction] {
        match self.status {
            ServiceStatus::Active => &[ServiceAction::Stop, ServiceAction::Restart],
            ServiceStatus::Inactive => &[ServiceAction::Start, ServiceAction::Restart],
            ServiceStatus::Failed => &[ServiceAction::Start],
        }
    }

    pub fn allows(&self, action: ServiceAction) -> bool {
        self.available_actions().contains(&action)
    }
}

/// Control command issued against a single service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
}

impl ServiceAction {
    /// Path segment used by `POST /control/{name}/{action}`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Stop => "Stop",
            Self::Restart => "Restart",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a `POST /control/{name}/{action}` response.
///
/// `success` is authoritative for whether the state change was applied;
/// `message` is always meant for the operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ControlResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            output: None,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            output: None,
            error: None,
        }
    }
}
