use std::collections::BTreeSet;

use crate::filter::{ServiceFilter, StatusCounts};
use crate::model::{Service, ServiceName};
use crate::notify::Notification;
use crate::poll::PollStatus;

/// Everything the presentation layer renders, rebuilt from engine events.
#[derive(Debug)]
pub struct DashboardState {
    /// Authoritative service list, replaced wholesale by each successful fetch
    pub services: Vec<Service>,
    pub poll: PollStatus,
    /// Message of the most recent failed fetch; cleared by the next success
    pub error: Option<String>,
    /// `HH:MM:SS` of the last successful fetch
    pub last_update: Option<String>,
    /// Mirror of the engine's in-flight set
    pub in_flight: BTreeSet<ServiceName>,
    pub notification: Option<Notification>,
    /// Whether the background poll timer is armed
    pub polling: bool,
    pub last_event_id: u64,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            services: Vec::new(),
            poll: PollStatus::new(),
            error: None,
            last_update: None,
            in_flight: BTreeSet::new(),
            notification: None,
            polling: false,
            last_event_id: 0,
        }
    }

    pub fn loading(&self) -> bool {
        self.poll.loading()
    }

    pub fn is_refreshing(&self) -> bool {
        self.poll.is_refreshing()
    }

    pub fn last_update_label(&self) -> &str {
        self.last_update.as_deref().unwrap_or("Never")
    }

    pub fn is_in_flight(&self, name: &str) -> bool {
        self.in_flight.contains(name)
    }

    pub fn visible(&self, filter: &ServiceFilter) -> Vec<&Service> {
        filter.visible(&self.services)
    }

    /// Totals over the whole list, ignoring any filter
    pub fn totals(&self) -> StatusCounts {
        StatusCounts::tally(&self.services)
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}
