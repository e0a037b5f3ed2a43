use std::time::{Duration, SystemTime};

use crate::model::{Service, ServiceAction, ServiceName};
use crate::notify::Notification;
use crate::poll::FetchMode;
use crate::state::DashboardState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearReason {
    Dismissed,
    Expired,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DashboardEvent {
    FetchStarted {
        mode: FetchMode,
    },
    ServicesLoaded {
        mode: FetchMode,
        services: Vec<Service>,
        /// Local wall-clock time of the response, `HH:MM:SS`
        at: String,
    },
    FetchFailed {
        mode: FetchMode,
        message: String,
    },
    ActionStarted {
        name: ServiceName,
        action: ServiceAction,
    },
    ActionSettled {
        name: ServiceName,
        action: ServiceAction,
        succeeded: bool,
    },
    DispatchRejected {
        name: ServiceName,
        action: ServiceAction,
    },
    RepollScheduled {
        name: ServiceName,
        delay: Duration,
    },
    NotificationPublished {
        notification: Notification,
    },
    NotificationCleared {
        reason: ClearReason,
    },
    PollingChanged {
        armed: bool,
    },
}

#[derive(Clone, Debug)]
pub struct EventEnvelope {
    pub id: u64,
    pub at: SystemTime,
    pub event: DashboardEvent,
}

pub fn reduce(state: &mut DashboardState, env: &EventEnvelope) {
    state.last_event_id = env.id;

    match &env.event {
        DashboardEvent::FetchStarted { mode } => state.poll.begin(*mode),
        DashboardEvent::ServicesLoaded { mode, services, at } => {
            state.services = services.clone();
            state.error = None;
            state.last_update = Some(at.clone());
            state.poll.finish(*mode);
        }
        DashboardEvent::FetchFailed { mode, message } => {
            state.error = Some(message.clone());
            state.poll.finish(*mode);
        }
        DashboardEvent::ActionStarted { name, .. } => {
            state.in_flight.insert(name.clone());
        }
        DashboardEvent::ActionSettled { name, .. } => {
            state.in_flight.remove(name);
        }
        DashboardEvent::NotificationPublished { notification } => {
            state.notification = Some(notification.clone());
        }
        DashboardEvent::NotificationCleared { .. } => state.notification = None,
        DashboardEvent::PollingChanged { armed } => state.polling = *armed,
        DashboardEvent::DispatchRejected { .. } | DashboardEvent::RepollScheduled { .. } => {}
    }
}
