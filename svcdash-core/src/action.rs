use std::collections::BTreeSet;
use std::fmt;

use crate::directory::DirectoryError;
use crate::model::{ControlResult, ServiceAction, ServiceName};
use crate::notify::Notification;

/// A dispatch refused because the service already has an action in flight
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchRejected {
    pub name: ServiceName,
    pub action: ServiceAction,
}

impl fmt::Display for DispatchRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot {} {}: another action is still in progress",
            self.action, self.name
        )
    }
}

impl std::error::Error for DispatchRejected {}

/// Proof that a name was admitted to the in-flight set.
///
/// Deliberately not `Clone`: the only way to release the name is to hand the
/// ticket back to [`ActionTracker::settle`].
#[derive(Debug)]
pub struct Ticket {
    name: ServiceName,
    action: ServiceAction,
}

impl Ticket {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// What the caller must do after a control call settled
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub name: ServiceName,
    pub action: ServiceAction,
    pub succeeded: bool,
    pub notification: Notification,
    /// Schedule one deferred re-poll of the service list
    pub repoll: bool,
}

/// Tracks which services have a control action in flight.
#[derive(Debug, Default)]
pub struct ActionTracker {
    in_flight: BTreeSet<ServiceName>,
}

impl ActionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `name` to the in-flight set, or reject if it is already there.
    pub fn begin(
        &mut self,
        name: impl Into<ServiceName>,
        action: ServiceAction,
    ) -> Result<Ticket, DispatchRejected> {
        let name = name.into();
        if !self.in_flight.insert(name.clone()) {
            return Err(DispatchRejected { name, action });
        }
        Ok(Ticket { name, action })
    }

    /// Release the ticket's name and turn the outcome into a notification.
    pub fn settle(
        &mut self,
        ticket: Ticket,
        outcome: Result<ControlResult, DirectoryError>,
    ) -> Settlement {
        let Ticket { name, action } = ticket;
        self.in_flight.remove(&name);

        let (succeeded, notification) = match outcome {
            Ok(result) if result.success => (true, Notification::success(result.message)),
            Ok(result) => (false, Notification::error(result.message)),
            Err(e) => (
                false,
                Notification::error(format!("Failed to {} {}: {}", action, name, e)),
            ),
        };

        Settlement {
            name,
            action,
            succeeded,
            notification,
            repoll: succeeded,
        }
    }

    pub fn is_in_flight(&self, name: &str) -> bool {
        self.in_flight.contains(name)
    }

    pub fn in_flight(&self) -> &BTreeSet<ServiceName> {
        &self.in_flight
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }
}
