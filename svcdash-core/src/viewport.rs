//! Scroll continuity across refresh-triggered re-renders
//!
//! The presentation layer reports its scroll offset and selected service
//! every frame. When a fetch starts the offset is captured; once the drawn
//! state includes the fetch result, the captured offset is handed back so a
//! background poll never moves the viewport.

use crate::model::{Service, ServiceName};
use crate::reducer::{DashboardEvent, EventEnvelope};

/// Viewport position to apply after a restore
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Restored {
    /// Index of the first visible row
    pub offset: usize,
    /// New index of the previously selected service, if it is still visible
    pub selected: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct ScrollKeeper {
    offset: usize,
    selected: Option<ServiceName>,
    captured: Option<usize>,
    /// Id of the envelope that resolved the last fetch
    restore_after: Option<u64>,
}

impl ScrollKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, name: Option<ServiceName>) {
        self.selected = name;
    }

    /// Remember the current offset; a later capture overwrites an earlier one.
    pub fn capture(&mut self) {
        self.captured = Some(self.offset);
    }

    pub fn observe(&mut self, env: &EventEnvelope) {
        match env.event {
            DashboardEvent::FetchStarted { .. } => self.capture(),
            DashboardEvent::ServicesLoaded { .. } | DashboardEvent::FetchFailed { .. } => {
                self.restore_after = Some(env.id);
            }
            _ => {}
        }
    }

    /// Call after drawing a state reduced up to envelope `applied`.
    ///
    /// Returns the position to restore once per resolved fetch, and only once
    /// the drawn state includes that fetch's result.
    pub fn restore(&mut self, visible: &[&Service], applied: u64) -> Option<Restored> {
        match self.restore_after {
            Some(id) if applied >= id => self.restore_after = None,
            _ => return None,
        }

        let wanted = self.captured.take().unwrap_or(self.offset);
        let offset = wanted.min(visible.len().saturating_sub(1));
        self.offset = offset;

        let selected = self
            .selected
            .as_deref()
            .and_then(|name| visible.iter().position(|s| s.name == name));

        Some(Restored { offset, selected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    use crate::model::ServiceStatus;
    use crate::poll::FetchMode;

    fn services(names: &[&str]) -> Vec<Service> {
        names
            .iter()
            .map(|n| Service {
                name: n.to_string(),
                description: String::new(),
                status: ServiceStatus::Active,
                active_state: "active".into(),
                sub_state: "running".into(),
            })
            .collect()
    }

    fn env(id: u64, event: DashboardEvent) -> EventEnvelope {
        EventEnvelope {
            id,
            at: SystemTime::now(),
            event,
        }
    }

    fn started(id: u64) -> EventEnvelope {
        env(
            id,
            DashboardEvent::FetchStarted {
                mode: FetchMode::Auto,
            },
        )
    }

    fn loaded(id: u64) -> EventEnvelope {
        env(
            id,
            DashboardEvent::ServicesLoaded {
                mode: FetchMode::Auto,
                services: vec![],
                at: "12:00:00".into(),
            },
        )
    }

    #[test]
    fn test_restore_returns_captured_offset_once() {
        let list = services(&["a", "b", "c", "d", "e", "f"]);
        let visible: Vec<&Service> = list.iter().collect();
        let mut keeper = ScrollKeeper::new();

        keeper.set_offset(3);
        keeper.observe(&started(1));
        // The renderer moved the viewport while the fetch was in flight
        keeper.set_offset(0);
        keeper.observe(&loaded(2));

        let restored = keeper.restore(&visible, 2).unwrap();
        assert_eq!(restored.offset, 3);
        assert_eq!(keeper.offset(), 3);
        assert!(keeper.restore(&visible, 2).is_none());
    }

    #[test]
    fn test_restore_waits_for_reduced_state() {
        let list = services(&["a", "b", "c", "d"]);
        let visible: Vec<&Service> = list.iter().collect();
        let mut keeper = ScrollKeeper::new();

        keeper.set_offset(2);
        keeper.observe(&started(7));
        keeper.observe(&loaded(8));

        // Frame drawn from a state that has not applied the new list yet
        assert!(keeper.restore(&visible, 7).is_none());
        assert_eq!(keeper.restore(&visible, 8).unwrap().offset, 2);
    }

    #[test]
    fn test_nothing_to_restore_without_fetch() {
        let list = services(&["a"]);
        let visible: Vec<&Service> = list.iter().collect();
        let mut keeper = ScrollKeeper::new();
        keeper.observe(&env(1, DashboardEvent::PollingChanged { armed: true }));
        assert!(keeper.restore(&visible, 1).is_none());
    }

    #[test]
    fn test_offset_is_clamped_to_shorter_list() {
        let mut keeper = ScrollKeeper::new();
        keeper.set_offset(10);
        keeper.capture();
        keeper.observe(&env(
            3,
            DashboardEvent::FetchFailed {
                mode: FetchMode::Manual,
                message: "HTTP error! status: 500".into(),
            },
        ));

        let list = services(&["a", "b", "c"]);
        let visible: Vec<&Service> = list.iter().collect();
        assert_eq!(keeper.restore(&visible, 3).unwrap().offset, 2);
    }

    #[test]
    fn test_selection_follows_service_name() {
        let mut keeper = ScrollKeeper::new();
        keeper.select(Some("c".into()));
        keeper.capture();
        keeper.observe(&loaded(1));

        let list = services(&["c", "a", "b"]);
        let visible: Vec<&Service> = list.iter().collect();
        assert_eq!(keeper.restore(&visible, 1).unwrap().selected, Some(0));

        keeper.select(Some("gone".into()));
        keeper.observe(&loaded(2));
        assert_eq!(keeper.restore(&visible, 2).unwrap().selected, None);
    }
}
