//! Dashboard engine
//!
//! One task owns every piece of mutable control state: the poll timer, the
//! in-flight set and the notification deadline. Network calls run in spawned
//! tasks and report back over a completion channel, so the loop itself only
//! ever waits on commands, completions and timers.
//!
//! Observers (the reducer, the renderer, tests) subscribe to the broadcast
//! channel of [`EventEnvelope`]s.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::Local;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::action::{ActionTracker, Ticket};
use crate::directory::{DirectoryError, ServiceDirectory};
use crate::model::{ControlResult, Service, ServiceAction, ServiceName};
use crate::notify::{NOTIFICATION_TTL, NotificationChannel};
use crate::poll::{FetchMode, POLL_INTERVAL, PollTimer, REPOLL_DELAY, format_clock};
use crate::reducer::{ClearReason, DashboardEvent, EventEnvelope};

/// Commands accepted by a running engine
#[derive(Clone, Debug)]
pub enum EngineCommand {
    /// Fetch the service list now, driving the refresh indicator
    Refresh,
    /// Issue a control action against one service
    Dispatch {
        name: ServiceName,
        action: ServiceAction,
    },
    /// Clear the current notification
    DismissNotification,
    /// Fetch immediately and re-arm the poll timer
    StartPolling,
    /// Disarm the poll timer
    StopPolling,
    /// Stop the engine; in-flight calls finish and are discarded
    Shutdown,
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub poll_interval: Duration,
    pub repoll_delay: Duration,
    pub notification_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            repoll_delay: REPOLL_DELAY,
            notification_ttl: NOTIFICATION_TTL,
        }
    }
}

enum Completion {
    Fetched {
        mode: FetchMode,
        result: Result<Vec<Service>, DirectoryError>,
    },
    Controlled {
        ticket: Ticket,
        result: Result<ControlResult, DirectoryError>,
    },
    RepollDue,
}

pub struct DashboardEngine {
    directory: Arc<dyn ServiceDirectory>,
    config: EngineConfig,
    actions: ActionTracker,
    notifications: NotificationChannel,
    timer: PollTimer,
    next_id: u64,
}

impl DashboardEngine {
    pub fn new(directory: Arc<dyn ServiceDirectory>, config: EngineConfig) -> Self {
        Self {
            notifications: NotificationChannel::new(config.notification_ttl),
            timer: PollTimer::new(config.poll_interval),
            directory,
            config,
            actions: ActionTracker::new(),
            next_id: 1,
        }
    }

    /// Spawn the engine loop, returning a handle for sending commands.
    pub fn spawn(self, event_tx: broadcast::Sender<EventEnvelope>) -> (EngineHandle, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(100);
        let join = tokio::spawn(self.run(cmd_rx, event_tx));
        (EngineHandle { cmd_tx }, join)
    }

    /// Run until `Shutdown` is received or every command sender is dropped.
    ///
    /// Starts polling immediately: one manual fetch, then a background fetch
    /// every `poll_interval`.
    pub async fn run(
        mut self,
        mut command_rx: mpsc::Receiver<EngineCommand>,
        event_tx: broadcast::Sender<EventEnvelope>,
    ) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();

        info!(
            directory = self.directory.name(),
            interval_ms = self.config.poll_interval.as_millis() as u64,
            "dashboard engine started"
        );
        self.start_polling(&done_tx, &event_tx);

        loop {
            let expiry = self.notifications.deadline();

            tokio::select! {
                cmd = command_rx.recv() => match cmd {
                    Some(EngineCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd, &done_tx, &event_tx),
                },
                Some(done) = done_rx.recv() => self.handle_completion(done, &done_tx, &event_tx),
                _ = self.timer.tick() => self.spawn_fetch(FetchMode::Auto, &done_tx, &event_tx),
                _ = sleep_until_deadline(expiry) => {
                    if self.notifications.expire(Instant::now()).is_some() {
                        self.emit(&event_tx, DashboardEvent::NotificationCleared {
                            reason: ClearReason::Expired,
                        });
                    }
                }
            }
        }

        if self.timer.disarm() {
            self.emit(&event_tx, DashboardEvent::PollingChanged { armed: false });
        }
        info!("dashboard engine stopped");
    }

    fn emit(&mut self, event_tx: &broadcast::Sender<EventEnvelope>, event: DashboardEvent) {
        let _ = event_tx.send(EventEnvelope {
            id: self.next_id,
            at: SystemTime::now(),
            event,
        });
        self.next_id += 1;
    }

    fn handle_command(
        &mut self,
        cmd: EngineCommand,
        done_tx: &mpsc::UnboundedSender<Completion>,
        event_tx: &broadcast::Sender<EventEnvelope>,
    ) {
        match cmd {
            EngineCommand::Refresh => self.spawn_fetch(FetchMode::Manual, done_tx, event_tx),
            EngineCommand::Dispatch { name, action } => {
                self.dispatch(name, action, done_tx, event_tx)
            }
            EngineCommand::DismissNotification => {
                if self.notifications.dismiss().is_some() {
                    self.emit(
                        event_tx,
                        DashboardEvent::NotificationCleared {
                            reason: ClearReason::Dismissed,
                        },
                    );
                }
            }
            EngineCommand::StartPolling => {
                if !self.timer.is_armed() {
                    self.start_polling(done_tx, event_tx);
                }
            }
            EngineCommand::StopPolling => {
                if self.timer.disarm() {
                    debug!("background polling stopped");
                    self.emit(event_tx, DashboardEvent::PollingChanged { armed: false });
                }
            }
            // Handled by the run loop
            EngineCommand::Shutdown => {}
        }
    }

    fn handle_completion(
        &mut self,
        done: Completion,
        done_tx: &mpsc::UnboundedSender<Completion>,
        event_tx: &broadcast::Sender<EventEnvelope>,
    ) {
        match done {
            Completion::Fetched { mode, result } => match result {
                Ok(services) => {
                    debug!(count = services.len(), ?mode, "service list loaded");
                    self.emit(
                        event_tx,
                        DashboardEvent::ServicesLoaded {
                            mode,
                            services,
                            at: format_clock(&Local::now()),
                        },
                    );
                }
                Err(e) => {
                    warn!(error = %e, ?mode, "failed to load services");
                    self.emit(
                        event_tx,
                        DashboardEvent::FetchFailed {
                            mode,
                            message: e.to_string(),
                        },
                    );
                }
            },
            Completion::Controlled { ticket, result } => {
                let settlement = self.actions.settle(ticket, result);
                info!(
                    service = %settlement.name,
                    action = %settlement.action,
                    succeeded = settlement.succeeded,
                    message = %settlement.notification.message,
                    "control action settled"
                );

                self.notifications
                    .publish(settlement.notification.clone(), Instant::now());
                self.emit(
                    event_tx,
                    DashboardEvent::NotificationPublished {
                        notification: settlement.notification,
                    },
                );

                if settlement.repoll {
                    let delay = self.config.repoll_delay;
                    let done = done_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = done.send(Completion::RepollDue);
                    });
                    self.emit(
                        event_tx,
                        DashboardEvent::RepollScheduled {
                            name: settlement.name.clone(),
                            delay,
                        },
                    );
                }

                self.emit(
                    event_tx,
                    DashboardEvent::ActionSettled {
                        name: settlement.name,
                        action: settlement.action,
                        succeeded: settlement.succeeded,
                    },
                );
            }
            Completion::RepollDue => self.spawn_fetch(FetchMode::Manual, done_tx, event_tx),
        }
    }

    fn start_polling(
        &mut self,
        done_tx: &mpsc::UnboundedSender<Completion>,
        event_tx: &broadcast::Sender<EventEnvelope>,
    ) {
        self.spawn_fetch(FetchMode::Manual, done_tx, event_tx);
        if self.timer.arm() {
            self.emit(event_tx, DashboardEvent::PollingChanged { armed: true });
        }
    }

    fn spawn_fetch(
        &mut self,
        mode: FetchMode,
        done_tx: &mpsc::UnboundedSender<Completion>,
        event_tx: &broadcast::Sender<EventEnvelope>,
    ) {
        self.emit(event_tx, DashboardEvent::FetchStarted { mode });

        let directory = self.directory.clone();
        let done = done_tx.clone();
        tokio::spawn(async move {
            let call = tokio::spawn(async move { directory.fetch_services().await });
            let result = call.await.unwrap_or_else(|e| Err(call_aborted(e)));
            let _ = done.send(Completion::Fetched { mode, result });
        });
    }

    fn dispatch(
        &mut self,
        name: ServiceName,
        action: ServiceAction,
        done_tx: &mpsc::UnboundedSender<Completion>,
        event_tx: &broadcast::Sender<EventEnvelope>,
    ) {
        let ticket = match self.actions.begin(name, action) {
            Ok(ticket) => ticket,
            Err(rejected) => {
                debug!(%rejected, "dispatch ignored");
                self.emit(
                    event_tx,
                    DashboardEvent::DispatchRejected {
                        name: rejected.name,
                        action: rejected.action,
                    },
                );
                return;
            }
        };

        info!(service = ticket.name(), %action, "dispatching control action");
        self.emit(
            event_tx,
            DashboardEvent::ActionStarted {
                name: ticket.name().to_string(),
                action,
            },
        );

        let directory = self.directory.clone();
        let done = done_tx.clone();
        let name = ticket.name().to_string();
        // The ticket stays out here so a panicking directory still settles it
        tokio::spawn(async move {
            let call = tokio::spawn(async move { directory.control_service(&name, action).await });
            let result = call.await.unwrap_or_else(|e| Err(call_aborted(e)));
            let _ = done.send(Completion::Controlled { ticket, result });
        });
    }
}

fn call_aborted(e: JoinError) -> DirectoryError {
    warn!(error = %e, "directory call aborted");
    DirectoryError::transport(format!("directory call aborted: {}", e))
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Cloneable sender side of a running engine
#[derive(Clone, Debug)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    async fn send(&self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).await.is_err() {
            debug!("engine is gone, command dropped");
        }
    }

    pub async fn refresh(&self) {
        self.send(EngineCommand::Refresh).await;
    }

    pub async fn dispatch(&self, name: impl Into<ServiceName>, action: ServiceAction) {
        self.send(EngineCommand::Dispatch {
            name: name.into(),
            action,
        })
        .await;
    }

    pub async fn dismiss_notification(&self) {
        self.send(EngineCommand::DismissNotification).await;
    }

    pub async fn start_polling(&self) {
        self.send(EngineCommand::StartPolling).await;
    }

    pub async fn stop_polling(&self) {
        self.send(EngineCommand::StopPolling).await;
    }

    pub async fn shutdown(&self) {
        self.send(EngineCommand::Shutdown).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServiceStatus;
    use crate::notify::{Notification, NotificationKind};
    use crate::reducer::reduce;
    use crate::state::DashboardState;
    use crate::testing::ScriptedDirectory;

    struct Harness {
        directory: Arc<ScriptedDirectory>,
        handle: EngineHandle,
        join: JoinHandle<()>,
        events_rx: broadcast::Receiver<EventEnvelope>,
        events: Vec<DashboardEvent>,
        state: DashboardState,
    }

    impl Harness {
        fn start(directory: ScriptedDirectory) -> Self {
            let directory = Arc::new(directory);
            let (event_tx, events_rx) = broadcast::channel(1_000);
            let engine = DashboardEngine::new(directory.clone(), EngineConfig::default());
            let (handle, join) = engine.spawn(event_tx);
            Self {
                directory,
                handle,
                join,
                events_rx,
                events: Vec::new(),
                state: DashboardState::new(),
            }
        }

        /// Let the runtime idle for `ms` of (paused) time, then fold new events.
        async fn advance(&mut self, ms: u64) {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            while let Ok(env) = self.events_rx.try_recv() {
                reduce(&mut self.state, &env);
                self.events.push(env.event);
            }
        }

        fn count(&self, pred: impl Fn(&DashboardEvent) -> bool) -> usize {
            self.events.iter().filter(|e| pred(*e)).count()
        }

        fn notifications(&self) -> Vec<Notification> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    DashboardEvent::NotificationPublished { notification } => {
                        Some(notification.clone())
                    }
                    _ => None,
                })
                .collect()
        }
    }

    fn svc(name: &str, status: ServiceStatus) -> Service {
        Service {
            name: name.into(),
            description: format!("{} unit", name),
            status,
            active_state: status.as_str().into(),
            sub_state: "running".into(),
        }
    }

    fn is_repoll(e: &DashboardEvent) -> bool {
        matches!(e, DashboardEvent::RepollScheduled { .. })
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_then_background_polls() {
        let directory = ScriptedDirectory::new(vec![svc("nginx", ServiceStatus::Active)]);
        let mut h = Harness::start(directory);

        h.advance(10).await;
        assert!(!h.state.loading());
        assert!(h.state.polling);
        assert_eq!(h.state.services.len(), 1);
        assert_eq!(h.directory.fetch_count(), 1);
        assert_eq!(
            h.events[0],
            DashboardEvent::FetchStarted {
                mode: FetchMode::Manual
            }
        );

        h.advance(5_000).await;
        assert_eq!(h.directory.fetch_count(), 2);
        h.advance(5_000).await;
        assert_eq!(h.directory.fetch_count(), 3);
        assert_eq!(
            h.count(|e| matches!(e, DashboardEvent::FetchStarted { mode: FetchMode::Auto })),
            2
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_load_failure_keeps_polling() {
        let directory = ScriptedDirectory::new(vec![svc("nginx", ServiceStatus::Active)]);
        directory.fail_next_fetch(DirectoryError::transport("connection refused"));
        let mut h = Harness::start(directory);

        h.advance(10).await;
        assert!(!h.state.loading());
        assert!(h.state.services.is_empty());
        assert_eq!(
            h.state.error.as_deref(),
            Some("cannot reach backend: connection refused")
        );

        h.advance(5_000).await;
        assert_eq!(h.directory.fetch_count(), 2);
        assert!(h.state.error.is_none());
        assert_eq!(h.state.services.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_after_success_keeps_list() {
        let directory = ScriptedDirectory::new(vec![
            svc("nginx", ServiceStatus::Active),
            svc("cups", ServiceStatus::Inactive),
        ]);
        let mut h = Harness::start(directory);
        h.advance(10).await;

        h.directory.fail_next_fetch(DirectoryError::Http { status: 500 });
        h.handle.refresh().await;
        h.advance(10).await;

        assert_eq!(h.state.services.len(), 2);
        assert_eq!(h.state.error.as_deref(), Some("HTTP error! status: 500"));
        assert!(!h.state.is_refreshing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshing_flag_only_for_manual_fetches() {
        let directory = ScriptedDirectory::new(vec![svc("nginx", ServiceStatus::Active)]);
        directory.set_fetch_delay(Duration::from_millis(100));
        let mut h = Harness::start(directory);

        h.advance(50).await;
        assert!(h.state.loading());
        assert!(h.state.is_refreshing());
        h.advance(100).await;
        assert!(!h.state.loading());
        assert!(!h.state.is_refreshing());

        // Background tick at t=5000 with the fetch still outstanding at t=5050
        h.advance(4_900).await;
        assert!(matches!(
            h.events.last(),
            Some(DashboardEvent::FetchStarted {
                mode: FetchMode::Auto
            })
        ));
        assert!(!h.state.is_refreshing());

        h.handle.refresh().await;
        h.advance(10).await;
        assert!(h.state.is_refreshing());
        h.advance(200).await;
        assert!(!h.state.is_refreshing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_action_schedules_single_repoll() {
        let directory = ScriptedDirectory::new(vec![svc("nginx", ServiceStatus::Active)]);
        directory.script_control("nginx", Ok(ControlResult::ok("Stopped nginx")));
        let mut h = Harness::start(directory);
        h.advance(10).await;
        assert_eq!(h.directory.fetch_count(), 1);

        h.handle.dispatch("nginx", ServiceAction::Stop).await;
        h.advance(10).await;

        assert_eq!(h.state.notification, Some(Notification::success("Stopped nginx")));
        assert!(h.state.in_flight.is_empty());
        assert_eq!(h.count(is_repoll), 1);
        assert_eq!(h.directory.fetch_count(), 1);

        h.advance(975).await;
        assert_eq!(h.directory.fetch_count(), 1);
        h.advance(30).await;
        assert_eq!(h.directory.fetch_count(), 2);

        h.advance(2_000).await;
        assert_eq!(h.directory.fetch_count(), 2);
        assert_eq!(h.count(is_repoll), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_during_call() {
        let directory = ScriptedDirectory::new(vec![svc("nginx", ServiceStatus::Active)]);
        directory.script_control("nginx", Ok(ControlResult::ok("Restarted nginx")));
        directory.set_control_delay("nginx", Duration::from_millis(300));
        let mut h = Harness::start(directory);
        h.advance(10).await;

        h.handle.dispatch("nginx", ServiceAction::Restart).await;
        h.advance(100).await;
        assert!(h.state.is_in_flight("nginx"));

        // A second click while in flight is ignored
        h.handle.dispatch("nginx", ServiceAction::Restart).await;
        h.advance(10).await;
        assert_eq!(
            h.count(|e| matches!(e, DashboardEvent::DispatchRejected { .. })),
            1
        );

        h.advance(300).await;
        assert!(h.state.in_flight.is_empty());
        assert_eq!(h.directory.control_count(), 1);
        assert_eq!(h.count(is_repoll), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_business_failure_does_not_repoll() {
        let directory = ScriptedDirectory::new(vec![svc("backup", ServiceStatus::Failed)]);
        directory.script_control(
            "backup",
            Ok(ControlResult::failed("Failed to start backup: exit status 1")),
        );
        let mut h = Harness::start(directory);
        h.advance(10).await;

        h.handle.dispatch("backup", ServiceAction::Start).await;
        h.advance(2_000).await;

        let shown = h.state.notification.clone().unwrap();
        assert_eq!(shown.kind, NotificationKind::Error);
        assert_eq!(shown.message, "Failed to start backup: exit status 1");
        assert_eq!(h.count(is_repoll), 0);
        assert_eq!(h.directory.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_on_dispatch() {
        let directory = ScriptedDirectory::new(vec![svc("sshd", ServiceStatus::Active)]);
        directory.script_control("sshd", Err(DirectoryError::transport("connection reset")));
        let mut h = Harness::start(directory);
        h.advance(10).await;

        h.handle.dispatch("sshd", ServiceAction::Stop).await;
        h.advance(10).await;

        assert_eq!(
            h.state.notification,
            Some(Notification::error(
                "Failed to stop sshd: cannot reach backend: connection reset"
            ))
        );
        assert!(h.state.in_flight.is_empty());
        assert_eq!(h.count(is_repoll), 0);
        // The list is untouched by the action
        assert_eq!(h.state.services.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_directory_still_settles() {
        let directory = ScriptedDirectory::new(vec![svc("cups", ServiceStatus::Active)]);
        directory.panic_on_control("cups");
        let mut h = Harness::start(directory);
        h.advance(10).await;

        h.handle.dispatch("cups", ServiceAction::Restart).await;
        h.advance(10).await;

        assert!(h.state.in_flight.is_empty());
        let shown = h.state.notification.clone().unwrap();
        assert!(shown.is_error());
        assert!(shown.message.starts_with("Failed to restart cups:"));
        assert_eq!(h.count(is_repoll), 0);

        // The name is free again
        h.handle.dispatch("cups", ServiceAction::Restart).await;
        h.advance(10).await;
        assert_eq!(h.directory.control_count(), 2);
        assert_eq!(
            h.count(|e| matches!(e, DashboardEvent::DispatchRejected { .. })),
            0
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_dispatches_for_different_names() {
        let directory = ScriptedDirectory::new(vec![
            svc("a", ServiceStatus::Active),
            svc("b", ServiceStatus::Inactive),
        ]);
        directory.script_control("a", Ok(ControlResult::failed("Failed to stop a")));
        directory.set_control_delay("a", Duration::from_millis(200));
        directory.script_control("b", Ok(ControlResult::ok("Started b")));
        directory.set_control_delay("b", Duration::from_millis(100));
        let mut h = Harness::start(directory);
        h.advance(10).await;

        h.handle.dispatch("a", ServiceAction::Stop).await;
        h.handle.dispatch("b", ServiceAction::Start).await;
        h.advance(50).await;
        assert!(h.state.is_in_flight("a"));
        assert!(h.state.is_in_flight("b"));

        h.advance(300).await;
        assert!(h.state.in_flight.is_empty());
        assert_eq!(
            h.notifications(),
            vec![
                Notification::success("Started b"),
                Notification::error("Failed to stop a"),
            ]
        );
        assert_eq!(h.state.notification, Some(Notification::error("Failed to stop a")));
        assert_eq!(h.count(is_repoll), 1);
        assert!(h.events.iter().any(|e| matches!(
            e,
            DashboardEvent::RepollScheduled { name, .. } if name == "b"
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_expires_and_republish_resets_timeout() {
        let directory = ScriptedDirectory::new(vec![
            svc("a", ServiceStatus::Active),
            svc("b", ServiceStatus::Active),
        ]);
        directory.script_control("a", Ok(ControlResult::failed("no a")));
        directory.script_control("b", Ok(ControlResult::failed("no b")));
        let mut h = Harness::start(directory);
        h.advance(10).await;

        h.handle.dispatch("a", ServiceAction::Stop).await;
        h.advance(3_000).await;
        h.handle.dispatch("b", ServiceAction::Stop).await;
        h.advance(10).await;
        assert_eq!(h.state.notification, Some(Notification::error("no b")));

        // Past a's original deadline, b's is still pending
        h.advance(2_500).await;
        assert!(h.state.notification.is_some());

        h.advance(2_600).await;
        assert!(h.state.notification.is_none());
        assert_eq!(
            h.count(|e| matches!(
                e,
                DashboardEvent::NotificationCleared {
                    reason: ClearReason::Expired
                }
            )),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_cancels_auto_dismiss() {
        let directory = ScriptedDirectory::new(vec![svc("a", ServiceStatus::Active)]);
        directory.script_control("a", Ok(ControlResult::failed("no a")));
        let mut h = Harness::start(directory);
        h.advance(10).await;

        h.handle.dispatch("a", ServiceAction::Stop).await;
        h.advance(10).await;
        h.handle.dismiss_notification().await;
        h.handle.dismiss_notification().await;
        h.advance(6_000).await;

        assert!(h.state.notification.is_none());
        assert_eq!(
            h.count(|e| matches!(e, DashboardEvent::NotificationCleared { .. })),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_polling_is_idempotent() {
        let directory = ScriptedDirectory::new(vec![svc("a", ServiceStatus::Active)]);
        let mut h = Harness::start(directory);
        h.advance(10).await;

        h.handle.stop_polling().await;
        h.handle.stop_polling().await;
        h.advance(12_000).await;
        assert!(!h.state.polling);
        assert_eq!(h.directory.fetch_count(), 1);
        assert_eq!(
            h.count(|e| matches!(e, DashboardEvent::PollingChanged { armed: false })),
            1
        );

        // Manual refresh still works while paused
        h.handle.refresh().await;
        h.advance(10).await;
        assert_eq!(h.directory.fetch_count(), 2);

        h.handle.start_polling().await;
        h.advance(10).await;
        assert!(h.state.polling);
        assert_eq!(h.directory.fetch_count(), 3);
        h.advance(5_000).await;
        assert_eq!(h.directory.fetch_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_with_action_in_flight() {
        let directory = ScriptedDirectory::new(vec![svc("a", ServiceStatus::Active)]);
        directory.script_control("a", Ok(ControlResult::ok("Stopped a")));
        directory.set_control_delay("a", Duration::from_millis(500));
        let mut h = Harness::start(directory);
        h.advance(10).await;

        h.handle.dispatch("a", ServiceAction::Stop).await;
        h.advance(10).await;
        h.handle.shutdown().await;
        h.advance(1_000).await;

        assert!(h.join.is_finished());
        assert_eq!(h.directory.control_count(), 1);
        assert!(matches!(
            h.events.last(),
            Some(DashboardEvent::PollingChanged { armed: false })
        ));

        // Commands to a stopped engine are dropped quietly
        h.handle.refresh().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_poll_replaces_list_wholesale() {
        let directory = ScriptedDirectory::new(vec![
            svc("a", ServiceStatus::Active),
            svc("b", ServiceStatus::Active),
        ]);
        let mut h = Harness::start(directory);
        h.advance(10).await;
        assert_eq!(h.state.services.len(), 2);

        h.directory
            .set_services(vec![svc("c", ServiceStatus::Failed)]);
        h.advance(5_000).await;
        assert_eq!(h.state.services, vec![svc("c", ServiceStatus::Failed)]);
        assert_eq!(h.state.totals().failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_backend_yields_identical_lists() {
        let services = vec![
            svc("z", ServiceStatus::Active),
            svc("a", ServiceStatus::Failed),
            svc("m", ServiceStatus::Inactive),
        ];
        let mut h = Harness::start(ScriptedDirectory::new(services.clone()));
        h.advance(10).await;
        let first = h.state.services.clone();
        h.advance(5_000).await;

        assert_eq!(first, services);
        assert_eq!(h.state.services, first);
    }
}
