use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, widgets::TableState};
use tokio::sync::{RwLock, broadcast};
use tracing::{info, warn};

use svcdash_core::config::DashConfig;
use svcdash_core::directory::ServiceDirectory;
use svcdash_core::engine::{DashboardEngine, EngineCommand, EngineHandle};
use svcdash_core::filter::{ServiceFilter, StatusTab};
use svcdash_core::model::{Service, ServiceAction};
use svcdash_core::reducer::{EventEnvelope, reduce};
use svcdash_core::state::DashboardState;
use svcdash_core::viewport::ScrollKeeper;

use crate::ui::render;

// --- Terminal setup/teardown ---
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// View-local state: filter, selection, overlays
pub struct UiState {
    pub filter: ServiceFilter,
    pub search_mode: bool,
    pub help_open: bool,
    pub table: TableState,
    pub scroll: ScrollKeeper,
    /// Advances once per frame; drives the refresh spinner
    pub frame: usize,
    pub refresh_every: Duration,
    pub source: &'static str,
}

/// What the loop should do after a key press
#[derive(Debug)]
pub enum KeyOutcome {
    None,
    Quit,
    Send(EngineCommand),
}

impl UiState {
    pub fn new(refresh_every: Duration, source: &'static str) -> Self {
        Self {
            filter: ServiceFilter::new(),
            search_mode: false,
            help_open: false,
            table: TableState::default(),
            scroll: ScrollKeeper::new(),
            frame: 0,
            refresh_every,
            source,
        }
    }

    /// Keep the highlighted row on the same service across list changes.
    pub fn sync_selection(&mut self, visible: &[&Service]) {
        let by_name = self
            .scroll
            .selected()
            .and_then(|name| visible.iter().position(|s| s.name == name));

        let idx = match by_name {
            Some(i) => Some(i),
            None if visible.is_empty() => None,
            None => Some(self.table.selected().unwrap_or(0).min(visible.len() - 1)),
        };
        self.select_index(idx, visible);
    }

    fn select_index(&mut self, idx: Option<usize>, visible: &[&Service]) {
        self.table.select(idx);
        self.scroll
            .select(idx.and_then(|i| visible.get(i)).map(|s| s.name.clone()));
    }

    /// Record the drawn viewport, or apply a pending restore.
    ///
    /// `applied` is the last envelope id folded into the drawn state.
    pub fn after_draw(&mut self, visible: &[&Service], applied: u64) {
        match self.scroll.restore(visible, applied) {
            Some(restored) => {
                *self.table.offset_mut() = restored.offset;
                if restored.selected.is_some() {
                    self.table.select(restored.selected);
                }
            }
            None => self.scroll.set_offset(self.table.offset()),
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, state: &DashboardState) -> KeyOutcome {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return KeyOutcome::Quit;
        }

        let visible = state.visible(&self.filter);

        // ---------- HELP MODE ----------
        if self.help_open {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.help_open = false;
            }
            return KeyOutcome::None;
        }

        // ---------- SEARCH MODE ----------
        if self.search_mode {
            match key.code {
                KeyCode::Enter => self.search_mode = false,
                KeyCode::Esc => {
                    self.filter.search.clear();
                    self.search_mode = false;
                }
                KeyCode::Backspace => self.filter.search.pop(),
                KeyCode::Char(c) => self.filter.search.push(c),
                _ => {}
            }
            return KeyOutcome::None;
        }

        // ---------- NORMAL MODE ----------
        match key.code {
            KeyCode::Char('q') => return KeyOutcome::Quit,
            KeyCode::Char('?') => self.help_open = true,
            KeyCode::Char('/') => self.search_mode = true,
            KeyCode::Esc => {
                if state.notification.is_some() {
                    return KeyOutcome::Send(EngineCommand::DismissNotification);
                }
                self.filter.search.clear();
            }

            KeyCode::Down | KeyCode::Char('j') => {
                if !visible.is_empty() {
                    let next = self
                        .table
                        .selected()
                        .map_or(0, |i| (i + 1).min(visible.len() - 1));
                    self.select_index(Some(next), &visible);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !visible.is_empty() {
                    let prev = self.table.selected().map_or(0, |i| i.saturating_sub(1));
                    self.select_index(Some(prev), &visible);
                }
            }
            KeyCode::Home | KeyCode::Char('g') => {
                if !visible.is_empty() {
                    self.select_index(Some(0), &visible);
                }
            }
            KeyCode::End | KeyCode::Char('G') => {
                if !visible.is_empty() {
                    self.select_index(Some(visible.len() - 1), &visible);
                }
            }

            KeyCode::Tab => self.filter.cycle_tab(),
            KeyCode::BackTab => self.filter.tab = self.filter.tab.cycle_back(),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.filter.tab = StatusTab::ALL[idx];
            }

            KeyCode::Char('s') => return self.dispatch(ServiceAction::Start, state, &visible),
            KeyCode::Char('x') => return self.dispatch(ServiceAction::Stop, state, &visible),
            KeyCode::Char('r') => return self.dispatch(ServiceAction::Restart, state, &visible),

            KeyCode::Char('R') | KeyCode::F(5) => return KeyOutcome::Send(EngineCommand::Refresh),
            KeyCode::Char('p') => {
                let cmd = if state.polling {
                    EngineCommand::StopPolling
                } else {
                    EngineCommand::StartPolling
                };
                return KeyOutcome::Send(cmd);
            }
            _ => {}
        }
        KeyOutcome::None
    }

    fn dispatch(
        &self,
        action: ServiceAction,
        state: &DashboardState,
        visible: &[&Service],
    ) -> KeyOutcome {
        let Some(service) = self.table.selected().and_then(|i| visible.get(i)) else {
            return KeyOutcome::None;
        };
        // Only offered actions, and never while this service is working
        if !service.allows(action) || state.is_in_flight(&service.name) {
            return KeyOutcome::None;
        }
        KeyOutcome::Send(EngineCommand::Dispatch {
            name: service.name.clone(),
            action,
        })
    }
}

async fn send(handle: &EngineHandle, cmd: EngineCommand) {
    match cmd {
        EngineCommand::Refresh => handle.refresh().await,
        EngineCommand::Dispatch { name, action } => handle.dispatch(name, action).await,
        EngineCommand::DismissNotification => handle.dismiss_notification().await,
        EngineCommand::StartPolling => handle.start_polling().await,
        EngineCommand::StopPolling => handle.stop_polling().await,
        EngineCommand::Shutdown => handle.shutdown().await,
    }
}

pub async fn run_tui(config: &DashConfig, directory: Arc<dyn ServiceDirectory>) -> io::Result<()> {
    let (event_tx, _) = broadcast::channel::<EventEnvelope>(1_000);
    let state = Arc::new(RwLock::new(DashboardState::new()));

    // Reducer task
    let state_for_reducer = state.clone();
    let mut reducer_rx = event_tx.subscribe();
    tokio::spawn(async move {
        loop {
            match reducer_rx.recv().await {
                Ok(env) => {
                    let mut s = state_for_reducer.write().await;
                    reduce(&mut s, &env);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "reducer lagged behind engine events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let ui_rx = event_tx.subscribe();
    let source = directory.name();
    let engine_config = config.engine_config();
    let ui = UiState::new(engine_config.poll_interval, source);

    let engine = DashboardEngine::new(directory, engine_config);
    let (handle, join) = engine.spawn(event_tx);
    info!(source, "dashboard started");

    let mut terminal = setup_terminal()?;
    let res = tui_loop(&mut terminal, state, &handle, ui_rx, ui).await;
    restore_terminal(terminal)?;

    handle.shutdown().await;
    let _ = join.await;
    res
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: Arc<RwLock<DashboardState>>,
    handle: &EngineHandle,
    mut events: broadcast::Receiver<EventEnvelope>,
    mut ui: UiState,
) -> io::Result<()> {
    loop {
        loop {
            match events.try_recv() {
                Ok(env) => ui.scroll.observe(&env),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }

        let snapshot = state.read().await;
        let visible = snapshot.visible(&ui.filter);
        ui.sync_selection(&visible);

        terminal.draw(|f| render::draw(f, &snapshot, &mut ui, &visible))?;
        ui.after_draw(&visible, snapshot.last_event_id);
        ui.frame = ui.frame.wrapping_add(1);

        drop(visible);

        if !event::poll(Duration::from_millis(50))? {
            drop(snapshot);
            continue;
        }

        let CEvent::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let outcome = ui.on_key(key, &snapshot);
        drop(snapshot);

        match outcome {
            KeyOutcome::None => {}
            KeyOutcome::Quit => return Ok(()),
            KeyOutcome::Send(cmd) => send(handle, cmd).await,
        }
    }
}
