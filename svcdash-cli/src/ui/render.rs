use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap},
};

use svcdash_core::filter::StatusTab;
use svcdash_core::model::{Service, ServiceAction};
use svcdash_core::notify::Notification;
use svcdash_core::state::DashboardState;

use crate::tui::UiState;
use crate::ui::theme::styles;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn action_key(action: ServiceAction) -> char {
    match action {
        ServiceAction::Start => 's',
        ServiceAction::Stop => 'x',
        ServiceAction::Restart => 'r',
    }
}

fn format_period(secs: u64) -> String {
    if secs > 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Rect of `width` x `height` centered in `area`, clamped to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

pub fn draw(f: &mut Frame, state: &DashboardState, ui: &mut UiState, visible: &[&Service]) {
    let area = f.area();

    // Layout:
    // [ header ]
    // [ controls: refresh + search ]
    // [ status tabs ]
    // [ table / loading / error ]
    // [ footer ]
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, outer[0], state, ui);
    draw_controls(f, outer[1], state, ui);
    draw_tabs(f, outer[2], state, ui);

    if state.loading() {
        draw_loading(f, outer[3], ui);
    } else if let Some(error) = &state.error {
        draw_error(f, outer[3], error, ui);
    } else if visible.is_empty() {
        let empty = Paragraph::new("No services found")
            .style(styles::text_muted())
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(styles::border_subtle()));
        f.render_widget(empty, outer[3]);
    } else {
        draw_table(f, outer[3], state, ui, visible);
    }

    draw_footer(f, outer[4], state);

    if let Some(notification) = &state.notification {
        draw_toast(f, area, notification);
    }

    if ui.help_open {
        draw_help(f, area);
    }
}

fn draw_header(f: &mut Frame, area: Rect, state: &DashboardState, ui: &UiState) {
    let polling = if state.polling {
        Span::styled(
            format!("Auto-refresh: every {}", format_period(ui.refresh_every.as_secs())),
            styles::text_dim(),
        )
    } else {
        Span::styled("Polling paused (p to resume)", styles::warn())
    };

    let line = Line::from(vec![
        Span::styled(" Service Dashboard ", styles::accent_bold()),
        Span::styled(format!("[{}]", ui.source), styles::text_muted()),
        Span::raw("   "),
        Span::styled("Last updated: ", styles::text_dim()),
        Span::styled(state.last_update_label().to_string(), styles::text()),
        Span::raw("   "),
        polling,
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_controls(f: &mut Frame, area: Rect, state: &DashboardState, ui: &UiState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(10)])
        .split(area);

    let refresh = if state.is_refreshing() {
        Line::from(vec![
            Span::styled(SPINNER[ui.frame % SPINNER.len()], styles::accent()),
            Span::styled(" Refreshing...", styles::text()),
        ])
    } else {
        Line::from(vec![
            Span::styled("R", styles::key_hint()),
            Span::styled(" Refresh", styles::text()),
        ])
    };
    f.render_widget(
        Paragraph::new(refresh).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_subtle()),
        ),
        cols[0],
    );

    let term = ui.filter.search.term();
    let search = if term.is_empty() && !ui.search_mode {
        Line::from(Span::styled(
            "Search services by name or description... (/)",
            styles::text_muted(),
        ))
    } else {
        Line::from(Span::styled(term.to_string(), styles::text()))
    };
    let border = if ui.search_mode {
        styles::border_focused()
    } else {
        styles::border_subtle()
    };
    f.render_widget(
        Paragraph::new(search).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(" Search "),
        ),
        cols[1],
    );

    if ui.search_mode {
        let x = cols[1].x + 1 + term.chars().count() as u16;
        let y = cols[1].y + 1;
        f.set_cursor_position((x.min(cols[1].right().saturating_sub(2)), y));
    }
}

fn draw_tabs(f: &mut Frame, area: Rect, state: &DashboardState, ui: &UiState) {
    let counts = ui.filter.counts(&state.services);
    let titles: Vec<Line> = StatusTab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            Line::from(vec![
                Span::styled(format!("{} ", i + 1), styles::key_hint()),
                Span::raw(format!("{} ({})", tab.label(), counts.get(*tab))),
            ])
        })
        .collect();

    let selected = StatusTab::ALL
        .iter()
        .position(|t| *t == ui.filter.tab)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(styles::tab(false))
        .highlight_style(styles::tab(true))
        .divider(Span::styled(" │ ", styles::text_muted()));
    f.render_widget(tabs, area);
}

fn draw_loading(f: &mut Frame, area: Rect, ui: &UiState) {
    let spinner = SPINNER[ui.frame % SPINNER.len()];
    let text = Paragraph::new(Line::from(vec![
        Span::styled(spinner, styles::accent()),
        Span::styled(" Loading services...", styles::text()),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(text, centered(area, 30, 1));
}

fn draw_error(f: &mut Frame, area: Rect, message: &str, ui: &UiState) {
    let retry = if ui.refresh_every.as_secs() > 0 {
        format!(
            "Retrying every {}. Press R to retry now.",
            format_period(ui.refresh_every.as_secs())
        )
    } else {
        "Press R to retry now.".to_string()
    };
    let body = vec![
        Line::from(vec![
            Span::styled("Error: ", styles::error_bold()),
            Span::styled(message.to_string(), styles::error()),
        ]),
        Line::from(""),
        Line::from(Span::styled(retry, styles::text_dim())),
    ];
    let banner = Paragraph::new(body).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::error())
            .title(" Backend unavailable "),
    );
    f.render_widget(banner, area);
}

fn actions_cell(service: &Service, working: bool) -> Line<'static> {
    if working {
        return Line::from(Span::styled("Working...", styles::warn()));
    }
    let mut spans = Vec::new();
    for action in service.available_actions() {
        if !spans.is_empty() {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(format!("[{}]", action_key(*action)), styles::key_hint()));
        spans.push(Span::styled(action.label(), styles::text()));
    }
    Line::from(spans)
}

fn draw_table(
    f: &mut Frame,
    area: Rect,
    state: &DashboardState,
    ui: &mut UiState,
    visible: &[&Service],
) {
    let header = Row::new(vec!["Service", "Description", "Status", "State", "Actions"])
        .style(styles::section_header());

    let rows: Vec<Row> = visible
        .iter()
        .map(|service| {
            let status_style = styles::status(service.status);
            Row::new(vec![
                Cell::from(Line::from(vec![
                    Span::styled(styles::status_icon(service.status), status_style),
                    Span::raw(" "),
                    Span::styled(service.name.clone(), styles::text()),
                ])),
                Cell::from(Span::styled(service.description.clone(), styles::text_dim())),
                Cell::from(Span::styled(service.status.as_str(), status_style)),
                Cell::from(Span::styled(
                    format!("{} / {}", service.active_state, service.sub_state),
                    styles::text_muted(),
                )),
                Cell::from(actions_cell(service, state.is_in_flight(&service.name))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(24),
        Constraint::Percentage(32),
        Constraint::Length(9),
        Constraint::Percentage(16),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_subtle())
                .title(format!(" Services ({}) ", ui.filter.label())),
        )
        .row_highlight_style(styles::selection())
        .highlight_symbol("▸ ");

    f.render_stateful_widget(table, area, &mut ui.table);
}

fn draw_footer(f: &mut Frame, area: Rect, state: &DashboardState) {
    let totals = state.totals();
    let line = Line::from(vec![
        Span::styled(format!(" Total: {}", totals.all), styles::text()),
        Span::raw("  "),
        Span::styled(format!("Active: {}", totals.active), styles::success()),
        Span::raw("  "),
        Span::styled(format!("Inactive: {}", totals.inactive), styles::text_muted()),
        Span::raw("  "),
        Span::styled(format!("Failed: {}", totals.failed), styles::error()),
        Span::raw("    "),
        Span::styled("?", styles::key_hint()),
        Span::styled(" help  ", styles::text_dim()),
        Span::styled("q", styles::key_hint()),
        Span::styled(" quit", styles::text_dim()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_toast(f: &mut Frame, area: Rect, notification: &Notification) {
    let width = (notification.message.chars().count() as u16 + 4)
        .clamp(24, 60)
        .min(area.width.saturating_sub(2));
    let rect = Rect {
        x: area.right().saturating_sub(width + 1),
        y: area.y + 1,
        width,
        height: 3u16.min(area.height),
    };

    let style = styles::notification(notification.kind);
    let title = if notification.is_error() { " Error " } else { " Done " };

    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(Span::styled(notification.message.clone(), style)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(title)
                .title_bottom(Line::from(" Esc ").right_aligned()),
        ),
        rect,
    );
}

fn hint(key: &'static str, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::key_hint()),
        Span::styled(text, styles::text()),
    ])
}

fn draw_help(f: &mut Frame, area: Rect) {
    let rect = centered(area, 50, 22);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_focused())
        .title(" Help - Press ? or Esc to close ");
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let lines = vec![
        Line::from(Span::styled("NAVIGATION", styles::section_header())),
        hint("j/k ↑/↓", "Move selection"),
        hint("g/G", "First / last service"),
        hint("Tab", "Next status tab (Shift-Tab back)"),
        hint("1-4", "All / Active / Inactive / Failed"),
        hint("/", "Search (Enter keep, Esc clear)"),
        Line::from(""),
        Line::from(Span::styled("ACTIONS", styles::section_header())),
        hint("s", "Start selected service"),
        hint("x", "Stop selected service"),
        hint("r", "Restart selected service"),
        hint("R / F5", "Refresh now"),
        hint("p", "Pause / resume auto-refresh"),
        Line::from(""),
        Line::from(Span::styled("OTHER", styles::section_header())),
        hint("Esc", "Dismiss notification"),
        hint("?", "Toggle this help"),
        hint("q", "Quit"),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}
