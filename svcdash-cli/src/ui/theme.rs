//! Color palette and style helpers for the dashboard

use ratatui::style::{Color, Modifier, Style};

use svcdash_core::model::ServiceStatus;
use svcdash_core::notify::NotificationKind;

/// Color palette tokens
#[derive(Clone, Debug)]
pub struct Palette {
    /// Panel border color
    pub panel_border: Color,
    /// Primary text color
    pub text: Color,
    /// Secondary info
    pub text_dim: Color,
    /// Tertiary info, disabled controls
    pub text_muted: Color,
    /// Highlights, focus
    pub accent: Color,
    /// Active units, success toasts
    pub success: Color,
    /// In-flight actions, paused polling
    pub warn: Color,
    /// Failed units, error banner, error toasts
    pub error: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub key_hint: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            panel_border: Color::Rgb(60, 60, 60),
            text: Color::Rgb(212, 212, 212),
            text_dim: Color::Rgb(150, 150, 150),
            text_muted: Color::Rgb(100, 100, 100),
            accent: Color::Rgb(79, 193, 255),
            success: Color::Rgb(78, 201, 176),
            warn: Color::Rgb(220, 180, 100),
            error: Color::Rgb(244, 135, 113),
            selection_bg: Color::Rgb(38, 79, 120),
            selection_fg: Color::White,
            key_hint: Color::Rgb(206, 145, 120),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Theme {
    pub palette: Palette,
}

impl Theme {
    pub fn status_style(&self, status: ServiceStatus) -> Style {
        let color = match status {
            ServiceStatus::Active => self.palette.success,
            ServiceStatus::Inactive => self.palette.text_muted,
            ServiceStatus::Failed => self.palette.error,
        };
        Style::default().fg(color)
    }

    pub fn status_icon(&self, status: ServiceStatus) -> &'static str {
        match status {
            ServiceStatus::Active => "●",
            ServiceStatus::Inactive => "○",
            ServiceStatus::Failed => "✗",
        }
    }

    pub fn notification_style(&self, kind: NotificationKind) -> Style {
        let color = match kind {
            NotificationKind::Success => self.palette.success,
            NotificationKind::Error => self.palette.error,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn tab_style(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.palette.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(self.palette.text_dim)
        }
    }

    pub fn selection_style(&self) -> Style {
        Style::default()
            .bg(self.palette.selection_bg)
            .fg(self.palette.selection_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn fg(&self, color: Color) -> Style {
        Style::default().fg(color)
    }

    pub fn bold(&self, color: Color) -> Style {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}

static DEFAULT_THEME: std::sync::OnceLock<Theme> = std::sync::OnceLock::new();

pub fn theme() -> &'static Theme {
    DEFAULT_THEME.get_or_init(Theme::default)
}

/// Shorthands over the default theme
pub mod styles {
    use super::*;

    pub fn status(status: ServiceStatus) -> Style {
        theme().status_style(status)
    }

    pub fn status_icon(status: ServiceStatus) -> &'static str {
        theme().status_icon(status)
    }

    pub fn notification(kind: NotificationKind) -> Style {
        theme().notification_style(kind)
    }

    pub fn tab(active: bool) -> Style {
        theme().tab_style(active)
    }

    pub fn selection() -> Style {
        theme().selection_style()
    }

    pub fn key_hint() -> Style {
        theme().fg(theme().palette.key_hint)
    }

    pub fn border_subtle() -> Style {
        theme().fg(theme().palette.panel_border)
    }

    pub fn border_focused() -> Style {
        theme().fg(theme().palette.accent)
    }

    pub fn text() -> Style {
        theme().fg(theme().palette.text)
    }

    pub fn text_dim() -> Style {
        theme().fg(theme().palette.text_dim)
    }

    pub fn text_muted() -> Style {
        theme().fg(theme().palette.text_muted)
    }

    pub fn accent() -> Style {
        theme().fg(theme().palette.accent)
    }

    pub fn accent_bold() -> Style {
        theme().bold(theme().palette.accent)
    }

    pub fn success() -> Style {
        theme().fg(theme().palette.success)
    }

    pub fn warn() -> Style {
        theme().fg(theme().palette.warn)
    }

    pub fn error() -> Style {
        theme().fg(theme().palette.error)
    }

    pub fn error_bold() -> Style {
        theme().bold(theme().palette.error)
    }

    pub fn title() -> Style {
        theme().bold(theme().palette.text)
    }

    pub fn section_header() -> Style {
        theme().bold(theme().palette.accent)
    }
}
