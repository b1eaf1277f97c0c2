//! Shared UI components (status bar, notifications, modal helpers).
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::{AppState, InputMode, ServerStatus, ToastKind};

/// Render the bottom status bar with mode, server state and counts.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Modal => "MODAL",
    };
    let server = match app.server {
        ServerStatus::Unknown => "server: ?",
        ServerStatus::Healthy => "server: healthy",
        ServerStatus::Unreachable => "server: unreachable",
    };
    let busy = if app.loading || app.pending_write.is_some() { "  working..." } else { "" };
    let msg = format!(
        "mode: {mode}  {server}  books:{}  shown:{}{busy}  | ?: help  q: quit",
        app.books.len(),
        app.visible.len(),
    );
    let p = Paragraph::new(msg).style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Stack live notifications in the lower right corner, newest at the bottom.
pub fn render_toasts(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 44u16.min(area.width);
    let mut bottom = area.y + area.height.saturating_sub(1);
    for toast in app.toasts.iter().rev() {
        let (color, label) = match toast.kind {
            ToastKind::Success => (app.theme.success, "ok"),
            ToastKind::Warning => (app.theme.warning, "warning"),
            ToastKind::Error => (app.theme.error, "error"),
        };
        let inner_w = width.saturating_sub(2).max(1) as usize;
        let lines = (toast.message.chars().count() / inner_w + 1) as u16;
        let height = lines + 2;
        if bottom < area.y + height {
            break;
        }
        let rect = Rect {
            x: area.x + area.width.saturating_sub(width),
            y: bottom - height,
            width,
            height,
        };
        let body = Line::from(Span::styled(
            crate::text::escape_text(&toast.message).into_owned(),
            Style::default().fg(color),
        ));
        let p = Paragraph::new(body).wrap(Wrap { trim: true }).block(
            Block::default()
                .title(label)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
        bottom -= height;
    }
}
