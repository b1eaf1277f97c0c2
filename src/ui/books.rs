//! Main screen: header with auth controls, search line, statistics and
//! the book grid.
//!
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::app::keymap::KeyAction;
use crate::app::{AppState, GridView, InputMode};

fn bordered<'a>(title: &'a str, app: &AppState) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border))
}

/// Title, login state and the add/login/logout entry points.
pub fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let auth = app.auth_view();
    let key = |a: KeyAction| app.keymap.keys_for(a).first().cloned().unwrap_or_default();

    let mut spans = vec![
        Span::styled("Book Manager", Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD)),
        Span::raw("   "),
        Span::styled(auth.status_label, Style::default().fg(app.theme.text)),
        Span::raw("   "),
    ];
    if auth.show_login {
        spans.push(Span::raw(format!("[{}] Login  ", key(KeyAction::ToggleLogin))));
    }
    if auth.show_logout {
        spans.push(Span::raw(format!("[{}] Logout  ", key(KeyAction::ToggleLogin))));
    }
    let add_style = if auth.add_enabled {
        Style::default().fg(app.theme.header_fg)
    } else {
        Style::default().fg(app.theme.muted).add_modifier(Modifier::CROSSED_OUT)
    };
    spans.push(Span::styled(format!("[{}] Add book", key(KeyAction::NewBook)), add_style));
    if let Some(hint) = auth.add_hint {
        spans.push(Span::styled(format!("  ({hint})"), Style::default().fg(app.theme.muted)));
    }

    let p = Paragraph::new(Line::from(spans))
        .block(bordered("book-manager", app))
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, area);
}

pub fn render_search(f: &mut Frame, area: Rect, app: &AppState) {
    let focused = app.input_mode == InputMode::Search;
    let text = if app.search_query.is_empty() && !focused {
        Line::from(Span::styled(
            "Search by title or author...",
            Style::default().fg(app.theme.muted),
        ))
    } else {
        let cursor = if focused { "_" } else { "" };
        Line::from(format!("{}{}", app.search_query, cursor))
    };
    let border = if focused { app.theme.highlight_fg } else { app.theme.border };
    let p = Paragraph::new(text).block(
        Block::default()
            .title("Search")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);
}

pub fn render_stats(f: &mut Frame, area: Rect, app: &AppState) {
    let s = app.stats;
    let text = format!("Books: {}   Authors: {}   Avg year: {}", s.total, s.authors, s.avg_year);
    let p = Paragraph::new(text)
        .style(Style::default().fg(app.theme.text))
        .block(bordered("Stats", app));
    f.render_widget(p, area);
}

/// Book table with the selection cursor, or the loading/empty placeholder.
pub fn render_grid(f: &mut Frame, area: Rect, app: &mut AppState) {
    let cards = match app.grid() {
        GridView::Loading => {
            let p = Paragraph::new("Loading books...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(app.theme.muted))
                .block(bordered("Books", app));
            f.render_widget(p, area);
            return;
        }
        GridView::Empty => {
            let msg = if app.books.is_empty() {
                "No books found. Add your first book to get started."
            } else {
                "No books match your search."
            };
            let p = Paragraph::new(msg)
                .alignment(Alignment::Center)
                .style(Style::default().fg(app.theme.muted))
                .block(bordered("Books", app));
            f.render_widget(p, area);
            return;
        }
        GridView::Cards(cards) => cards,
    };

    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }
    let start = (app.selected_index / app.rows_per_page) * app.rows_per_page;
    let end = (start + app.rows_per_page).min(cards.len());

    let rows = cards[start..end].iter().enumerate().map(|(i, c)| {
        let style = if start + i == app.selected_index {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Row::new(vec![
            Cell::from(c.title.clone()),
            Cell::from(c.author.clone()),
            Cell::from(c.year.to_string()),
        ])
        .style(style)
    });

    let widths = [Constraint::Percentage(50), Constraint::Percentage(35), Constraint::Length(6)];
    let header = Row::new(vec!["TITLE", "AUTHOR", "YEAR"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));
    let title = format!("Books ({}/{})", app.visible.len(), app.books.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .column_spacing(1);
    f.render_widget(table, area);
}
