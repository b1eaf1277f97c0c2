//! Modal dialogs: book form, delete confirmation, login and help.
//!
//! Each renderer draws over the main screen and returns the area it used so
//! mouse presses outside the dialog can be detected.
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::components::centered_rect;
use crate::app::keymap::KeyAction;
use crate::app::{AppState, BookForm, FormField, LoginField, LoginForm};

fn dialog<'a>(title: &'a str, app: &AppState) -> Block<'a> {
    Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border))
}

fn field_line<'a>(label: &'a str, value: String, focused: bool, app: &AppState) -> Line<'a> {
    let (marker, style) = if focused {
        ("> ", Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD))
    } else {
        ("  ", Style::default().fg(app.theme.text))
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{marker}{label:<8}"), style),
        Span::raw(format!("{value}{cursor}")),
    ])
}

fn button<'a>(label: &'a str, busy: bool, app: &AppState) -> Span<'a> {
    let style = if busy {
        Style::default().fg(app.theme.muted)
    } else {
        Style::default().fg(app.theme.success).add_modifier(Modifier::BOLD)
    };
    Span::styled(format!("[ {label} ]"), style)
}

/// "Add New Book" or "Edit Book", depending on the editing slot.
pub fn render_book_form(f: &mut Frame, area: Rect, app: &AppState, form: &BookForm) -> Rect {
    let rect = centered_rect(56, 10, area);
    let editing = app.editing.is_some();
    let title = if editing { "Edit Book" } else { "Add New Book" };
    let busy = app.is_saving();
    let submit = if busy {
        "Saving..."
    } else if editing {
        "Update Book"
    } else {
        "Save Book"
    };

    let lines = vec![
        Line::from(""),
        field_line("Title", form.title.clone(), form.focus == FormField::Title, app),
        field_line("Author", form.author.clone(), form.focus == FormField::Author, app),
        field_line("Year", form.year.clone(), form.focus == FormField::Year, app),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            button(submit, busy, app),
            Span::styled("  Enter: submit  Tab: next  Esc: cancel", Style::default().fg(app.theme.muted)),
        ]),
    ];
    f.render_widget(Clear, rect);
    f.render_widget(Paragraph::new(lines).block(dialog(title, app)), rect);
    rect
}

pub fn render_delete_confirm(f: &mut Frame, area: Rect, app: &AppState) -> Rect {
    let rect = centered_rect(56, 9, area);
    let busy = app.is_deleting();
    let mut lines = vec![Line::from("Are you sure you want to delete this book?"), Line::from("")];
    if let Some((title, author, year)) = app.delete_preview() {
        lines.push(Line::from(Span::styled(
            title,
            Style::default().fg(app.theme.text).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("by {author} ({year})")));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        button(if busy { "Deleting..." } else { "Delete" }, busy, app),
        Span::styled("  y/Enter: delete  n/Esc: cancel", Style::default().fg(app.theme.muted)),
    ]));
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(dialog("Delete Book", app)),
        rect,
    );
    rect
}

/// Login dialog; the password is masked.
pub fn render_login(f: &mut Frame, area: Rect, app: &AppState, form: &LoginForm) -> Rect {
    let rect = centered_rect(48, 9, area);
    let busy = app.is_logging_in();
    let masked = "*".repeat(form.password.chars().count());
    let lines = vec![
        Line::from(""),
        field_line("User", form.username.clone(), form.focus == LoginField::Username, app),
        field_line("Password", masked, form.focus == LoginField::Password, app),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            button(if busy { "Logging in..." } else { "Login" }, busy, app),
            Span::styled("  Enter: submit  Esc: cancel", Style::default().fg(app.theme.muted)),
        ]),
    ];
    f.render_widget(Clear, rect);
    f.render_widget(Paragraph::new(lines).block(dialog("Login", app)), rect);
    rect
}

const HELP_ENTRIES: &[(KeyAction, &str)] = &[
    (KeyAction::FocusSearch, "Focus the search field"),
    (KeyAction::NewBook, "Add a new book"),
    (KeyAction::EditSelection, "Edit the selected book"),
    (KeyAction::DeleteSelection, "Delete the selected book"),
    (KeyAction::ToggleLogin, "Login or logout"),
    (KeyAction::Refresh, "Reload the book list"),
    (KeyAction::MoveUp, "Move selection up"),
    (KeyAction::MoveDown, "Move selection down"),
    (KeyAction::PageUp, "Previous page"),
    (KeyAction::PageDown, "Next page"),
    (KeyAction::Cancel, "Close dialog or clear search"),
    (KeyAction::OpenHelp, "Toggle this help"),
    (KeyAction::Quit, "Quit"),
];

pub fn render_help(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) -> Rect {
    let rect = centered_rect(64, 18, area);
    let lines: Vec<Line> = HELP_ENTRIES
        .iter()
        .map(|(action, desc)| {
            let keys = app.keymap.keys_for(*action).join(", ");
            Line::from(vec![
                Span::styled(format!("{keys:<22}"), Style::default().fg(app.theme.highlight_fg)),
                Span::styled(*desc, Style::default().fg(app.theme.text)),
            ])
        })
        .collect();
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines)
            .scroll((scroll, 0))
            .block(dialog("Keybindings", app)),
        rect,
    );
    rect
}
