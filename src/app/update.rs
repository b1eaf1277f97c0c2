use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::time::{Duration, Instant};

use crate::app::controller::Controller;
use crate::app::keymap::KeyAction;
use crate::app::task::Executor;
use crate::app::{FormField, InputMode, LoginField, ModalState};
use crate::session::TokenStore;
use crate::ui;

/// Draw, pump finished requests and react to input until the user quits.
pub fn run_app<S: TokenStore>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ctrl: &mut Controller<S>,
    exec: &mut dyn Executor,
) -> Result<()> {
    for req in ctrl.start() {
        exec.submit(req);
    }

    loop {
        ctrl.pump(exec);
        ctrl.state.prune_toasts(Instant::now());

        terminal.draw(|f| {
            ui::render(f, &mut ctrl.state);
        })?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if !handle_key(ctrl, exec, key) {
                        break;
                    }
                }
                Event::Mouse(m) => handle_mouse(ctrl, m),
                _ => {}
            }
        }
    }

    tracing::info!(uptime_secs = ctrl.state.started_at.elapsed().as_secs(), "exiting");
    Ok(())
}

/// Route one key press. Returns `false` when the app should exit.
pub fn handle_key<S: TokenStore>(
    ctrl: &mut Controller<S>,
    exec: &mut dyn Executor,
    key: KeyEvent,
) -> bool {
    match ctrl.state.input_mode {
        InputMode::Normal => return handle_normal_key(ctrl, exec, key),
        InputMode::Search => {
            // Ctrl shortcuts stay live while typing a search term
            if key.modifiers.contains(KeyModifiers::CONTROL) && ctrl.state.keymap.resolve(&key).is_some() {
                ctrl.state.input_mode = InputMode::Normal;
                return handle_normal_key(ctrl, exec, key);
            }
            handle_search_key(ctrl, key)
        }
        InputMode::Modal => handle_modal_key(ctrl, exec, key),
    }
    true
}

fn handle_normal_key<S: TokenStore>(
    ctrl: &mut Controller<S>,
    exec: &mut dyn Executor,
    key: KeyEvent,
) -> bool {
    let Some(action) = ctrl.state.keymap.resolve(&key) else {
        return true;
    };
    match action {
        KeyAction::Quit => return false,
        KeyAction::FocusSearch => ctrl.focus_search(),
        KeyAction::NewBook => {
            ctrl.add_book();
        }
        KeyAction::EditSelection => {
            if let Some(id) = ctrl.state.selected_book().map(|b| b.id.clone()) {
                ctrl.open_edit(&id);
            }
        }
        KeyAction::DeleteSelection => {
            if let Some(id) = ctrl.state.selected_book().map(|b| b.id.clone()) {
                ctrl.open_delete(&id);
            }
        }
        KeyAction::ToggleLogin => {
            if ctrl.state.session.is_logged_in() {
                let req = ctrl.logout();
                ctrl.dispatch(exec, req);
            } else {
                ctrl.open_login();
            }
        }
        KeyAction::Refresh => {
            let req = ctrl.refresh();
            ctrl.dispatch(exec, Some(req));
        }
        KeyAction::OpenHelp => ctrl.toggle_help(),
        KeyAction::MoveUp => move_selection(ctrl, -1),
        KeyAction::MoveDown => move_selection(ctrl, 1),
        KeyAction::PageUp => {
            let rpp = ctrl.state.rows_per_page.max(1) as isize;
            move_selection(ctrl, -rpp);
        }
        KeyAction::PageDown => {
            let rpp = ctrl.state.rows_per_page.max(1) as isize;
            move_selection(ctrl, rpp);
        }
        KeyAction::Cancel => {}
    }
    true
}

fn move_selection<S: TokenStore>(ctrl: &mut Controller<S>, delta: isize) {
    let len = ctrl.state.visible.len();
    if len == 0 {
        ctrl.state.selected_index = 0;
        return;
    }
    let cur = ctrl.state.selected_index as isize;
    ctrl.state.selected_index = (cur + delta).clamp(0, len as isize - 1) as usize;
}

fn handle_search_key<S: TokenStore>(ctrl: &mut Controller<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            ctrl.set_search("");
            ctrl.state.input_mode = InputMode::Normal;
        }
        KeyCode::Enter | KeyCode::Down | KeyCode::Tab => {
            ctrl.state.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            let mut q = ctrl.state.search_query.clone();
            q.pop();
            ctrl.set_search(&q);
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let q = format!("{}{}", ctrl.state.search_query, c);
            ctrl.set_search(&q);
        }
        _ => {}
    }
}

fn handle_modal_key<S: TokenStore>(ctrl: &mut Controller<S>, exec: &mut dyn Executor, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        ctrl.close_modal();
        return;
    }
    match &mut ctrl.state.modal {
        Some(ModalState::BookForm(form)) => match key.code {
            KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(),
            KeyCode::Backspace => {
                form.field_mut(form.focus).pop();
            }
            KeyCode::Enter => {
                let req = ctrl.submit_form();
                ctrl.dispatch(exec, req);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                // the year field only takes digits
                if form.focus != FormField::Year || c.is_ascii_digit() {
                    form.field_mut(form.focus).push(c);
                }
            }
            _ => {}
        },
        Some(ModalState::DeleteConfirm) => match key.code {
            KeyCode::Enter | KeyCode::Char('y') => {
                let req = ctrl.confirm_delete();
                ctrl.dispatch(exec, req);
            }
            KeyCode::Char('n') => ctrl.close_delete(),
            _ => {}
        },
        Some(ModalState::Login(form)) => match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                form.focus = match form.focus {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                };
            }
            KeyCode::Backspace => match form.focus {
                LoginField::Username => {
                    form.username.pop();
                }
                LoginField::Password => {
                    form.password.pop();
                }
            },
            KeyCode::Enter => {
                let req = ctrl.submit_login();
                ctrl.dispatch(exec, req);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => match form.focus {
                LoginField::Username => form.username.push(c),
                LoginField::Password => form.password.push(c),
            },
            _ => {}
        },
        Some(ModalState::Help { scroll }) => match key.code {
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => ctrl.close_modal(),
            _ => {}
        },
        None => ctrl.state.input_mode = InputMode::Normal,
    }
}

/// A press outside the book or delete dialog closes it.
pub fn handle_mouse<S: TokenStore>(ctrl: &mut Controller<S>, m: MouseEvent) {
    if !matches!(m.kind, MouseEventKind::Down(_)) {
        return;
    }
    let closable = matches!(
        ctrl.state.modal,
        Some(ModalState::BookForm(_)) | Some(ModalState::DeleteConfirm) | Some(ModalState::Help { .. })
    );
    let Some(area) = ctrl.state.modal_area else {
        return;
    };
    let inside = m.column >= area.x
        && m.column < area.x.saturating_add(area.width)
        && m.row >= area.y
        && m.row < area.y.saturating_add(area.height);
    if closable && !inside {
        ctrl.close_modal();
    }
}
