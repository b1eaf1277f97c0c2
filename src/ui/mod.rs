pub mod books;
pub mod components;
pub mod modals;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::{AppState, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let area = f.area();
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(root[1]);

    books::render_header(f, root[0], app);
    books::render_search(f, top[0], app);
    books::render_stats(f, top[1], app);
    books::render_grid(f, root[2], app);
    components::render_status_bar(f, root[3], app);

    app.modal_area = match app.modal.clone() {
        Some(ModalState::BookForm(form)) => Some(modals::render_book_form(f, area, app, &form)),
        Some(ModalState::DeleteConfirm) => Some(modals::render_delete_confirm(f, area, app)),
        Some(ModalState::Login(form)) => Some(modals::render_login(f, area, app, &form)),
        Some(ModalState::Help { scroll }) => Some(modals::render_help(f, area, app, scroll)),
        None => None,
    };

    components::render_toasts(f, area, app);
}
