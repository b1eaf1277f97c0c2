//! Workflow logic: refresh, search, create/edit, delete and login/logout.
//!
//! Every operation is a method on [`Controller`]. Operations that talk to
//! the server return an [`ApiRequest`] rather than blocking; the executor's
//! [`ApiOutcome`] comes back through [`Controller::apply`].
//!
use tracing::{debug, info, warn};

use super::task::{ApiOutcome, ApiRequest, ApiTask, Executor};
use super::{
    AppState, BookForm, InputMode, LOGIN_HINT, LoginField, LoginForm, ModalState, ServerStatus,
    ToastKind, WriteKind, compute_stats,
};
use crate::error::ApiError;
use crate::search::apply_search;
use crate::session::TokenStore;

/// Owns the application state and the durable token store.
pub struct Controller<S: TokenStore> {
    pub state: AppState,
    store: S,
}

impl<S: TokenStore> Controller<S> {
    pub fn new(state: AppState, store: S) -> Self {
        Self { state, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn token(&self) -> Option<&str> {
        self.state.session.token()
    }

    /// Requests issued on startup: health probe and initial load.
    pub fn start(&mut self) -> Vec<ApiRequest> {
        vec![ApiRequest::new(None, ApiTask::Health), self.refresh()]
    }

    /// Show the loading indicator and ask for the full list.
    pub fn refresh(&mut self) -> ApiRequest {
        self.state.loading = true;
        ApiRequest::new(self.token(), ApiTask::ListBooks)
    }

    pub fn focus_search(&mut self) {
        self.state.input_mode = InputMode::Search;
    }

    pub fn set_search(&mut self, term: &str) {
        self.state.search_query = term.to_string();
        apply_search(&mut self.state);
    }

    fn show_modal(&mut self, modal: ModalState) {
        self.state.modal = Some(modal);
        self.state.input_mode = InputMode::Modal;
    }

    fn hide_modal(&mut self) {
        self.state.modal = None;
        self.state.modal_area = None;
        self.state.input_mode = InputMode::Normal;
    }

    // ---- create / edit ------------------------------------------------

    /// The add-book entry point; refused with a hint while logged out.
    pub fn add_book(&mut self) -> bool {
        if !self.state.auth_view().add_enabled {
            self.state.push_toast(ToastKind::Warning, LOGIN_HINT);
            return false;
        }
        self.open_create();
        true
    }

    pub fn open_create(&mut self) {
        self.state.editing = None;
        self.show_modal(ModalState::BookForm(BookForm::default()));
    }

    /// Open the form pre-filled with a cached book. No-op for unknown ids.
    pub fn open_edit(&mut self, id: &str) -> bool {
        let Some(book) = self.state.find_cached(id).cloned() else {
            debug!(%id, "edit requested for a book not in the cache");
            return false;
        };
        let form = BookForm::from_book(&book);
        self.state.editing = Some(book);
        self.show_modal(ModalState::BookForm(form));
        true
    }

    pub fn close_form(&mut self) {
        self.state.editing = None;
        if matches!(self.state.modal, Some(ModalState::BookForm(_))) {
            self.hide_modal();
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut BookForm> {
        match self.state.modal.as_mut() {
            Some(ModalState::BookForm(form)) => Some(form),
            _ => None,
        }
    }

    /// Validate the form and issue a create or update.
    pub fn submit_form(&mut self) -> Option<ApiRequest> {
        if self.state.pending_write.is_some() {
            return None;
        }
        let Some(ModalState::BookForm(form)) = &self.state.modal else {
            return None;
        };
        let draft = match form.validate() {
            Ok(d) => d,
            Err(e) => {
                self.state.push_toast(ToastKind::Warning, e.message());
                return None;
            }
        };
        let task = match &self.state.editing {
            Some(book) => {
                let id = book.id.clone();
                self.state.pending_write = Some(WriteKind::Update { id: id.clone() });
                ApiTask::UpdateBook { id, draft }
            }
            None => {
                self.state.pending_write = Some(WriteKind::Create);
                ApiTask::CreateBook(draft)
            }
        };
        Some(ApiRequest::new(self.token(), task))
    }

    // ---- delete -------------------------------------------------------

    pub fn open_delete(&mut self, id: &str) -> bool {
        let Some(book) = self.state.find_cached(id).cloned() else {
            debug!(%id, "delete requested for a book not in the cache");
            return false;
        };
        self.state.deleting = Some(book);
        self.show_modal(ModalState::DeleteConfirm);
        true
    }

    pub fn close_delete(&mut self) {
        self.state.deleting = None;
        if matches!(self.state.modal, Some(ModalState::DeleteConfirm)) {
            self.hide_modal();
        }
    }

    pub fn confirm_delete(&mut self) -> Option<ApiRequest> {
        if self.state.pending_write.is_some() {
            return None;
        }
        let id = self.state.deleting.as_ref()?.id.clone();
        self.state.pending_write = Some(WriteKind::Delete { id: id.clone() });
        Some(ApiRequest::new(self.token(), ApiTask::DeleteBook { id }))
    }

    // ---- auth ---------------------------------------------------------

    pub fn open_login(&mut self) {
        self.show_modal(ModalState::Login(LoginForm::default()));
    }

    pub fn close_login(&mut self) {
        if matches!(self.state.modal, Some(ModalState::Login(_))) {
            self.hide_modal();
        }
    }

    pub fn login_mut(&mut self) -> Option<&mut LoginForm> {
        match self.state.modal.as_mut() {
            Some(ModalState::Login(form)) => Some(form),
            _ => None,
        }
    }

    pub fn submit_login(&mut self) -> Option<ApiRequest> {
        if self.state.pending_write.is_some() {
            return None;
        }
        let Some(ModalState::Login(form)) = &self.state.modal else {
            return None;
        };
        let username = form.username.trim().to_string();
        let password = form.password.trim().to_string();
        self.state.pending_write = Some(WriteKind::Login);
        Some(ApiRequest::new(None, ApiTask::Login { username, password }))
    }

    /// Notify the server if a token is held; local state is cleared when the
    /// outcome arrives, whatever it is. Refused while another write is in
    /// flight.
    pub fn logout(&mut self) -> Option<ApiRequest> {
        if self.state.pending_write.is_some() {
            return None;
        }
        if self.token().is_some() {
            self.state.pending_write = Some(WriteKind::Logout);
            return Some(ApiRequest::new(self.token(), ApiTask::Logout));
        }
        self.clear_session();
        Some(self.refresh())
    }

    fn clear_session(&mut self) {
        self.state.session.clear();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not remove persisted token");
        }
    }

    /// Esc / outside click: close whichever modal is open.
    pub fn close_modal(&mut self) {
        match self.state.modal {
            Some(ModalState::BookForm(_)) => self.close_form(),
            Some(ModalState::DeleteConfirm) => self.close_delete(),
            Some(ModalState::Login(_)) => self.close_login(),
            Some(ModalState::Help { .. }) => self.hide_modal(),
            None => {}
        }
    }

    pub fn toggle_help(&mut self) {
        if matches!(self.state.modal, Some(ModalState::Help { .. })) {
            self.hide_modal();
        } else if self.state.modal.is_none() {
            self.show_modal(ModalState::Help { scroll: 0 });
        }
    }

    // ---- completions --------------------------------------------------

    /// Fold a finished request into the state. May return a follow-up
    /// request (the refresh after a successful write).
    pub fn apply(&mut self, outcome: ApiOutcome) -> Option<ApiRequest> {
        match outcome {
            ApiOutcome::Listed(result) => {
                let books = result.unwrap_or_else(|e| {
                    warn!(error = %e, "loading books failed");
                    self.state.push_toast(ToastKind::Error, "Failed to load books");
                    Vec::new()
                });
                info!(count = books.len(), "book list refreshed");
                self.state.stats = compute_stats(&books);
                self.state.books = books;
                apply_search(&mut self.state);
                self.state.loading = false;
                None
            }
            ApiOutcome::Created(result) => {
                self.finish_write(result.map(|_| ()), "Book created successfully!", "Failed to create book")
            }
            ApiOutcome::Updated(result) => {
                self.finish_write(result, "Book updated successfully!", "Failed to update book")
            }
            ApiOutcome::Deleted(result) => {
                let write = self.state.pending_write.take();
                match result {
                    Ok(()) => {
                        info!("book deleted");
                        if self.delete_targets(write.as_ref()) {
                            self.close_delete();
                        }
                        self.state.push_toast(ToastKind::Success, "Book deleted successfully!");
                        Some(self.refresh())
                    }
                    Err(e) => {
                        warn!(error = %e, "delete failed");
                        self.state.push_toast(ToastKind::Error, e.user_message("Failed to delete book"));
                        None
                    }
                }
            }
            ApiOutcome::LoggedIn(result) => {
                self.state.pending_write = None;
                match result {
                    Ok(token) => {
                        info!("login succeeded");
                        if let Err(e) = self.store.save(&token) {
                            warn!(error = %e, "could not persist token");
                        }
                        self.state.session.set(token);
                        self.close_login();
                        self.state.push_toast(ToastKind::Success, "Login successful");
                        Some(self.refresh())
                    }
                    Err(e) => {
                        warn!(error = %e, "login failed");
                        self.state.push_toast(ToastKind::Error, e.user_message("Login failed"));
                        if let Some(form) = self.login_mut() {
                            form.focus = LoginField::Password;
                        }
                        None
                    }
                }
            }
            ApiOutcome::LoggedOut(result) => {
                self.state.pending_write = None;
                if let Err(e) = result {
                    debug!(error = %e, "logout notification failed; clearing locally");
                }
                self.clear_session();
                info!("logged out");
                Some(self.refresh())
            }
            ApiOutcome::Health(result) => {
                self.state.server = match result {
                    Ok(h) if h.is_healthy() => ServerStatus::Healthy,
                    Ok(h) => {
                        warn!(status = %h.status, "server reports unhealthy");
                        ServerStatus::Unreachable
                    }
                    Err(e) => {
                        warn!(error = %e, "health check failed");
                        ServerStatus::Unreachable
                    }
                };
                None
            }
        }
    }

    /// The open book form is the one `write` was submitted from.
    fn form_targets(&self, write: Option<&WriteKind>) -> bool {
        if !matches!(self.state.modal, Some(ModalState::BookForm(_))) {
            return false;
        }
        match (write, &self.state.editing) {
            (Some(WriteKind::Create), None) => true,
            (Some(WriteKind::Update { id }), Some(book)) => book.id == *id,
            _ => false,
        }
    }

    fn delete_targets(&self, write: Option<&WriteKind>) -> bool {
        match (write, &self.state.deleting) {
            (Some(WriteKind::Delete { id }), Some(book)) => book.id == *id,
            _ => false,
        }
    }

    fn finish_write(
        &mut self,
        result: Result<(), ApiError>,
        success: &str,
        fallback: &str,
    ) -> Option<ApiRequest> {
        let write = self.state.pending_write.take();
        match result {
            Ok(()) => {
                info!("{success}");
                if self.form_targets(write.as_ref()) {
                    self.close_form();
                }
                self.state.push_toast(ToastKind::Success, success);
                Some(self.refresh())
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                self.state.push_toast(ToastKind::Error, e.user_message(fallback));
                None
            }
        }
    }

    // ---- execution ----------------------------------------------------

    pub fn dispatch(&mut self, exec: &mut dyn Executor, req: Option<ApiRequest>) {
        if let Some(r) = req {
            exec.submit(r);
        }
    }

    /// Apply every outcome the executor has ready, dispatching follow-ups.
    /// Returns how many outcomes were applied.
    pub fn pump(&mut self, exec: &mut dyn Executor) -> usize {
        let mut applied = 0;
        while let Some(outcome) = exec.poll() {
            applied += 1;
            let next = self.apply(outcome);
            self.dispatch(exec, next);
        }
        applied
    }
}
