// Integration tests for book-manager
// Workflows run headless: a recording mock ApiClient behind the Inline executor.

use std::cell::RefCell;

use book_manager::api::{ApiClient, Book, BookDraft, Health};
use book_manager::app::controller::Controller;
use book_manager::app::task::{ApiTask, Inline};
use book_manager::app::{AppState, InputMode, ModalState, ToastKind, WriteKind};
use book_manager::error::ApiError;
use book_manager::session::{MemoryTokenStore, Session, TokenStore};

fn mk_book(id: &str, judul: &str, author: &str, year: i32) -> Book {
    Book {
        id: id.into(),
        judul: judul.into(),
        author: author.into(),
        tahun_terbit: year,
    }
}

/// Canned server that records every call and the token it carried.
#[derive(Default)]
struct MockApi {
    books: RefCell<Vec<Book>>,
    calls: RefCell<Vec<(String, Option<String>)>>,
    fail_list: Option<ApiError>,
    fail_create: Option<ApiError>,
    fail_delete: Option<ApiError>,
    fail_login: Option<ApiError>,
    fail_logout: Option<ApiError>,
    login_token: String,
}

impl MockApi {
    fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: RefCell::new(books),
            login_token: "abc".into(),
            ..Default::default()
        }
    }

    fn record(&self, name: &str, token: Option<&str>) {
        self.calls
            .borrow_mut()
            .push((name.to_string(), token.map(str::to_string)));
    }

    fn names(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    fn count(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|(n, _)| n == name).count()
    }
}

impl ApiClient for MockApi {
    fn list_books(&self, token: Option<&str>) -> Result<Vec<Book>, ApiError> {
        self.record("list", token);
        match &self.fail_list {
            Some(e) => Err(e.clone()),
            None => Ok(self.books.borrow().clone()),
        }
    }

    fn create_book(&self, token: Option<&str>, draft: &BookDraft) -> Result<Option<Book>, ApiError> {
        self.record("create", token);
        if let Some(e) = &self.fail_create {
            return Err(e.clone());
        }
        let id = (self.books.borrow().len() + 1).to_string();
        let book = Book {
            id,
            judul: draft.judul.clone(),
            author: draft.author.clone(),
            tahun_terbit: draft.tahun_terbit,
        };
        self.books.borrow_mut().push(book.clone());
        Ok(Some(book))
    }

    fn update_book(&self, token: Option<&str>, id: &str, draft: &BookDraft) -> Result<(), ApiError> {
        self.record("update", token);
        for b in self.books.borrow_mut().iter_mut().filter(|b| b.id == id) {
            b.judul = draft.judul.clone();
            b.author = draft.author.clone();
            b.tahun_terbit = draft.tahun_terbit;
        }
        Ok(())
    }

    fn delete_book(&self, token: Option<&str>, id: &str) -> Result<(), ApiError> {
        self.record("delete", token);
        if let Some(e) = &self.fail_delete {
            return Err(e.clone());
        }
        self.books.borrow_mut().retain(|b| b.id != id);
        Ok(())
    }

    fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        self.record(&format!("login:{username}:{password}"), None);
        match &self.fail_login {
            Some(e) => Err(e.clone()),
            None => Ok(self.login_token.clone()),
        }
    }

    fn logout(&self, token: &str) -> Result<(), ApiError> {
        self.record("logout", Some(token));
        match &self.fail_logout {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn health(&self) -> Result<Health, ApiError> {
        self.record("health", None);
        Ok(Health {
            status: "healthy".into(),
            message: String::new(),
        })
    }
}

type Ctrl = Controller<MemoryTokenStore>;

fn setup(api: MockApi, store: MemoryTokenStore) -> (Ctrl, Inline<MockApi>) {
    let session = Session::restore(&store);
    let state = AppState::new(session, Default::default(), Default::default());
    let mut ctrl = Controller::new(state, store);
    let mut exec = Inline::new(api);
    for req in ctrl.start() {
        ctrl.dispatch(&mut exec, Some(req));
    }
    ctrl.pump(&mut exec);
    (ctrl, exec)
}

fn last_toast(ctrl: &Ctrl) -> (ToastKind, String) {
    let t = ctrl.state.toasts.last().expect("a toast");
    (t.kind, t.message.clone())
}

fn fill_form(ctrl: &mut Ctrl, title: &str, author: &str, year: &str) {
    let form = ctrl.form_mut().expect("book form open");
    form.title = title.into();
    form.author = author.into();
    form.year = year.into();
}

// 1) Startup probes health and loads the list
#[test]
fn startup_loads_books_and_checks_health() {
    let api = MockApi::with_books(vec![mk_book("1", "Dune", "Herbert", 1965)]);
    let (ctrl, exec) = setup(api, MemoryTokenStore::default());
    assert_eq!(exec.api.names(), vec!["health", "list"]);
    assert_eq!(ctrl.state.books.len(), 1);
    assert_eq!(ctrl.state.visible.len(), 1);
    assert_eq!(ctrl.state.stats.total, 1);
    assert_eq!(ctrl.state.stats.avg_year, 1965);
    assert!(!ctrl.state.loading);
    assert_eq!(ctrl.state.server, book_manager::app::ServerStatus::Healthy);
    // logged out: no bearer on the list call
    assert_eq!(exec.api.calls.borrow()[1].1, None);
}

// 2) Failed list degrades to an empty cache and an error toast
#[test]
fn failed_list_shows_empty_state_and_toast() {
    let mut api = MockApi::with_books(vec![mk_book("1", "Dune", "Herbert", 1965)]);
    api.fail_list = Some(ApiError::transport("connection refused"));
    let (ctrl, _exec) = setup(api, MemoryTokenStore::default());
    assert!(ctrl.state.books.is_empty());
    assert!(!ctrl.state.loading);
    assert_eq!(ctrl.state.grid(), book_manager::app::GridView::Empty);
    assert_eq!(last_toast(&ctrl), (ToastKind::Error, "Failed to load books".to_string()));
}

// 3) Search over the cache
#[test]
fn search_dune_and_xyz() {
    let api = MockApi::with_books(vec![mk_book("1", "Dune", "Herbert", 1965)]);
    let (mut ctrl, exec) = setup(api, MemoryTokenStore::default());
    ctrl.set_search("dune");
    assert_eq!(ctrl.state.visible, vec![mk_book("1", "Dune", "Herbert", 1965)]);
    ctrl.set_search("xyz");
    assert!(ctrl.state.visible.is_empty());
    assert_eq!(ctrl.state.books.len(), 1);
    ctrl.set_search("");
    assert_eq!(ctrl.state.visible.len(), 1);
    // filtering never calls the server
    assert_eq!(exec.api.count("list"), 1);
}

// 4) Year validation happens before any request
#[test]
fn year_999_rejected_locally_and_2024_accepted() {
    let (mut ctrl, mut exec) = setup(MockApi::with_books(vec![]), MemoryTokenStore::with_token("tok"));
    assert!(ctrl.add_book());
    fill_form(&mut ctrl, "Old", "Someone", "999");
    let req = ctrl.submit_form();
    assert!(req.is_none());
    assert_eq!(
        last_toast(&ctrl),
        (ToastKind::Warning, "Publication year must be between 1000 and 2024".to_string())
    );
    assert!(matches!(ctrl.state.modal, Some(ModalState::BookForm(_))));
    assert_eq!(ctrl.state.pending_write, None);
    assert_eq!(exec.api.count("create"), 0);

    fill_form(&mut ctrl, "New", "Someone", "2024");
    let req = ctrl.submit_form();
    assert!(matches!(req.as_ref().map(|r| &r.task), Some(ApiTask::CreateBook(_))));
    ctrl.dispatch(&mut exec, req);
    ctrl.pump(&mut exec);
    assert_eq!(exec.api.count("create"), 1);
    assert_eq!(ctrl.state.modal, None);
    assert_eq!(ctrl.state.input_mode, InputMode::Normal);
    assert_eq!(last_toast(&ctrl), (ToastKind::Success, "Book created successfully!".to_string()));
    assert_eq!(ctrl.state.books.len(), 1);
    assert_eq!(exec.api.calls.borrow().last().map(|c| c.1.clone()), Some(Some("tok".to_string())));
}

// 5) Server-side rejection keeps the form open with the server's message
#[test]
fn duplicate_title_keeps_modal_open() {
    let mut api = MockApi::with_books(vec![]);
    api.fail_create = Some(ApiError::application(Some("duplicate title".into())));
    let (mut ctrl, mut exec) = setup(api, MemoryTokenStore::with_token("tok"));
    ctrl.add_book();
    fill_form(&mut ctrl, "Dune", "Herbert", "1965");
    let req = ctrl.submit_form();
    ctrl.dispatch(&mut exec, req);
    ctrl.pump(&mut exec);
    assert!(matches!(ctrl.state.modal, Some(ModalState::BookForm(_))));
    assert_eq!(last_toast(&ctrl), (ToastKind::Error, "duplicate title".to_string()));
    assert_eq!(ctrl.state.pending_write, None);
    // no refresh after a failed write
    assert_eq!(exec.api.count("list"), 1);
}

// 6) Edit pre-fills and updates by id
#[test]
fn edit_updates_cached_book() {
    let api = MockApi::with_books(vec![mk_book("7", "Dune", "Herbert", 1965)]);
    let (mut ctrl, mut exec) = setup(api, MemoryTokenStore::with_token("tok"));
    assert!(!ctrl.open_edit("missing"));
    assert_eq!(ctrl.state.modal, None);
    assert!(ctrl.open_edit("7"));
    let form = ctrl.form_mut().unwrap();
    assert_eq!((form.title.as_str(), form.author.as_str(), form.year.as_str()), ("Dune", "Herbert", "1965"));
    form.title = "Dune Messiah".into();
    form.year = "1969".into();
    let req = ctrl.submit_form();
    ctrl.dispatch(&mut exec, req);
    ctrl.pump(&mut exec);
    assert_eq!(ctrl.state.books[0].judul, "Dune Messiah");
    assert_eq!(ctrl.state.editing, None);
    assert_eq!(last_toast(&ctrl), (ToastKind::Success, "Book updated successfully!".to_string()));
}

// 7) Delete confirm success and failure
#[test]
fn delete_confirm_then_refresh() {
    let api = MockApi::with_books(vec![mk_book("1", "Dune", "Herbert", 1965), mk_book("2", "Emma", "Austen", 1815)]);
    let (mut ctrl, mut exec) = setup(api, MemoryTokenStore::with_token("tok"));
    assert!(ctrl.open_delete("2"));
    assert_eq!(ctrl.state.delete_preview(), Some(("Emma".into(), "Austen".into(), 1815)));
    let req = ctrl.confirm_delete();
    ctrl.dispatch(&mut exec, req);
    ctrl.pump(&mut exec);
    assert_eq!(ctrl.state.books.len(), 1);
    assert_eq!(ctrl.state.deleting, None);
    assert_eq!(ctrl.state.modal, None);
    assert_eq!(last_toast(&ctrl), (ToastKind::Success, "Book deleted successfully!".to_string()));
}

#[test]
fn failed_delete_leaves_dialog_open() {
    let mut api = MockApi::with_books(vec![mk_book("1", "Dune", "Herbert", 1965)]);
    api.fail_delete = Some(ApiError::transport("timed out"));
    let (mut ctrl, mut exec) = setup(api, MemoryTokenStore::with_token("tok"));
    ctrl.open_delete("1");
    let req = ctrl.confirm_delete();
    ctrl.dispatch(&mut exec, req);
    ctrl.pump(&mut exec);
    assert_eq!(ctrl.state.modal, Some(ModalState::DeleteConfirm));
    assert_eq!(last_toast(&ctrl), (ToastKind::Error, "Failed to delete book".to_string()));
    ctrl.close_delete();
    assert_eq!(ctrl.state.deleting, None);
    assert_eq!(exec.api.count("delete"), 1);
}

// 8) Login persists the token and refreshes
#[test]
fn login_abc_persists_and_enables_add() {
    let (mut ctrl, mut exec) = setup(MockApi::with_books(vec![]), MemoryTokenStore::default());
    assert!(!ctrl.state.auth_view().add_enabled);
    ctrl.open_login();
    {
        let form = ctrl.login_mut().unwrap();
        form.username = "  admin ".into();
        form.password = "secret ".into();
    }
    let req = ctrl.submit_login();
    assert!(ctrl.state.is_logging_in());
    ctrl.dispatch(&mut exec, req);
    ctrl.pump(&mut exec);

    assert_eq!(ctrl.store().load().as_deref(), Some("abc"));
    assert_eq!(ctrl.state.session.token(), Some("abc"));
    assert!(ctrl.state.auth_view().add_enabled);
    assert_eq!(ctrl.state.modal, None);
    assert_eq!(last_toast(&ctrl), (ToastKind::Success, "Login successful".to_string()));
    let names = exec.api.names();
    assert_eq!(names[2], "login:admin:secret");
    assert_eq!(names[3], "list");
    assert_eq!(exec.api.calls.borrow()[3].1.as_deref(), Some("abc"));
}

#[test]
fn failed_login_keeps_dialog_with_server_message() {
    let mut api = MockApi::with_books(vec![]);
    api.fail_login = Some(ApiError::status(401, Some("Invalid credentials".into())));
    let (mut ctrl, mut exec) = setup(api, MemoryTokenStore::default());
    ctrl.open_login();
    let req = ctrl.submit_login();
    ctrl.dispatch(&mut exec, req);
    ctrl.pump(&mut exec);
    assert!(matches!(ctrl.state.modal, Some(ModalState::Login(_))));
    assert_eq!(last_toast(&ctrl), (ToastKind::Error, "Invalid credentials".to_string()));
    assert!(!ctrl.state.session.is_logged_in());
    assert_eq!(ctrl.state.pending_write, None);
}

// 9) Logout clears locally even when the server call fails
#[test]
fn logout_with_network_error_still_clears_token() {
    let mut api = MockApi::with_books(vec![]);
    api.fail_logout = Some(ApiError::transport("network unreachable"));
    let (mut ctrl, mut exec) = setup(api, MemoryTokenStore::with_token("abc"));
    assert!(ctrl.state.session.is_logged_in());
    let toasts_before = ctrl.state.toasts.len();
    let req = ctrl.logout();
    assert!(req.is_some());
    ctrl.dispatch(&mut exec, req);
    ctrl.pump(&mut exec);
    assert!(!ctrl.state.session.is_logged_in());
    assert_eq!(ctrl.store().load(), None);
    let v = ctrl.state.auth_view();
    assert!(v.show_login && !v.show_logout && !v.add_enabled);
    // swallowed: no notification
    assert_eq!(ctrl.state.toasts.len(), toasts_before);
    assert_eq!(exec.api.count("logout"), 1);
    assert_eq!(exec.api.names().last().map(String::as_str), Some("list"));
}

#[test]
fn logout_without_token_skips_server() {
    let (mut ctrl, mut exec) = setup(MockApi::with_books(vec![]), MemoryTokenStore::default());
    let req = ctrl.logout().unwrap();
    assert_eq!(req.task, ApiTask::ListBooks);
    ctrl.dispatch(&mut exec, Some(req));
    ctrl.pump(&mut exec);
    assert_eq!(exec.api.count("logout"), 0);
}

// 10) Only one write in flight at a time
#[test]
fn second_submit_while_saving_is_ignored() {
    let (mut ctrl, _exec) = setup(MockApi::with_books(vec![]), MemoryTokenStore::with_token("tok"));
    ctrl.add_book();
    fill_form(&mut ctrl, "A", "B", "2000");
    assert!(ctrl.submit_form().is_some());
    assert_eq!(ctrl.state.pending_write, Some(WriteKind::Create));
    assert!(ctrl.state.is_saving());
    assert!(ctrl.submit_form().is_none());
}

#[test]
fn add_book_is_gated_when_logged_out() {
    let (mut ctrl, _exec) = setup(MockApi::with_books(vec![]), MemoryTokenStore::default());
    assert!(!ctrl.add_book());
    assert_eq!(ctrl.state.modal, None);
    assert_eq!(last_toast(&ctrl), (ToastKind::Warning, "Login to add a book".to_string()));
}

// 11) Keyboard routing
#[test]
fn keyboard_shortcuts_drive_the_controller() {
    use book_manager::app::update::handle_key;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    let key = |code, mods| KeyEvent::new(code, mods);
    let (mut ctrl, mut exec) = setup(
        MockApi::with_books(vec![mk_book("1", "Dune", "Herbert", 1965)]),
        MemoryTokenStore::with_token("tok"),
    );

    assert!(handle_key(&mut ctrl, &mut exec, key(KeyCode::Char('k'), KeyModifiers::CONTROL)));
    assert_eq!(ctrl.state.input_mode, InputMode::Search);
    for c in "DUNE".chars() {
        handle_key(&mut ctrl, &mut exec, key(KeyCode::Char(c), KeyModifiers::NONE));
    }
    assert_eq!(ctrl.state.search_query, "DUNE");
    assert_eq!(ctrl.state.visible.len(), 1);
    handle_key(&mut ctrl, &mut exec, key(KeyCode::Esc, KeyModifiers::NONE));
    assert_eq!(ctrl.state.input_mode, InputMode::Normal);
    assert_eq!(ctrl.state.search_query, "");

    handle_key(&mut ctrl, &mut exec, key(KeyCode::Char('n'), KeyModifiers::CONTROL));
    assert!(matches!(ctrl.state.modal, Some(ModalState::BookForm(_))));
    // year field accepts digits only
    for code in [KeyCode::Tab, KeyCode::Tab, KeyCode::Char('x'), KeyCode::Char('1')] {
        handle_key(&mut ctrl, &mut exec, key(code, KeyModifiers::NONE));
    }
    assert_eq!(ctrl.form_mut().unwrap().year, "1");
    handle_key(&mut ctrl, &mut exec, key(KeyCode::Esc, KeyModifiers::NONE));
    assert_eq!(ctrl.state.modal, None);
    assert_eq!(ctrl.state.editing, None);

    assert!(!handle_key(&mut ctrl, &mut exec, key(KeyCode::Char('q'), KeyModifiers::NONE)));
}

#[test]
fn late_success_after_close_still_refreshes() {
    use book_manager::app::task::Executor;

    let (mut ctrl, mut exec) = setup(MockApi::with_books(vec![]), MemoryTokenStore::with_token("tok"));
    ctrl.add_book();
    fill_form(&mut ctrl, "A", "B", "2000");
    let req = ctrl.submit_form().unwrap();
    ctrl.close_form();
    ctrl.open_login();
    exec.submit(req);
    ctrl.pump(&mut exec);
    // the unrelated dialog stays open
    assert!(matches!(ctrl.state.modal, Some(ModalState::Login(_))));
    assert_eq!(ctrl.state.books.len(), 1);
}

#[test]
fn late_update_leaves_form_for_other_book_alone() {
    use book_manager::app::task::Executor;

    let api = MockApi::with_books(vec![mk_book("1", "Dune", "Herbert", 1965), mk_book("2", "Emma", "Austen", 1815)]);
    let (mut ctrl, mut exec) = setup(api, MemoryTokenStore::with_token("tok"));
    ctrl.open_edit("1");
    let req = ctrl.submit_form().unwrap();
    assert_eq!(ctrl.state.pending_write, Some(WriteKind::Update { id: "1".into() }));
    ctrl.close_form();
    ctrl.open_edit("2");
    ctrl.form_mut().unwrap().title = "Emma (typed)".into();

    exec.submit(req);
    ctrl.pump(&mut exec);
    assert!(matches!(&ctrl.state.modal, Some(ModalState::BookForm(f)) if f.title == "Emma (typed)"));
    assert_eq!(ctrl.state.editing.as_ref().map(|b| b.id.as_str()), Some("2"));
    assert_eq!(ctrl.state.pending_write, None);
    assert_eq!(last_toast(&ctrl), (ToastKind::Success, "Book updated successfully!".to_string()));
    assert_eq!(exec.api.count("list"), 2);
}

#[test]
fn late_delete_leaves_dialog_for_other_book_alone() {
    use book_manager::app::task::Executor;

    let api = MockApi::with_books(vec![mk_book("1", "Dune", "Herbert", 1965), mk_book("2", "Emma", "Austen", 1815)]);
    let (mut ctrl, mut exec) = setup(api, MemoryTokenStore::with_token("tok"));
    ctrl.open_delete("1");
    let req = ctrl.confirm_delete().unwrap();
    ctrl.close_delete();
    ctrl.open_delete("2");

    exec.submit(req);
    ctrl.pump(&mut exec);
    assert_eq!(ctrl.state.modal, Some(ModalState::DeleteConfirm));
    assert_eq!(ctrl.state.deleting.as_ref().map(|b| b.id.as_str()), Some("2"));
    assert_eq!(ctrl.state.books, vec![mk_book("2", "Emma", "Austen", 1815)]);
    assert_eq!(last_toast(&ctrl), (ToastKind::Success, "Book deleted successfully!".to_string()));
}

#[test]
fn logout_waits_for_in_flight_write() {
    use book_manager::app::task::Executor;

    let (mut ctrl, mut exec) = setup(MockApi::with_books(vec![]), MemoryTokenStore::with_token("tok"));
    ctrl.add_book();
    fill_form(&mut ctrl, "A", "B", "2000");
    let req = ctrl.submit_form().unwrap();
    ctrl.close_form();

    assert_eq!(ctrl.logout(), None);
    assert_eq!(ctrl.state.pending_write, Some(WriteKind::Create));
    assert!(ctrl.state.session.is_logged_in());

    exec.submit(req);
    ctrl.pump(&mut exec);
    assert_eq!(ctrl.state.pending_write, None);
    let req = ctrl.logout();
    assert!(matches!(req.as_ref().map(|r| &r.task), Some(ApiTask::Logout)));
    assert_eq!(ctrl.state.pending_write, Some(WriteKind::Logout));
    // a second logout while the first is in flight is refused
    assert_eq!(ctrl.logout(), None);
    ctrl.dispatch(&mut exec, req);
    ctrl.pump(&mut exec);
    assert_eq!(exec.api.count("logout"), 1);
    assert!(!ctrl.state.session.is_logged_in());
}

#[test]
fn ctrl_shortcuts_work_from_search_line() {
    use book_manager::app::update::handle_key;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    let (mut ctrl, mut exec) = setup(MockApi::with_books(vec![]), MemoryTokenStore::with_token("tok"));
    handle_key(&mut ctrl, &mut exec, KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL));
    handle_key(&mut ctrl, &mut exec, KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE));
    // Ctrl+K again keeps the search line focused without typing 'k'
    handle_key(&mut ctrl, &mut exec, KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL));
    assert_eq!(ctrl.state.input_mode, InputMode::Search);
    assert_eq!(ctrl.state.search_query, "d");

    handle_key(&mut ctrl, &mut exec, KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL));
    assert!(matches!(ctrl.state.modal, Some(ModalState::BookForm(_))));
    assert_eq!(ctrl.state.input_mode, InputMode::Modal);
    assert_eq!(ctrl.state.search_query, "d");
}

#[test]
fn press_outside_dialog_closes_it() {
    use book_manager::app::update::handle_mouse;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use ratatui::layout::Rect;

    let press = |column, row| MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    };
    let area = Rect { x: 10, y: 5, width: 20, height: 6 };
    let api = MockApi::with_books(vec![mk_book("1", "Dune", "Herbert", 1965)]);
    let (mut ctrl, _exec) = setup(api, MemoryTokenStore::with_token("tok"));

    ctrl.open_edit("1");
    ctrl.state.modal_area = Some(area);
    handle_mouse(&mut ctrl, press(12, 7));
    assert!(matches!(ctrl.state.modal, Some(ModalState::BookForm(_))));
    handle_mouse(&mut ctrl, press(29, 10));
    assert!(ctrl.state.modal.is_some());
    handle_mouse(&mut ctrl, press(30, 7));
    assert_eq!(ctrl.state.modal, None);
    assert_eq!(ctrl.state.editing, None);
    assert_eq!(ctrl.state.input_mode, InputMode::Normal);

    ctrl.open_delete("1");
    ctrl.state.modal_area = Some(area);
    handle_mouse(&mut ctrl, press(0, 0));
    assert_eq!(ctrl.state.modal, None);
    assert_eq!(ctrl.state.deleting, None);

    // login only closes with Esc
    ctrl.open_login();
    ctrl.state.modal_area = Some(area);
    handle_mouse(&mut ctrl, press(0, 0));
    assert!(matches!(ctrl.state.modal, Some(ModalState::Login(_))));
}

#[test]
fn delete_preview_escapes_control_characters() {
    let api = MockApi::with_books(vec![mk_book("1", "\u{1b}[2Jwipe", "Ann\u{7}", 1999)]);
    let (mut ctrl, _exec) = setup(api, MemoryTokenStore::with_token("tok"));
    assert!(ctrl.open_delete("1"));
    let (title, author, year) = ctrl.state.delete_preview().unwrap();
    assert_eq!(title, "\\u{1b}[2Jwipe");
    assert_eq!(author, "Ann\\u{7}");
    assert_eq!(year, 1999);
    assert!(!title.contains('\u{1b}'));
}

// 12) HTTP client against a loopback stub
mod http_stub {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::time::Duration;

    use book_manager::api::{ApiClient, BookDraft, HttpApiClient};
    use book_manager::error::{ApiError, ApiErrorKind};

    /// Request line, headers (lowercased names) and body of one request.
    struct Seen {
        line: String,
        headers: Vec<(String, String)>,
        body: String,
    }

    impl Seen {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
        }
    }

    /// Serve one connection per canned `(status, body)` and report what was received.
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, mpsc::Receiver<Seen>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}/api", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            for (status, body) in responses {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let mut headers = Vec::new();
                loop {
                    let mut h = String::new();
                    reader.read_line(&mut h).unwrap();
                    let h = h.trim_end().to_string();
                    if h.is_empty() {
                        break;
                    }
                    if let Some((n, v)) = h.split_once(':') {
                        headers.push((n.trim().to_ascii_lowercase(), v.trim().to_string()));
                    }
                }
                let len = headers
                    .iter()
                    .find(|(n, _)| n == "content-length")
                    .and_then(|(_, v)| v.parse::<usize>().ok())
                    .unwrap_or(0);
                let mut buf = vec![0u8; len];
                reader.read_exact(&mut buf).unwrap();
                let mut stream = stream;
                write!(
                    stream,
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                )
                .unwrap();
                stream.flush().unwrap();
                tx.send(Seen {
                    line: line.trim_end().to_string(),
                    headers,
                    body: String::from_utf8_lossy(&buf).into_owned(),
                })
                .unwrap();
            }
        });
        (base, rx)
    }

    fn client(base: &str) -> HttpApiClient {
        HttpApiClient::new(base, Duration::from_secs(5))
    }

    #[test]
    fn list_sends_bearer_and_decodes_data() {
        let (base, rx) = serve(vec![(
            200,
            r#"{"success":true,"data":[{"id":"1","judul":"Dune","author":"Herbert","tahun_terbit":1965}]}"#,
        )]);
        let books = client(&base).list_books(Some("abc")).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].judul, "Dune");
        let seen = rx.recv().unwrap();
        assert_eq!(seen.line, "GET /api/books HTTP/1.1");
        assert_eq!(seen.header("authorization"), Some("Bearer abc"));
    }

    #[test]
    fn anonymous_list_omits_authorization() {
        let (base, rx) = serve(vec![(200, r#"{"success":true,"data":[]}"#)]);
        assert!(client(&base).list_books(None).unwrap().is_empty());
        assert_eq!(rx.recv().unwrap().header("authorization"), None);
    }

    #[test]
    fn create_posts_wire_fields_and_folds_application_failure() {
        let (base, rx) = serve(vec![(200, r#"{"success":false,"message":"duplicate title"}"#)]);
        let draft = BookDraft {
            judul: "Dune".into(),
            author: "Herbert".into(),
            tahun_terbit: 1965,
        };
        let err = client(&base).create_book(Some("t"), &draft).unwrap_err();
        assert_eq!(err, ApiError::application(Some("duplicate title".into())));
        let seen = rx.recv().unwrap();
        assert_eq!(seen.line, "POST /api/books HTTP/1.1");
        let body: serde_json::Value = serde_json::from_str(&seen.body).unwrap();
        assert_eq!(body["judul"], "Dune");
        assert_eq!(body["tahun_terbit"], 1965);
    }

    #[test]
    fn non_2xx_keeps_status_and_message() {
        let (base, rx) = serve(vec![(401, r#"{"success":false,"message":"Unauthorized"}"#)]);
        let err = client(&base).delete_book(Some("t"), "9").unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Status(401));
        assert_eq!(err.user_message("Failed to delete book"), "Unauthorized");
        assert_eq!(rx.recv().unwrap().line, "DELETE /api/books/9 HTTP/1.1");
    }

    #[test]
    fn login_returns_token() {
        let (base, rx) = serve(vec![(200, r#"{"success":true,"token":"abc"}"#)]);
        assert_eq!(client(&base).login("admin", "pw").unwrap(), "abc");
        let seen = rx.recv().unwrap();
        assert_eq!(seen.header("authorization"), None);
        assert!(seen.body.contains("\"username\":\"admin\""));
    }

    #[test]
    fn health_uses_server_root() {
        let (base, rx) = serve(vec![(200, r#"{"status":"healthy","message":"ok"}"#)]);
        assert!(client(&base).health().unwrap().is_healthy());
        assert_eq!(rx.recv().unwrap().line, "GET /health HTTP/1.1");
    }

    #[test]
    fn unreachable_server_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = client(&format!("http://{addr}/api")).list_books(None).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Transport);
        assert_eq!(err.user_message("Failed to load books"), "Failed to load books");
    }
}
