//! Application state types and entry glue.
//!
//! Defines the explicit state owned by the controller (book cache, search,
//! selection slots, modals, session, notifications) together with the pure
//! derived views the UI draws from: statistics, the book grid, the auth
//! controls and the delete preview.
//!
pub mod controller;
pub mod keymap;
pub mod task;
pub mod update;

use std::collections::HashSet;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use crate::api::{Book, BookDraft};
use crate::config::Theme;
use crate::session::Session;
use crate::text::escape_text;

/// Inclusive publication year bounds accepted by the book form.
pub const MIN_YEAR: i32 = 1000;
pub const MAX_YEAR: i32 = 2024;

/// How long a notification stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(5);

/// Hint shown when the add-book entry point is disabled.
pub const LOGIN_HINT: &str = "Login to add a book";

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Modal,
}

/// Fields of the book form, in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormField {
    Title,
    Author,
    Year,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Author,
            FormField::Author => FormField::Year,
            FormField::Year => FormField::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::Year,
            FormField::Author => FormField::Title,
            FormField::Year => FormField::Author,
        }
    }
}

/// Text inputs of the create/edit dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub year: String,
    pub focus: FormField,
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            year: String::new(),
            focus: FormField::Title,
        }
    }
}

/// Reasons the book form is rejected before any request is made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormError {
    MissingFields,
    YearOutOfRange,
}

impl FormError {
    pub fn message(self) -> &'static str {
        match self {
            FormError::MissingFields => "Please fill in all fields",
            FormError::YearOutOfRange => "Publication year must be between 1000 and 2024",
        }
    }
}

impl BookForm {
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.judul.clone(),
            author: book.author.clone(),
            year: book.tahun_terbit.to_string(),
            focus: FormField::Title,
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Author => &mut self.author,
            FormField::Year => &mut self.year,
        }
    }

    /// Trim and check the inputs, producing the request payload.
    pub fn validate(&self) -> Result<BookDraft, FormError> {
        let judul = self.title.trim();
        let author = self.author.trim();
        // a zero or unparsable year counts as missing
        let year = self.year.trim().parse::<i32>().ok().filter(|y| *y != 0);
        let (false, false, Some(tahun_terbit)) = (judul.is_empty(), author.is_empty(), year) else {
            return Err(FormError::MissingFields);
        };
        if !(MIN_YEAR..=MAX_YEAR).contains(&tahun_terbit) {
            return Err(FormError::YearOutOfRange);
        }
        Ok(BookDraft {
            judul: judul.to_string(),
            author: author.to_string(),
            tahun_terbit,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            focus: LoginField::Username,
        }
    }
}

/// Modal dialogs. Only one is shown at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    /// Create when `AppState::editing` is empty, edit otherwise.
    BookForm(BookForm),
    DeleteConfirm,
    Login(LoginForm),
    Help { scroll: u16 },
}

/// The write currently in flight; at most one at a time.
///
/// Update and delete carry the book id so a late completion only closes
/// the dialog still showing that book.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update { id: String },
    Delete { id: String },
    Login,
    Logout,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Warning,
    Error,
}

/// Transient notification.
#[derive(Clone, Debug)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub created_at: Instant,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ServerStatus {
    Unknown,
    Healthy,
    Unreachable,
}

/// Summary numbers shown above the grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub authors: usize,
    pub avg_year: i64,
}

/// Count, distinct authors and rounded mean year. An empty list yields zeros.
pub fn compute_stats(books: &[Book]) -> Stats {
    if books.is_empty() {
        return Stats::default();
    }
    let authors = books.iter().map(|b| b.author.as_str()).collect::<HashSet<_>>().len();
    let sum: i64 = books.iter().map(|b| i64::from(b.tahun_terbit)).sum();
    let avg_year = (sum as f64 / books.len() as f64).round() as i64;
    Stats {
        total: books.len(),
        authors,
        avg_year,
    }
}

/// One row of the book grid, with server text already escaped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookCard {
    pub id: String,
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl BookCard {
    pub fn from_book(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: escape_text(&book.judul).into_owned(),
            author: escape_text(&book.author).into_owned(),
            year: book.tahun_terbit,
        }
    }
}

/// What the book area shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridView {
    Loading,
    /// Placeholder shown instead of the grid.
    Empty,
    Cards(Vec<BookCard>),
}

/// Build the grid for `list`: the empty placeholder or one card per book.
pub fn render_grid(list: &[Book]) -> GridView {
    if list.is_empty() {
        GridView::Empty
    } else {
        GridView::Cards(list.iter().map(BookCard::from_book).collect())
    }
}

/// State of the login/logout controls and the add-book entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthView {
    pub status_label: &'static str,
    pub show_login: bool,
    pub show_logout: bool,
    pub add_enabled: bool,
    pub add_hint: Option<&'static str>,
}

pub struct AppState {
    pub started_at: Instant,
    /// Last list fetched from the server.
    pub books: Vec<Book>,
    /// `books` filtered by `search_query`.
    pub visible: Vec<Book>,
    pub stats: Stats,
    pub loading: bool,
    pub search_query: String,
    pub input_mode: InputMode,
    pub selected_index: usize,
    pub rows_per_page: usize,
    pub modal: Option<ModalState>,
    pub editing: Option<Book>,
    pub deleting: Option<Book>,
    pub session: Session,
    pub toasts: Vec<Toast>,
    pub pending_write: Option<WriteKind>,
    pub server: ServerStatus,
    pub theme: Theme,
    pub keymap: keymap::Keymap,
    /// Screen area of the open modal, recorded while drawing.
    pub modal_area: Option<Rect>,
}

impl AppState {
    pub fn new(session: Session, theme: Theme, keymap: keymap::Keymap) -> Self {
        Self {
            started_at: Instant::now(),
            books: Vec::new(),
            visible: Vec::new(),
            stats: Stats::default(),
            loading: false,
            search_query: String::new(),
            input_mode: InputMode::Normal,
            selected_index: 0,
            rows_per_page: 10,
            modal: None,
            editing: None,
            deleting: None,
            session,
            toasts: Vec::new(),
            pending_write: None,
            server: ServerStatus::Unknown,
            theme,
            keymap,
            modal_area: None,
        }
    }

    pub fn grid(&self) -> GridView {
        if self.loading {
            GridView::Loading
        } else {
            render_grid(&self.visible)
        }
    }

    pub fn auth_view(&self) -> AuthView {
        let logged_in = self.session.is_logged_in();
        AuthView {
            status_label: if logged_in { "Logged in" } else { "Not logged in" },
            show_login: !logged_in,
            show_logout: logged_in,
            add_enabled: logged_in,
            add_hint: if logged_in { None } else { Some(LOGIN_HINT) },
        }
    }

    /// Escaped `(title, author, year)` of the book awaiting delete confirmation.
    pub fn delete_preview(&self) -> Option<(String, String, i32)> {
        self.deleting.as_ref().map(|b| {
            (
                escape_text(&b.judul).into_owned(),
                escape_text(&b.author).into_owned(),
                b.tahun_terbit,
            )
        })
    }

    pub fn selected_book(&self) -> Option<&Book> {
        self.visible.get(self.selected_index)
    }

    pub fn find_cached(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// A create or update is in flight.
    pub fn is_saving(&self) -> bool {
        matches!(self.pending_write, Some(WriteKind::Create | WriteKind::Update { .. }))
    }

    pub fn is_deleting(&self) -> bool {
        matches!(self.pending_write, Some(WriteKind::Delete { .. }))
    }

    pub fn is_logging_in(&self) -> bool {
        self.pending_write == Some(WriteKind::Login)
    }

    pub fn push_toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.toasts.push(Toast {
            kind,
            message: message.into(),
            created_at: Instant::now(),
        });
    }

    /// Drop notifications older than [`TOAST_TTL`].
    pub fn prune_toasts(&mut self, now: Instant) {
        self.toasts
            .retain(|t| now.saturating_duration_since(t.created_at) < TOAST_TTL);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Session::default(), Theme::mocha(), keymap::Keymap::default())
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
