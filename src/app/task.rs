//! Network calls as values.
//!
//! Workflows never block on the server. They hand back an [`ApiRequest`],
//! an [`Executor`] runs it, and the resulting [`ApiOutcome`] is fed into
//! `Controller::apply`. The event loop uses the threaded [`Worker`]; tests
//! and batch callers use [`Inline`].
//!
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::api::{ApiClient, Book, BookDraft, Health};
use crate::error::ApiError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiTask {
    ListBooks,
    CreateBook(BookDraft),
    UpdateBook { id: String, draft: BookDraft },
    DeleteBook { id: String },
    Login { username: String, password: String },
    Logout,
    Health,
}

impl ApiTask {
    /// Short label for logs; never includes credentials.
    pub fn name(&self) -> &'static str {
        match self {
            ApiTask::ListBooks => "list_books",
            ApiTask::CreateBook(_) => "create_book",
            ApiTask::UpdateBook { .. } => "update_book",
            ApiTask::DeleteBook { .. } => "delete_book",
            ApiTask::Login { .. } => "login",
            ApiTask::Logout => "logout",
            ApiTask::Health => "health",
        }
    }
}

/// A task plus the bearer token captured when it was issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
    pub token: Option<String>,
    pub task: ApiTask,
}

impl ApiRequest {
    pub fn new(token: Option<&str>, task: ApiTask) -> Self {
        Self {
            token: token.map(str::to_string),
            task,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiOutcome {
    Listed(Result<Vec<Book>, ApiError>),
    Created(Result<Option<Book>, ApiError>),
    Updated(Result<(), ApiError>),
    Deleted(Result<(), ApiError>),
    LoggedIn(Result<String, ApiError>),
    LoggedOut(Result<(), ApiError>),
    Health(Result<Health, ApiError>),
}

/// Perform one request against `api`.
pub fn run_task(api: &dyn ApiClient, req: &ApiRequest) -> ApiOutcome {
    let token = req.token.as_deref();
    match &req.task {
        ApiTask::ListBooks => ApiOutcome::Listed(api.list_books(token)),
        ApiTask::CreateBook(draft) => ApiOutcome::Created(api.create_book(token, draft)),
        ApiTask::UpdateBook { id, draft } => ApiOutcome::Updated(api.update_book(token, id, draft)),
        ApiTask::DeleteBook { id } => ApiOutcome::Deleted(api.delete_book(token, id)),
        ApiTask::Login { username, password } => ApiOutcome::LoggedIn(api.login(username, password)),
        ApiTask::Logout => match token {
            Some(t) => ApiOutcome::LoggedOut(api.logout(t)),
            None => ApiOutcome::LoggedOut(Ok(())),
        },
        ApiTask::Health => ApiOutcome::Health(api.health()),
    }
}

/// Runs requests and hands back their outcomes.
pub trait Executor {
    fn submit(&mut self, req: ApiRequest);
    /// Next finished outcome, if any, without blocking.
    fn poll(&mut self) -> Option<ApiOutcome>;
}

/// Executes each request immediately on the calling thread.
pub struct Inline<A: ApiClient> {
    pub api: A,
    done: VecDeque<ApiOutcome>,
}

impl<A: ApiClient> Inline<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            done: VecDeque::new(),
        }
    }
}

impl<A: ApiClient> Executor for Inline<A> {
    fn submit(&mut self, req: ApiRequest) {
        let outcome = run_task(&self.api, &req);
        self.done.push_back(outcome);
    }

    fn poll(&mut self) -> Option<ApiOutcome> {
        self.done.pop_front()
    }
}

/// Background thread owning the API client; requests run in FIFO order.
///
/// Dropping the worker closes the request channel. A request already in
/// flight still runs to completion on the detached thread.
pub struct Worker {
    tx: Option<Sender<ApiRequest>>,
    rx: Receiver<ApiOutcome>,
}

impl Worker {
    pub fn spawn<A>(api: A) -> Self
    where
        A: ApiClient + Send + 'static,
    {
        let (req_tx, req_rx) = mpsc::channel::<ApiRequest>();
        let (out_tx, out_rx) = mpsc::channel::<ApiOutcome>();
        let spawned = std::thread::Builder::new()
            .name("api-worker".into())
            .spawn(move || {
                for req in req_rx {
                    let outcome = run_task(&api, &req);
                    if out_tx.send(outcome).is_err() {
                        break;
                    }
                }
                tracing::debug!("api worker stopped");
            });
        let tx = match spawned {
            Ok(_) => Some(req_tx),
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn api worker thread");
                None
            }
        };
        Self { tx, rx: out_rx }
    }
}

impl Executor for Worker {
    fn submit(&mut self, req: ApiRequest) {
        tracing::debug!(task = req.task.name(), "dispatch");
        let sent = self.tx.as_ref().map(|tx| tx.send(req).is_ok()).unwrap_or(false);
        if !sent {
            tracing::warn!("api worker is gone; request dropped");
        }
    }

    fn poll(&mut self) -> Option<ApiOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}
