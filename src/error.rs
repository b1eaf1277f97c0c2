use std::fmt::{Display, Formatter};

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type Result<T> = std::result::Result<T, DynError>;

/// Attach a lazily built context string to any error result.
pub trait Context<T> {
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

#[derive(Debug)]
pub struct WithContextError {
    pub context: String,
    pub source: DynError,
}

impl Display for WithContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl std::error::Error for WithContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            Box::new(WithContextError {
                context: f(),
                source: e.into(),
            }) as DynError
        })
    }
}

/// Where an API call went wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Connection refused, DNS failure, timeout, broken body stream.
    Transport,
    /// Non-2xx status code.
    Status(u16),
    /// 2xx response carrying `success: false`.
    Application,
    /// Response body was not the JSON shape we expected.
    Decode,
}

/// Failure of a single request against the book API.
///
/// Transport and application failures are folded into one type so the
/// workflows only ever surface one message to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// Server-provided message, when the server sent one.
    pub message: Option<String>,
}

impl ApiError {
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            message: Some(detail.into()),
        }
    }

    pub fn status(code: u16, message: Option<String>) -> Self {
        Self {
            kind: ApiErrorKind::Status(code),
            message,
        }
    }

    pub fn application(message: Option<String>) -> Self {
        Self {
            kind: ApiErrorKind::Application,
            message,
        }
    }

    pub fn decode(detail: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            message: Some(detail.into()),
        }
    }

    /// Message to show the user: the server's own words for status and
    /// application failures, `fallback` for anything without a usable message.
    pub fn user_message(&self, fallback: &str) -> String {
        match (&self.kind, self.message.as_deref().map(str::trim)) {
            (ApiErrorKind::Status(_) | ApiErrorKind::Application, Some(m)) if !m.is_empty() => {
                m.to_string()
            }
            _ => fallback.to_string(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let msg = self.message.as_deref().unwrap_or("no message");
        match self.kind {
            ApiErrorKind::Transport => write!(f, "transport error: {msg}"),
            ApiErrorKind::Status(code) => write!(f, "HTTP {code}: {msg}"),
            ApiErrorKind::Application => write!(f, "request rejected: {msg}"),
            ApiErrorKind::Decode => write!(f, "unexpected response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
