//! Typed boundary to the remote book API.
//!
//! Request and response bodies are explicit serde records; every call goes
//! through the [`ApiClient`] trait so the workflows can run against a mock.
//!
pub mod http;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub use http::HttpApiClient;

/// Default API root used when neither config nor CLI provide one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// A book as held by the server. Extra fields (timestamps) are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Book {
    pub id: String,
    pub judul: String,
    pub author: String,
    pub tahun_terbit: i32,
}

/// Payload for create and update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BookDraft {
    pub judul: String,
    pub author: String,
    pub tahun_terbit: i32,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Common `{success, message, data}` response wrapper.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Body of `GET /health`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Operations the UI needs from the server.
///
/// `token` is attached as `Authorization: Bearer <token>` when present.
pub trait ApiClient {
    fn list_books(&self, token: Option<&str>) -> Result<Vec<Book>, ApiError>;
    fn create_book(&self, token: Option<&str>, draft: &BookDraft) -> Result<Option<Book>, ApiError>;
    fn update_book(&self, token: Option<&str>, id: &str, draft: &BookDraft) -> Result<(), ApiError>;
    fn delete_book(&self, token: Option<&str>, id: &str) -> Result<(), ApiError>;
    fn login(&self, username: &str, password: &str) -> Result<String, ApiError>;
    fn logout(&self, token: &str) -> Result<(), ApiError>;
    fn health(&self) -> Result<Health, ApiError>;
}
