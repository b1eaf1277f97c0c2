//! Blocking HTTP implementation of [`ApiClient`] on top of `ureq`.
//!
use std::time::Duration;

use serde::de::{DeserializeOwned, IgnoredAny};

use super::{ApiClient, Book, BookDraft, Envelope, Health, LoginRequest, LoginResponse};
use crate::error::ApiError;

pub struct HttpApiClient {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Server root: the API base with a trailing `/api` removed.
    fn origin(&self) -> &str {
        self.base_url.strip_suffix("/api").unwrap_or(&self.base_url)
    }

    fn request(&self, method: &str, path: &str, token: Option<&str>) -> ureq::Request {
        let req = self.agent.request(method, &self.url(path));
        match token {
            Some(t) if !t.is_empty() => req.set("Authorization", &format!("Bearer {t}")),
            _ => req,
        }
    }
}

/// Collapse a ureq result into `(status, body)`, keeping error bodies.
fn read_response(
    resp: Result<ureq::Response, ureq::Error>,
) -> Result<(u16, String), ApiError> {
    match resp {
        Ok(r) => {
            let status = r.status();
            let body = r
                .into_string()
                .map_err(|e| ApiError::transport(format!("reading body: {e}")))?;
            Ok((status, body))
        }
        Err(ureq::Error::Status(code, r)) => Ok((code, r.into_string().unwrap_or_default())),
        Err(ureq::Error::Transport(t)) => Err(ApiError::transport(t.to_string())),
    }
}

/// Best-effort `message` field from an error body.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Envelope<IgnoredAny>>(body)
        .ok()
        .and_then(|e| e.message)
}

fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<Envelope<T>, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::status(status, error_message(body)));
    }
    let env: Envelope<T> =
        serde_json::from_str(body).map_err(|e| ApiError::decode(e.to_string()))?;
    if !env.success {
        return Err(ApiError::application(env.message));
    }
    Ok(env)
}

impl ApiClient for HttpApiClient {
    fn list_books(&self, token: Option<&str>) -> Result<Vec<Book>, ApiError> {
        tracing::debug!(url = %self.url("/books"), "GET books");
        let (status, body) = read_response(self.request("GET", "/books", token).call())?;
        let env: Envelope<Vec<Book>> = decode_envelope(status, &body)?;
        Ok(env.data.unwrap_or_default())
    }

    fn create_book(&self, token: Option<&str>, draft: &BookDraft) -> Result<Option<Book>, ApiError> {
        tracing::debug!(title = %draft.judul, "POST books");
        let (status, body) =
            read_response(self.request("POST", "/books", token).send_json(draft))?;
        let env: Envelope<Book> = decode_envelope(status, &body)?;
        Ok(env.data)
    }

    fn update_book(&self, token: Option<&str>, id: &str, draft: &BookDraft) -> Result<(), ApiError> {
        tracing::debug!(%id, "PUT book");
        let path = format!("/books/{id}");
        let (status, body) = read_response(self.request("PUT", &path, token).send_json(draft))?;
        decode_envelope::<IgnoredAny>(status, &body).map(|_| ())
    }

    fn delete_book(&self, token: Option<&str>, id: &str) -> Result<(), ApiError> {
        tracing::debug!(%id, "DELETE book");
        let path = format!("/books/{id}");
        let (status, body) = read_response(self.request("DELETE", &path, token).call())?;
        decode_envelope::<IgnoredAny>(status, &body).map(|_| ())
    }

    fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        tracing::debug!(%username, "POST login");
        let payload = LoginRequest { username, password };
        let (status, body) = read_response(self.request("POST", "/login", None).send_json(&payload))?;
        if !(200..300).contains(&status) {
            return Err(ApiError::status(status, error_message(&body)));
        }
        let resp: LoginResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::decode(e.to_string()))?;
        if !resp.success {
            return Err(ApiError::application(resp.message));
        }
        match resp.token {
            Some(t) if !t.is_empty() => Ok(t),
            _ => Err(ApiError::decode("login response carried no token")),
        }
    }

    fn logout(&self, token: &str) -> Result<(), ApiError> {
        tracing::debug!("POST logout");
        let (status, body) = read_response(self.request("POST", "/logout", Some(token)).call())?;
        decode_envelope::<IgnoredAny>(status, &body).map(|_| ())
    }

    fn health(&self) -> Result<Health, ApiError> {
        let url = format!("{}/health", self.origin());
        tracing::debug!(%url, "GET health");
        let (status, body) = read_response(self.agent.get(&url).call())?;
        if !(200..300).contains(&status) {
            return Err(ApiError::status(status, None));
        }
        serde_json::from_str(&body).map_err(|e| ApiError::decode(e.to_string()))
    }
}
