//! Typed client for the notes REST backend.
//!
//! Every call resolves to one of three outcomes: the backend accepted the
//! request (`Success`), the backend understood it and declined
//! (`Rejected` with the status code), or the request never completed
//! (`BackendError`, the transport failure arm). Calls carry a bounded
//! timeout and are never retried here; retry policy belongs to the caller.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::draft::Draft;

/// A note as the backend owns it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tags: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for creating a note
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteCreate {
    pub title: String,
    pub content: String,
    pub tags: String,
}

impl NoteCreate {
    /// Builds the request body from a finished draft; `None` while any
    /// field is still missing.
    pub fn from_draft(draft: &Draft) -> Option<Self> {
        Some(Self {
            title: draft.title.clone()?,
            content: draft.content.clone()?,
            tags: draft.tags.clone()?,
        })
    }
}

/// Registered user as returned by the backend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Outcome of a call the backend answered
#[derive(Clone, Debug, PartialEq)]
pub enum ApiOutcome<T> {
    Success(T),
    Rejected(u16),
}

impl<T> ApiOutcome<T> {
    /// True when the backend declined for authorization reasons
    /// (bad or expired bearer token)
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiOutcome::Rejected(401))
    }
}

/// Transport-level failures: the request never got a backend verdict
#[derive(Debug, Clone)]
pub enum BackendError {
    /// Connection failed or was interrupted
    Transport(String),
    /// The bounded per-call timeout elapsed
    Timeout(String),
    /// The backend answered success but the body did not parse
    Decode(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Transport(msg) => write!(f, "Transport error: {msg}"),
            BackendError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            BackendError::Decode(msg) => write!(f, "Decode error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

/// HTTP client for the notes backend
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client with a bounded per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendError::from)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Register a new user. 200 carries the user body, 400 means the
    /// username is taken.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<ApiOutcome<UserProfile>, BackendError> {
        let response = self
            .http
            .post(format!("{}/users/", self.base_url))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        debug!(username, status = %response.status(), "register call answered");
        outcome(response).await
    }

    /// Exchange credentials for a bearer token. The backend speaks the
    /// OAuth2 password grant: form-encoded, token in `access_token`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<ApiOutcome<String>, BackendError> {
        let response = self
            .http
            .post(format!("{}/token/", self.base_url))
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await?;

        debug!(username, status = %response.status(), "authenticate call answered");
        Ok(match outcome::<TokenResponse>(response).await? {
            ApiOutcome::Success(body) => ApiOutcome::Success(body.access_token),
            ApiOutcome::Rejected(status) => ApiOutcome::Rejected(status),
        })
    }

    /// Create a note from a finished draft. 401 means the token is bad or
    /// expired.
    pub async fn create_note(
        &self,
        note: &NoteCreate,
        token: &str,
    ) -> Result<ApiOutcome<Note>, BackendError> {
        let response = self
            .http
            .post(format!("{}/notes/", self.base_url))
            .bearer_auth(token)
            .json(note)
            .send()
            .await?;

        debug!(status = %response.status(), "create_note call answered");
        outcome(response).await
    }

    /// List the authenticated user's notes
    pub async fn list_notes(&self, token: &str) -> Result<ApiOutcome<Vec<Note>>, BackendError> {
        let response = self
            .http
            .get(format!("{}/notes/", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        debug!(status = %response.status(), "list_notes call answered");
        outcome(response).await
    }

    /// Search notes by a single tag
    pub async fn search_notes_by_tag(
        &self,
        tag: &str,
        token: &str,
    ) -> Result<ApiOutcome<Vec<Note>>, BackendError> {
        let response = self
            .http
            .get(format!("{}/notes/tags/{}", self.base_url, tag))
            .bearer_auth(token)
            .send()
            .await?;

        debug!(tag, status = %response.status(), "search_notes_by_tag call answered");
        outcome(response).await
    }
}

async fn outcome<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<ApiOutcome<T>, BackendError> {
    let status = response.status();
    if status.is_success() {
        let payload = response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(ApiOutcome::Success(payload))
    } else {
        Ok(ApiOutcome::Rejected(status.as_u16()))
    }
}
