//! Collaborator contracts for the hosted backend.
//!
//! The dashboard never talks to a database directly: every read and write goes
//! through one of these traits. `HostedBackend` in `crate::hosted` implements
//! all four against a Supabase-compatible REST service; tests substitute an
//! in-memory fake.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Identity, Ordering, Record};

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Missing field `{0}` in response")]
    MissingField(&'static str),

    #[error("Missing API key")]
    MissingApiKey,
}

impl BackendError {
    /// The message a user should see, without the transport prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in identity, or `None` when the session is missing or expired.
    async fn current_user(&self) -> Result<Option<Identity>, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;
}

/// Row-level CRUD. Ownership filtering is the backend's job, not the caller's.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, table: &str, order: Ordering) -> Result<Vec<Value>, BackendError>;

    async fn insert(&self, table: &str, row: Value) -> Result<(), BackendError>;

    async fn update(&self, table: &str, id: &str, fields: Value) -> Result<(), BackendError>;

    async fn delete(&self, table: &str, id: &str) -> Result<(), BackendError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), BackendError>;

    async fn remove(&self, bucket: &str, path: &str) -> Result<(), BackendError>;
}

/// Named remote functions (`chat`, `summarize`, `translate`).
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke(&self, name: &str, body: Value) -> Result<Value, BackendError>;
}

/// Everything a dashboard needs from its backend.
pub trait Backend: AuthProvider + TableStore + BlobStore + FunctionInvoker {}

impl<T> Backend for T where T: AuthProvider + TableStore + BlobStore + FunctionInvoker {}

/// Selects `R::TABLE` in `R::ORDER` and decodes every row.
pub async fn fetch_all<R: Record>(store: &(impl TableStore + ?Sized)) -> Result<Vec<R>, BackendError> {
    let rows = store.select(R::TABLE, R::ORDER).await?;
    decode_rows(rows)
}

pub fn decode_rows<R: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<R>, BackendError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(BackendError::from))
        .collect()
}
