//! Dashboard widgets. Each one owns its in-memory state and reloads it from
//! the backend after every successful mutation.

pub mod calendar;
pub mod chatbot;
pub mod files;
pub mod graph;
pub mod notifications;
pub mod summarizer;
pub mod translator;

pub use calendar::Calendar;
pub use chatbot::{Chatbot, ListenState};
pub use files::FileManager;
pub use graph::{GraphGenerator, GraphPreview};
pub use notifications::Notifications;
pub use summarizer::Summarizer;
pub use translator::{TargetLanguage, Translator};

use bytes::Bytes;
use std::path::Path;

use crate::backend::fetch_all;
use crate::context::AppContext;
use crate::error::LumenError;
use crate::models::Record;

/// Rows of one table as of the last successful reload.
#[derive(Debug, Clone)]
pub struct RecordList<R: Record> {
    rows: Vec<R>,
    loading: bool,
}

impl<R: Record> Default for RecordList<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            loading: false,
        }
    }
}

impl<R: Record> RecordList<R> {
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn find(&self, id: &str) -> Option<&R> {
        self.rows.iter().find(|row| row.id() == id)
    }

    /// Replaces the rows with a fresh select. On failure the previous rows stay
    /// and the error is reported under `error_title`.
    pub async fn reload(&mut self, ctx: &AppContext, error_title: &str) -> Result<(), LumenError> {
        self.loading = true;
        let result = fetch_all::<R>(ctx.backend()).await.map_err(LumenError::from);
        self.loading = false;

        let rows = ctx.notifier().report(error_title, result)?;
        tracing::debug!(table = R::TABLE, rows = rows.len(), "Reloaded");
        self.rows = rows;
        Ok(())
    }
}

/// A file picked by the user: its name and full contents.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn read(path: &Path) -> Result<Self, LumenError> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }
}
