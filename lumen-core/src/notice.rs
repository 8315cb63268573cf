//! Transient user-facing notices ("toasts").

use serde::Serialize;
use std::sync::{Arc, Mutex};

use crate::error::LumenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: Option<String>,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            level: NoticeLevel::Info,
        }
    }

    pub fn title_only(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            level: NoticeLevel::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            level: NoticeLevel::Destructive,
        }
    }

    /// Notice for a failed operation; validation errors keep their own title.
    pub fn from_error(title: &str, error: &LumenError) -> Self {
        match error {
            LumenError::Validation { title, description } => {
                Self::destructive(title.clone(), description.clone())
            }
            LumenError::Unsupported(message) => Self::destructive("Not supported", message.clone()),
            other => Self::destructive(title, other.user_message()),
        }
    }
}

pub trait NoticeSink: Send + Sync {
    fn push(&self, notice: Notice);
}

/// Collects notices in memory until drained.
#[derive(Debug, Clone, Default)]
pub struct NoticeBuffer {
    inner: Arc<Mutex<Vec<Notice>>>,
}

impl NoticeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        self.inner
            .lock()
            .map(|mut notices| std::mem::take(&mut *notices))
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.inner
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }
}

impl NoticeSink for NoticeBuffer {
    fn push(&self, notice: Notice) {
        if let Ok(mut notices) = self.inner.lock() {
            notices.push(notice);
        }
    }
}

/// Handle widgets use to report outcomes.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NoticeSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NoticeSink>) -> Self {
        Self { sink }
    }

    pub fn push(&self, notice: Notice) {
        self.sink.push(notice);
    }

    /// Pushes a destructive notice for `Err` and hands the result back unchanged.
    pub fn report<T>(&self, title: &str, result: Result<T, LumenError>) -> Result<T, LumenError> {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "{}", title);
            self.push(Notice::from_error(title, e));
        }
        result
    }
}
