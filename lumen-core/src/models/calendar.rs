use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Ordering, Record};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Stored as entered (`datetime-local` style), not normalized to UTC.
    pub event_date: String,
    pub created_at: DateTime<Utc>,
}

impl Record for CalendarEvent {
    const TABLE: &'static str = "calendar_events";
    const ORDER: Ordering = Ordering::asc("event_date");

    fn id(&self) -> &str {
        &self.id
    }
}

/// Draft for the "Add Event" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCalendarEvent {
    pub title: String,
    pub description: String,
    pub event_date: String,
}

impl NewCalendarEvent {
    pub fn new(title: impl Into<String>, event_date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            event_date: event_date.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.event_date.is_empty()
    }

    pub fn to_row(&self, user_id: &str) -> serde_json::Value {
        serde_json::json!({
            "user_id": user_id,
            "title": self.title,
            "description": self.description,
            "event_date": self.event_date,
        })
    }
}
