use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Ordering, Record};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for Notification {
    const TABLE: &'static str = "notifications";
    const ORDER: Ordering = Ordering::desc("created_at");

    fn id(&self) -> &str {
        &self.id
    }
}
