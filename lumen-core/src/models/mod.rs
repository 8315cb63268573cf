pub mod calendar;
pub mod chat;
pub mod file;
pub mod identity;
pub mod notification;

pub use calendar::{CalendarEvent, NewCalendarEvent};
pub use chat::{ChatMessage, ChatRole};
pub use file::{FileRecord, NewFileRecord};
pub use identity::Identity;
pub use notification::Notification;

use serde::de::DeserializeOwned;

/// Sort applied to every `select` of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub column: &'static str,
    pub ascending: bool,
}

impl Ordering {
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            ascending: true,
        }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            ascending: false,
        }
    }
}

/// A row type stored in one backend table and always listed in one fixed order.
pub trait Record: DeserializeOwned + Clone + Send + Sync {
    const TABLE: &'static str;
    const ORDER: Ordering;

    fn id(&self) -> &str;
}
