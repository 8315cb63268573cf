use serde::{Deserialize, Serialize};

/// The signed-in user as reported by the backend's auth service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}
