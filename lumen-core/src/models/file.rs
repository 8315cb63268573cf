use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Ordering, Record};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileRecord {
    pub id: String,
    pub filename: String,
    pub file_type: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Blob key inside the storage bucket.
    #[serde(default)]
    pub file_path: Option<String>,
}

impl Record for FileRecord {
    const TABLE: &'static str = "files";
    const ORDER: Ordering = Ordering::desc("created_at");

    fn id(&self) -> &str {
        &self.id
    }
}

/// Row inserted after the blob upload succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct NewFileRecord {
    pub user_id: String,
    pub filename: String,
    pub file_type: String,
    pub file_path: String,
}

/// MIME type for the upload, derived from the file extension.
pub fn content_type_for(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("pdf") => "application/pdf",
        Some("csv") => "text/csv",
        Some("txt") => "text/plain",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

/// Lowercased text after the last `.`, if any.
pub fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Blob key `<user_id>/<unix_millis>.<ext>`; the timestamp keeps repeated uploads apart.
pub fn storage_path(user_id: &str, filename: &str, now: DateTime<Utc>) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => format!("{}/{}.{}", user_id, now.timestamp_millis(), ext),
        None => format!("{}/{}", user_id, now.timestamp_millis()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_storage_path_is_namespaced_by_user_and_time() {
        let now = Utc.timestamp_millis_opt(1_760_000_000_123).unwrap();
        assert_eq!(
            storage_path("user-1", "Report.Final.pdf", now),
            "user-1/1760000000123.pdf"
        );
        assert_eq!(storage_path("user-1", "Makefile", now), "user-1/1760000000123");
    }

    #[test]
    fn test_content_type_for_known_and_unknown() {
        assert_eq!(content_type_for("data.CSV"), "text/csv");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("paper.docx"), "application/vnd.openxmlformats-officedocument.wordprocessingml.document");
        assert_eq!(content_type_for("archive.tar.gz"), "application/octet-stream");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }
}
