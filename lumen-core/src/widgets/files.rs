use chrono::Utc;

use crate::backend::{fetch_all, BackendError, BlobStore, TableStore};
use crate::context::AppContext;
use crate::error::LumenError;
use crate::models::file::{content_type_for, extension, storage_path};
use crate::models::{FileRecord, NewFileRecord, Record};
use crate::notice::Notice;
use crate::widgets::{RecordList, SelectedFile};

/// Extensions offered by the upload picker.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "csv", "txt", "doc", "docx"];

pub struct FileManager {
    ctx: AppContext,
    files: RecordList<FileRecord>,
    uploading: bool,
}

impl FileManager {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            files: RecordList::default(),
            uploading: false,
        }
    }

    pub async fn open(ctx: AppContext) -> Self {
        let mut manager = Self::new(ctx);
        manager.reload().await;
        manager
    }

    /// Newest upload first.
    pub fn files(&self) -> &[FileRecord] {
        self.files.rows()
    }

    pub fn is_loading(&self) -> bool {
        self.files.is_loading()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub async fn refresh(&mut self) -> Result<(), LumenError> {
        self.files.reload(&self.ctx, "Error loading files").await
    }

    /// Stores the blob, records it in `files`, then reloads the list.
    pub async fn upload(&mut self, file: Option<SelectedFile>) -> Result<(), LumenError> {
        let Some(file) = file else {
            return self.ctx.notifier().report(
                "Upload error",
                Err(LumenError::validation("No file selected", "Please choose a file to upload")),
            );
        };

        let accepted = extension(&file.name)
            .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);
        if !accepted {
            return self.ctx.notifier().report(
                "Upload error",
                Err(LumenError::validation(
                    "Invalid file type",
                    "Please upload a PDF, CSV, TXT, DOC or DOCX file",
                )),
            );
        }

        self.uploading = true;
        let result = self.store(file).await;
        self.uploading = false;
        self.ctx.notifier().report("Upload error", result)?;

        self.ctx.notifier().push(Notice::info(
            "File uploaded! 📁",
            "Your file has been saved successfully.",
        ));
        self.reload().await;
        Ok(())
    }

    /// Removes the row, then the stored blob. A blob that cannot be removed is only logged.
    pub async fn delete(&mut self, id: &str) -> Result<(), LumenError> {
        let blob_path = self.blob_path(id).await;

        let result = self
            .ctx
            .backend()
            .delete(FileRecord::TABLE, id)
            .await
            .map_err(LumenError::from);
        self.ctx.notifier().report("Error", result)?;

        match blob_path {
            Some(path) => {
                if let Err(e) = self.ctx.backend().remove(self.ctx.bucket(), &path).await {
                    tracing::warn!(path = %path, error = %e, "Failed to remove stored blob");
                }
            }
            None => tracing::warn!(id = id, "No blob path known for file, blob left in storage"),
        }

        self.ctx
            .notifier()
            .push(Notice::info("File deleted", "The file has been removed."));
        self.reload().await;
        Ok(())
    }

    /// Blob key of file `id`, from the loaded list or, failing that, a fresh select.
    async fn blob_path(&self, id: &str) -> Option<String> {
        if let Some(file) = self.files.find(id) {
            return file.file_path.clone();
        }
        match fetch_all::<FileRecord>(self.ctx.backend()).await {
            Ok(files) => files
                .into_iter()
                .find(|f| f.id == id)
                .and_then(|f| f.file_path),
            Err(e) => {
                tracing::warn!(id = id, error = %e, "Could not look up blob path");
                None
            }
        }
    }

    async fn store(&self, file: SelectedFile) -> Result<(), LumenError> {
        let user = self.ctx.require_user().await?;
        let path = storage_path(&user.id, &file.name, Utc::now());
        let file_type = content_type_for(&file.name);

        self.ctx
            .backend()
            .upload(self.ctx.bucket(), &path, file.bytes, file_type)
            .await?;

        let record = NewFileRecord {
            user_id: user.id,
            filename: file.name,
            file_type: file_type.to_string(),
            file_path: path,
        };
        let row = serde_json::to_value(&record).map_err(BackendError::from)?;
        self.ctx.backend().insert(FileRecord::TABLE, row).await?;

        tracing::info!(filename = %record.filename, path = %record.file_path, "File uploaded");
        Ok(())
    }

    /// Failures are already reported as notices.
    async fn reload(&mut self) {
        let _ = self.refresh().await;
    }
}
