use crate::context::AppContext;
use crate::error::LumenError;
use crate::functions;
use crate::models::file::content_type_for;
use crate::notice::Notice;
use crate::widgets::SelectedFile;

const PLAIN_TEXT: &str = "text/plain";

/// Document types accepted for upload; only plain text is read locally.
const ALLOWED_TYPES: &[&str] = &[
    PLAIN_TEXT,
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub struct Summarizer {
    ctx: AppContext,
    text: String,
    summary: String,
    uploaded_file_name: Option<String>,
    loading: bool,
}

impl Summarizer {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            text: String::new(),
            summary: String::new(),
            uploaded_file_name: None,
            loading: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn uploaded_file_name(&self) -> Option<&str> {
        self.uploaded_file_name.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Puts the contents of a plain-text file into the text field.
    pub fn load_file(&mut self, file: SelectedFile) -> Result<(), LumenError> {
        let file_type = content_type_for(&file.name);
        if !ALLOWED_TYPES.contains(&file_type) {
            return self.ctx.notifier().report(
                "Invalid file type",
                Err(LumenError::validation(
                    "Invalid file type",
                    "Please upload a TXT, PDF, or DOC file",
                )),
            );
        }

        self.uploaded_file_name = Some(file.name.clone());

        if file_type != PLAIN_TEXT {
            self.ctx.notifier().push(Notice::info(
                "Feature coming soon!",
                "PDF/DOC processing will be available soon. Please use TXT files or paste text directly.",
            ));
            return Err(LumenError::Unsupported(format!(
                "Text extraction from {} is not available",
                file_type
            )));
        }

        match String::from_utf8(file.bytes.to_vec()) {
            Ok(content) => {
                self.text = content;
                self.ctx.notifier().push(Notice::info(
                    "File loaded! 📄",
                    "Your text is ready to summarize.",
                ));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(file = %file.name, error = %e, "Text file is not valid UTF-8");
                self.ctx.notifier().push(Notice::destructive(
                    "Error reading file",
                    "The file is not valid UTF-8 text.",
                ));
                Err(LumenError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    e,
                )))
            }
        }
    }

    pub async fn summarize(&mut self) -> Result<&str, LumenError> {
        if self.text.trim().is_empty() {
            return self
                .ctx
                .notifier()
                .report(
                    "Empty input",
                    Err(LumenError::validation(
                        "Empty input",
                        "Please enter some text or upload a file to summarize",
                    )),
                )
                .map(|()| "");
        }

        self.loading = true;
        let result = functions::summarize(self.ctx.backend(), &self.text)
            .await
            .map_err(LumenError::from);
        self.loading = false;

        self.summary = self.ctx.notifier().report("Error", result)?;
        self.ctx.notifier().push(Notice::info(
            "Summary generated! ✨",
            "Your text has been summarized.",
        ));
        Ok(&self.summary)
    }

    /// Reads the summary aloud. Nothing to read is a no-op.
    pub async fn speak_result(&self) -> Result<(), LumenError> {
        if self.summary.is_empty() {
            return Ok(());
        }
        let result = self.ctx.narrator().speak(&self.summary).await;
        self.ctx.notifier().report("Error", result)
    }
}
