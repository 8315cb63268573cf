use serde::Serialize;

use crate::context::AppContext;
use crate::error::LumenError;
use crate::notice::Notice;

/// Result shown after a CSV upload. Analysis is not implemented; the preview
/// is always the same placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphPreview {
    pub kind: String,
    pub message: String,
}

impl GraphPreview {
    fn placeholder() -> Self {
        Self {
            kind: "scatter".to_string(),
            message: "Graph generation would be implemented here with actual ML analysis"
                .to_string(),
        }
    }
}

pub struct GraphGenerator {
    ctx: AppContext,
    processing: bool,
    preview: Option<GraphPreview>,
}

impl GraphGenerator {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            processing: false,
            preview: None,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn preview(&self) -> Option<&GraphPreview> {
        self.preview.as_ref()
    }

    pub async fn analyze(&mut self, file_name: &str) -> Result<&GraphPreview, LumenError> {
        if !file_name.ends_with(".csv") {
            let err = LumenError::validation("Invalid file type", "Please upload a CSV file");
            self.ctx.notifier().push(Notice::from_error("Invalid file type", &err));
            return Err(err);
        }

        self.processing = true;
        let result = self.run(file_name).await;
        self.processing = false;

        let preview = self.ctx.notifier().report("Error", result)?;
        Ok(self.preview.insert(preview))
    }

    async fn run(&self, file_name: &str) -> Result<GraphPreview, LumenError> {
        self.ctx.require_user().await?;

        self.ctx.notifier().push(Notice::info(
            "Processing CSV...",
            "Analyzing your data and generating graphs.",
        ));
        tracing::info!(file = file_name, "CSV accepted for analysis");

        let preview = GraphPreview::placeholder();
        self.ctx.notifier().push(Notice::info(
            "Analysis complete! 📊",
            "Your graphs have been generated.",
        ));
        Ok(preview)
    }
}
