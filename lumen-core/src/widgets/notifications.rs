use crate::backend::TableStore;
use crate::context::AppContext;
use crate::error::LumenError;
use crate::models::{Notification, Record};
use crate::notice::Notice;
use crate::widgets::RecordList;

pub struct Notifications {
    ctx: AppContext,
    items: RecordList<Notification>,
}

impl Notifications {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            items: RecordList::default(),
        }
    }

    pub async fn open(ctx: AppContext) -> Self {
        let mut widget = Self::new(ctx);
        widget.reload().await;
        widget
    }

    /// Newest first.
    pub fn items(&self) -> &[Notification] {
        self.items.rows()
    }

    pub fn unread_count(&self) -> usize {
        self.items.rows().iter().filter(|n| !n.is_read).count()
    }

    pub fn is_loading(&self) -> bool {
        self.items.is_loading()
    }

    pub async fn refresh(&mut self) -> Result<(), LumenError> {
        self.items
            .reload(&self.ctx, "Error loading notifications")
            .await
    }

    pub async fn mark_read(&mut self, id: &str) -> Result<(), LumenError> {
        let result = self
            .ctx
            .backend()
            .update(
                Notification::TABLE,
                id,
                serde_json::json!({ "is_read": true }),
            )
            .await
            .map_err(LumenError::from);
        self.ctx.notifier().report("Error", result)?;

        self.reload().await;
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), LumenError> {
        let result = self
            .ctx
            .backend()
            .delete(Notification::TABLE, id)
            .await
            .map_err(LumenError::from);
        self.ctx.notifier().report("Error", result)?;

        self.reload().await;
        self.ctx
            .notifier()
            .push(Notice::title_only("Notification deleted"));
        Ok(())
    }

    /// Failures are already reported as notices.
    async fn reload(&mut self) {
        let _ = self.refresh().await;
    }
}
