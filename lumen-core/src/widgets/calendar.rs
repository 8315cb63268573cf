use crate::backend::TableStore;
use crate::context::AppContext;
use crate::error::LumenError;
use crate::models::{CalendarEvent, NewCalendarEvent, Record};
use crate::notice::Notice;
use crate::widgets::RecordList;

pub struct Calendar {
    ctx: AppContext,
    events: RecordList<CalendarEvent>,
}

impl Calendar {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            events: RecordList::default(),
        }
    }

    /// Creates the widget and loads its events.
    pub async fn open(ctx: AppContext) -> Self {
        let mut calendar = Self::new(ctx);
        calendar.reload().await;
        calendar
    }

    /// Events ordered by `event_date`, earliest first.
    pub fn events(&self) -> &[CalendarEvent] {
        self.events.rows()
    }

    pub fn is_loading(&self) -> bool {
        self.events.is_loading()
    }

    pub async fn refresh(&mut self) -> Result<(), LumenError> {
        self.events.reload(&self.ctx, "Error loading events").await
    }

    pub async fn add_event(&mut self, draft: NewCalendarEvent) -> Result<(), LumenError> {
        if !draft.is_complete() {
            return self.ctx.notifier().report(
                "Missing information",
                Err(LumenError::validation(
                    "Missing information",
                    "Please fill in title and date",
                )),
            );
        }

        let result = self.insert(&draft).await;
        self.ctx.notifier().report("Error", result)?;

        self.ctx.notifier().push(Notice::info(
            "Event added! 📅",
            "Your event has been scheduled.",
        ));
        self.reload().await;
        Ok(())
    }

    pub async fn delete_event(&mut self, id: &str) -> Result<(), LumenError> {
        let result = self
            .ctx
            .backend()
            .delete(CalendarEvent::TABLE, id)
            .await
            .map_err(LumenError::from);
        self.ctx.notifier().report("Error", result)?;

        self.ctx.notifier().push(Notice::info(
            "Event deleted",
            "The event has been removed.",
        ));
        self.reload().await;
        Ok(())
    }

    async fn insert(&self, draft: &NewCalendarEvent) -> Result<(), LumenError> {
        let user = self.ctx.require_user().await?;
        self.ctx
            .backend()
            .insert(CalendarEvent::TABLE, draft.to_row(&user.id))
            .await?;
        tracing::info!(title = %draft.title, "Calendar event added");
        Ok(())
    }

    /// Failures are already reported as notices.
    async fn reload(&mut self) {
        let _ = self.refresh().await;
    }
}
