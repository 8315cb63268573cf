use serde::Serialize;

use crate::backend::{fetch_all, AuthProvider, TableStore};
use crate::context::AppContext;
use crate::error::LumenError;
use crate::functions;
use crate::models::{ChatMessage, Record};
use crate::notice::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenState {
    #[default]
    Idle,
    Listening,
}

/// Conversation with the remote `chat` function. Turns live for as long as the
/// widget does; each exchange is also written to `chat_messages`.
pub struct Chatbot {
    ctx: AppContext,
    messages: Vec<ChatMessage>,
    input: String,
    loading: bool,
    listen_state: ListenState,
}

impl Chatbot {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            messages: Vec::new(),
            input: String::new(),
            loading: false,
            listen_state: ListenState::Idle,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn listen_state(&self) -> ListenState {
        self.listen_state
    }

    pub fn is_speaking(&self) -> bool {
        self.ctx.narrator().is_speaking()
    }

    /// Sends the current input. Blank input, or a request already in flight,
    /// is ignored and yields `Ok(None)`.
    pub async fn send(&mut self) -> Result<Option<ChatMessage>, LumenError> {
        if self.input.trim().is_empty() || self.loading {
            return Ok(None);
        }

        let text = std::mem::take(&mut self.input);
        self.messages.push(ChatMessage::user(text.clone()));
        self.loading = true;
        let result = self.exchange(&text).await;
        self.loading = false;

        self.ctx.notifier().report("Error", result).map(Some)
    }

    async fn exchange(&mut self, text: &str) -> Result<ChatMessage, LumenError> {
        let reply = functions::chat(self.ctx.backend(), text).await?;
        let assistant = ChatMessage::assistant(reply);
        self.messages.push(assistant.clone());

        if let Err(e) = self.ctx.narrator().speak(&assistant.content).await {
            tracing::debug!(error = %e, "Reply not spoken");
        }

        self.persist(text, &assistant).await?;
        Ok(assistant)
    }

    /// Stores the user turn, then the assistant turn. Skipped without a live session.
    async fn persist(&self, text: &str, assistant: &ChatMessage) -> Result<(), LumenError> {
        let Some(user) = self.ctx.backend().current_user().await? else {
            tracing::warn!("Session expired, chat turn not persisted");
            return Ok(());
        };

        let backend = self.ctx.backend();
        backend
            .insert(ChatMessage::TABLE, ChatMessage::user(text).to_row(&user.id))
            .await?;
        backend
            .insert(ChatMessage::TABLE, assistant.to_row(&user.id))
            .await?;
        Ok(())
    }

    /// Flips between idle and listening. Starting a session runs one recognition
    /// and replaces the input with the transcript.
    pub async fn toggle_listening(&mut self) -> Result<ListenState, LumenError> {
        if !self.ctx.speech_input().is_supported() {
            return self.ctx.notifier().report(
                "Not supported",
                Err(LumenError::Unsupported(
                    "Speech recognition is not supported in your environment".to_string(),
                )),
            );
        }

        if self.listen_state == ListenState::Listening {
            self.ctx.speech_input().stop().await;
            self.listen_state = ListenState::Idle;
            return Ok(self.listen_state);
        }

        self.listen_state = ListenState::Listening;
        let result = self.ctx.speech_input().recognize().await;
        self.listen_state = ListenState::Idle;

        match result {
            Ok(transcript) => {
                self.input = transcript;
                Ok(self.listen_state)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Speech recognition failed");
                self.ctx.notifier().push(Notice::destructive(
                    "Speech recognition error",
                    "Please try again",
                ));
                Err(e.into())
            }
        }
    }

    /// Cuts off the reply being read aloud, if any.
    pub async fn stop_speaking(&self) {
        self.ctx.narrator().stop().await;
    }

    /// Speaks `text`, cutting off whatever is currently playing.
    pub async fn speak(&self, text: &str) -> Result<(), LumenError> {
        let result = self.ctx.narrator().speak(text).await;
        self.ctx.notifier().report("Error", result)
    }

    /// Previously persisted turns, oldest first.
    pub async fn history(&self) -> Result<Vec<ChatMessage>, LumenError> {
        let result = fetch_all::<ChatMessage>(self.ctx.backend())
            .await
            .map_err(LumenError::from);
        self.ctx.notifier().report("Error loading history", result)
    }
}
