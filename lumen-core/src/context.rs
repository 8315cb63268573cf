//! Application context: the signed-in identity plus the collaborators every
//! widget talks to. Built once by `AppContext::resolve`, torn down on sign-out.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::backend::{AuthProvider, Backend};
use crate::error::LumenError;
use crate::models::Identity;
use crate::notice::{NoticeSink, Notifier};
use crate::speech::{Narrator, Silent, SpeechInput, SpeechOutput, Voice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Collaborators handed to `AppContext::resolve`.
pub struct Services {
    pub backend: Arc<dyn Backend>,
    pub notices: Arc<dyn NoticeSink>,
    pub speech_input: Arc<dyn SpeechInput>,
    pub speech_output: Arc<dyn SpeechOutput>,
    pub voice: Voice,
    pub bucket: String,
}

impl Services {
    /// Silent speech, default voice, bucket `documents`.
    pub fn new(backend: Arc<dyn Backend>, notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            backend,
            notices,
            speech_input: Arc::new(Silent),
            speech_output: Arc::new(Silent),
            voice: Voice::default(),
            bucket: "documents".to_string(),
        }
    }

    pub fn with_speech(
        mut self,
        input: Arc<dyn SpeechInput>,
        output: Arc<dyn SpeechOutput>,
    ) -> Self {
        self.speech_input = input;
        self.speech_output = output;
        self
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }
}

/// Outcome of start-up: either a ready context or a redirect to sign-in.
pub enum Launch {
    Ready(AppContext),
    SignIn,
}

#[derive(Clone)]
pub struct AppContext {
    identity: Identity,
    backend: Arc<dyn Backend>,
    notifier: Notifier,
    speech_input: Arc<dyn SpeechInput>,
    narrator: Narrator,
    bucket: String,
}

impl AppContext {
    /// Looks up the current session; no identity means the caller must sign in first.
    pub async fn resolve(services: Services) -> Result<Launch, LumenError> {
        let Some(identity) = services.backend.current_user().await? else {
            tracing::info!("No active session, sign-in required");
            return Ok(Launch::SignIn);
        };

        tracing::info!(user_id = %identity.id, "Session resolved");
        Ok(Launch::Ready(Self {
            identity,
            backend: services.backend,
            notifier: Notifier::new(services.notices),
            speech_input: services.speech_input,
            narrator: Narrator::new(services.speech_output, services.voice),
            bucket: services.bucket,
        }))
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    pub fn speech_input(&self) -> &dyn SpeechInput {
        self.speech_input.as_ref()
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Re-checks the live session before a write so rows are stamped with a current owner.
    pub async fn require_user(&self) -> Result<Identity, LumenError> {
        self.backend
            .current_user()
            .await?
            .ok_or(LumenError::NotAuthenticated)
    }
}
