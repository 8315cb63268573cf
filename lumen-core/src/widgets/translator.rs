use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::context::AppContext;
use crate::error::LumenError;
use crate::functions;
use crate::notice::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    #[default]
    Es,
    Fr,
    De,
    It,
    Pt,
    Ja,
    Ko,
    Zh,
}

impl TargetLanguage {
    pub const ALL: [Self; 8] = [
        Self::Es,
        Self::Fr,
        Self::De,
        Self::It,
        Self::Pt,
        Self::Ja,
        Self::Ko,
        Self::Zh,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::Fr => "fr",
            Self::De => "de",
            Self::It => "it",
            Self::Pt => "pt",
            Self::Ja => "ja",
            Self::Ko => "ko",
            Self::Zh => "zh",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Es => "Spanish",
            Self::Fr => "French",
            Self::De => "German",
            Self::It => "Italian",
            Self::Pt => "Portuguese",
            Self::Ja => "Japanese",
            Self::Ko => "Korean",
            Self::Zh => "Chinese",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TargetLanguage {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == wanted || lang.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                LumenError::validation(
                    "Unknown language",
                    format!("No target language matches '{}'", s),
                )
            })
    }
}

pub struct Translator {
    ctx: AppContext,
    text: String,
    target: TargetLanguage,
    translation: String,
    loading: bool,
}

impl Translator {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            text: String::new(),
            target: TargetLanguage::default(),
            translation: String::new(),
            loading: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn target(&self) -> TargetLanguage {
        self.target
    }

    pub fn set_target(&mut self, target: TargetLanguage) {
        self.target = target;
    }

    /// Empty until a translation succeeds.
    pub fn translation(&self) -> &str {
        &self.translation
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub async fn translate(&mut self) -> Result<&str, LumenError> {
        if self.text.trim().is_empty() {
            return self
                .ctx
                .notifier()
                .report(
                    "Empty input",
                    Err(LumenError::validation(
                        "Empty input",
                        "Please enter some text to translate",
                    )),
                )
                .map(|()| "");
        }

        self.loading = true;
        let result = functions::translate(self.ctx.backend(), &self.text, self.target.code())
            .await
            .map_err(LumenError::from);
        self.loading = false;

        self.translation = self.ctx.notifier().report("Error", result)?;
        tracing::info!(language = self.target.code(), chars = self.text.len(), "Text translated");
        self.ctx.notifier().push(Notice::info(
            "Translation complete! 🌍",
            "Your text has been translated.",
        ));
        Ok(&self.translation)
    }

    /// Reads the translation aloud. Nothing to read is a no-op.
    pub async fn speak_result(&self) -> Result<(), LumenError> {
        if self.translation.is_empty() {
            return Ok(());
        }
        let result = self.ctx.narrator().speak(&self.translation).await;
        self.ctx.notifier().report("Error", result)
    }
}
