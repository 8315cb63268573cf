//! Speech capabilities behind feature-detectable traits.
//!
//! - `SpeechInput`  single-shot speech-to-text
//! - `SpeechOutput` text-to-speech with cancel
//! - `Narrator`     cancel-then-speak wrapper so at most one utterance plays
//!
//! `Silent` reports both capabilities as unsupported. The `Command*` types
//! drive external programs (e.g. `espeak`) for terminal use.

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::process::{Child, Command};

use crate::config::SpeechConfig;
use crate::error::LumenError;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Speech capability not available")]
    Unavailable,

    #[error("Speech recognition error: {0}")]
    Recognition(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Speech process error: {0}")]
    Io(#[from] std::io::Error),
}

/// Voice parameters, each 1.0 by default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

impl From<&SpeechConfig> for Voice {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            rate: config.rate,
            pitch: config.pitch,
            volume: config.volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub voice: Voice,
}

// ============================================================================
// Traits
// ============================================================================

#[async_trait]
pub trait SpeechInput: Send + Sync {
    fn is_supported(&self) -> bool;

    /// Listens once (non-continuous) and returns the final transcript.
    async fn recognize(&self) -> Result<String, SpeechError>;

    async fn stop(&self);
}

#[async_trait]
pub trait SpeechOutput: Send + Sync {
    fn is_supported(&self) -> bool;

    /// Stops the active utterance, if any.
    async fn cancel(&self);

    /// Starts speaking and returns once playback has begun.
    async fn speak(&self, utterance: Utterance) -> Result<(), SpeechError>;

    fn is_speaking(&self) -> bool;
}

// ============================================================================
// Silent
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

#[async_trait]
impl SpeechInput for Silent {
    fn is_supported(&self) -> bool {
        false
    }

    async fn recognize(&self) -> Result<String, SpeechError> {
        Err(SpeechError::Unavailable)
    }

    async fn stop(&self) {}
}

#[async_trait]
impl SpeechOutput for Silent {
    fn is_supported(&self) -> bool {
        false
    }

    async fn cancel(&self) {}

    async fn speak(&self, _utterance: Utterance) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn is_speaking(&self) -> bool {
        false
    }
}

// ============================================================================
// Process-backed implementations
// ============================================================================

/// Speaks by running `program [args..] <text>`; cancel kills the running process.
/// `{rate}`, `{pitch}` and `{volume}` in an argument are replaced with the voice settings.
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
    active: Mutex<Option<Child>>,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            active: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SpeechOutput for CommandSynthesizer {
    fn is_supported(&self) -> bool {
        true
    }

    async fn cancel(&self) {
        let child = self.active.lock().ok().and_then(|mut guard| guard.take());
        if let Some(mut child) = child {
            if let Err(e) = child.start_kill() {
                tracing::debug!(error = %e, "Synthesizer process already gone");
            }
        }
    }

    async fn speak(&self, utterance: Utterance) -> Result<(), SpeechError> {
        let child = Command::new(&self.program)
            .args(self.args.iter().map(|arg| render_arg(arg, &utterance.voice)))
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let mut guard = self
            .active
            .lock()
            .map_err(|_| SpeechError::Synthesis("synthesizer state poisoned".to_string()))?;
        *guard = Some(child);
        tracing::debug!(program = %self.program, chars = utterance.text.len(), "Utterance started");
        Ok(())
    }

    fn is_speaking(&self) -> bool {
        let Ok(mut guard) = self.active.lock() else {
            return false;
        };
        match guard.as_mut().map(Child::try_wait) {
            Some(Ok(None)) => true,
            Some(_) => {
                *guard = None;
                false
            }
            None => false,
        }
    }
}

/// Recognizes by running `program [args..]` and taking its first non-empty stdout line.
/// Dropping the `recognize` future kills the process.
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl SpeechInput for CommandRecognizer {
    fn is_supported(&self) -> bool {
        true
    }

    async fn recognize(&self) -> Result<String, SpeechError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SpeechError::Recognition(if stderr.is_empty() {
                format!("recognizer exited with {}", output.status)
            } else {
                stderr
            }));
        }

        first_transcript_line(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| SpeechError::Recognition("no speech detected".to_string()))
    }

    async fn stop(&self) {
        tracing::debug!(program = %self.program, "Recognizer stop requested");
    }
}

fn render_arg(arg: &str, voice: &Voice) -> String {
    arg.replace("{rate}", &voice.rate.to_string())
        .replace("{pitch}", &voice.pitch.to_string())
        .replace("{volume}", &voice.volume.to_string())
}

fn first_transcript_line(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Input and output built from the `[speech]` config section; unset programs are `Silent`.
pub fn from_config(config: &SpeechConfig) -> (Arc<dyn SpeechInput>, Arc<dyn SpeechOutput>) {
    let input: Arc<dyn SpeechInput> = match &config.recognizer {
        Some(program) => Arc::new(CommandRecognizer::new(
            program.clone(),
            config.recognizer_args.clone(),
        )),
        None => Arc::new(Silent),
    };
    let output: Arc<dyn SpeechOutput> = match &config.synthesizer {
        Some(program) => Arc::new(CommandSynthesizer::new(
            program.clone(),
            config.synthesizer_args.clone(),
        )),
        None => Arc::new(Silent),
    };
    (input, output)
}

// ============================================================================
// Narrator
// ============================================================================

/// Speaks text through a `SpeechOutput`, cancelling whatever was playing first.
#[derive(Clone)]
pub struct Narrator {
    output: Arc<dyn SpeechOutput>,
    voice: Voice,
}

impl Narrator {
    pub fn new(output: Arc<dyn SpeechOutput>, voice: Voice) -> Self {
        Self { output, voice }
    }

    pub fn is_supported(&self) -> bool {
        self.output.is_supported()
    }

    pub fn is_speaking(&self) -> bool {
        self.output.is_speaking()
    }

    pub async fn speak(&self, text: &str) -> Result<(), LumenError> {
        if !self.output.is_supported() {
            return Err(LumenError::Unsupported(
                "Speech synthesis is not supported in this environment".to_string(),
            ));
        }

        self.output.cancel().await;
        self.output
            .speak(Utterance {
                text: text.to_string(),
                voice: self.voice,
            })
            .await?;
        Ok(())
    }

    pub async fn stop(&self) {
        self.output.cancel().await;
    }
}
