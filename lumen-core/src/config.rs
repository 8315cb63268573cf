use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::dashboard::Tab;
use crate::context::Theme;

#[derive(Debug, Deserialize, Clone)]
pub struct LumenConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub url: String,
    #[serde(default)]
    pub anon_key: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Unset means requests wait for the backend indefinitely.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl BackendConfig {
    /// Project key, falling back to `LUMEN_ANON_KEY`.
    pub fn resolved_anon_key(&self) -> String {
        self.anon_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("LUMEN_ANON_KEY").ok())
            .unwrap_or_default()
    }

    /// Session token, falling back to `LUMEN_ACCESS_TOKEN`, then the anon key.
    pub fn resolved_access_token(&self) -> String {
        self.access_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var("LUMEN_ACCESS_TOKEN").ok())
            .unwrap_or_else(|| self.resolved_anon_key())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "documents".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SpeechConfig {
    /// Text-to-speech program, e.g. `espeak`. The text is passed as the last argument.
    pub synthesizer: Option<String>,
    pub synthesizer_args: Vec<String>,
    /// Speech-to-text program; its first non-empty stdout line is the transcript.
    pub recognizer: Option<String>,
    pub recognizer_args: Vec<String>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            synthesizer: None,
            synthesizer_args: Vec::new(),
            recognizer: None,
            recognizer_args: Vec::new(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub default_tab: Tab,
    #[serde(default)]
    pub theme: Theme,
}

impl LumenConfig {
    /// Loads `path`, then applies `LUMEN__SECTION__KEY` environment overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("LUMEN").separator("__"))
            .build()?;
        s.try_deserialize()
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()?;
        s.try_deserialize()
    }
}
