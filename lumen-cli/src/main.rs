//! lumen: terminal front end for the Lumen productivity dashboard
//!
//! Each invocation resolves the session, opens the dashboard on the tab the
//! command belongs to, runs one action and exits. Notices go to stderr, state
//! to stdout (`--json` for machine-readable state).
//!
//! # Subcommands
//! - `status`                                  session and configuration
//! - `chat [MESSAGE] [--listen] [--history]`   talk to the assistant
//! - `summarize [TEXT] [--file PATH] [--speak]`
//! - `translate TEXT [--to CODE] [--speak]`
//! - `calendar list|add|delete`
//! - `files list|upload|delete`
//! - `notifications list|read|delete`
//! - `graph CSV`
//! - `languages`
//! - `sign-out`

use anyhow::bail;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use lumen_core::models::{CalendarEvent, FileRecord, NewCalendarEvent, Notification};
use lumen_core::widgets::TargetLanguage;
use lumen_core::{
    speech, AppContext, Dashboard, HostedBackend, HostedConfig, Launch, LumenConfig, Notice,
    NoticeBuffer, NoticeLevel, SelectedFile, Services, Tab, Theme, Voice,
};

const DEFAULT_CONFIG: &str = "lumen.toml";
const SPEECH_POLL: Duration = Duration::from_millis(100);

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "lumen", version, about = "AI productivity dashboard in your terminal")]
struct Cli {
    /// Config file (overrides LUMEN_CONFIG env var)
    #[arg(short, long, env = "LUMEN_CONFIG", default_value = DEFAULT_CONFIG)]
    config: String,

    /// Print state as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the signed-in user and dashboard settings
    Status,

    /// Send a message to the assistant
    Chat {
        /// Message text
        message: Option<String>,

        /// Dictate the message through the configured recognizer
        #[arg(long, conflicts_with = "message")]
        listen: bool,

        /// Print the stored conversation instead of sending
        #[arg(long, conflicts_with_all = ["message", "listen"])]
        history: bool,
    },

    /// Summarize text or a plain-text file
    Summarize {
        /// Text to summarize
        text: Option<String>,

        /// Read the text from a file instead
        #[arg(short, long, conflicts_with = "text")]
        file: Option<String>,

        /// Read the summary aloud
        #[arg(long)]
        speak: bool,
    },

    /// Translate text
    Translate {
        /// Text to translate
        text: String,

        /// Target language code or name
        #[arg(long, default_value = "es")]
        to: String,

        /// Read the translation aloud
        #[arg(long)]
        speak: bool,
    },

    /// Manage calendar events
    Calendar {
        #[command(subcommand)]
        action: CalendarAction,
    },

    /// Manage uploaded files
    Files {
        #[command(subcommand)]
        action: FilesAction,
    },

    /// Read and clear notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationsAction,
    },

    /// Generate graphs from a CSV file
    Graph {
        /// Path to the CSV file
        csv: String,
    },

    /// List the supported translation languages
    Languages,

    /// End the current session
    SignOut,
}

#[derive(Debug, Subcommand)]
enum CalendarAction {
    /// List events, earliest first
    List,
    /// Schedule an event
    Add {
        title: String,
        /// Date and time, e.g. 2026-11-03T14:30
        date: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete an event by id
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
enum FilesAction {
    /// List uploaded files, newest first
    List,
    /// Upload a file
    Upload { path: String },
    /// Delete a file by id
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
enum NotificationsAction {
    /// List notifications, newest first
    List,
    /// Mark a notification as read
    Read { id: String },
    /// Delete a notification
    Delete { id: String },
}

impl Commands {
    fn tab(&self, default_tab: Tab) -> Tab {
        match self {
            Self::Chat { .. } => Tab::Chatbot,
            Self::Summarize { .. } => Tab::Summarizer,
            Self::Translate { .. } | Self::Languages => Tab::Translator,
            Self::Calendar { .. } => Tab::Calendar,
            Self::Files { .. } => Tab::Files,
            Self::Notifications { .. } => Tab::Notifications,
            Self::Graph { .. } => Tab::Graphs,
            Self::Status | Self::SignOut => default_tab,
        }
    }
}

// ============================================================================
// Output Formatting
// ============================================================================

#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    user_id: &'a str,
    email: Option<&'a str>,
    backend: &'a str,
    tab: Tab,
    theme: Theme,
    speech_output: bool,
    speech_input: bool,
}

pub fn format_notice(notice: &Notice) -> String {
    let marker = match notice.level {
        NoticeLevel::Info => "•",
        NoticeLevel::Destructive => "✖",
    };
    match &notice.description {
        Some(description) => format!("{} {}: {}", marker, notice.title, description),
        None => format!("{} {}", marker, notice.title),
    }
}

pub fn format_event(event: &CalendarEvent) -> String {
    let mut line = format!("{}  {}  [{}]", event.event_date, event.title, event.id);
    if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!("\n    {}", description));
    }
    line
}

pub fn format_file(file: &FileRecord) -> String {
    format!(
        "{}  {}  {}  [{}]",
        file.created_at.format("%Y-%m-%d %H:%M"),
        file.filename,
        file.file_type,
        file.id
    )
}

pub fn format_notification(notification: &Notification) -> String {
    let marker = if notification.is_read { " " } else { "*" };
    format!(
        "{} {}  {}  [{}]",
        marker,
        notification.created_at.format("%Y-%m-%d %H:%M"),
        notification.message,
        notification.id
    )
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn print_rows<T: Serialize>(json: bool, rows: &[T], line: fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
    } else if rows.is_empty() {
        eprintln!("Nothing here yet.");
    } else {
        for row in rows {
            println!("{}", line(row));
        }
    }
    Ok(())
}

fn print_text(json: bool, key: &str, text: &str) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::json!({ key: text }));
    } else {
        println!("{}", text);
    }
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

async fn connect(config: &LumenConfig, notices: &NoticeBuffer) -> anyhow::Result<AppContext> {
    let backend = HostedBackend::new(HostedConfig::from(&config.backend))?;
    let (input, output) = speech::from_config(&config.speech);
    let services = Services::new(Arc::new(backend), Arc::new(notices.clone()))
        .with_speech(input, output)
        .with_voice(Voice::from(&config.speech))
        .with_bucket(config.storage.bucket.clone());

    match AppContext::resolve(services).await? {
        Launch::Ready(ctx) => Ok(ctx),
        Launch::SignIn => {
            bail!("not signed in; set LUMEN_ACCESS_TOKEN to a session token and retry")
        }
    }
}

/// Keeps the process alive until the narrator finishes; the synthesizer is killed on exit.
async fn wait_for_speech(ctx: &AppContext) {
    while ctx.narrator().is_speaking() {
        tokio::time::sleep(SPEECH_POLL).await;
    }
}

async fn run(cli: Cli, config: LumenConfig, notices: &NoticeBuffer) -> anyhow::Result<()> {
    let json = cli.json;

    if let Commands::Languages = cli.command {
        for language in TargetLanguage::ALL {
            println!("{}  {}", language.code(), language.name());
        }
        return Ok(());
    }

    let ctx = connect(&config, notices).await?;
    let tab = cli.command.tab(config.dashboard.default_tab);
    let mut dashboard = Dashboard::open(ctx.clone(), tab, config.dashboard.theme).await;

    match cli.command {
        Commands::Languages => {}

        Commands::Status => {
            let report = StatusReport {
                user_id: &ctx.identity().id,
                email: ctx.identity().email.as_deref(),
                backend: &config.backend.url,
                tab: dashboard.active_tab(),
                theme: dashboard.theme(),
                speech_output: ctx.narrator().is_supported(),
                speech_input: ctx.speech_input().is_supported(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("User:     {}", report.email.unwrap_or(report.user_id));
                println!("Backend:  {}", report.backend);
                println!("Tab:      {}", report.tab);
                println!("Theme:    {:?}", report.theme);
                println!(
                    "Speech:   output {}, input {}",
                    if report.speech_output { "on" } else { "off" },
                    if report.speech_input { "on" } else { "off" }
                );
            }
        }

        Commands::Chat {
            message,
            listen,
            history,
        } => {
            let chatbot = dashboard.chatbot().await;
            if history {
                let turns = chatbot.history().await?;
                return print_rows(json, &turns, |m| format!("{}: {}", m.role.as_str(), m.content));
            }

            if listen {
                chatbot.toggle_listening().await?;
                eprintln!("> {}", chatbot.input());
            } else if let Some(message) = message {
                chatbot.set_input(message);
            }

            match chatbot.send().await? {
                Some(reply) => print_text(json, "response", &reply.content)?,
                None => bail!("nothing to send"),
            }
            wait_for_speech(&ctx).await;
        }

        Commands::Summarize { text, file, speak } => {
            let summarizer = dashboard.summarizer().await;
            if let Some(path) = file {
                let file = SelectedFile::read(&expand(&path)).await?;
                summarizer.load_file(file)?;
            } else if let Some(text) = text {
                summarizer.set_text(text);
            }

            let summary = summarizer.summarize().await?.to_string();
            print_text(json, "summary", &summary)?;
            if speak {
                summarizer.speak_result().await?;
                wait_for_speech(&ctx).await;
            }
        }

        Commands::Translate { text, to, speak } => {
            let target: TargetLanguage = to.parse()?;
            let translator = dashboard.translator().await;
            translator.set_text(text);
            translator.set_target(target);

            let translation = translator.translate().await?.to_string();
            print_text(json, "translation", &translation)?;
            if speak {
                translator.speak_result().await?;
                wait_for_speech(&ctx).await;
            }
        }

        Commands::Calendar { action } => {
            let calendar = dashboard.calendar().await;
            match action {
                CalendarAction::List => {}
                CalendarAction::Add {
                    title,
                    date,
                    description,
                } => {
                    let draft = NewCalendarEvent::new(title, date)
                        .with_description(description.unwrap_or_default());
                    calendar.add_event(draft).await?;
                }
                CalendarAction::Delete { id } => calendar.delete_event(&id).await?,
            }
            print_rows(json, calendar.events(), format_event)?;
        }

        Commands::Files { action } => {
            let files = dashboard.files().await;
            match action {
                FilesAction::List => {}
                FilesAction::Upload { path } => {
                    let file = SelectedFile::read(&expand(&path)).await?;
                    files.upload(Some(file)).await?;
                }
                FilesAction::Delete { id } => files.delete(&id).await?,
            }
            print_rows(json, files.files(), format_file)?;
        }

        Commands::Notifications { action } => {
            let widget = dashboard.notifications().await;
            match action {
                NotificationsAction::List => {}
                NotificationsAction::Read { id } => widget.mark_read(&id).await?,
                NotificationsAction::Delete { id } => widget.delete(&id).await?,
            }
            print_rows(json, widget.items(), format_notification)?;
        }

        Commands::Graph { csv } => {
            let preview = dashboard.graphs().await.analyze(&csv).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(preview)?);
            } else {
                println!("{} graph: {}", preview.kind, preview.message);
            }
        }

        Commands::SignOut => dashboard.sign_out().await?,
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    // Load .env file if present (dev convenience, real deployments use env vars)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config_path = expand(&cli.config);
    let config = match LumenConfig::load(&config_path.to_string_lossy()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("lumen: failed to load config from {}: {}", cli.config, e);
            std::process::exit(1);
        }
    };

    let level = config
        .service
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let notices = NoticeBuffer::new();
    let result = run(cli, config, &notices).await;

    let reported = notices.drain();
    for notice in &reported {
        eprintln!("{}", format_notice(notice));
    }

    let failed = reported.iter().any(|n| n.level == NoticeLevel::Destructive);
    match result {
        // Already shown as a notice.
        Err(_) if failed => std::process::exit(1),
        Err(e) => {
            eprintln!("lumen: {}", e);
            std::process::exit(1);
        }
        Ok(()) if failed => std::process::exit(1),
        Ok(()) => {}
    }
}

// ============================================================================
// Tests
// ============================================================================
