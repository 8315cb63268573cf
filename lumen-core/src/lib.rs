pub mod backend;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod functions;
pub mod hosted;
pub mod models;
pub mod notice;
pub mod speech;
pub mod widgets;

pub use backend::{AuthProvider, Backend, BackendError, BlobStore, FunctionInvoker, TableStore};
pub use config::LumenConfig;
pub use context::{AppContext, Launch, Services, Theme};
pub use dashboard::{Dashboard, Tab, Widget};
pub use error::LumenError;
pub use hosted::{HostedBackend, HostedConfig};
pub use notice::{Notice, NoticeBuffer, NoticeLevel, NoticeSink, Notifier};
pub use speech::{Narrator, Silent, SpeechError, SpeechInput, SpeechOutput, Utterance, Voice};
pub use widgets::SelectedFile;
