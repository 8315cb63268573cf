//! Tabbed dashboard shell. Only the active tab's widget is mounted; switching
//! tabs drops it and mounts the next one fresh, which re-fetches its rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::backend::AuthProvider;
use crate::context::{AppContext, Theme};
use crate::error::LumenError;
use crate::models::Identity;
use crate::notice::Notice;
use crate::widgets::{
    Calendar, Chatbot, FileManager, GraphGenerator, Notifications, Summarizer, Translator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Chatbot,
    Summarizer,
    Translator,
    Calendar,
    Graphs,
    Files,
    Notifications,
}

impl Tab {
    pub const ALL: [Self; 7] = [
        Self::Chatbot,
        Self::Summarizer,
        Self::Translator,
        Self::Calendar,
        Self::Graphs,
        Self::Files,
        Self::Notifications,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Chatbot => "Chatbot",
            Self::Summarizer => "Summarizer",
            Self::Translator => "Translator",
            Self::Calendar => "Calendar",
            Self::Graphs => "Graphs",
            Self::Files => "Files",
            Self::Notifications => "Notifications",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tab {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LumenError::validation("Unknown tab", format!("No tab named '{}'", s)))
    }
}

/// The mounted widget of the active tab.
pub enum Widget {
    Chatbot(Chatbot),
    Summarizer(Summarizer),
    Translator(Translator),
    Calendar(Calendar),
    Graphs(GraphGenerator),
    Files(FileManager),
    Notifications(Notifications),
}

impl Widget {
    pub async fn mount(tab: Tab, ctx: AppContext) -> Self {
        match tab {
            Tab::Chatbot => Self::Chatbot(Chatbot::new(ctx)),
            Tab::Summarizer => Self::Summarizer(Summarizer::new(ctx)),
            Tab::Translator => Self::Translator(Translator::new(ctx)),
            Tab::Calendar => Self::Calendar(Calendar::open(ctx).await),
            Tab::Graphs => Self::Graphs(GraphGenerator::new(ctx)),
            Tab::Files => Self::Files(FileManager::open(ctx).await),
            Tab::Notifications => Self::Notifications(Notifications::open(ctx).await),
        }
    }

    pub fn tab(&self) -> Tab {
        match self {
            Self::Chatbot(_) => Tab::Chatbot,
            Self::Summarizer(_) => Tab::Summarizer,
            Self::Translator(_) => Tab::Translator,
            Self::Calendar(_) => Tab::Calendar,
            Self::Graphs(_) => Tab::Graphs,
            Self::Files(_) => Tab::Files,
            Self::Notifications(_) => Tab::Notifications,
        }
    }
}

pub struct Dashboard {
    ctx: AppContext,
    theme: Theme,
    active: Widget,
}

/// Typed access to one tab's widget, mounting it first if another tab is active.
macro_rules! tab_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub async fn $name(&mut self) -> &mut $ty {
            self.select(Tab::$variant).await;
            match &mut self.active {
                Widget::$variant(widget) => widget,
                _ => unreachable!(concat!(stringify!($variant), " was just mounted")),
            }
        }
    };
}

impl Dashboard {
    pub async fn open(ctx: AppContext, tab: Tab, theme: Theme) -> Self {
        tracing::info!(user_id = %ctx.identity().id, tab = %tab, "Dashboard opened");
        let active = Widget::mount(tab, ctx.clone()).await;
        Self { ctx, theme, active }
    }

    pub fn identity(&self) -> &Identity {
        self.ctx.identity()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn active_tab(&self) -> Tab {
        self.active.tab()
    }

    /// Switches tabs. Re-selecting the active tab keeps its widget as is.
    pub async fn select(&mut self, tab: Tab) -> &mut Widget {
        if self.active.tab() != tab {
            tracing::debug!(from = %self.active.tab(), to = %tab, "Switching tab");
            self.active = Widget::mount(tab, self.ctx.clone()).await;
        }
        &mut self.active
    }

    tab_accessor!(chatbot, Chatbot, Chatbot);
    tab_accessor!(summarizer, Summarizer, Summarizer);
    tab_accessor!(translator, Translator, Translator);
    tab_accessor!(calendar, Calendar, Calendar);
    tab_accessor!(graphs, Graphs, GraphGenerator);
    tab_accessor!(files, Files, FileManager);
    tab_accessor!(notifications, Notifications, Notifications);

    /// Ends the session. The dashboard and its context are dropped either way.
    pub async fn sign_out(self) -> Result<(), LumenError> {
        let result = self.ctx.backend().sign_out().await.map_err(LumenError::from);
        self.ctx.notifier().report("Error", result)?;
        tracing::info!(user_id = %self.ctx.identity().id, "Signed out");
        self.ctx
            .notifier()
            .push(Notice::info("Signed out", "See you soon! ✨"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_parse_is_case_insensitive() {
        assert_eq!("graphs".parse::<Tab>().unwrap(), Tab::Graphs);
        assert_eq!("Notifications".parse::<Tab>().unwrap(), Tab::Notifications);
        assert!("settings".parse::<Tab>().is_err());
    }

    #[test]
    fn test_tab_order_matches_dashboard() {
        let labels: Vec<&str> = Tab::ALL.iter().map(Tab::label).collect();
        assert_eq!(
            labels,
            vec![
                "Chatbot",
                "Summarizer",
                "Translator",
                "Calendar",
                "Graphs",
                "Files",
                "Notifications"
            ]
        );
    }
}
