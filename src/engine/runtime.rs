//! The browser runtime collaborator.
//!
//! A [`BrowserRuntime`] is the process-wide engine core: it is initialized
//! once, owns every session and creates views bound to a session. The view
//! host never talks to a runtime directly; it goes through the
//! [`SessionManager`](crate::session::SessionManager), which enforces the
//! init-once and shutdown-on-last-window lifecycle.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::preferences::SessionPreferences;
use crate::engine::view::EngineView;

const DEFAULT_USER_AGENT: &str = "Gosub/1.0 (X11; Linux x86_64) Gecko/20250802 GosubBrowser/1.0";

/// Verbosity of the runtime's own logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    None,
    #[default]
    Normal,
    Verbose,
}

impl LogLevel {
    /// Maps the runtime log level onto a `log` filter for the host process.
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::None => log::LevelFilter::Warn,
            LogLevel::Normal => log::LevelFilter::Info,
            LogLevel::Verbose => log::LevelFilter::Trace,
        }
    }
}

/// Configuration passed to [`BrowserRuntime::initialize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub log_level: LogLevel,
    /// User agent string for HTTP requests
    pub user_agent: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Normal,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// A unique identifier for a session, represented as a UUID.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a runtime session: the storage context (cache, cookies) bound
/// to one data path. Cheap to clone; two handles are equal when they refer
/// to the same session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    pub id: SessionId,
    pub data_path: PathBuf,
}

impl SessionHandle {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            id: SessionId::new(),
            data_path: data_path.into(),
        }
    }
}

/// Process-wide browser runtime. Calls occur on the host's event-loop thread.
pub trait BrowserRuntime {
    /// Starts the runtime. Only called when [`is_running`](Self::is_running) is false.
    fn initialize(&mut self, config: &RuntimeConfig) -> anyhow::Result<()>;

    fn is_running(&self) -> bool;

    /// Tears the runtime down, implicitly destroying every session.
    fn shutdown(&mut self);

    /// Version string of the engine, for diagnostics.
    fn version(&self) -> String;

    /// Creates a session whose storage lives under `data_path`.
    fn create_session(&mut self, data_path: &Path, preferences: &SessionPreferences) -> anyhow::Result<SessionHandle>;

    /// Returns the session already bound to `data_path`, if any.
    fn session(&self, data_path: &Path) -> Option<SessionHandle>;

    /// Creates a new view of `width` x `height` pixels inside `session`.
    fn create_view(&mut self, width: u32, height: u32, session: &SessionHandle) -> anyhow::Result<Box<dyn EngineView>>;
}
