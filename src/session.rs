//! Session system: [`SessionManager`].
//!
//! The session manager is the single owner of the [`BrowserRuntime`]. It is
//! created once by the host application and passed by reference to every
//! window constructor. It guarantees:
//!
//! - the runtime is initialized lazily, exactly once per process lifetime;
//! - there is at most one session per canonical data path;
//! - the runtime is shut down when the last open host window is released, and
//!   never while any window is still open.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;

use crate::engine::{BrowserRuntime, EngineView, RuntimeConfig, SessionHandle, SessionPreferences};
use crate::errors::HostError;

const DEFAULT_CACHE_DIR: &str = "Cache";

/// Returns the default data path: a `Cache` directory next to the running executable.
pub fn default_data_path() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(dir.join(DEFAULT_CACHE_DIR))
}

pub struct SessionManager {
    runtime: Box<dyn BrowserRuntime>,
    runtime_config: RuntimeConfig,
    preferences: SessionPreferences,
    /// Sessions by canonical data path
    sessions: HashMap<PathBuf, SessionHandle>,
    /// Number of host windows currently open (popups included)
    open_windows: usize,
    /// Set once the runtime was torn down; it is never restarted afterwards
    shut_down: bool,
}

impl SessionManager {
    pub fn new(runtime: Box<dyn BrowserRuntime>, runtime_config: RuntimeConfig, preferences: SessionPreferences) -> Self {
        Self {
            runtime,
            runtime_config,
            preferences,
            sessions: HashMap::new(),
            open_windows: 0,
            shut_down: false,
        }
    }

    /// Initializes the runtime if it is not running yet.
    pub fn ensure_runtime(&mut self) -> Result<(), HostError> {
        if self.runtime.is_running() {
            return Ok(());
        }
        if self.shut_down {
            return Err(HostError::RuntimeInit(anyhow!("runtime was shut down and cannot be restarted")));
        }

        self.runtime
            .initialize(&self.runtime_config)
            .map_err(HostError::RuntimeInit)?;

        log::info!("Runtime started, version {}", self.runtime.version());
        Ok(())
    }

    /// Makes sure the runtime is running, then returns the session bound to
    /// `data_path`, creating the directory and the session when needed.
    pub fn ensure_runtime_and_session(&mut self, data_path: &Path) -> Result<SessionHandle, HostError> {
        self.ensure_runtime()?;

        let canonical = fs::create_dir_all(data_path)
            .and_then(|_| fs::canonicalize(data_path))
            .map_err(|source| HostError::DataPath {
                path: data_path.to_path_buf(),
                source,
            })?;

        if let Some(session) = self.sessions.get(&canonical) {
            return Ok(session.clone());
        }

        let session = match self.runtime.session(&canonical) {
            Some(existing) => existing,
            None => self
                .runtime
                .create_session(&canonical, &self.preferences)
                .map_err(|source| HostError::Session {
                    path: canonical.clone(),
                    source,
                })?,
        };

        log::debug!("Session[{}]: bound to {}", session.id, canonical.display());
        self.sessions.insert(canonical, session.clone());
        Ok(session)
    }

    /// Creates a new engine view inside `session`.
    pub fn create_view(&mut self, width: u32, height: u32, session: &SessionHandle) -> Result<Box<dyn EngineView>, HostError> {
        self.runtime
            .create_view(width, height, session)
            .map_err(HostError::ViewCreation)
    }

    /// Counts a newly opened host window.
    pub fn register_window(&mut self) {
        self.open_windows += 1;
    }

    /// Releases a closed host window. Shuts the runtime down when it was the
    /// last one and returns true in that case.
    pub fn release_window(&mut self) -> bool {
        self.open_windows = self.open_windows.saturating_sub(1);
        if self.open_windows > 0 {
            return false;
        }

        if self.runtime.is_running() {
            log::info!("Last window closed, shutting down runtime");
            self.runtime.shutdown();
        }
        self.sessions.clear();
        self.shut_down = true;
        true
    }

    pub fn open_windows(&self) -> usize {
        self.open_windows
    }

    pub fn is_runtime_running(&self) -> bool {
        self.runtime.is_running()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
