use std::path::PathBuf;

/// Errors surfaced by the view host.
///
/// Every variant is a startup failure: the window that asked for it is never
/// shown. Stale-view access and degenerate geometry are not errors and never
/// show up here.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Runtime initialization failed")]
    RuntimeInit(#[source] anyhow::Error),

    #[error("Data path {path} is not usable")]
    DataPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create session for {path}")]
    Session {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("View creation failed")]
    ViewCreation(#[source] anyhow::Error),

    #[error("Window creation failed")]
    WindowCreation(#[source] anyhow::Error),
}

/// Errors found while loading or validating a [`HostConfig`](crate::config::HostConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("inactive_popup_opacity {0} is out of range (expected 0.0..=1.0)")]
    InvalidOpacity(f32),

    #[error("default child size {width}x{height} must be positive")]
    InvalidChildSize { width: i32, height: i32 },

    #[error("start page is not a valid URL: {0}")]
    InvalidStartPage(#[from] url::ParseError),

    #[error("cannot read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file")]
    Parse(#[from] serde_json::Error),
}
