//! Host configuration.
//!
//! `HostConfig` controls where sessions keep their data, what a new top-level
//! window loads, how the runtime is started and how popups look.
//!
//! `HostConfig` provides sensible defaults via [`Default`], a fluent
//! [`HostConfig::builder()`] with validation, and JSON loading through
//! [`HostConfig::load`].
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use gosub_viewhost::config::HostConfig;
//! let cfg = HostConfig::default();
//! assert_eq!(cfg.start_page.as_str(), "http://www.google.com/ncr");
//! assert_eq!(cfg.inactive_popup_opacity, 0.8);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use gosub_viewhost::config::HostConfig;
//! use gosub_viewhost::engine::LogLevel;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = HostConfig::builder()
//!     .data_path("/tmp/viewhost-cache")
//!     .start_page("https://example.com/")
//!     .log_level(LogLevel::Verbose)
//!     .javascript_enabled(false)
//!     .inactive_popup_opacity(0.5)
//!     .build()?; // returns Result<HostConfig, ConfigError>
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `data_path`: Session data directory. Defaults to `Cache` next to the executable.
//! - `start_page`: URL a top-level window loads when no target is given.
//! - `runtime`: Runtime log level and user agent.
//! - `preferences`: Preferences for the sessions created by this host.
//! - `window_size`: Client size of top-level windows (default: 1024x768).
//! - `child_window_size`: Client size of child windows without geometry (default: 640x480).
//! - `inactive_popup_opacity`: Opacity of a deactivated popup (validated range `0.0..=1.0`).
//!
//! # Errors
//!
//! Validation returns [`ConfigError`] for an out of range opacity, a
//! non-positive child window size or an unparsable start page.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::engine::{LogLevel, RuntimeConfig, SessionPreferences};
use crate::errors::ConfigError;
use crate::geometry::Size;

pub const DEFAULT_START_PAGE: &str = "http://www.google.com/ncr";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub data_path: Option<PathBuf>,
    pub start_page: Url,
    pub runtime: RuntimeConfig,
    pub preferences: SessionPreferences,
    pub window_size: Size,
    pub child_window_size: Size,
    pub inactive_popup_opacity: f32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            start_page: default_start_page(),
            runtime: RuntimeConfig::default(),
            preferences: SessionPreferences::default(),
            window_size: Size::new(1024, 768),
            child_window_size: Size::new(640, 480),
            inactive_popup_opacity: 0.8,
        }
    }
}

fn default_start_page() -> Url {
    Url::parse(DEFAULT_START_PAGE).expect("default start page is a valid URL")
}

impl HostConfig {
    pub fn builder() -> HostConfigBuilder {
        HostConfigBuilder::default()
    }

    /// Parses and validates a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: HostConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.inactive_popup_opacity) {
            return Err(ConfigError::InvalidOpacity(self.inactive_popup_opacity));
        }
        if self.child_window_size.is_degenerate() {
            return Err(ConfigError::InvalidChildSize {
                width: self.child_window_size.width,
                height: self.child_window_size.height,
            });
        }
        Ok(())
    }
}

/// Builder for [`HostConfig`], in the style of the session preference builders.
#[derive(Debug, Clone)]
pub struct HostConfigBuilder {
    inner: HostConfig,
    start_page: Option<String>,
}

impl Default for HostConfigBuilder {
    fn default() -> Self {
        Self {
            inner: HostConfig::default(),
            start_page: None,
        }
    }
}

impl HostConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut HostConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn data_path<P: Into<PathBuf>>(self, path: P) -> Self { self.map(|c| c.data_path = Some(path.into())) }
    pub fn log_level(self, level: LogLevel) -> Self { self.map(|c| c.runtime.log_level = level) }
    pub fn runtime_user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.runtime.user_agent = ua.into()) }
    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.preferences.user_agent = Some(ua.into())) }
    pub fn accept_languages<S: Into<String>>(self, langs: S) -> Self { self.map(|c| c.preferences.accept_languages = Some(langs.into())) }
    pub fn do_not_track(self, dnt: bool) -> Self { self.map(|c| c.preferences.do_not_track = dnt) }
    pub fn javascript_enabled(self, on: bool) -> Self { self.map(|c| c.preferences.javascript_enabled = on) }
    pub fn images_enabled(self, on: bool) -> Self { self.map(|c| c.preferences.images_enabled = on) }
    pub fn plugins_enabled(self, on: bool) -> Self { self.map(|c| c.preferences.plugins_enabled = on) }
    pub fn enable_local_file_access(self, on: bool) -> Self { self.map(|c| c.preferences.enable_local_file_access = on) }
    pub fn window_size(self, width: i32, height: i32) -> Self { self.map(|c| c.window_size = Size::new(width, height)) }
    pub fn child_window_size(self, width: i32, height: i32) -> Self { self.map(|c| c.child_window_size = Size::new(width, height)) }
    pub fn inactive_popup_opacity(self, opacity: f32) -> Self { self.map(|c| c.inactive_popup_opacity = opacity) }

    /// The start page is parsed when the config is built.
    pub fn start_page<S: Into<String>>(mut self, url: S) -> Self {
        self.start_page = Some(url.into());
        self
    }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut HostConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(mut self) -> Result<HostConfig, ConfigError> {
        if let Some(url) = self.start_page.take() {
            self.inner.start_page = Url::parse(&url)?;
        }
        self.inner.validate()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let cfg = HostConfig::builder().build().unwrap();
        assert_eq!(cfg, HostConfig::default());
        assert_eq!(cfg.child_window_size, Size::new(640, 480));
        assert_eq!(cfg.data_path, None);
    }

    #[test]
    fn builder_sets_nested_fields() {
        let cfg = HostConfig::builder()
            .log_level(LogLevel::Verbose)
            .user_agent("ViewHost/0.1")
            .plugins_enabled(true)
            .window_size(800, 600)
            .start_page("https://example.com/start")
            .build()
            .unwrap();

        assert_eq!(cfg.runtime.log_level, LogLevel::Verbose);
        assert_eq!(cfg.preferences.user_agent.as_deref(), Some("ViewHost/0.1"));
        assert!(cfg.preferences.plugins_enabled);
        assert_eq!(cfg.window_size, Size::new(800, 600));
        assert_eq!(cfg.start_page.as_str(), "https://example.com/start");
    }

    #[test]
    fn rejects_out_of_range_opacity() {
        let err = HostConfig::builder().inactive_popup_opacity(1.5).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOpacity(o) if o == 1.5));

        let err = HostConfig::builder().inactive_popup_opacity(-0.1).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOpacity(_)));
    }

    #[test]
    fn rejects_empty_child_size() {
        let err = HostConfig::builder().child_window_size(0, 480).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidChildSize { width: 0, height: 480 }));
    }

    #[test]
    fn rejects_unparsable_start_page() {
        let err = HostConfig::builder().start_page("not a url").build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStartPage(_)));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = HostConfig::from_json_str(
            r#"{
                "start_page": "https://example.org/",
                "runtime": { "log_level": "verbose" },
                "child_window_size": { "width": 320, "height": 240 }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.start_page.as_str(), "https://example.org/");
        assert_eq!(cfg.runtime.log_level, LogLevel::Verbose);
        assert_eq!(cfg.child_window_size, Size::new(320, 240));
        assert_eq!(cfg.inactive_popup_opacity, 0.8);
        assert!(cfg.preferences.javascript_enabled);
    }

    #[test]
    fn json_is_validated() {
        let err = HostConfig::from_json_str(r#"{ "inactive_popup_opacity": 2.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOpacity(_)));

        let err = HostConfig::from_json_str(r#"{ "start_page": "::" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "data_path": "/tmp/vh-cache" }}"#).unwrap();

        let cfg = HostConfig::load(file.path()).unwrap();
        assert_eq!(cfg.data_path, Some(PathBuf::from("/tmp/vh-cache")));

        let missing = HostConfig::load(file.path().with_extension("missing")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
