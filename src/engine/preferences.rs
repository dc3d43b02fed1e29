//! Session preferences.
//!
//! `SessionPreferences` are handed to the runtime when a session is created.
//! They describe behavior (JavaScript, images, plugins) and identity (user
//! agent, languages) for every view living in that session.
//!
//! # Notes
//!
//! The view host does not interpret any of these; they are passed through to
//! the engine unchanged.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPreferences {
    pub user_agent: Option<String>,
    pub accept_languages: Option<String>,
    pub do_not_track: bool,
    pub javascript_enabled: bool,
    pub images_enabled: bool,
    pub plugins_enabled: bool,
    pub enable_local_file_access: bool,
}

impl Default for SessionPreferences {
    fn default() -> Self {
        Self {
            user_agent: None,
            accept_languages: None,
            do_not_track: false,
            javascript_enabled: true,
            images_enabled: true,
            plugins_enabled: false,
            enable_local_file_access: false,
        }
    }
}
