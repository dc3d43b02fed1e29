//! Embedding bridge between a native host window and a browser engine view.
//!
//! The host toolkit owns windows and the event loop; the browser engine owns
//! views, sessions and rendering. This crate sits in between: it routes paint,
//! resize, focus, input and close events from the toolkit to the engine view,
//! and surface updates and popup requests from the engine back to the toolkit.
//!
//! ```no_run
//! use gosub_viewhost::config::HostConfig;
//! use gosub_viewhost::engine::backends::null::NullRuntime;
//! use gosub_viewhost::host::headless::HeadlessWindowFactory;
//! use gosub_viewhost::host::HostApp;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut app = HostApp::new(
//!     HostConfig::default(),
//!     Box::new(NullRuntime::new()),
//!     Box::new(HeadlessWindowFactory::new()),
//! )?;
//! let window = app.open_window(None)?;
//! app.pump();
//! app.close_window(window);
//! assert!(!app.is_runtime_running());
//! # Ok(()) }
//! ```

pub mod config;
pub mod engine;
pub mod errors;
pub mod geometry;
pub mod host;
pub mod render;
pub mod session;

pub use config::HostConfig;
pub use errors::{ConfigError, HostError};
pub use host::HostApp;
pub use session::SessionManager;
