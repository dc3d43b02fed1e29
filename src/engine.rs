//! Browser engine collaborator interface.
//!
//! The view host does not render anything itself. Everything it needs from
//! the browser engine is expressed by the [`BrowserRuntime`] and
//! [`EngineView`] traits; [`backends::null`] provides an in-process
//! implementation used by the demos and the tests.

pub mod backends;
pub mod child;
pub mod events;
pub mod preferences;
pub mod runtime;
pub mod view;

pub use child::{ChildKind, PendingChildSpec};
pub use events::{KeyEventKind, KeyboardEvent, Modifiers, MouseButton};
pub use preferences::SessionPreferences;
pub use runtime::{BrowserRuntime, LogLevel, RuntimeConfig, SessionHandle, SessionId};
pub use view::{EngineView, ViewId, ViewSignal};
