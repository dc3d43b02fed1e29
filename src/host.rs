//! Host side of the embedding bridge.
//!
//! Toolkit events come in through [`HostApp`], reach a [`HostWindow`] and are
//! delegated to its [`ViewHost`]. Input goes through the [`InputTranslator`];
//! child view requests go through the [`PopupSpawner`].

mod app;
pub mod headless;
mod input;
mod popup;
mod view_host;
mod window;

pub use app::HostApp;
pub use input::{translate_mouse_button, HostInput, HostMouseButton, InjectedInput, InputTranslator};
pub use popup::{PopupSpawner, SpawnOutcome, DEFAULT_CHILD_SIZE};
pub use view_host::{ViewHost, ViewState};
pub use window::{Canvas, HostWindow, NativeWindow, PaintOutcome, WindowEvent, WindowFactory, WindowId, WindowOptions, WindowStyle};
