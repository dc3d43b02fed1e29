//! The browser view collaborator.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::engine::child::PendingChildSpec;
use crate::engine::events::{KeyboardEvent, MouseButton};
use crate::render::SurfaceSink;

/// A unique identifier for an engine view.
///
/// **Note:** The use of [`Uuid`] is an implementation detail. Treat `ViewId`
/// as an opaque handle; the host only uses it to remember which view opened a
/// popup, never to reach that view.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId(Uuid);

impl ViewId {
    /// Create a new unique `ViewId` using a random UUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Messages a view emits toward its host. Drained once per event-loop turn
/// through [`EngineView::poll_signals`].
#[derive(Debug)]
pub enum ViewSignal {
    /// The page asked for a new view
    ChildRequested(PendingChildSpec),
    /// The page called `window.close()`
    CloseRequested,
    /// The view's renderer process went away
    Crashed { status: String },
    /// Location of the view has changed
    AddressChanged(Url),
    /// Title of the document has changed
    TitleChanged(String),
}

/// One browser view instance, owned by the engine. Calls occur on the host's
/// event-loop thread.
pub trait EngineView {
    fn id(&self) -> ViewId;

    /// False once the view was disposed or its renderer crashed.
    fn is_live(&self) -> bool;

    /// The view that opened this one, if it was created as a child.
    fn parent_view(&self) -> Option<ViewId>;

    /// Resizes the view. Never called with a zero dimension.
    fn resize(&mut self, width: u32, height: u32);

    /// Pauses or resumes rendering into the surface.
    fn set_rendering(&mut self, rendering: bool);

    /// Attaches the surface the view paints into.
    fn set_surface(&mut self, sink: SurfaceSink);

    fn navigate(&mut self, url: &Url);

    fn focus(&mut self);

    fn unfocus(&mut self);

    fn inject_keyboard(&mut self, event: KeyboardEvent);

    fn inject_mouse_down(&mut self, button: MouseButton);

    fn inject_mouse_up(&mut self, button: MouseButton);

    fn inject_mouse_move(&mut self, x: i32, y: i32);

    fn inject_mouse_wheel(&mut self, scroll_y: i32, scroll_x: i32);

    /// Releases the view. The attached surface is released by the engine.
    fn dispose(&mut self);

    /// Marks a freshly created child view as not kept, so the engine
    /// destroys it instead of keeping it alive next to its parent.
    fn cancel(&mut self);

    /// Takes all signals emitted since the last call.
    fn poll_signals(&mut self) -> Vec<ViewSignal>;
}
