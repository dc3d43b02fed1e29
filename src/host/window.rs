//! Host windows.
//!
//! A [`HostWindow`] is the generic window type of the view host. It does not
//! specialize any toolkit window: it holds the toolkit's [`NativeWindow`] and
//! an owned [`ViewHost`], and delegates every native event to the view host.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::ViewSignal;
use crate::geometry::{Point, Rect, Size};
use crate::host::input::{HostInput, InputTranslator};
use crate::host::view_host::ViewHost;
use crate::render::PixelBuffer;

/// A unique identifier for a host window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(Uuid);

impl WindowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frame style of a native window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowStyle {
    /// Regular resizable frame
    #[default]
    Normal,
    /// Small fixed tool-window frame, used for popups
    ToolWindow,
}

/// How the toolkit should create a native window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOptions {
    pub title: String,
    pub client_size: Size,
    pub style: WindowStyle,
    pub show_in_taskbar: bool,
}

impl WindowOptions {
    pub fn top_level(title: impl Into<String>, client_size: Size) -> Self {
        Self {
            title: title.into(),
            client_size,
            style: WindowStyle::Normal,
            show_in_taskbar: true,
        }
    }

    pub fn popup(title: impl Into<String>, client_size: Size) -> Self {
        Self {
            title: title.into(),
            client_size,
            style: WindowStyle::ToolWindow,
            show_in_taskbar: false,
        }
    }
}

/// Events the host toolkit delivers for a window. Painting goes through
/// [`HostApp::paint`](crate::host::HostApp::paint) since it needs a canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    /// Client area has a new size
    Resized(Size),
    Activated,
    Deactivated,
    Input(HostInput),
    /// The toolkit closed the window
    Closed,
}

/// Result of a paint request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOutcome {
    /// The surface image was drawn
    Painted,
    /// Nothing to draw; the toolkit should paint its default background
    DefaultBackground,
}

/// Drawing target handed to the paint handler by the toolkit.
pub trait Canvas {
    /// Draws `image` at `at` without any scaling.
    fn draw_image_unscaled(&mut self, image: &PixelBuffer, at: Point);
}

/// A toolkit window. Calls occur on the toolkit's event-loop thread.
pub trait NativeWindow {
    fn client_size(&self) -> Size;

    /// Moves the window to `position` in screen coordinates.
    fn set_position(&mut self, position: Point);

    fn set_opacity(&mut self, opacity: f32);

    fn set_title(&mut self, title: &str);

    /// Schedules a repaint of `region`. Must not paint synchronously.
    fn invalidate(&mut self, region: Rect);

    /// Shows the window non-modally, owned by `owner` if given.
    fn show(&mut self, owner: Option<WindowId>);

    /// Destroys the native window. The toolkit does not deliver
    /// [`WindowEvent::Closed`] for windows closed this way.
    fn close(&mut self);
}

/// Creates toolkit windows.
pub trait WindowFactory {
    fn create_window(&mut self, id: WindowId, options: &WindowOptions) -> anyhow::Result<Box<dyn NativeWindow>>;
}

pub struct HostWindow {
    id: WindowId,
    native: Box<dyn NativeWindow>,
    /// Window this one was spawned from, if any
    owner: Option<WindowId>,
    view_host: Option<ViewHost>,
    input: InputTranslator,
    inactive_opacity: f32,
}

impl HostWindow {
    pub fn new(
        id: WindowId,
        native: Box<dyn NativeWindow>,
        owner: Option<WindowId>,
        view_host: Option<ViewHost>,
        inactive_opacity: f32,
    ) -> Self {
        Self {
            id,
            native,
            owner,
            view_host,
            input: InputTranslator::new(),
            inactive_opacity,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn owner(&self) -> Option<WindowId> {
        self.owner
    }

    pub fn view_host(&self) -> Option<&ViewHost> {
        self.view_host.as_ref()
    }

    pub fn view_host_mut(&mut self) -> Option<&mut ViewHost> {
        self.view_host.as_mut()
    }

    pub fn native_mut(&mut self) -> &mut dyn NativeWindow {
        self.native.as_mut()
    }

    /// True when the hosted view was opened by another view.
    pub fn is_popup(&self) -> bool {
        self.view_host.as_ref().is_some_and(ViewHost::is_popup)
    }

    /// Shows the native window and brings the view host to life.
    pub fn show(&mut self) {
        self.native.show(self.owner);
        if let Some(view_host) = self.view_host.as_mut() {
            view_host.show();
        }
    }

    pub fn on_paint(&mut self, canvas: &mut dyn Canvas) -> PaintOutcome {
        match self.view_host.as_mut() {
            Some(view_host) => view_host.paint(canvas),
            None => PaintOutcome::DefaultBackground,
        }
    }

    pub fn on_resize(&mut self, client_size: Size) {
        if let Some(view_host) = self.view_host.as_mut() {
            view_host.resize(client_size);
        }
    }

    pub fn on_activated(&mut self) {
        self.native.set_opacity(1.0);

        if let Some(view_host) = self.view_host.as_mut() {
            view_host.focus();
        }
    }

    pub fn on_deactivated(&mut self) {
        let Some(view_host) = self.view_host.as_mut() else {
            return;
        };
        if !view_host.is_live() {
            return;
        }

        if view_host.is_popup() {
            self.native.set_opacity(self.inactive_opacity);
        }
        view_host.unfocus();
    }

    /// Forwards a toolkit input event. Returns true when it reached the view.
    pub fn on_input(&mut self, event: &HostInput) -> bool {
        self.input.forward(self.view_host.as_mut(), event)
    }

    /// Releases the view. The window itself is dropped by the caller.
    pub fn on_closed(&mut self) {
        if let Some(view_host) = self.view_host.as_mut() {
            view_host.dispose();
        }
    }

    /// Turns the surface's pending dirty regions into toolkit invalidations.
    pub fn pump_surface(&mut self) -> usize {
        let Some(view_host) = self.view_host.as_mut() else {
            return 0;
        };

        let regions = view_host.take_surface_updates();
        for region in &regions {
            self.native.invalidate(*region);
        }
        regions.len()
    }

    pub fn poll_signals(&mut self) -> Vec<ViewSignal> {
        self.view_host
            .as_mut()
            .map(ViewHost::poll_signals)
            .unwrap_or_default()
    }
}
