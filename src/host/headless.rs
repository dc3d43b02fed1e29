//! Headless host toolkit.
//!
//! An in-memory [`WindowFactory`] whose windows only record what was asked of
//! them. The factory is cheap to clone; keep a clone to inspect the windows
//! after handing the other one to [`HostApp`](crate::host::HostApp).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use crate::geometry::{Point, Rect, Size};
use crate::host::window::{Canvas, NativeWindow, WindowFactory, WindowId, WindowOptions};
use crate::render::PixelBuffer;

/// Everything a headless window was told.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWindowState {
    pub options: WindowOptions,
    pub client_size: Size,
    pub position: Option<Point>,
    pub opacity: f32,
    pub title: String,
    pub visible: bool,
    pub owner: Option<WindowId>,
    pub invalidations: Vec<Rect>,
    pub closed: bool,
}

#[derive(Default)]
struct FactoryState {
    fail_next: bool,
    order: Vec<WindowId>,
    windows: HashMap<WindowId, HeadlessWindowState>,
}

#[derive(Clone, Default)]
pub struct HeadlessWindowFactory {
    state: Arc<Mutex<FactoryState>>,
}

impl HeadlessWindowFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next [`WindowFactory::create_window`] call fail.
    pub fn fail_next(&self) {
        self.with(|s| s.fail_next = true);
    }

    fn with<R>(&self, f: impl FnOnce(&mut FactoryState) -> R) -> Option<R> {
        self.state.lock().ok().map(|mut state| f(&mut state))
    }

    /// Ids of every window created so far, in creation order.
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.with(|s| s.order.clone()).unwrap_or_default()
    }

    pub fn window(&self, id: WindowId) -> Option<HeadlessWindowState> {
        self.with(|s| s.windows.get(&id).cloned()).flatten()
    }

    /// Simulates the user resizing the window. The caller still has to
    /// dispatch the matching resize event.
    pub fn set_client_size(&self, id: WindowId, size: Size) {
        self.with(|s| {
            if let Some(window) = s.windows.get_mut(&id) {
                window.client_size = size;
            }
        });
    }

    /// Returns and clears the regions invalidated on `id`.
    pub fn take_invalidations(&self, id: WindowId) -> Vec<Rect> {
        self.with(|s| {
            s.windows
                .get_mut(&id)
                .map(|w| std::mem::take(&mut w.invalidations))
                .unwrap_or_default()
        })
        .unwrap_or_default()
    }
}

impl WindowFactory for HeadlessWindowFactory {
    fn create_window(&mut self, id: WindowId, options: &WindowOptions) -> anyhow::Result<Box<dyn NativeWindow>> {
        let created = self.with(|s| {
            if std::mem::take(&mut s.fail_next) {
                return false;
            }

            s.order.push(id);
            s.windows.insert(
                id,
                HeadlessWindowState {
                    options: options.clone(),
                    client_size: options.client_size,
                    position: None,
                    opacity: 1.0,
                    title: options.title.clone(),
                    visible: false,
                    owner: None,
                    invalidations: Vec::new(),
                    closed: false,
                },
            );
            true
        });

        match created {
            Some(true) => Ok(Box::new(HeadlessWindow {
                id,
                factory: self.clone(),
            })),
            Some(false) => Err(anyhow!("headless window creation refused")),
            None => Err(anyhow!("headless factory state poisoned")),
        }
    }
}

pub struct HeadlessWindow {
    id: WindowId,
    factory: HeadlessWindowFactory,
}

impl HeadlessWindow {
    fn update(&self, f: impl FnOnce(&mut HeadlessWindowState)) {
        self.factory.with(|s| {
            if let Some(window) = s.windows.get_mut(&self.id) {
                f(window);
            }
        });
    }
}

impl NativeWindow for HeadlessWindow {
    fn client_size(&self) -> Size {
        self.factory.window(self.id).map(|w| w.client_size).unwrap_or_default()
    }

    fn set_position(&mut self, position: Point) {
        self.update(|w| w.position = Some(position));
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.update(|w| w.opacity = opacity);
    }

    fn set_title(&mut self, title: &str) {
        self.update(|w| w.title = title.to_string());
    }

    fn invalidate(&mut self, region: Rect) {
        self.update(|w| w.invalidations.push(region));
    }

    fn show(&mut self, owner: Option<WindowId>) {
        self.update(|w| {
            w.visible = true;
            w.owner = owner;
        });
    }

    fn close(&mut self) {
        self.update(|w| {
            w.visible = false;
            w.closed = true;
        });
    }
}

/// A canvas that keeps a copy of the last image drawn on it.
#[derive(Default)]
pub struct HeadlessCanvas {
    pub draws: usize,
    pub last_origin: Option<Point>,
    pub image: Option<PixelBuffer>,
}

impl HeadlessCanvas {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Canvas for HeadlessCanvas {
    fn draw_image_unscaled(&mut self, image: &PixelBuffer, at: Point) {
        self.draws += 1;
        self.last_origin = Some(at);
        self.image = Some(image.clone());
    }
}
