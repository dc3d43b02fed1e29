//! Null engine.
//!
//! [`NullRuntime`] and [`NullView`] implement the engine collaborator without
//! loading or rendering any page. A view fills its surface with a solid colour
//! whenever it is resized, which is enough to drive the host's paint pipeline.
//!
//! Every call the host makes on a view is recorded as a [`ViewCall`], and the
//! runtime can be asked to emit view signals (child requests, close requests,
//! crashes) the way a real engine would. `NullRuntime` is cheap to clone: keep
//! a clone around to inspect what the host did after boxing the other one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use url::Url;

use crate::engine::child::{ChildKind, PendingChildSpec};
use crate::engine::events::{KeyboardEvent, MouseButton};
use crate::engine::preferences::SessionPreferences;
use crate::engine::runtime::{BrowserRuntime, RuntimeConfig, SessionHandle, SessionId};
use crate::engine::view::{EngineView, ViewId, ViewSignal};
use crate::geometry::Rect;
use crate::render::SurfaceSink;

const NULL_VERSION: &str = "null-engine/0.1";
const DEFAULT_FILL: [u8; 4] = [0x20, 0x20, 0x40, 0xff];

/// A call made by the host on a [`NullView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    Resize { width: u32, height: u32 },
    SetRendering(bool),
    SetSurface,
    Navigate(Url),
    Focus,
    Unfocus,
    Keyboard(KeyboardEvent),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    MouseMove { x: i32, y: i32 },
    MouseWheel { scroll_y: i32, scroll_x: i32 },
    Dispose,
    Cancel,
}

struct NullViewState {
    parent: Option<ViewId>,
    session: Option<SessionId>,
    live: bool,
    rendering: bool,
    cancelled: bool,
    size: (u32, u32),
    fill: [u8; 4],
    url: Option<Url>,
    sink: Option<SurfaceSink>,
    calls: Vec<ViewCall>,
    signals: Vec<ViewSignal>,
}

impl NullViewState {
    fn new(parent: Option<ViewId>, session: Option<SessionId>, size: (u32, u32), fill: [u8; 4]) -> Self {
        Self {
            parent,
            session,
            live: true,
            rendering: true,
            cancelled: false,
            size,
            fill,
            url: None,
            sink: None,
            calls: Vec::new(),
            signals: Vec::new(),
        }
    }

    /// Reallocates and fills the surface, if one is attached and rendering is on.
    fn repaint(&self) {
        if !self.rendering {
            return;
        }
        let Some(sink) = &self.sink else {
            return;
        };

        let (width, height) = self.size;
        sink.resize(width, height);
        sink.fill(Rect::from_xywh(0, 0, width as i32, height as i32), self.fill);
    }
}

#[derive(Default)]
struct NullRuntimeState {
    running: bool,
    fail_init: bool,
    init_count: usize,
    shutdown_count: usize,
    fill: Option<[u8; 4]>,
    sessions: HashMap<PathBuf, SessionHandle>,
    views: HashMap<ViewId, Arc<Mutex<NullViewState>>>,
}

/// Runtime half of the null engine.
#[derive(Clone, Default)]
pub struct NullRuntime {
    state: Arc<Mutex<NullRuntimeState>>,
}

impl NullRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runtime whose initialization always fails.
    pub fn failing() -> Self {
        let runtime = Self::default();
        runtime.with(|s| s.fail_init = true);
        runtime
    }

    /// Colour new views fill their surface with, in RGBA order.
    pub fn with_fill(self, color: [u8; 4]) -> Self {
        self.with(|s| s.fill = Some(color));
        self
    }

    fn with<R>(&self, f: impl FnOnce(&mut NullRuntimeState) -> R) -> Option<R> {
        self.state.lock().ok().map(|mut state| f(&mut state))
    }

    fn view_state(&self, view: ViewId) -> Option<Arc<Mutex<NullViewState>>> {
        self.with(|s| s.views.get(&view).cloned()).flatten()
    }

    fn with_view<R>(&self, view: ViewId, f: impl FnOnce(&mut NullViewState) -> R) -> Option<R> {
        let state = self.view_state(view)?;
        let mut guard = state.lock().ok()?;
        Some(f(&mut guard))
    }

    fn register_view(&self, parent: Option<ViewId>, session: Option<SessionId>, size: (u32, u32)) -> NullView {
        let id = ViewId::new();
        let fill = self.with(|s| s.fill).flatten().unwrap_or(DEFAULT_FILL);
        let state = Arc::new(Mutex::new(NullViewState::new(parent, session, size, fill)));
        self.with(|s| s.views.insert(id, state.clone()));
        NullView { id, state }
    }

    pub fn init_count(&self) -> usize {
        self.with(|s| s.init_count).unwrap_or_default()
    }

    pub fn shutdown_count(&self) -> usize {
        self.with(|s| s.shutdown_count).unwrap_or_default()
    }

    /// Every view ever created by this runtime, in no particular order.
    pub fn view_ids(&self) -> Vec<ViewId> {
        self.with(|s| s.views.keys().copied().collect()).unwrap_or_default()
    }

    /// Calls the host made on `view`, in order.
    pub fn calls(&self, view: ViewId) -> Vec<ViewCall> {
        self.with_view(view, |v| v.calls.clone()).unwrap_or_default()
    }

    /// Sizes passed to [`EngineView::resize`] on `view`, in order.
    pub fn resize_calls(&self, view: ViewId) -> Vec<(u32, u32)> {
        self.calls(view)
            .into_iter()
            .filter_map(|call| match call {
                ViewCall::Resize { width, height } => Some((width, height)),
                _ => None,
            })
            .collect()
    }

    pub fn current_url(&self, view: ViewId) -> Option<Url> {
        self.with_view(view, |v| v.url.clone()).flatten()
    }

    pub fn session_of(&self, view: ViewId) -> Option<SessionId> {
        self.with_view(view, |v| v.session).flatten()
    }

    pub fn is_live(&self, view: ViewId) -> bool {
        self.with_view(view, |v| v.live).unwrap_or(false)
    }

    pub fn is_cancelled(&self, view: ViewId) -> bool {
        self.with_view(view, |v| v.cancelled).unwrap_or(false)
    }

    /// Queues `signal` on `view`; the host picks it up on its next pump.
    pub fn emit(&self, view: ViewId, signal: ViewSignal) -> bool {
        self.with_view(view, |v| v.signals.push(signal)).is_some()
    }

    /// Simulates a renderer crash: the view stops being live.
    pub fn crash(&self, view: ViewId, status: &str) -> bool {
        self.with_view(view, |v| {
            v.live = false;
            v.signals.push(ViewSignal::Crashed { status: status.to_string() });
        })
        .is_some()
    }

    /// Simulates the page in `parent` asking for a new view. The engine
    /// creates the child view up front, like a real engine does, and queues a
    /// [`ViewSignal::ChildRequested`] on the parent. Returns the child's id.
    pub fn request_child(&self, parent: ViewId, kind: ChildKind, initial_position: Option<Rect>, target_url: Url) -> Option<ViewId> {
        let session = self.with_view(parent, |v| v.session)?;
        let size = initial_position
            .and_then(|r| r.size.to_pixels())
            .unwrap_or((1, 1));

        let child = self.register_view(Some(parent), session, size);
        let child_id = child.id;

        let spec = PendingChildSpec {
            kind,
            initial_position,
            target_url,
            new_view: Some(Box::new(child)),
        };
        self.emit(parent, ViewSignal::ChildRequested(spec));
        Some(child_id)
    }
}

impl BrowserRuntime for NullRuntime {
    fn initialize(&mut self, config: &RuntimeConfig) -> Result<()> {
        let ok = self
            .with(|s| {
                if s.fail_init {
                    return false;
                }
                s.running = true;
                s.init_count += 1;
                true
            })
            .unwrap_or(false);

        if !ok {
            return Err(anyhow!("null runtime refused to start"));
        }

        log::debug!("NullRuntime: started (log level {:?}, UA {})", config.log_level, config.user_agent);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.with(|s| s.running).unwrap_or(false)
    }

    fn shutdown(&mut self) {
        self.with(|s| {
            if s.running {
                s.running = false;
                s.shutdown_count += 1;
                s.sessions.clear();
            }
        });
    }

    fn version(&self) -> String {
        NULL_VERSION.to_string()
    }

    fn create_session(&mut self, data_path: &Path, _preferences: &SessionPreferences) -> Result<SessionHandle> {
        self.with(|s| {
            if !s.running {
                return Err(anyhow!("runtime is not running"));
            }
            let session = s
                .sessions
                .entry(data_path.to_path_buf())
                .or_insert_with(|| SessionHandle::new(data_path));
            Ok(session.clone())
        })
        .unwrap_or_else(|| Err(anyhow!("null runtime state poisoned")))
    }

    fn session(&self, data_path: &Path) -> Option<SessionHandle> {
        self.with(|s| s.sessions.get(data_path).cloned()).flatten()
    }

    fn create_view(&mut self, width: u32, height: u32, session: &SessionHandle) -> Result<Box<dyn EngineView>> {
        if !self.is_running() {
            return Err(anyhow!("runtime is not running"));
        }
        Ok(Box::new(self.register_view(None, Some(session.id), (width, height))))
    }
}

/// View half of the null engine.
pub struct NullView {
    id: ViewId,
    state: Arc<Mutex<NullViewState>>,
}

impl NullView {
    fn with<R: Default>(&self, f: impl FnOnce(&mut NullViewState) -> R) -> R {
        self.state
            .lock()
            .map(|mut state| f(&mut state))
            .unwrap_or_default()
    }

    fn record(&self, call: ViewCall) {
        self.with(|s| s.calls.push(call));
    }
}

impl EngineView for NullView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn is_live(&self) -> bool {
        self.with(|s| s.live)
    }

    fn parent_view(&self) -> Option<ViewId> {
        self.with(|s| s.parent)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.with(|s| {
            s.calls.push(ViewCall::Resize { width, height });
            s.size = (width, height);
            s.repaint();
        });
    }

    fn set_rendering(&mut self, rendering: bool) {
        self.with(|s| {
            s.calls.push(ViewCall::SetRendering(rendering));
            s.rendering = rendering;
        });
    }

    fn set_surface(&mut self, sink: SurfaceSink) {
        self.with(|s| {
            s.calls.push(ViewCall::SetSurface);
            s.sink = Some(sink);
            s.repaint();
        });
    }

    fn navigate(&mut self, url: &Url) {
        self.with(|s| {
            s.calls.push(ViewCall::Navigate(url.clone()));
            s.url = Some(url.clone());
            s.signals.push(ViewSignal::AddressChanged(url.clone()));
        });
    }

    fn focus(&mut self) {
        self.record(ViewCall::Focus);
    }

    fn unfocus(&mut self) {
        self.record(ViewCall::Unfocus);
    }

    fn inject_keyboard(&mut self, event: KeyboardEvent) {
        self.record(ViewCall::Keyboard(event));
    }

    fn inject_mouse_down(&mut self, button: MouseButton) {
        self.record(ViewCall::MouseDown(button));
    }

    fn inject_mouse_up(&mut self, button: MouseButton) {
        self.record(ViewCall::MouseUp(button));
    }

    fn inject_mouse_move(&mut self, x: i32, y: i32) {
        self.record(ViewCall::MouseMove { x, y });
    }

    fn inject_mouse_wheel(&mut self, scroll_y: i32, scroll_x: i32) {
        self.record(ViewCall::MouseWheel { scroll_y, scroll_x });
    }

    fn dispose(&mut self) {
        self.with(|s| {
            s.calls.push(ViewCall::Dispose);
            s.live = false;
            s.sink = None;
        });
    }

    fn cancel(&mut self) {
        self.with(|s| {
            s.calls.push(ViewCall::Cancel);
            s.cancelled = true;
            s.live = false;
            s.sink = None;
        });
    }

    fn poll_signals(&mut self) -> Vec<ViewSignal> {
        self.with(|s| std::mem::take(&mut s.signals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Surface;

    fn running() -> (NullRuntime, SessionHandle) {
        let mut runtime = NullRuntime::new();
        runtime.initialize(&RuntimeConfig::default()).unwrap();
        let session = runtime
            .create_session(Path::new("/tmp/null-cache"), &SessionPreferences::default())
            .unwrap();
        (runtime, session)
    }

    #[test]
    fn views_require_a_running_runtime() {
        let mut runtime = NullRuntime::new();
        let session = SessionHandle::new("/tmp/null-cache");
        assert!(runtime.create_view(10, 10, &session).is_err());
    }

    #[test]
    fn resize_paints_attached_surface() {
        let (mut runtime, session) = running();
        let mut view = runtime.create_view(4, 3, &session).unwrap();
        let mut surface = Surface::new();

        view.set_surface(surface.sink());
        view.resize(8, 6);

        let snapshot = surface.snapshot().unwrap();
        assert_eq!((snapshot.width, snapshot.height), (8, 6));
        assert!(!surface.take_dirty().is_empty());
        assert_eq!(runtime.resize_calls(view.id()), vec![(8, 6)]);
    }

    #[test]
    fn paused_view_does_not_paint() {
        let (mut runtime, session) = running();
        let mut view = runtime.create_view(4, 3, &session).unwrap();
        let mut surface = Surface::new();

        view.set_rendering(false);
        view.set_surface(surface.sink());
        assert!(surface.take_dirty().is_empty());
        assert!(!surface.has_image());
    }

    #[test]
    fn child_requests_are_queued_on_the_parent() {
        let (mut runtime, session) = running();
        let mut parent = runtime.create_view(4, 3, &session).unwrap();
        let target = Url::parse("https://example.com/popup").unwrap();

        let child = runtime
            .request_child(parent.id(), ChildKind::Popup, Some(Rect::from_xywh(0, 0, 300, 200)), target.clone())
            .unwrap();

        let signals = parent.poll_signals();
        assert_eq!(signals.len(), 1);
        match &signals[0] {
            ViewSignal::ChildRequested(spec) => {
                assert_eq!(spec.kind, ChildKind::Popup);
                assert_eq!(spec.target_url, target);
                let view = spec.new_view.as_ref().unwrap();
                assert_eq!(view.id(), child);
                assert_eq!(view.parent_view(), Some(parent.id()));
            }
            other => panic!("unexpected signal {other:?}"),
        }
        assert!(parent.poll_signals().is_empty());
    }

    #[test]
    fn shutdown_forgets_sessions() {
        let (mut runtime, _session) = running();
        runtime.shutdown();
        assert!(!runtime.is_running());
        assert!(runtime.session(Path::new("/tmp/null-cache")).is_none());
        assert_eq!(runtime.shutdown_count(), 1);
    }
}
