//! View host: one engine view, its surface, and its lifecycle.
//!
//! ```text
//!   Created ──show──▶ Live ◀──resize(w>0,h>0)── Suspended
//!                      │  └──resize(w<=0|h<=0)──▶   │
//!                      └──────────dispose────────▶ Disposed ◀──dispose──┘
//! ```
//!
//! Every operation checks liveness first. Calls arriving before the host is
//! shown, after it was disposed, or after the engine reported the view dead
//! are silently ignored: they are an expected race between the event loop and
//! teardown, not an error.

use url::Url;

use crate::engine::{EngineView, SessionHandle, ViewId, ViewSignal};
use crate::errors::HostError;
use crate::geometry::{Point, Rect, Size};
use crate::host::window::{Canvas, PaintOutcome};
use crate::render::Surface;
use crate::session::SessionManager;

/// Lifecycle state of a [`ViewHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// View exists and has a surface, window not shown yet
    Created,
    /// Shown, rendering and receiving input
    Live,
    /// Rendering paused because the client area is degenerate
    Suspended,
    /// View released; terminal
    Disposed,
}

pub struct ViewHost {
    view: Option<Box<dyn EngineView>>,
    view_id: ViewId,
    /// View that opened this one. A relation only, never used to reach it.
    parent_view: Option<ViewId>,
    surface: Surface,
    state: ViewState,
    /// Regions announced by the surface and not painted yet
    pending_repaint: Vec<Rect>,
}

impl ViewHost {
    /// Creates a top-level view host: a new engine view sized to
    /// `client_size`, bound to `session`, navigated to `target`.
    pub fn create(
        sessions: &mut SessionManager,
        session: &SessionHandle,
        client_size: Size,
        target: &Url,
    ) -> Result<Self, HostError> {
        let width = client_size.width.max(1) as u32;
        let height = client_size.height.max(1) as u32;
        let view = sessions.create_view(width, height, session)?;

        let mut host = Self::attach(view, None);
        if let Some(view) = host.view.as_mut() {
            view.navigate(target);
            view.focus();
        }

        log::debug!("View[{}]: created {}x{} for {}", host.view_id, width, height, target);
        Ok(host)
    }

    /// Wraps a view the engine created on behalf of `parent`. The view is
    /// resized once to `client_size` so its buffer matches the host window.
    pub fn wrap(view: Box<dyn EngineView>, parent: ViewId, client_size: Size) -> Self {
        let mut host = Self::attach(view, Some(parent));

        if let Some(view) = host.view.as_mut() {
            match client_size.to_pixels() {
                Some((width, height)) => view.resize(width, height),
                None => log::debug!("View[{}]: skipping initial resize to {:?}", host.view_id, client_size),
            }
            view.focus();
        }

        log::debug!("View[{}]: wrapped as child of {}", host.view_id, parent);
        host
    }

    fn attach(mut view: Box<dyn EngineView>, parent_view: Option<ViewId>) -> Self {
        let surface = Surface::new();
        view.set_surface(surface.sink());

        Self {
            view_id: view.id(),
            view: Some(view),
            parent_view,
            surface,
            state: ViewState::Created,
            pending_repaint: Vec::new(),
        }
    }

    pub fn id(&self) -> ViewId {
        self.view_id
    }

    pub fn parent_view(&self) -> Option<ViewId> {
        self.parent_view
    }

    pub fn is_popup(&self) -> bool {
        self.parent_view.is_some()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Live or Suspended, and the engine still considers the view alive.
    pub fn is_live(&self) -> bool {
        matches!(self.state, ViewState::Live | ViewState::Suspended)
            && self.view.as_ref().is_some_and(|view| view.is_live())
    }

    pub fn is_rendering(&self) -> bool {
        self.state == ViewState::Live
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Regions waiting for the next paint.
    pub fn pending_repaint(&self) -> &[Rect] {
        &self.pending_repaint
    }

    fn live_view(&mut self) -> Option<&mut Box<dyn EngineView>> {
        if !self.is_live() {
            log::trace!("View[{}]: ignoring call in state {:?}", self.view_id, self.state);
            return None;
        }
        self.view.as_mut()
    }

    /// The engine view, only while the host is live.
    pub fn live_view_mut(&mut self) -> Option<&mut dyn EngineView> {
        match self.live_view() {
            Some(view) => Some(view.as_mut()),
            None => None,
        }
    }

    /// Created → Live, once the host window is shown.
    pub fn show(&mut self) {
        if self.state == ViewState::Created {
            self.state = ViewState::Live;
        }
    }

    /// Drains the surface's dirty regions and records them for repaint.
    /// Returns the regions the toolkit should invalidate.
    pub fn take_surface_updates(&mut self) -> Vec<Rect> {
        let regions = self.surface.take_dirty();
        if self.state == ViewState::Disposed {
            return Vec::new();
        }

        self.pending_repaint.extend_from_slice(&regions);
        regions
    }

    /// Draws the current surface image unscaled at the origin. Hosts that are
    /// not shown yet, or already disposed, leave the default background.
    pub fn paint(&mut self, canvas: &mut dyn Canvas) -> PaintOutcome {
        self.pending_repaint.clear();
        if !matches!(self.state, ViewState::Live | ViewState::Suspended) {
            return PaintOutcome::DefaultBackground;
        }

        self.surface
            .with_image(|image| canvas.draw_image_unscaled(image, Point::ORIGIN))
            .map(|_| PaintOutcome::Painted)
            .unwrap_or(PaintOutcome::DefaultBackground)
    }

    /// Applies a new client size. Degenerate sizes suspend rendering instead
    /// of reaching the engine.
    pub fn resize(&mut self, client_size: Size) {
        let view_id = self.view_id;
        let was_suspended = self.state == ViewState::Suspended;
        let Some(view) = self.live_view() else {
            return;
        };

        let Some((width, height)) = client_size.to_pixels() else {
            if !was_suspended {
                log::debug!("View[{}]: suspending rendering at {:?}", view_id, client_size);
                view.set_rendering(false);
            }
            self.state = ViewState::Suspended;
            return;
        };

        if was_suspended {
            log::debug!("View[{}]: resuming rendering", view_id);
            view.set_rendering(true);
        }
        view.resize(width, height);
        self.state = ViewState::Live;
    }

    pub fn focus(&mut self) {
        if let Some(view) = self.live_view() {
            view.focus();
        }
    }

    pub fn unfocus(&mut self) {
        if let Some(view) = self.live_view() {
            view.unfocus();
        }
    }

    pub fn navigate(&mut self, url: &Url) {
        if let Some(view) = self.live_view() {
            view.navigate(url);
        }
    }

    /// Signals emitted by the view since the last call. A crashed view still
    /// reports its crash; a disposed one reports nothing.
    pub fn poll_signals(&mut self) -> Vec<ViewSignal> {
        match self.view.as_mut() {
            Some(view) => view.poll_signals(),
            None => Vec::new(),
        }
    }

    /// Releases the engine view. The surface stays with the host until it is
    /// dropped; the engine releases its side together with the view.
    ///
    /// Child requests the view emitted but nobody polled yet are cancelled
    /// first: once the view is gone there is no host left to wrap them.
    pub fn dispose(&mut self) {
        if let Some(mut view) = self.view.take() {
            for signal in view.poll_signals() {
                if let ViewSignal::ChildRequested(mut spec) = signal {
                    spec.cancel();
                    log::debug!("View[{}]: cancelled pending child request for {}", self.view_id, spec.target_url);
                }
            }
            view.dispose();
            log::debug!("View[{}]: disposed", self.view_id);
        }
        self.state = ViewState::Disposed;
        self.pending_repaint.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::backends::null::{NullRuntime, ViewCall};
    use crate::engine::{RuntimeConfig, SessionPreferences};
    use crate::render::PixelBuffer;

    struct RecordingCanvas {
        draws: Vec<(u32, u32, Point)>,
    }

    impl Canvas for RecordingCanvas {
        fn draw_image_unscaled(&mut self, image: &PixelBuffer, at: Point) {
            self.draws.push((image.width, image.height, at));
        }
    }

    struct Fixture {
        runtime: NullRuntime,
        sessions: SessionManager,
        session: SessionHandle,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let runtime = NullRuntime::new();
        let mut sessions = SessionManager::new(
            Box::new(runtime.clone()),
            RuntimeConfig::default(),
            SessionPreferences::default(),
        );
        let session = sessions.ensure_runtime_and_session(dir.path()).unwrap();
        Fixture { runtime, sessions, session, _dir: dir }
    }

    fn live_host(f: &mut Fixture, size: Size) -> ViewHost {
        let url = Url::parse("https://example.com/").unwrap();
        let mut host = ViewHost::create(&mut f.sessions, &f.session, size, &url).unwrap();
        host.show();
        host
    }

    #[test]
    fn top_level_navigates_and_focuses() {
        let mut f = fixture();
        let host = live_host(&mut f, Size::new(800, 600));

        let calls = f.runtime.calls(host.id());
        assert_eq!(calls[0], ViewCall::SetSurface);
        assert_eq!(calls[1], ViewCall::Navigate(Url::parse("https://example.com/").unwrap()));
        assert_eq!(calls[2], ViewCall::Focus);
        assert!(!host.is_popup());
        assert_eq!(host.state(), ViewState::Live);
    }

    #[test]
    fn created_host_ignores_resize_until_shown() {
        let mut f = fixture();
        let url = Url::parse("https://example.com/").unwrap();
        let mut host = ViewHost::create(&mut f.sessions, &f.session, Size::new(800, 600), &url).unwrap();

        host.resize(Size::new(1024, 768));
        assert!(f.runtime.resize_calls(host.id()).is_empty());
        assert_eq!(host.state(), ViewState::Created);
    }

    #[test]
    fn zero_width_suspends_then_resumes_with_one_resize() {
        let mut f = fixture();
        let mut host = live_host(&mut f, Size::new(800, 600));

        host.resize(Size::new(0, 600));
        assert_eq!(host.state(), ViewState::Suspended);
        assert!(!host.is_rendering());
        assert!(f.runtime.resize_calls(host.id()).is_empty());

        host.resize(Size::new(1024, 600));
        assert!(host.is_rendering());
        assert_eq!(f.runtime.resize_calls(host.id()), vec![(1024, 600)]);
    }

    #[test]
    fn engine_never_sees_non_positive_sizes() {
        let mut f = fixture();
        let mut host = live_host(&mut f, Size::new(800, 600));

        let sizes = [
            Size::new(0, 0),
            Size::new(-10, 300),
            Size::new(300, 0),
            Size::new(640, 480),
            Size::new(0, 480),
            Size::new(-1, -1),
            Size::new(1, 1),
            Size::new(320, -4),
        ];
        for size in sizes {
            host.resize(size);
        }

        let resizes = f.runtime.resize_calls(host.id());
        assert_eq!(resizes, vec![(640, 480), (1, 1)]);
        assert_eq!(host.state(), ViewState::Suspended);
    }

    #[test]
    fn suspension_is_reported_to_the_engine_once() {
        let mut f = fixture();
        let mut host = live_host(&mut f, Size::new(800, 600));

        host.resize(Size::new(0, 0));
        host.resize(Size::new(0, 10));
        host.resize(Size::new(10, 10));

        let toggles: Vec<_> = f
            .runtime
            .calls(host.id())
            .into_iter()
            .filter(|c| matches!(c, ViewCall::SetRendering(_)))
            .collect();
        assert_eq!(toggles, vec![ViewCall::SetRendering(false), ViewCall::SetRendering(true)]);
    }

    #[test]
    fn paint_draws_surface_at_origin() {
        let mut f = fixture();
        let mut host = live_host(&mut f, Size::new(800, 600));
        host.resize(Size::new(320, 200));

        let regions = host.take_surface_updates();
        assert!(!regions.is_empty());
        assert_eq!(host.pending_repaint(), regions.as_slice());

        let mut canvas = RecordingCanvas { draws: vec![] };
        assert_eq!(host.paint(&mut canvas), PaintOutcome::Painted);
        assert_eq!(canvas.draws, vec![(320, 200, Point::ORIGIN)]);
        assert!(host.pending_repaint().is_empty());
    }

    #[test]
    fn unshown_host_paints_default_background() {
        let mut f = fixture();
        let url = Url::parse("https://example.com/").unwrap();
        let mut host = ViewHost::create(&mut f.sessions, &f.session, Size::new(800, 600), &url).unwrap();
        assert!(host.surface().has_image());

        let mut canvas = RecordingCanvas { draws: vec![] };
        assert_eq!(host.paint(&mut canvas), PaintOutcome::DefaultBackground);
        assert!(canvas.draws.is_empty());

        host.show();
        assert_eq!(host.paint(&mut canvas), PaintOutcome::Painted);
        assert_eq!(canvas.draws.len(), 1);
    }

    #[test]
    fn disposed_host_paints_default_background_and_ignores_calls() {
        let mut f = fixture();
        let mut host = live_host(&mut f, Size::new(800, 600));
        host.dispose();

        let mut canvas = RecordingCanvas { draws: vec![] };
        assert_eq!(host.paint(&mut canvas), PaintOutcome::DefaultBackground);
        assert!(canvas.draws.is_empty());

        host.resize(Size::new(100, 100));
        host.focus();
        host.unfocus();
        host.navigate(&Url::parse("https://example.org/").unwrap());
        host.dispose();

        let calls = f.runtime.calls(host.id());
        assert_eq!(calls.last(), Some(&ViewCall::Dispose));
        assert_eq!(calls.iter().filter(|c| **c == ViewCall::Dispose).count(), 1);
        assert!(!host.is_live());
    }

    #[test]
    fn crashed_view_is_not_live() {
        let mut f = fixture();
        let mut host = live_host(&mut f, Size::new(800, 600));
        f.runtime.crash(host.id(), "gone");

        assert!(!host.is_live());
        host.resize(Size::new(10, 10));
        assert!(f.runtime.resize_calls(host.id()).is_empty());

        let signals = host.poll_signals();
        assert!(signals.iter().any(|s| matches!(s, ViewSignal::Crashed { .. })));
    }

    #[test]
    fn wrapped_child_gets_one_forced_resize() {
        let mut f = fixture();
        let parent = live_host(&mut f, Size::new(800, 600));
        let child_id = f
            .runtime
            .request_child(
                parent.id(),
                crate::engine::ChildKind::WindowOpen,
                None,
                Url::parse("https://example.com/child").unwrap(),
            )
            .unwrap();

        let mut parent = parent;
        let mut spec = match parent.poll_signals().into_iter().find_map(|s| match s {
            ViewSignal::ChildRequested(spec) => Some(spec),
            _ => None,
        }) {
            Some(spec) => spec,
            None => panic!("no child request"),
        };

        let view = spec.new_view.take().unwrap();
        let child = ViewHost::wrap(view, parent.id(), Size::new(640, 480));

        assert_eq!(child.id(), child_id);
        assert_eq!(child.parent_view(), Some(parent.id()));
        assert!(child.is_popup());
        assert_eq!(f.runtime.resize_calls(child_id), vec![(640, 480)]);
        assert!(!f.runtime.calls(child_id).iter().any(|c| matches!(c, ViewCall::Navigate(_))));
    }
}
