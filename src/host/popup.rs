//! Popup spawning.
//!
//! Every [`PendingChildSpec`] that reaches the [`PopupSpawner`] either ends up
//! wrapped in a new host window or cancelled. A new view that is neither keeps
//! its parent alive inside the engine.

use url::Url;

use crate::engine::{ChildKind, EngineView, PendingChildSpec};
use crate::geometry::Size;
use crate::host::view_host::ViewHost;
use crate::host::window::{HostWindow, WindowFactory, WindowId, WindowOptions};
use crate::session::SessionManager;

/// Client size of a child window when the request does not name one.
pub const DEFAULT_CHILD_SIZE: Size = Size {
    width: 640,
    height: 480,
};

/// What the spawner did with a child request.
pub enum SpawnOutcome {
    /// A new host window now hosts the child view
    Spawned(HostWindow),
    /// The requesting view was navigated to `target` instead
    Redirected { target: Url, cancelled: bool },
    /// The request was dropped; `cancelled` is true if a view was cancelled
    Discarded { cancelled: bool },
    /// The request carried no view to wrap
    Ignored,
}

impl std::fmt::Debug for SpawnOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpawnOutcome::Spawned(window) => f.debug_tuple("Spawned").field(&window.id()).finish(),
            SpawnOutcome::Redirected { target, cancelled } => f
                .debug_struct("Redirected")
                .field("target", &target.as_str())
                .field("cancelled", cancelled)
                .finish(),
            SpawnOutcome::Discarded { cancelled } => f.debug_struct("Discarded").field("cancelled", cancelled).finish(),
            SpawnOutcome::Ignored => write!(f, "Ignored"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PopupSpawner {
    default_size: Size,
    inactive_opacity: f32,
}

impl Default for PopupSpawner {
    fn default() -> Self {
        Self::new(DEFAULT_CHILD_SIZE, 0.8)
    }
}

impl PopupSpawner {
    pub fn new(default_size: Size, inactive_opacity: f32) -> Self {
        Self {
            default_size,
            inactive_opacity,
        }
    }

    /// Handles a child request coming from the view hosted by `requesting`.
    pub fn handle(
        &self,
        mut spec: PendingChildSpec,
        requesting: &mut HostWindow,
        factory: &mut dyn WindowFactory,
        sessions: &mut SessionManager,
    ) -> SpawnOutcome {
        let live = requesting.view_host().is_some_and(ViewHost::is_live);
        if !live {
            let cancelled = spec.cancel();
            log::debug!("Window[{}]: discarding child request from a view that is not live", requesting.id());
            return SpawnOutcome::Discarded { cancelled };
        }

        match spec.kind {
            ChildKind::Redirect => {
                let cancelled = spec.cancel();
                if let Some(view_host) = requesting.view_host_mut() {
                    view_host.navigate(&spec.target_url);
                }
                log::debug!("Window[{}]: redirecting to {}", requesting.id(), spec.target_url);
                SpawnOutcome::Redirected {
                    target: spec.target_url.clone(),
                    cancelled,
                }
            }
            ChildKind::Popup | ChildKind::WindowOpen | ChildKind::PostNavigation => {
                let Some(view) = spec.new_view.take() else {
                    log::warn!("Window[{}]: {:?} request without a view, dropping", requesting.id(), spec.kind);
                    return SpawnOutcome::Ignored;
                };
                self.spawn(spec, view, requesting, factory, sessions)
            }
        }
    }

    fn spawn(
        &self,
        spec: PendingChildSpec,
        mut view: Box<dyn EngineView>,
        requesting: &HostWindow,
        factory: &mut dyn WindowFactory,
        sessions: &mut SessionManager,
    ) -> SpawnOutcome {
        let Some(parent) = requesting.view_host().map(ViewHost::id) else {
            view.cancel();
            return SpawnOutcome::Discarded { cancelled: true };
        };

        let title = spec.target_url.as_str();
        let (options, position) = match spec.kind {
            ChildKind::Popup => {
                let requested = spec.initial_position.unwrap_or_default();
                let size = if requested.size.is_degenerate() {
                    self.default_size
                } else {
                    requested.size
                };
                let position = (!requested.origin.is_origin()).then_some(requested.origin);
                (WindowOptions::popup(title, size), position)
            }
            _ => (WindowOptions::top_level(title, self.default_size), None),
        };

        let id = WindowId::new();
        let native = match factory.create_window(id, &options) {
            Ok(native) => native,
            Err(e) => {
                log::error!("Window[{}]: could not create child window: {:#}", requesting.id(), e);
                view.cancel();
                return SpawnOutcome::Discarded { cancelled: true };
            }
        };

        // The toolkit may clamp the requested size; the view follows the real one.
        let client_size = native.client_size();
        let view_host = ViewHost::wrap(view, parent, client_size);
        let mut window = HostWindow::new(id, native, Some(requesting.id()), Some(view_host), self.inactive_opacity);
        sessions.register_window();
        window.show();

        if let Some(position) = position {
            window.native_mut().set_position(position);
        }

        log::debug!(
            "Window[{}]: spawned {:?} child {} at {}x{}",
            requesting.id(),
            spec.kind,
            id,
            client_size.width,
            client_size.height
        );
        SpawnOutcome::Spawned(window)
    }
}
