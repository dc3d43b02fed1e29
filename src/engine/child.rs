//! Child view requests.
//!
//! When a page asks for a new view (`window.open`, a popup, a form posting to
//! a new target) the engine creates the view up front and hands it to the
//! host in a [`PendingChildSpec`]. The host must either wrap that view in a
//! new window or cancel it. A spec dropped while still holding its view
//! cancels the view, so a request can never keep a view alive next to its
//! parent.

use url::Url;

use crate::engine::view::EngineView;
use crate::geometry::Rect;

/// Why the engine is asking for a new view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    /// A popup with optional geometry hints (`window.open` with features)
    Popup,
    /// A plain `window.open` / `target=_blank` navigation
    WindowOpen,
    /// A form post targeting a new window
    PostNavigation,
    /// Any other request; the host reuses the current view instead
    Redirect,
}

/// A request to host a new view. Transient: consumed by the
/// [`PopupSpawner`](crate::host::PopupSpawner) in the same event-loop turn.
pub struct PendingChildSpec {
    pub kind: ChildKind,
    /// Requested screen rectangle. Only meaningful for [`ChildKind::Popup`].
    pub initial_position: Option<Rect>,
    /// URL the page asked to open
    pub target_url: Url,
    /// The view created by the engine. Absent for redirects that were never
    /// materialized as a view.
    pub new_view: Option<Box<dyn EngineView>>,
}

impl std::fmt::Debug for PendingChildSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingChildSpec")
            .field("kind", &self.kind)
            .field("initial_position", &self.initial_position)
            .field("target_url", &self.target_url.as_str())
            .field("new_view", &self.new_view.as_ref().map(|v| v.id()))
            .finish()
    }
}

impl PendingChildSpec {
    /// Tells the engine the new view is not being kept. No-op when there is
    /// no view to cancel.
    pub fn cancel(&mut self) -> bool {
        match self.new_view.take() {
            Some(mut view) => {
                view.cancel();
                true
            }
            None => false,
        }
    }
}

impl Drop for PendingChildSpec {
    fn drop(&mut self) {
        if self.cancel() {
            log::debug!("Child request for {} dropped unhandled, view cancelled", self.target_url);
        }
    }
}
