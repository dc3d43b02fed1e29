//! The event-loop facing driver.
//!
//! A [`HostApp`] owns the [`SessionManager`], the toolkit's [`WindowFactory`]
//! and every open [`HostWindow`]. The toolkit feeds it window events through
//! [`HostApp::dispatch`] and paint requests through [`HostApp::paint`], and
//! calls [`HostApp::pump`] once per event-loop turn.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use url::Url;

use crate::config::HostConfig;
use crate::engine::{BrowserRuntime, ViewSignal};
use crate::errors::HostError;
use crate::host::popup::{PopupSpawner, SpawnOutcome};
use crate::host::view_host::ViewHost;
use crate::host::window::{Canvas, HostWindow, PaintOutcome, WindowEvent, WindowFactory, WindowId, WindowOptions};
use crate::session::{default_data_path, SessionManager};

pub struct HostApp {
    config: HostConfig,
    sessions: SessionManager,
    factory: Box<dyn WindowFactory>,
    windows: HashMap<WindowId, HostWindow>,
    data_path: PathBuf,
    spawner: PopupSpawner,
}

impl HostApp {
    /// Creates the driver. The runtime is not started until the first window opens.
    pub fn new(
        config: HostConfig,
        runtime: Box<dyn BrowserRuntime>,
        factory: Box<dyn WindowFactory>,
    ) -> Result<Self, HostError> {
        let data_path = match &config.data_path {
            Some(path) => path.clone(),
            None => default_data_path().map_err(|source| HostError::DataPath {
                path: PathBuf::from("Cache"),
                source,
            })?,
        };

        let sessions = SessionManager::new(runtime, config.runtime.clone(), config.preferences.clone());
        let spawner = PopupSpawner::new(config.child_window_size, config.inactive_popup_opacity);

        Ok(Self {
            config,
            sessions,
            factory,
            windows: HashMap::new(),
            data_path,
            spawner,
        })
    }

    /// Opens a top-level window navigated to `target`, or to the configured
    /// start page when `target` is `None`. Nothing is shown on failure.
    pub fn open_window(&mut self, target: Option<Url>) -> Result<WindowId, HostError> {
        let session = self.sessions.ensure_runtime_and_session(&self.data_path)?;
        let target = target.unwrap_or_else(|| self.config.start_page.clone());

        let id = WindowId::new();
        let options = WindowOptions::top_level(target.as_str(), self.config.window_size);
        let mut native = self
            .factory
            .create_window(id, &options)
            .map_err(HostError::WindowCreation)?;

        let client_size = native.client_size();
        let view_host = match ViewHost::create(&mut self.sessions, &session, client_size, &target) {
            Ok(view_host) => view_host,
            Err(e) => {
                native.close();
                return Err(e);
            }
        };

        let mut window = HostWindow::new(id, native, None, Some(view_host), self.config.inactive_popup_opacity);
        self.sessions.register_window();
        window.show();
        self.windows.insert(id, window);

        log::info!("Window[{}]: opened on {}", id, target);
        Ok(id)
    }

    /// Routes a toolkit event to its window.
    pub fn dispatch(&mut self, id: WindowId, event: WindowEvent) {
        let Some(window) = self.windows.get_mut(&id) else {
            log::debug!("Window[{}]: ignoring {:?} for unknown window", id, event);
            return;
        };

        match event {
            WindowEvent::Resized(size) => window.on_resize(size),
            WindowEvent::Activated => window.on_activated(),
            WindowEvent::Deactivated => window.on_deactivated(),
            WindowEvent::Input(input) => {
                window.on_input(&input);
            }
            WindowEvent::Closed => self.finish_close(id, false),
        }
    }

    pub fn paint(&mut self, id: WindowId, canvas: &mut dyn Canvas) -> PaintOutcome {
        match self.windows.get_mut(&id) {
            Some(window) => window.on_paint(canvas),
            None => PaintOutcome::DefaultBackground,
        }
    }

    /// Runs one event-loop turn: surface updates become invalidations, then
    /// the signals of every view are handled.
    pub fn pump(&mut self) {
        for window in self.windows.values_mut() {
            window.pump_surface();
        }

        let ids: Vec<WindowId> = self.windows.keys().copied().collect();
        for id in ids {
            let signals = match self.windows.get_mut(&id) {
                Some(window) => window.poll_signals(),
                None => continue,
            };
            for signal in signals {
                self.handle_signal(id, signal);
            }
        }
    }

    fn handle_signal(&mut self, id: WindowId, signal: ViewSignal) {
        match signal {
            ViewSignal::ChildRequested(mut spec) => {
                let Some(requesting) = self.windows.get_mut(&id) else {
                    spec.cancel();
                    return;
                };

                match self
                    .spawner
                    .handle(spec, requesting, self.factory.as_mut(), &mut self.sessions)
                {
                    SpawnOutcome::Spawned(window) => {
                        self.windows.insert(window.id(), window);
                    }
                    outcome => log::debug!("Window[{}]: child request ended as {:?}", id, outcome),
                }
            }
            ViewSignal::CloseRequested => {
                let is_popup = self.windows.get(&id).is_some_and(HostWindow::is_popup);
                if is_popup {
                    self.close_window(id);
                } else {
                    log::debug!("Window[{}]: ignoring close request from a top-level view", id);
                }
            }
            ViewSignal::Crashed { status } => {
                log::error!("Window[{}]: view crashed, status: {}", id, status);
            }
            ViewSignal::AddressChanged(url) => {
                if let Some(window) = self.windows.get_mut(&id) {
                    window.native_mut().set_title(url.as_str());
                }
            }
            ViewSignal::TitleChanged(title) => {
                if let Some(window) = self.windows.get_mut(&id) {
                    window.native_mut().set_title(&title);
                }
            }
        }
    }

    /// Closes a window from the host side.
    pub fn close_window(&mut self, id: WindowId) {
        self.finish_close(id, true);
    }

    fn finish_close(&mut self, id: WindowId, close_native: bool) {
        let Some(mut window) = self.windows.remove(&id) else {
            return;
        };

        window.on_closed();
        if close_native {
            window.native_mut().close();
        }
        drop(window);

        log::debug!("Window[{}]: closed", id);
        self.sessions.release_window();
    }

    pub fn window(&self, id: WindowId) -> Option<&HostWindow> {
        self.windows.get(&id)
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    pub fn open_windows(&self) -> usize {
        self.sessions.open_windows()
    }

    pub fn is_runtime_running(&self) -> bool {
        self.sessions.is_runtime_running()
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::backends::null::NullRuntime;
    use crate::geometry::Size;
    use crate::host::headless::{HeadlessCanvas, HeadlessWindowFactory};

    fn app(dir: &tempfile::TempDir) -> (HostApp, NullRuntime, HeadlessWindowFactory) {
        let runtime = NullRuntime::new();
        let factory = HeadlessWindowFactory::new();
        let config = HostConfig::builder().data_path(dir.path()).build().unwrap();
        let app = HostApp::new(config, Box::new(runtime.clone()), Box::new(factory.clone())).unwrap();
        (app, runtime, factory)
    }

    #[test]
    fn open_window_uses_start_page_and_window_size() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, runtime, factory) = app(&dir);

        let id = app.open_window(None).unwrap();
        let view = app.window(id).and_then(HostWindow::view_host).map(ViewHost::id).unwrap();

        assert_eq!(runtime.current_url(view).unwrap().as_str(), "http://www.google.com/ncr");
        let native = factory.window(id).unwrap();
        assert!(native.visible);
        assert_eq!(native.client_size, Size::new(1024, 768));
        assert_eq!(app.open_windows(), 1);
    }

    #[test]
    fn pump_invalidates_and_paint_draws() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _runtime, factory) = app(&dir);
        let id = app.open_window(None).unwrap();

        app.pump();
        assert!(!factory.take_invalidations(id).is_empty());

        let mut canvas = HeadlessCanvas::new();
        assert_eq!(app.paint(id, &mut canvas), PaintOutcome::Painted);
        let image = canvas.image.unwrap();
        assert_eq!((image.width, image.height), (1024, 768));
    }

    #[test]
    fn address_changes_update_the_title() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _runtime, factory) = app(&dir);
        let target = Url::parse("https://example.com/page").unwrap();
        let id = app.open_window(Some(target)).unwrap();

        app.pump();
        assert_eq!(factory.window(id).unwrap().title, "https://example.com/page");
    }

    #[test]
    fn unknown_window_events_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _runtime, _factory) = app(&dir);

        app.dispatch(WindowId::new(), WindowEvent::Activated);
        let mut canvas = HeadlessCanvas::new();
        assert_eq!(app.paint(WindowId::new(), &mut canvas), PaintOutcome::DefaultBackground);
    }

    #[test]
    fn window_creation_failure_is_a_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _runtime, factory) = app(&dir);
        factory.fail_next();

        assert!(matches!(app.open_window(None), Err(HostError::WindowCreation(_))));
        assert_eq!(app.open_windows(), 0);
        assert!(app.window_ids().is_empty());
    }
}
