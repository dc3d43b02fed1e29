//! Host input translation.
//!
//! The toolkit hands us [`HostInput`] events; [`InputTranslator`] maps each one
//! to exactly one engine injection call and forwards it to a live view host.
//! Events are never batched, coalesced or reordered.

use crate::engine::{EngineView, KeyboardEvent, Modifiers, MouseButton};
use crate::host::view_host::ViewHost;

/// Mouse buttons as reported by the host toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMouseButton {
    Left,
    Right,
    Middle,
    XButton1,
    XButton2,
}

/// Input events as reported by the host toolkit.
#[derive(Debug, Clone, PartialEq)]
pub enum HostInput {
    /// A character was typed
    KeyPress { ch: char, modifiers: Modifiers },
    KeyDown { key_code: u32, modifiers: Modifiers },
    KeyUp { key_code: u32, modifiers: Modifiers },
    MouseDown { button: HostMouseButton },
    MouseUp { button: HostMouseButton },
    /// Absolute position in client coordinates
    MouseMove { x: i32, y: i32 },
    /// Vertical wheel delta
    MouseWheel { delta: i32 },
}

/// An engine injection call, ready to be applied to a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedInput {
    Keyboard(KeyboardEvent),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    MouseMove { x: i32, y: i32 },
    MouseWheel { scroll_y: i32, scroll_x: i32 },
}

impl InjectedInput {
    fn apply(self, view: &mut dyn EngineView) {
        match self {
            InjectedInput::Keyboard(event) => view.inject_keyboard(event),
            InjectedInput::MouseDown(button) => view.inject_mouse_down(button),
            InjectedInput::MouseUp(button) => view.inject_mouse_up(button),
            InjectedInput::MouseMove { x, y } => view.inject_mouse_move(x, y),
            InjectedInput::MouseWheel { scroll_y, scroll_x } => view.inject_mouse_wheel(scroll_y, scroll_x),
        }
    }
}

/// Maps a toolkit mouse button onto the engine's. Extra buttons have no
/// engine counterpart.
pub fn translate_mouse_button(button: HostMouseButton) -> Option<MouseButton> {
    match button {
        HostMouseButton::Left => Some(MouseButton::Left),
        HostMouseButton::Middle => Some(MouseButton::Middle),
        HostMouseButton::Right => Some(MouseButton::Right),
        HostMouseButton::XButton1 | HostMouseButton::XButton2 => None,
    }
}

#[derive(Debug, Default)]
pub struct InputTranslator;

impl InputTranslator {
    pub fn new() -> Self {
        Self
    }

    pub fn translate(&self, event: &HostInput) -> Option<InjectedInput> {
        let injected = match *event {
            HostInput::KeyPress { ch, modifiers } => InjectedInput::Keyboard(KeyboardEvent::char(ch, modifiers)),
            HostInput::KeyDown { key_code, modifiers } => {
                InjectedInput::Keyboard(KeyboardEvent::key_down(key_code, modifiers))
            }
            HostInput::KeyUp { key_code, modifiers } => InjectedInput::Keyboard(KeyboardEvent::key_up(key_code, modifiers)),
            HostInput::MouseDown { button } => InjectedInput::MouseDown(Self::button(button)?),
            HostInput::MouseUp { button } => InjectedInput::MouseUp(Self::button(button)?),
            HostInput::MouseMove { x, y } => InjectedInput::MouseMove { x, y },
            HostInput::MouseWheel { delta } => InjectedInput::MouseWheel {
                scroll_y: delta,
                scroll_x: 0,
            },
        };
        Some(injected)
    }

    fn button(button: HostMouseButton) -> Option<MouseButton> {
        let translated = translate_mouse_button(button);
        if translated.is_none() {
            log::trace!("Input: dropping unsupported mouse button {:?}", button);
        }
        translated
    }

    /// Forwards `event` to the view of `view_host` if the host is live.
    /// Returns true when an injection call was made.
    pub fn forward(&self, view_host: Option<&mut ViewHost>, event: &HostInput) -> bool {
        let Some(view) = view_host.and_then(ViewHost::live_view_mut) else {
            return false;
        };
        let Some(injected) = self.translate(event) else {
            return false;
        };

        injected.apply(view);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::backends::null::{NullRuntime, ViewCall};
    use crate::engine::{RuntimeConfig, SessionPreferences};
    use crate::geometry::Size;
    use crate::session::SessionManager;
    use url::Url;

    fn live_host(runtime: &NullRuntime, dir: &tempfile::TempDir) -> ViewHost {
        let mut sessions = SessionManager::new(
            Box::new(runtime.clone()),
            RuntimeConfig::default(),
            SessionPreferences::default(),
        );
        let session = sessions.ensure_runtime_and_session(dir.path()).unwrap();
        let url = Url::parse("https://example.com/").unwrap();
        let mut host = ViewHost::create(&mut sessions, &session, Size::new(200, 100), &url).unwrap();
        host.show();
        host
    }

    fn injected_calls(runtime: &NullRuntime, host: &ViewHost) -> Vec<ViewCall> {
        runtime
            .calls(host.id())
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    ViewCall::Keyboard(_)
                        | ViewCall::MouseDown(_)
                        | ViewCall::MouseUp(_)
                        | ViewCall::MouseMove { .. }
                        | ViewCall::MouseWheel { .. }
                )
            })
            .collect()
    }

    #[test]
    fn wheel_has_no_horizontal_component() {
        let translator = InputTranslator::new();
        assert_eq!(
            translator.translate(&HostInput::MouseWheel { delta: -120 }),
            Some(InjectedInput::MouseWheel {
                scroll_y: -120,
                scroll_x: 0
            })
        );
    }

    #[test]
    fn extra_mouse_buttons_are_dropped() {
        let translator = InputTranslator::new();
        assert_eq!(
            translator.translate(&HostInput::MouseDown {
                button: HostMouseButton::XButton1
            }),
            None
        );
        assert_eq!(translate_mouse_button(HostMouseButton::Middle), Some(MouseButton::Middle));
    }

    #[test]
    fn events_reach_the_view_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = NullRuntime::new();
        let mut host = live_host(&runtime, &dir);
        let translator = InputTranslator::new();

        let events = vec![
            HostInput::MouseMove { x: 10, y: 20 },
            HostInput::MouseDown {
                button: HostMouseButton::Left,
            },
            HostInput::KeyDown {
                key_code: 0x41,
                modifiers: Modifiers::SHIFT,
            },
            HostInput::KeyPress {
                ch: 'A',
                modifiers: Modifiers::SHIFT,
            },
            HostInput::KeyUp {
                key_code: 0x41,
                modifiers: Modifiers::empty(),
            },
            HostInput::MouseUp {
                button: HostMouseButton::Left,
            },
            HostInput::MouseWheel { delta: 3 },
        ];
        for event in &events {
            assert!(translator.forward(Some(&mut host), event));
        }

        assert_eq!(
            injected_calls(&runtime, &host),
            vec![
                ViewCall::MouseMove { x: 10, y: 20 },
                ViewCall::MouseDown(MouseButton::Left),
                ViewCall::Keyboard(KeyboardEvent::key_down(0x41, Modifiers::SHIFT)),
                ViewCall::Keyboard(KeyboardEvent::char('A', Modifiers::SHIFT)),
                ViewCall::Keyboard(KeyboardEvent::key_up(0x41, Modifiers::empty())),
                ViewCall::MouseUp(MouseButton::Left),
                ViewCall::MouseWheel { scroll_y: 3, scroll_x: 0 },
            ]
        );
    }

    #[test]
    fn suspended_host_still_receives_input() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = NullRuntime::new();
        let mut host = live_host(&runtime, &dir);
        host.resize(Size::new(0, 0));

        assert!(InputTranslator::new().forward(Some(&mut host), &HostInput::MouseMove { x: 1, y: 1 }));
    }

    #[test]
    fn disposed_or_missing_host_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = NullRuntime::new();
        let mut host = live_host(&runtime, &dir);
        host.dispose();

        let translator = InputTranslator::new();
        assert!(!translator.forward(Some(&mut host), &HostInput::MouseWheel { delta: 1 }));
        assert!(!translator.forward(None, &HostInput::MouseWheel { delta: 1 }));
        assert!(injected_calls(&runtime, &host).is_empty());
    }
}
