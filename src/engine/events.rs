//! Input vocabulary of the browser engine.
//!
//! These are the events the host injects into an [`EngineView`](crate::engine::EngineView).
//! Host-toolkit events are converted into this vocabulary by the
//! [`InputTranslator`](crate::host::InputTranslator).
//!
//! # Main Types
//!
//! - [`MouseButton`]: Mouse buttons the engine understands (left, middle, right).
//! - [`Modifiers`]: Keyboard modifiers (Shift, Control, Alt, Meta).
//! - [`KeyboardEvent`]: A key-down, key-up or character event.

use bitflags::bitflags;
use std::fmt::Display;

/// Button carried by an injected mouse-down or mouse-up. The engine has no
/// notion of extra (back/forward) buttons; the host drops those before they
/// get here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    pub fn name(self) -> &'static str {
        match self {
            MouseButton::Left => "Left",
            MouseButton::Middle => "Middle",
            MouseButton::Right => "Right",
        }
    }
}

impl Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Modifier keys held while an input event was produced.
    #[derive(Default)]
    pub struct Modifiers: u8 {
        const SHIFT   = 0b0001;
        const CONTROL = 0b0010;
        const ALT     = 0b0100;
        /// Windows / Command key
        const META    = 0b1000;
    }
}

/// Modifier names in display order.
const MODIFIER_NAMES: [(Modifiers, &str); 4] = [
    (Modifiers::SHIFT, "Shift"),
    (Modifiers::CONTROL, "Control"),
    (Modifiers::ALT, "Alt"),
    (Modifiers::META, "Meta"),
];

impl Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }

        let mut names = MODIFIER_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name);
        if let Some(first) = names.next() {
            f.write_str(first)?;
        }
        for name in names {
            write!(f, "+{name}")?;
        }
        Ok(())
    }
}

/// Kind of a keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    /// Key has been pressed
    KeyDown,
    /// Key has been released
    KeyUp,
    /// A character has been produced (after keyboard layout translation)
    Char,
}

/// A keyboard event as injected into the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub kind: KeyEventKind,
    /// Platform virtual key code. Zero for character events.
    pub virtual_key: u32,
    /// Produced character, only set for [`KeyEventKind::Char`]
    pub text: Option<char>,
    pub modifiers: Modifiers,
}

impl KeyboardEvent {
    pub fn key_down(virtual_key: u32, modifiers: Modifiers) -> Self {
        Self { kind: KeyEventKind::KeyDown, virtual_key, text: None, modifiers }
    }

    pub fn key_up(virtual_key: u32, modifiers: Modifiers) -> Self {
        Self { kind: KeyEventKind::KeyUp, virtual_key, text: None, modifiers }
    }

    pub fn char(ch: char, modifiers: Modifiers) -> Self {
        Self { kind: KeyEventKind::Char, virtual_key: 0, text: Some(ch), modifiers }
    }
}
