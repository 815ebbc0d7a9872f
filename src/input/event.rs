//! Decoded input events

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock capture time, split into whole seconds and microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Timestamp {
    pub secs: u64,
    pub micros: u32,
}

impl Timestamp {
    pub fn now() -> Self {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp {
            secs: elapsed.as_secs(),
            micros: elapsed.subsec_micros(),
        }
    }
}

/// Direction of an arrow key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    Up,
    Down,
    Right,
    Left,
}

/// Editing and paging keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Enter,
    Backspace,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseAction {
    #[default]
    None,
    Press,
    Release,
    Move,
}

/// Modifier keys held during a mouse report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

/// A decoded SGR mouse report with 0-based cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseReport {
    pub button: MouseButton,
    pub action: MouseAction,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
}

/// What a raw byte sequence decoded to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PrintableChar { key: char, shift: bool },
    ControlChar { key: u8, ctrl: bool },
    AltKey { key: char },
    /// F1 through F12, `key_code` is the function key number
    FunctionKey { key_code: u8 },
    ArrowKey { key_code: u8, direction: ArrowDirection },
    NavigationKey { key_code: u8, key: NavKey },
    Mouse(MouseReport),
    Unknown,
}

impl EventKind {
    pub fn is_enter(&self) -> bool {
        matches!(
            self,
            EventKind::NavigationKey {
                key: NavKey::Enter,
                ..
            }
        )
    }

    pub fn is_tab(&self) -> bool {
        matches!(self, EventKind::ControlChar { key: 0x09, .. })
    }

    pub fn mouse(&self) -> Option<&MouseReport> {
        match self {
            EventKind::Mouse(report) => Some(report),
            _ => None,
        }
    }
}

/// One input event with the bytes it was decoded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub raw: Vec<u8>,
    pub timestamp: Timestamp,
}

impl Event {
    pub fn new(kind: EventKind, raw: &[u8]) -> Self {
        Event {
            kind,
            raw: raw.to_vec(),
            timestamp: Timestamp::now(),
        }
    }
}
