//! Raw byte sequence to [`Event`] decoding
//!
//! Decoding is a total function: every byte sequence, including the empty
//! one, produces an event carrying the original bytes. Sequences that match
//! nothing known decode to [`EventKind::Unknown`].
//!
//! Key sequences come from the terminal capability table. Arrow, home and
//! end keys are accepted in both their CSI (`ESC [ x`) and SS3 (`ESC O x`)
//! spellings since terminals switch between them with the keypad mode.

use super::event::{
    ArrowDirection, Event, EventKind, Modifiers, MouseAction, MouseButton, MouseReport, NavKey,
};
use crate::terminal::CapabilityDb;
use regex::bytes::Regex;
use std::sync::LazyLock;

const ESC: u8 = 0x1b;
const MOUSE_PREFIX: &[u8] = b"\x1b[<";

static MOUSE_REPORT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\x1b\[<(\d+);(\d+);(\d+)([Mm])$").ok());

static XTERM_DECODER: LazyLock<Decoder> = LazyLock::new(Decoder::default);

/// Decode with the xterm-compatible key table
pub fn decode(bytes: &[u8]) -> Event {
    XTERM_DECODER.decode(bytes)
}

/// What a capability-defined key sequence stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyMeaning {
    Arrow(ArrowDirection),
    Function(u8),
    Navigation(NavKey),
}

const ARROW_CAPS: [(&str, ArrowDirection); 4] = [
    ("kcuu1", ArrowDirection::Up),
    ("kcud1", ArrowDirection::Down),
    ("kcuf1", ArrowDirection::Right),
    ("kcub1", ArrowDirection::Left),
];

const NAV_CAPS: [(&str, NavKey); 6] = [
    ("kich1", NavKey::Insert),
    ("kdch1", NavKey::Delete),
    ("khome", NavKey::Home),
    ("kend", NavKey::End),
    ("kpp", NavKey::PageUp),
    ("knp", NavKey::PageDown),
];

/// Maps raw input to typed events using one terminal's key sequences
#[derive(Debug, Clone)]
pub struct Decoder {
    keys: Vec<(Vec<u8>, KeyMeaning)>,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new(&CapabilityDb::default())
    }
}

impl Decoder {
    pub fn new(caps: &CapabilityDb) -> Self {
        let mut decoder = Decoder { keys: Vec::new() };
        for (name, direction) in ARROW_CAPS {
            decoder.learn(caps.get(name), KeyMeaning::Arrow(direction), true);
        }
        for n in 1..=12u8 {
            decoder.learn(caps.get(&format!("kf{n}")), KeyMeaning::Function(n), false);
        }
        for (name, key) in NAV_CAPS {
            let alternate = matches!(key, NavKey::Home | NavKey::End);
            decoder.learn(caps.get(name), KeyMeaning::Navigation(key), alternate);
        }
        decoder
    }

    /// Register `seq`, plus its CSI/SS3 twin when `alternate` is set
    fn learn(&mut self, seq: Option<&str>, meaning: KeyMeaning, alternate: bool) {
        let Some(seq) = seq else {
            return;
        };
        let bytes = seq.as_bytes().to_vec();
        if alternate && bytes.len() == 3 && bytes[0] == ESC {
            let twin = match bytes[1] {
                b'[' => Some(b'O'),
                b'O' => Some(b'['),
                _ => None,
            };
            if let Some(twin) = twin {
                self.insert(vec![ESC, twin, bytes[2]], meaning);
            }
        }
        self.insert(bytes, meaning);
    }

    fn insert(&mut self, bytes: Vec<u8>, meaning: KeyMeaning) {
        if !self.keys.iter().any(|(known, _)| *known == bytes) {
            self.keys.push((bytes, meaning));
        }
    }

    fn lookup(&self, bytes: &[u8]) -> Option<KeyMeaning> {
        self.keys
            .iter()
            .find(|(known, _)| known == bytes)
            .map(|(_, meaning)| *meaning)
    }

    pub fn decode(&self, bytes: &[u8]) -> Event {
        Event::new(self.decode_kind(bytes), bytes)
    }

    fn decode_kind(&self, bytes: &[u8]) -> EventKind {
        match bytes {
            [] => EventKind::Unknown,
            [ESC] => EventKind::Unknown,
            [byte] => decode_single(*byte),
            [ESC, rest @ ..] => self.decode_escape(bytes, rest),
            _ => decode_utf8(bytes),
        }
    }

    fn decode_escape(&self, bytes: &[u8], rest: &[u8]) -> EventKind {
        if let [second] = rest {
            if is_printable(*second) {
                return EventKind::AltKey {
                    key: *second as char,
                };
            }
        }

        if let Some(meaning) = self.lookup(bytes) {
            let third = bytes.get(2).copied().unwrap_or(0);
            return match meaning {
                KeyMeaning::Arrow(direction) => EventKind::ArrowKey {
                    key_code: third & 0x1f,
                    direction,
                },
                KeyMeaning::Function(n) => EventKind::FunctionKey { key_code: n },
                KeyMeaning::Navigation(key) => EventKind::NavigationKey {
                    key_code: third,
                    key,
                },
            };
        }

        if bytes.starts_with(MOUSE_PREFIX) && bytes.len() > 4 {
            return EventKind::Mouse(decode_mouse(bytes));
        }

        EventKind::Unknown
    }
}

fn is_printable(byte: u8) -> bool {
    (0x20..=0x7e).contains(&byte)
}

fn decode_single(byte: u8) -> EventKind {
    match byte {
        0x0d | 0x0a => EventKind::NavigationKey {
            key_code: byte,
            key: NavKey::Enter,
        },
        0x7f | 0x08 => EventKind::NavigationKey {
            key_code: byte,
            key: NavKey::Backspace,
        },
        b if is_printable(b) => EventKind::PrintableChar {
            key: b as char,
            shift: b.is_ascii_uppercase(),
        },
        b => EventKind::ControlChar {
            key: b,
            ctrl: b < 0x20,
        },
    }
}

/// A multi-byte sequence that is exactly one UTF-8 scalar is a typed character
fn decode_utf8(bytes: &[u8]) -> EventKind {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return EventKind::Unknown;
    };
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(key), None) if !key.is_control() => EventKind::PrintableChar {
            key,
            shift: key.is_uppercase(),
        },
        _ => EventKind::Unknown,
    }
}

/// Decode an SGR mouse report (`ESC [ < button ; x ; y M|m`)
///
/// A report that starts like SGR but does not parse still yields a mouse
/// event, with no button or action and zero coordinates.
fn decode_mouse(bytes: &[u8]) -> MouseReport {
    let parsed = MOUSE_REPORT.as_ref().and_then(|re| {
        let caps = re.captures(bytes)?;
        let number = |i: usize| -> Option<u16> {
            std::str::from_utf8(caps.get(i)?.as_bytes()).ok()?.parse().ok()
        };
        let code = number(1)?;
        let x = number(2)?;
        let y = number(3)?;
        let release = caps.get(4)?.as_bytes() == b"m";
        Some((code, x, y, release))
    });

    let Some((code, x, y, release)) = parsed else {
        tracing::debug!(raw = ?bytes, "incomplete mouse report");
        return MouseReport::default();
    };

    let button = if code & 64 != 0 {
        match code & 3 {
            0 => MouseButton::WheelUp,
            1 => MouseButton::WheelDown,
            _ => MouseButton::None,
        }
    } else {
        match code & 3 {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::None,
        }
    };
    let action = if release {
        MouseAction::Release
    } else if code & 32 != 0 {
        MouseAction::Move
    } else {
        MouseAction::Press
    };

    MouseReport {
        button,
        action,
        x: x.saturating_sub(1),
        y: y.saturating_sub(1),
        modifiers: Modifiers {
            shift: code & 4 != 0,
            alt: code & 8 != 0,
            ctrl: code & 16 != 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kind(bytes: &[u8]) -> EventKind {
        decode(bytes).kind
    }

    #[test]
    fn test_printable_and_shift() {
        assert_eq!(
            kind(b"a"),
            EventKind::PrintableChar {
                key: 'a',
                shift: false
            }
        );
        assert_eq!(
            kind(b"Q"),
            EventKind::PrintableChar {
                key: 'Q',
                shift: true
            }
        );
    }

    #[test]
    fn test_control_enter_backspace() {
        assert_eq!(
            kind(&[0x03]),
            EventKind::ControlChar {
                key: 0x03,
                ctrl: true
            }
        );
        assert!(kind(b"\r").is_enter());
        assert!(kind(b"\n").is_enter());
        assert_eq!(
            kind(&[0x7f]),
            EventKind::NavigationKey {
                key_code: 0x7f,
                key: NavKey::Backspace
            }
        );
        assert!(kind(b"\t").is_tab());
    }

    #[test]
    fn test_arrow_keys_both_forms() {
        let up = EventKind::ArrowKey {
            key_code: b'A' & 0x1f,
            direction: ArrowDirection::Up,
        };
        assert_eq!(kind(b"\x1b[A"), up);
        assert_eq!(kind(b"\x1bOA"), up);
        assert!(matches!(
            kind(b"\x1b[D"),
            EventKind::ArrowKey {
                direction: ArrowDirection::Left,
                ..
            }
        ));
    }

    #[test]
    fn test_function_and_navigation_keys() {
        assert_eq!(kind(b"\x1bOP"), EventKind::FunctionKey { key_code: 1 });
        assert_eq!(kind(b"\x1b[24~"), EventKind::FunctionKey { key_code: 12 });
        assert_eq!(
            kind(b"\x1b[3~"),
            EventKind::NavigationKey {
                key_code: b'3',
                key: NavKey::Delete
            }
        );
        assert!(matches!(
            kind(b"\x1b[H"),
            EventKind::NavigationKey {
                key: NavKey::Home,
                ..
            }
        ));
    }

    #[test]
    fn test_alt_key() {
        assert_eq!(kind(b"\x1bx"), EventKind::AltKey { key: 'x' });
        assert_eq!(kind(b"\x1b"), EventKind::Unknown);
    }

    #[test]
    fn test_mouse_press_and_release() {
        assert_eq!(
            kind(b"\x1b[<0;10;5M"),
            EventKind::Mouse(MouseReport {
                button: MouseButton::Left,
                action: MouseAction::Press,
                x: 9,
                y: 4,
                modifiers: Modifiers::default(),
            })
        );
        let release = decode(b"\x1b[<2;1;1m").kind;
        let report = release.mouse().unwrap();
        assert_eq!(report.button, MouseButton::Right);
        assert_eq!(report.action, MouseAction::Release);
        assert_eq!((report.x, report.y), (0, 0));
    }

    #[test]
    fn test_mouse_wheel_motion_modifiers() {
        let wheel = decode(b"\x1b[<65;3;3M").kind;
        assert_eq!(wheel.mouse().unwrap().button, MouseButton::WheelDown);

        let drag = decode(b"\x1b[<32;4;4M").kind;
        assert_eq!(drag.mouse().unwrap().action, MouseAction::Move);

        let ctrl_shift = decode(b"\x1b[<20;1;1M").kind;
        let mods = ctrl_shift.mouse().unwrap().modifiers;
        assert!(mods.ctrl && mods.shift && !mods.alt);
    }

    #[test]
    fn test_partial_mouse_report() {
        assert_eq!(
            kind(b"\x1b[<0;10"),
            EventKind::Mouse(MouseReport {
                button: MouseButton::None,
                action: MouseAction::None,
                x: 0,
                y: 0,
                modifiers: Modifiers::default(),
            })
        );
        // Too short to be a report at all
        assert_eq!(kind(b"\x1b[<0"), EventKind::Unknown);
    }

    #[test]
    fn test_utf8_and_unknown() {
        assert_eq!(
            kind("é".as_bytes()),
            EventKind::PrintableChar {
                key: 'é',
                shift: false
            }
        );
        assert_eq!(kind("ab".as_bytes()), EventKind::Unknown);
        assert_eq!(kind(&[0xff, 0xfe]), EventKind::Unknown);
        assert_eq!(kind(b"\x1b[99z"), EventKind::Unknown);
        assert_eq!(kind(b""), EventKind::Unknown);
    }

    #[test]
    fn test_raw_bytes_preserved() {
        let event = decode(b"\x1b[99z");
        assert_eq!(event.raw, b"\x1b[99z");
        assert!(event.timestamp.secs > 0);
    }

    #[test]
    fn test_linux_console_keys() {
        let decoder = Decoder::new(&CapabilityDb::for_term("linux", None));
        assert_eq!(
            decoder.decode(b"\x1b[[A").kind,
            EventKind::FunctionKey { key_code: 1 }
        );
        assert!(matches!(
            decoder.decode(b"\x1b[1~").kind,
            EventKind::NavigationKey {
                key: NavKey::Home,
                ..
            }
        ));
    }

    proptest! {
        #[test]
        fn test_decode_is_total(bytes in proptest::collection::vec(any::<u8>(), 0..16)) {
            let event = decode(&bytes);
            prop_assert_eq!(event.raw, bytes);
        }
    }
}
