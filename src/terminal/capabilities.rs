//! Built-in terminal capability tables
//!
//! A small terminfo stand-in: each supported terminal family maps terminfo
//! short names to their escape strings. Lookups also accept the long
//! variable names (`cursor_address`, `set_a_foreground`, ...).

use super::tparm::tparm;
use crate::error::{Error, Result};
use crate::style::ColorDepth;
use std::collections::HashMap;

/// Terminal families with a built-in capability table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermFamily {
    Xterm,
    Linux,
    Vt100,
}

const XTERM_SETAF_256: &str = "\x1b[%?%p1%{8}%<%t3%p1%d%e%p1%{16}%<%t9%p1%{8}%-%d%e38;5;%p1%d%;m";
const XTERM_SETAB_256: &str = "\x1b[%?%p1%{8}%<%t4%p1%d%e%p1%{16}%<%t10%p1%{8}%-%d%e48;5;%p1%d%;m";

const XTERM: &[(&str, &str)] = &[
    ("clear", "\x1b[H\x1b[2J"),
    ("cup", "\x1b[%i%p1%d;%p2%dH"),
    ("civis", "\x1b[?25l"),
    ("cnorm", "\x1b[?12l\x1b[?25h"),
    ("smcup", "\x1b[?1049h"),
    ("rmcup", "\x1b[?1049l"),
    ("sgr0", "\x1b(B\x1b[m"),
    ("bold", "\x1b[1m"),
    ("dim", "\x1b[2m"),
    ("sitm", "\x1b[3m"),
    ("smul", "\x1b[4m"),
    ("blink", "\x1b[5m"),
    ("rev", "\x1b[7m"),
    ("kcuu1", "\x1bOA"),
    ("kcud1", "\x1bOB"),
    ("kcuf1", "\x1bOC"),
    ("kcub1", "\x1bOD"),
    ("kf1", "\x1bOP"),
    ("kf2", "\x1bOQ"),
    ("kf3", "\x1bOR"),
    ("kf4", "\x1bOS"),
    ("kf5", "\x1b[15~"),
    ("kf6", "\x1b[17~"),
    ("kf7", "\x1b[18~"),
    ("kf8", "\x1b[19~"),
    ("kf9", "\x1b[20~"),
    ("kf10", "\x1b[21~"),
    ("kf11", "\x1b[23~"),
    ("kf12", "\x1b[24~"),
    ("kich1", "\x1b[2~"),
    ("kdch1", "\x1b[3~"),
    ("khome", "\x1bOH"),
    ("kend", "\x1bOF"),
    ("kpp", "\x1b[5~"),
    ("knp", "\x1b[6~"),
];

const LINUX: &[(&str, &str)] = &[
    ("clear", "\x1b[H\x1b[J"),
    ("cup", "\x1b[%i%p1%d;%p2%dH"),
    ("civis", "\x1b[?25l\x1b[?1c"),
    ("cnorm", "\x1b[?25h\x1b[?0c"),
    ("sgr0", "\x1b[0;10m"),
    ("bold", "\x1b[1m"),
    ("dim", "\x1b[2m"),
    ("smul", "\x1b[4m"),
    ("blink", "\x1b[5m"),
    ("rev", "\x1b[7m"),
    ("setaf", "\x1b[3%p1%dm"),
    ("setab", "\x1b[4%p1%dm"),
    ("kcuu1", "\x1b[A"),
    ("kcud1", "\x1b[B"),
    ("kcuf1", "\x1b[C"),
    ("kcub1", "\x1b[D"),
    ("kf1", "\x1b[[A"),
    ("kf2", "\x1b[[B"),
    ("kf3", "\x1b[[C"),
    ("kf4", "\x1b[[D"),
    ("kf5", "\x1b[[E"),
    ("kf6", "\x1b[17~"),
    ("kf7", "\x1b[18~"),
    ("kf8", "\x1b[19~"),
    ("kf9", "\x1b[20~"),
    ("kf10", "\x1b[21~"),
    ("kf11", "\x1b[23~"),
    ("kf12", "\x1b[24~"),
    ("kich1", "\x1b[2~"),
    ("kdch1", "\x1b[3~"),
    ("khome", "\x1b[1~"),
    ("kend", "\x1b[4~"),
    ("kpp", "\x1b[5~"),
    ("knp", "\x1b[6~"),
];

const VT100: &[(&str, &str)] = &[
    ("clear", "\x1b[H\x1b[J"),
    ("cup", "\x1b[%i%p1%d;%p2%dH"),
    ("sgr0", "\x1b[m"),
    ("bold", "\x1b[1m"),
    ("smul", "\x1b[4m"),
    ("blink", "\x1b[5m"),
    ("rev", "\x1b[7m"),
    ("kcuu1", "\x1bOA"),
    ("kcud1", "\x1bOB"),
    ("kcuf1", "\x1bOC"),
    ("kcub1", "\x1bOD"),
    ("kf1", "\x1bOP"),
    ("kf2", "\x1bOQ"),
    ("kf3", "\x1bOR"),
    ("kf4", "\x1bOS"),
];

/// Long terminfo variable names and their short capability names
const LONG_NAMES: &[(&str, &str)] = &[
    ("clear_screen", "clear"),
    ("cursor_address", "cup"),
    ("cursor_invisible", "civis"),
    ("cursor_normal", "cnorm"),
    ("enter_ca_mode", "smcup"),
    ("exit_ca_mode", "rmcup"),
    ("exit_attribute_mode", "sgr0"),
    ("enter_bold_mode", "bold"),
    ("enter_dim_mode", "dim"),
    ("enter_italics_mode", "sitm"),
    ("enter_underline_mode", "smul"),
    ("enter_blink_mode", "blink"),
    ("enter_reverse_mode", "rev"),
    ("set_a_foreground", "setaf"),
    ("set_a_background", "setab"),
    ("key_up", "kcuu1"),
    ("key_down", "kcud1"),
    ("key_right", "kcuf1"),
    ("key_left", "kcub1"),
    ("key_f1", "kf1"),
    ("key_f2", "kf2"),
    ("key_f3", "kf3"),
    ("key_f4", "kf4"),
    ("key_f5", "kf5"),
    ("key_f6", "kf6"),
    ("key_f7", "kf7"),
    ("key_f8", "kf8"),
    ("key_f9", "kf9"),
    ("key_f10", "kf10"),
    ("key_f11", "kf11"),
    ("key_f12", "kf12"),
    ("key_ic", "kich1"),
    ("key_dc", "kdch1"),
    ("key_home", "khome"),
    ("key_end", "kend"),
    ("key_ppage", "kpp"),
    ("key_npage", "knp"),
];

/// Terminals that identify as something other than `xterm*` but speak its dialect
const XTERM_LIKE: &[&str] = &["screen", "tmux", "rxvt", "alacritty", "kitty", "foot", "wezterm"];

/// Terminals that always offer the 256-color palette
const MODERN: &[&str] = &["alacritty", "kitty", "foot", "wezterm"];

/// Capability strings resolved for one terminal type
#[derive(Debug, Clone)]
pub struct CapabilityDb {
    term: String,
    family: TermFamily,
    strings: HashMap<&'static str, &'static str>,
    colors: u16,
    truecolor: bool,
}

impl CapabilityDb {
    /// Resolve the table for `term`, taking `COLORTERM` into account for
    /// 24-bit color support
    pub fn for_term(term: &str, colorterm: Option<&str>) -> Self {
        let lowered = term.to_ascii_lowercase();
        let family = if lowered.starts_with("xterm")
            || XTERM_LIKE.iter().any(|name| lowered.starts_with(name))
        {
            TermFamily::Xterm
        } else if lowered == "linux" {
            TermFamily::Linux
        } else {
            TermFamily::Vt100
        };

        let colors = match family {
            TermFamily::Xterm
                if lowered.contains("256color")
                    || MODERN.iter().any(|name| lowered.starts_with(name)) =>
            {
                256
            }
            TermFamily::Xterm | TermFamily::Linux => 8,
            TermFamily::Vt100 => 0,
        };
        let truecolor = colors > 0
            && colorterm.is_some_and(|value| {
                let value = value.to_ascii_lowercase();
                value.contains("truecolor") || value.contains("24bit")
            });

        let table = match family {
            TermFamily::Xterm => XTERM,
            TermFamily::Linux => LINUX,
            TermFamily::Vt100 => VT100,
        };
        let mut strings: HashMap<&'static str, &'static str> = table.iter().copied().collect();
        if family == TermFamily::Xterm {
            let (setaf, setab) = if colors >= 256 {
                (XTERM_SETAF_256, XTERM_SETAB_256)
            } else {
                ("\x1b[3%p1%dm", "\x1b[4%p1%dm")
            };
            strings.insert("setaf", setaf);
            strings.insert("setab", setab);
        }

        if family == TermFamily::Vt100 && !lowered.starts_with("vt100") {
            tracing::debug!(term, "no capability table for terminal, using vt100");
        }

        CapabilityDb {
            term: term.to_string(),
            family,
            strings,
            colors,
            truecolor,
        }
    }

    /// Resolve from the `TERM` and `COLORTERM` environment variables
    pub fn detect() -> Self {
        let term = std::env::var("TERM").unwrap_or_else(|_| "vt100".to_string());
        let colorterm = std::env::var("COLORTERM").ok();
        Self::for_term(&term, colorterm.as_deref())
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn family(&self) -> TermFamily {
        self.family
    }

    /// Number of palette colors (`0` when the terminal has no color support)
    pub fn colors(&self) -> u16 {
        self.colors
    }

    pub fn truecolor(&self) -> bool {
        self.truecolor
    }

    /// The richest color depth the terminal can display
    pub fn color_depth(&self) -> ColorDepth {
        if self.truecolor {
            ColorDepth::TrueColor
        } else if self.colors >= 256 {
            ColorDepth::Palette256
        } else {
            ColorDepth::Ansi8
        }
    }

    /// Look up a capability by short or long name
    pub fn get(&self, name: &str) -> Option<&'static str> {
        let short = LONG_NAMES
            .iter()
            .find(|(long, _)| *long == name)
            .map_or(name, |(_, short)| *short);
        self.strings.get(short).copied()
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Like [`get`](Self::get), failing when the terminal lacks the capability
    pub fn require(&self, name: &str) -> Result<&'static str> {
        self.get(name)
            .ok_or_else(|| Error::CapabilityFailure(format!("{name} ({})", self.term)))
    }

    /// Look up `name` and run its parameter expansion
    pub fn expand(&self, name: &str, params: &[i32]) -> Result<String> {
        tparm(self.require(name)?, params)
    }
}

impl Default for CapabilityDb {
    fn default() -> Self {
        Self::for_term("xterm-256color", None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_detection() {
        assert_eq!(CapabilityDb::for_term("xterm", None).family(), TermFamily::Xterm);
        assert_eq!(CapabilityDb::for_term("tmux-256color", None).family(), TermFamily::Xterm);
        assert_eq!(CapabilityDb::for_term("linux", None).family(), TermFamily::Linux);
        assert_eq!(CapabilityDb::for_term("dumb", None).family(), TermFamily::Vt100);
    }

    #[test]
    fn test_color_depth() {
        assert_eq!(CapabilityDb::for_term("xterm", None).colors(), 8);
        assert_eq!(
            CapabilityDb::for_term("xterm-256color", None).color_depth(),
            ColorDepth::Palette256
        );
        assert_eq!(CapabilityDb::for_term("kitty", None).colors(), 256);
        assert_eq!(
            CapabilityDb::for_term("xterm-256color", Some("truecolor")).color_depth(),
            ColorDepth::TrueColor
        );
        // No palette at all means no truecolor either
        assert!(!CapabilityDb::for_term("vt100", Some("24bit")).truecolor());
    }

    #[test]
    fn test_long_and_short_names() {
        let db = CapabilityDb::for_term("xterm-256color", None);
        assert_eq!(db.get("cup"), db.get("cursor_address"));
        assert_eq!(db.get("clear_screen"), Some("\x1b[H\x1b[2J"));
        assert_eq!(db.get("key_f5"), Some("\x1b[15~"));
        assert!(db.get("no_such_cap").is_none());
    }

    #[test]
    fn test_expand() {
        let db = CapabilityDb::for_term("xterm-256color", None);
        assert_eq!(db.expand("cup", &[0, 0]).unwrap(), "\x1b[1;1H");
        assert_eq!(db.expand("set_a_foreground", &[196]).unwrap(), "\x1b[38;5;196m");
        assert_eq!(db.expand("setab", &[2]).unwrap(), "\x1b[42m");

        let linux = CapabilityDb::for_term("linux", None);
        assert_eq!(linux.expand("setaf", &[3]).unwrap(), "\x1b[33m");
    }

    #[test]
    fn test_missing_capability() {
        let db = CapabilityDb::for_term("vt100", None);
        assert!(matches!(db.expand("setaf", &[1]), Err(Error::CapabilityFailure(_))));
        assert!(matches!(db.require("civis"), Err(Error::CapabilityFailure(_))));
    }
}
