//! Runtime configuration
//!
//! Every setting has a default and an optional `PANELKIT_*` environment
//! override. Values that fail to parse are ignored with a warning.

use crate::input::OverflowPolicy;
use crate::terminal::CapabilityDb;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Raw input chunks buffered between the reader thread and the main loop
    pub queue_capacity: usize,
    pub overflow_policy: OverflowPolicy,
    /// Upper bound on how long the reader waits before checking for cancellation
    pub poll_timeout: Duration,
    /// Maximum bytes taken from stdin per read
    pub read_chunk_size: usize,
    pub target_fps: u32,
    pub mouse_tracking: bool,
    pub alternate_screen: bool,
    /// Terminal type; `None` uses `TERM`
    pub term: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            queue_capacity: 64,
            overflow_policy: OverflowPolicy::OverwriteOldest,
            poll_timeout: Duration::from_millis(100),
            read_chunk_size: 256,
            target_fps: 30,
            mouse_tracking: true,
            alternate_screen: true,
            term: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `PANELKIT_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        let parsed = |name: &str, default| parse_or(name, lookup(name), default);

        Config {
            queue_capacity: parsed("PANELKIT_QUEUE_CAPACITY", defaults.queue_capacity),
            overflow_policy: parse_or(
                "PANELKIT_OVERFLOW",
                lookup("PANELKIT_OVERFLOW"),
                defaults.overflow_policy,
            ),
            poll_timeout: Duration::from_millis(parse_or(
                "PANELKIT_POLL_TIMEOUT_MS",
                lookup("PANELKIT_POLL_TIMEOUT_MS"),
                defaults.poll_timeout.as_millis() as u64,
            )),
            read_chunk_size: parsed("PANELKIT_READ_CHUNK", defaults.read_chunk_size),
            target_fps: parse_or("PANELKIT_FPS", lookup("PANELKIT_FPS"), defaults.target_fps),
            mouse_tracking: flag_or("PANELKIT_MOUSE", lookup("PANELKIT_MOUSE"), true),
            alternate_screen: flag_or("PANELKIT_ALT_SCREEN", lookup("PANELKIT_ALT_SCREEN"), true),
            term: None,
        }
        .sanitized()
    }

    /// Replace zero sizes and rates with their defaults
    fn sanitized(mut self) -> Self {
        let defaults = Config::default();
        if self.queue_capacity == 0 {
            tracing::warn!("queue capacity must be positive, using {}", defaults.queue_capacity);
            self.queue_capacity = defaults.queue_capacity;
        }
        if self.read_chunk_size == 0 {
            tracing::warn!("read chunk size must be positive, using {}", defaults.read_chunk_size);
            self.read_chunk_size = defaults.read_chunk_size;
        }
        if self.target_fps == 0 {
            tracing::warn!("target fps must be positive, using {}", defaults.target_fps);
            self.target_fps = defaults.target_fps;
        }
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self.sanitized()
    }

    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self.sanitized()
    }

    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self.sanitized()
    }

    pub fn with_mouse_tracking(mut self, enabled: bool) -> Self {
        self.mouse_tracking = enabled;
        self
    }

    pub fn with_alternate_screen(mut self, enabled: bool) -> Self {
        self.alternate_screen = enabled;
        self
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    /// Capability table for the configured terminal type
    pub fn capabilities(&self) -> CapabilityDb {
        match &self.term {
            Some(term) => {
                let colorterm = std::env::var("COLORTERM").ok();
                CapabilityDb::for_term(term, colorterm.as_deref())
            }
            None => CapabilityDb::detect(),
        }
    }
}

fn parse_or<T: FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring unparseable setting");
            default
        }
    }
}

/// `0`, `false`, `no` and `off` disable; anything else enables
fn flag_or(name: &str, raw: Option<String>, default: bool) -> bool {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => default,
        Some(v) if v.is_empty() => {
            tracing::warn!(variable = name, "ignoring empty setting");
            default
        }
        Some(v) => !matches!(v.as_str(), "0" | "false" | "no" | "off"),
    }
}
