//! Process-wide terminal mode
//!
//! Raw mode, the alternate screen and mouse reporting are global to the
//! process. [`acquire`] switches them on once; [`release`] switches back
//! exactly once. [`TerminalGuard`] calls `release` on drop so the user's
//! terminal is restored on every exit path, including unwinding.

use crate::config::Config;
use crate::error::{Error, Result};
use crossterm::{cursor, execute, terminal};
use parking_lot::Mutex;
use std::io::{self, Write};

const ENABLE_MOUSE: &str = "\x1b[?1000h\x1b[?1002h\x1b[?1006h";
const DISABLE_MOUSE: &str = "\x1b[?1006l\x1b[?1002l\x1b[?1000l";

/// What `acquire` turned on, so `release` undoes only that
#[derive(Debug, Clone, Copy)]
struct Acquired {
    alternate_screen: bool,
    mouse: bool,
}

static TERMINAL: Mutex<Option<Acquired>> = Mutex::new(None);

/// Restores the terminal when dropped
#[derive(Debug)]
#[must_use = "the terminal is restored as soon as the guard is dropped"]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    /// Restore the terminal now, reporting any failure
    pub fn release(self) -> Result<()> {
        let result = release();
        std::mem::forget(self);
        result
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = release() {
            tracing::error!(error = %err, "failed to restore terminal");
        }
    }
}

/// Check whether the terminal is currently in application mode
pub fn is_acquired() -> bool {
    TERMINAL.lock().is_some()
}

/// Enter raw mode (plus alternate screen and mouse reporting as configured)
pub fn acquire(config: &Config) -> Result<TerminalGuard> {
    let mut state = TERMINAL.lock();
    if state.is_some() {
        return Err(Error::TerminalInUse);
    }

    terminal::enable_raw_mode()?;
    let acquired = Acquired {
        alternate_screen: config.alternate_screen,
        mouse: config.mouse_tracking,
    };
    if let Err(err) = enter(&acquired) {
        // Leave the terminal as we found it
        let _ = leave(&acquired);
        let _ = terminal::disable_raw_mode();
        return Err(err);
    }

    *state = Some(acquired);
    tracing::debug!(
        alternate_screen = acquired.alternate_screen,
        mouse = acquired.mouse,
        "terminal acquired"
    );
    Ok(TerminalGuard { _private: () })
}

/// Undo [`acquire`]; does nothing when the terminal is not acquired
pub fn release() -> Result<()> {
    let mut state = TERMINAL.lock();
    let Some(acquired) = state.take() else {
        return Ok(());
    };
    let left = leave(&acquired);
    let raw = terminal::disable_raw_mode().map_err(Error::from);
    tracing::debug!("terminal released");
    left.and(raw)
}

fn enter(acquired: &Acquired) -> Result<()> {
    let mut stdout = io::stdout();
    if acquired.alternate_screen {
        execute!(stdout, terminal::EnterAlternateScreen)?;
    }
    execute!(stdout, cursor::Hide)?;
    if acquired.mouse {
        stdout.write_all(ENABLE_MOUSE.as_bytes())?;
    }
    stdout.flush()?;
    Ok(())
}

fn leave(acquired: &Acquired) -> Result<()> {
    let mut stdout = io::stdout();
    if acquired.mouse {
        stdout.write_all(DISABLE_MOUSE.as_bytes())?;
    }
    stdout.write_all(b"\x1b[0m")?;
    execute!(stdout, cursor::Show)?;
    if acquired.alternate_screen {
        execute!(stdout, terminal::LeaveAlternateScreen)?;
    }
    stdout.flush()?;
    Ok(())
}
