//! Terminal abstraction - geometry, capabilities, mode and output

mod capabilities;
mod guard;
mod output;
mod tparm;

pub use capabilities::{CapabilityDb, TermFamily};
pub use guard::{acquire, is_acquired, release, TerminalGuard};
pub use output::Renderer;
pub use tparm::tparm;

use crate::error::Result;

/// Terminal size in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalGeometry {
    /// Terminal width in columns (characters)
    pub cols: u16,
    /// Terminal height in rows (lines)
    pub rows: u16,
}

impl TerminalGeometry {
    pub fn new(cols: u16, rows: u16) -> Self {
        TerminalGeometry { cols, rows }
    }

    /// Get current terminal geometry
    pub fn detect() -> Result<Self> {
        let (cols, rows) = crossterm::terminal::size()?;
        Ok(TerminalGeometry { cols, rows })
    }
}
