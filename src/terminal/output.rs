//! Terminal output - buffered writes, cursor movement and SGR styling
//!
//! Performance optimizations:
//! - Write buffering to minimize syscalls
//! - SGR sequences only when the style differs from the previous cell

use super::capabilities::CapabilityDb;
use crate::error::Result;
use crate::style::{Color, ColorDepth, ResolvedColor, Style};
use std::io::{self, BufWriter, Write};

/// Default buffer capacity for write batching (16KB)
const WRITE_BUFFER_CAPACITY: usize = 16 * 1024;

/// Which color slot an SGR sequence targets
#[derive(Debug, Clone, Copy)]
enum Layer {
    Foreground,
    Background,
}

impl Layer {
    fn capability(self) -> &'static str {
        match self {
            Layer::Foreground => "setaf",
            Layer::Background => "setab",
        }
    }

    fn direct_prefix(self) -> u8 {
        match self {
            Layer::Foreground => 38,
            Layer::Background => 48,
        }
    }
}

/// Writes cells and control sequences to the terminal
///
/// Uses internal write buffering to minimize syscalls. Call `flush()` after
/// a batch of operations to ensure output is displayed.
pub struct Renderer<W: Write = BufWriter<io::Stdout>> {
    writer: W,
    caps: CapabilityDb,
    depth: ColorDepth,
    /// Style of the last written cell; `None` when unknown
    current: Option<Style>,
    degraded_warned: bool,
    missing_color_warned: bool,
    cells_written: usize,
}

impl Renderer {
    /// Create a renderer writing to stdout
    pub fn new(caps: CapabilityDb) -> Self {
        let writer = BufWriter::with_capacity(WRITE_BUFFER_CAPACITY, io::stdout());
        Renderer::with_writer(writer, caps)
    }
}

impl Renderer<Vec<u8>> {
    /// Create a renderer collecting output in memory
    pub fn headless(caps: CapabilityDb) -> Self {
        Renderer::with_writer(Vec::new(), caps)
    }

    /// Drop the collected output
    pub fn clear_output(&mut self) {
        self.writer.clear();
    }
}

impl<W: Write> Renderer<W> {
    pub fn with_writer(writer: W, caps: CapabilityDb) -> Self {
        let depth = caps.color_depth();
        Renderer {
            writer,
            caps,
            depth,
            current: None,
            degraded_warned: false,
            missing_color_warned: false,
            cells_written: 0,
        }
    }

    pub fn capabilities(&self) -> &CapabilityDb {
        &self.caps
    }

    pub fn color_depth(&self) -> ColorDepth {
        self.depth
    }

    /// Everything written so far
    pub fn output(&self) -> &W {
        &self.writer
    }

    fn emit(&mut self, name: &str, params: &[i32]) -> Result<()> {
        let seq = self.caps.expand(name, params)?;
        self.writer.write_all(seq.as_bytes())?;
        Ok(())
    }

    /// Emit an optional capability, skipping it when the terminal lacks it
    fn emit_optional(&mut self, name: &str) -> Result<()> {
        match self.caps.get(name) {
            Some(seq) => {
                self.writer.write_all(seq.as_bytes())?;
                Ok(())
            }
            None => {
                tracing::debug!(capability = name, "terminal lacks capability, skipped");
                Ok(())
            }
        }
    }

    /// Move cursor to position (0-indexed)
    #[inline]
    pub fn move_cursor(&mut self, col: u16, row: u16) -> Result<()> {
        self.emit("cup", &[row as i32, col as i32])
    }

    /// Clear the screen
    pub fn clear(&mut self) -> Result<()> {
        self.emit("clear", &[])
    }

    /// Hide cursor
    ///
    /// Note: Buffered - call flush() to ensure it takes effect immediately.
    pub fn hide_cursor(&mut self) -> Result<()> {
        self.emit_optional("civis")
    }

    /// Show cursor
    ///
    /// Note: Buffered - call flush() to ensure it takes effect immediately.
    pub fn show_cursor(&mut self) -> Result<()> {
        self.emit_optional("cnorm")
    }

    /// Return to the terminal's default rendition
    pub fn reset_style(&mut self) -> Result<()> {
        self.emit("sgr0", &[])?;
        self.current = Some(Style::default());
        Ok(())
    }

    /// Write one glyph at the cursor, switching rendition first if needed
    pub fn write_cell(&mut self, ch: char, style: &Style) -> Result<()> {
        if self.current.as_ref() != Some(style) {
            self.apply_style(style)?;
        }
        let mut utf8 = [0u8; 4];
        self.writer.write_all(ch.encode_utf8(&mut utf8).as_bytes())?;
        self.cells_written += 1;
        Ok(())
    }

    fn apply_style(&mut self, style: &Style) -> Result<()> {
        self.reset_style()?;
        let attributes = [
            (style.bold, "bold"),
            (style.dim, "dim"),
            (style.italic, "sitm"),
            (style.underline, "smul"),
            (style.blink, "blink"),
            (style.reverse, "rev"),
        ];
        for (enabled, name) in attributes {
            if enabled {
                self.emit_optional(name)?;
            }
        }
        if let Some(fg) = style.fg {
            self.apply_color(fg, Layer::Foreground)?;
        }
        if let Some(bg) = style.bg {
            self.apply_color(bg, Layer::Background)?;
        }
        self.current = Some(*style);
        Ok(())
    }

    fn apply_color(&mut self, color: Color, layer: Layer) -> Result<()> {
        if color.required_depth() == ColorDepth::TrueColor
            && self.depth < ColorDepth::TrueColor
            && !self.degraded_warned
        {
            self.degraded_warned = true;
            tracing::warn!(
                term = self.caps.term(),
                depth = ?self.depth,
                "{}; degrading RGB colors to the terminal palette",
                crate::error::Error::CapabilityFailure("truecolor".to_string())
            );
        }

        match color.resolve(self.depth) {
            ResolvedColor::Rgb(r, g, b) => {
                write!(self.writer, "\x1b[{};2;{};{};{}m", layer.direct_prefix(), r, g, b)?;
            }
            ResolvedColor::Indexed(idx) => {
                if !self.caps.has(layer.capability()) {
                    if !self.missing_color_warned {
                        self.missing_color_warned = true;
                        tracing::warn!(
                            term = self.caps.term(),
                            "terminal has no color support, colors ignored"
                        );
                    }
                    return Ok(());
                }
                self.emit(layer.capability(), &[idx as i32])?;
            }
        }
        Ok(())
    }

    /// Flush output buffer to terminal
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Cells written since the last call, for per-frame statistics
    pub fn take_cells_written(&mut self) -> usize {
        std::mem::take(&mut self.cells_written)
    }

    pub fn cells_written(&self) -> usize {
        self.cells_written
    }

    /// Forget the current rendition so the next cell re-emits its style
    pub fn invalidate_style(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::AnsiColor;

    fn text(renderer: &Renderer<Vec<u8>>) -> String {
        String::from_utf8_lossy(renderer.output()).into_owned()
    }

    #[test]
    fn test_move_cursor_uses_one_based_address() {
        let mut r = Renderer::headless(CapabilityDb::for_term("xterm", None));
        r.move_cursor(4, 2).unwrap();
        assert_eq!(text(&r), "\x1b[3;5H");
    }

    #[test]
    fn test_style_emitted_only_on_change() {
        let mut r = Renderer::headless(CapabilityDb::for_term("xterm-256color", None));
        let bold = Style::new().bold(true);
        r.write_cell('a', &bold).unwrap();
        r.write_cell('b', &bold).unwrap();
        assert_eq!(text(&r), "\x1b(B\x1b[m\x1b[1mab");

        r.clear_output();
        r.write_cell('c', &Style::default()).unwrap();
        assert_eq!(text(&r), "\x1b(B\x1b[mc");
        assert_eq!(r.take_cells_written(), 3);
        assert_eq!(r.cells_written(), 0);
    }

    #[test]
    fn test_palette_colors() {
        let mut r = Renderer::headless(CapabilityDb::for_term("xterm-256color", None));
        let style = Style::new()
            .fg(Color::Palette256(202))
            .bg(Color::Ansi16(AnsiColor::Blue));
        r.write_cell('x', &style).unwrap();
        let out = text(&r);
        assert!(out.contains("\x1b[38;5;202m"));
        assert!(out.contains("\x1b[44m"));
    }

    #[test]
    fn test_truecolor_passthrough_and_degradation() {
        let mut direct =
            Renderer::headless(CapabilityDb::for_term("xterm-256color", Some("truecolor")));
        direct.write_cell('x', &Style::new().fg(Color::rgb(1, 2, 3))).unwrap();
        assert!(text(&direct).contains("\x1b[38;2;1;2;3m"));

        let mut palette = Renderer::headless(CapabilityDb::for_term("xterm-256color", None));
        palette.write_cell('x', &Style::new().fg(Color::rgb(255, 0, 0))).unwrap();
        let out = text(&palette);
        assert!(!out.contains(";2;"));
        assert!(out.contains("\x1b[38;5;196m"));
    }

    #[test]
    fn test_colorless_terminal_skips_colors() {
        let mut r = Renderer::headless(CapabilityDb::for_term("vt100", None));
        r.write_cell('x', &Style::new().fg(Color::white()).italic(true)).unwrap();
        assert_eq!(text(&r), "\x1b[mx");
        // No cursor visibility capability is not an error
        r.hide_cursor().unwrap();
    }
}
