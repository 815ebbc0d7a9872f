//! Differential screen buffer
//!
//! Widgets draw into a grid of [`Cell`]s. Every cell whose glyph or style
//! changes is stamped with the next frame number; [`ScreenBuffer::flush`]
//! writes only the stamped cells and then advances the flushed marker, so a
//! frame that changed nothing costs nothing.
//!
//! A second grid remembers what the terminal was last sent. A cell that was
//! cleared and repainted with its old contents within one frame is stamped
//! but not rewritten.
//!
//! Storage only ever grows. Shrinking the terminal narrows the visible
//! viewport while keeping the larger allocation around for the next growth.

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::style::Style;
use crate::terminal::Renderer;
use std::io::Write;
use unicode_width::UnicodeWidthChar;

/// Placeholder stored in the right half of a double-width glyph
pub const CONTINUATION: char = '\0';

/// One character position on the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
    /// Frame number of the last change to this cell
    pub last_write: u64,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            style: Style::default(),
            last_write: 0,
        }
    }
}

impl Cell {
    fn is_continuation(&self) -> bool {
        self.ch == CONTINUATION
    }
}

#[derive(Debug)]
pub struct ScreenBuffer {
    cells: Vec<Cell>,
    /// Glyph and style the terminal shows; `None` when unknown
    front: Vec<Option<(char, Style)>>,
    /// Allocated grid dimensions
    stride_rows: u16,
    stride_cols: u16,
    /// Visible dimensions
    rows: u16,
    cols: u16,
    update_counter: u64,
    flushed_counter: u64,
    /// Cell indices stamped since the last flush
    dirty: Vec<usize>,
}

impl ScreenBuffer {
    /// Create a blank buffer; nothing is pending until something is written
    pub fn new(rows: u16, cols: u16) -> Self {
        let len = rows as usize * cols as usize;
        ScreenBuffer {
            cells: vec![Cell::default(); len],
            front: vec![Some((' ', Style::default())); len],
            stride_rows: rows,
            stride_cols: cols,
            rows,
            cols,
            update_counter: 0,
            flushed_counter: 0,
            dirty: Vec::new(),
        }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Number of cells waiting for the next flush
    pub fn pending(&self) -> usize {
        self.dirty.len()
    }

    /// Frame number of the last flush
    pub fn flushed_frame(&self) -> u64 {
        self.flushed_counter
    }

    pub fn get(&self, row: u16, col: u16) -> Option<&Cell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(self.index(row, col))
    }

    /// Check whether the cell changed since the last flush
    pub fn is_dirty(&self, row: u16, col: u16) -> bool {
        self.get(row, col)
            .is_some_and(|cell| cell.last_write > self.flushed_counter)
    }

    #[inline]
    fn index(&self, row: u16, col: u16) -> usize {
        row as usize * self.stride_cols as usize + col as usize
    }

    /// Store `ch` at `idx`, stamping the cell only when it actually changes
    fn put(&mut self, idx: usize, ch: char, style: Style) -> bool {
        let next = self.update_counter + 1;
        let flushed = self.flushed_counter;
        let cell = &mut self.cells[idx];
        if cell.ch == ch && cell.style == style {
            return false;
        }
        let was_dirty = cell.last_write > flushed;
        cell.ch = ch;
        cell.style = style;
        cell.last_write = next;
        if !was_dirty {
            self.dirty.push(idx);
        }
        true
    }

    /// Blank the halves of any wide glyph that a write at `col` would split
    fn repair_wide(&mut self, row: u16, col: u16, style: Style) {
        let idx = self.index(row, col);
        if self.cells[idx].is_continuation() && col > 0 {
            self.put(idx - 1, ' ', style);
        }
        if col + 1 < self.cols && self.cells[idx + 1].is_continuation() {
            self.put(idx + 1, ' ', style);
        }
    }

    /// Write `content` starting at (`row`, `col`)
    ///
    /// Text never wraps onto the next row: whatever runs past the end of
    /// `row` is dropped with a warning, even when later rows have room.
    /// Zero-width characters are skipped. Returns the number of cells whose
    /// contents changed.
    pub fn set(&mut self, content: &str, row: u16, col: u16, style: Style) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::out_of_range(format!(
                "cell ({row}, {col}) outside {}x{} buffer",
                self.rows, self.cols
            )));
        }

        let mut written = 0;
        let mut x = col;
        let mut chars = content.chars();
        while let Some(ch) = chars.next() {
            let width = ch.width().unwrap_or(0) as u16;
            if width == 0 {
                continue;
            }
            if x + width > self.cols {
                let dropped = 1 + chars.filter(|c| c.width().unwrap_or(0) > 0).count();
                tracing::warn!(
                    row,
                    col,
                    dropped,
                    cols = self.cols,
                    "truncated write past end of screen row"
                );
                break;
            }
            self.repair_wide(row, x, style);
            if width == 2 {
                self.repair_wide(row, x + 1, style);
            }
            let idx = self.index(row, x);
            written += self.put(idx, ch, style) as usize;
            if width == 2 {
                written += self.put(idx + 1, CONTINUATION, style) as usize;
            }
            x += width;
        }
        Ok(written)
    }

    /// Fill `rect` (clipped to the visible grid) with `ch`
    pub fn fill(&mut self, rect: Rect, ch: char, style: Style) -> usize {
        let area = rect.intersect(&Rect::new(0, 0, self.cols, self.rows));
        if area.is_empty() {
            return 0;
        }
        let line: String = std::iter::repeat_n(ch, area.width as usize).collect();
        let mut written = 0;
        for row in area.y..area.bottom() {
            // Cannot fail: the area lies inside the grid
            written += self.set(&line, row, area.x, style).unwrap_or(0);
        }
        written
    }

    /// Blank the whole visible grid
    pub fn clear(&mut self) -> usize {
        self.fill(
            Rect::new(0, 0, self.cols, self.rows),
            ' ',
            Style::default(),
        )
    }

    /// Mark every visible cell for redraw, e.g. after the terminal was cleared
    pub fn invalidate(&mut self) {
        let next = self.update_counter + 1;
        self.dirty.clear();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let idx = self.index(row, col);
                self.cells[idx].last_write = next;
                self.front[idx] = None;
                self.dirty.push(idx);
            }
        }
    }

    /// Change the visible size
    ///
    /// Storage grows only along dimensions that increased. An unchanged size
    /// is a no-op; any real change stamps the whole visible grid because the
    /// terminal has reflowed its contents.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        if rows == self.rows && cols == self.cols {
            return;
        }
        let new_rows = self.stride_rows.max(rows);
        let new_cols = self.stride_cols.max(cols);
        if new_rows != self.stride_rows || new_cols != self.stride_cols {
            let len = new_rows as usize * new_cols as usize;
            let mut cells = vec![Cell::default(); len];
            let width = self.stride_cols as usize;
            for row in 0..self.stride_rows as usize {
                let (from, to) = (row * width, row * new_cols as usize);
                cells[to..to + width].copy_from_slice(&self.cells[from..from + width]);
            }
            self.cells = cells;
            self.front = vec![None; len];
            self.stride_rows = new_rows;
            self.stride_cols = new_cols;
        }
        tracing::debug!(rows, cols, "screen buffer resized");
        self.rows = rows;
        self.cols = cols;
        self.invalidate();
    }

    /// Write every changed cell to `renderer`; returns the number written
    ///
    /// The cursor is repositioned only when the next changed cell does not
    /// directly follow the previous one. Cells whose final contents match
    /// what the terminal already shows are skipped.
    pub fn flush<W: Write>(&mut self, renderer: &mut Renderer<W>) -> Result<usize> {
        self.update_counter += 1;
        let frame = self.update_counter;

        let mut dirty = std::mem::take(&mut self.dirty);
        dirty.sort_unstable();

        let stride = self.stride_cols as usize;
        let mut cursor: Option<(u16, u16)> = None;
        let mut written = 0;
        for &idx in &dirty {
            let row = (idx / stride) as u16;
            let col = (idx % stride) as u16;
            if row >= self.rows || col >= self.cols {
                continue;
            }
            let cell = self.cells[idx];
            if cell.is_continuation() {
                self.front[idx] = Some((cell.ch, cell.style));
                continue;
            }
            if self.front[idx] == Some((cell.ch, cell.style)) {
                continue;
            }
            self.front[idx] = Some((cell.ch, cell.style));
            if cursor != Some((row, col)) {
                renderer.move_cursor(col, row)?;
            }
            renderer.write_cell(cell.ch, &cell.style)?;
            let advance = cell.ch.width().unwrap_or(1).max(1) as u16;
            cursor = Some((row, col + advance));
            written += 1;
        }

        dirty.clear();
        self.dirty = dirty;
        self.flushed_counter = frame;
        renderer.flush()?;
        tracing::trace!(frame, written, "flushed screen buffer");
        Ok(written)
    }
}
