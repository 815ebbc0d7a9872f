//! Single-line text input with cursor and editing support
//!
//! Provides:
//! - Cursor positioning and movement (left, right, home, end)
//! - Basic editing (insert, delete, backspace)
//! - Submission on Enter through the `submitted` signal
//! - Horizontal scrolling that keeps the cursor visible

use super::draw::{char_width, fit_line, text_width, Canvas};
use crate::error::Result;
use crate::geometry::Rect;
use crate::input::{ArrowDirection, EventKind, NavKey};
use crate::signal::Signal;
use crate::style::{Style, TextAlign};

#[derive(Debug, Default)]
pub struct InputBox {
    buffer: String,
    /// Cursor position (byte offset into `buffer`)
    cursor: usize,
    pub submitted: Signal<String>,
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Replace the value and move the cursor to the end
    pub(crate) fn set_value(&mut self, value: String) {
        self.buffer = value;
        self.cursor = self.buffer.len();
    }

    fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| self.cursor + i)
            .unwrap_or(self.buffer.len())
    }

    fn delete_char_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = self.prev_boundary();
        self.buffer.remove(prev);
        self.cursor = prev;
        true
    }

    fn delete_char_at(&mut self) -> bool {
        if self.cursor >= self.buffer.len() {
            return false;
        }
        self.buffer.remove(self.cursor);
        true
    }

    fn move_to(&mut self, cursor: usize) -> bool {
        let moved = self.cursor != cursor;
        self.cursor = cursor;
        moved
    }

    fn submit(&mut self) {
        let value = self.buffer.clone();
        self.submitted.emit(&value);
    }

    pub(crate) fn handle_key(&mut self, kind: &EventKind) -> bool {
        match kind {
            EventKind::PrintableChar { key, .. } => {
                self.insert_char(*key);
                true
            }
            EventKind::NavigationKey { key, .. } => match key {
                NavKey::Enter => {
                    self.submit();
                    true
                }
                NavKey::Backspace => self.delete_char_before(),
                NavKey::Delete => self.delete_char_at(),
                NavKey::Home => self.move_to(0),
                NavKey::End => self.move_to(self.buffer.len()),
                _ => false,
            },
            EventKind::ArrowKey {
                direction: ArrowDirection::Left,
                ..
            } => self.move_to(self.prev_boundary()),
            EventKind::ArrowKey {
                direction: ArrowDirection::Right,
                ..
            } => self.move_to(self.next_boundary()),
            _ => false,
        }
    }

    /// Characters skipped on the left so the cursor fits in `width` cells
    fn scroll_for(&self, width: u16) -> usize {
        let cursor_col = text_width(&self.buffer[..self.cursor]) as usize;
        let width = width as usize;
        if width == 0 || cursor_col < width {
            return 0;
        }
        // Drop leading characters until the cursor cell is inside the window
        let mut skipped = 0;
        let mut dropped_width = 0usize;
        for c in self.buffer[..self.cursor].chars() {
            if cursor_col - dropped_width < width {
                break;
            }
            dropped_width += char_width(c) as usize;
            skipped += 1;
        }
        skipped
    }

    pub(crate) fn render(
        &self,
        canvas: &mut Canvas,
        area: Rect,
        style: Style,
        focused: bool,
    ) -> Result<()> {
        if area.is_empty() {
            return Ok(());
        }
        let y = area.y;
        let skip = self.scroll_for(area.width);
        let before: String = self.buffer[..self.cursor].chars().skip(skip).collect();
        let under = self.buffer[self.cursor..].chars().next();
        let after: String = self.buffer[self.cursor..].chars().skip(1).collect();

        let mut x = area.x;
        let right = area.right();

        let before_width = text_width(&before).min(area.width);
        canvas.put_str(x, y, &fit_line(&before, before_width, TextAlign::Left), style)?;
        x += before_width;

        if x < right {
            let cursor_glyph = under.map(String::from).unwrap_or_else(|| " ".to_string());
            let cursor_style = if focused { style.reverse(true) } else { style };
            let glyph_width = text_width(&cursor_glyph).min(right - x);
            canvas.put_str(
                x,
                y,
                &fit_line(&cursor_glyph, glyph_width, TextAlign::Left),
                cursor_style,
            )?;
            x += glyph_width;
        }

        if x < right {
            canvas.put_str(x, y, &fit_line(&after, right - x, TextAlign::Left), style)?;
        }

        for row in 1..area.height {
            canvas.put_str(area.x, y + row, &" ".repeat(area.width as usize), style)?;
        }
        Ok(())
    }
}
