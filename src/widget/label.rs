//! Static text

use super::draw::{fit_line, text_width, Canvas};
use crate::error::Result;
use crate::geometry::Rect;
use crate::style::{Style, TextAlign};

/// One or more lines of text, split on `\n`
#[derive(Debug, Clone, Default)]
pub struct Label {
    text: String,
    align: TextAlign,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Label {
            text: text.into(),
            align: TextAlign::Left,
        }
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn align(&self) -> TextAlign {
        self.align
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub(crate) fn set_align(&mut self, align: TextAlign) {
        self.align = align;
    }

    /// Content size that shows every line in full
    pub fn natural_size(&self) -> (u16, u16) {
        let width = self.text.split('\n').map(text_width).max().unwrap_or(0);
        let height = self.text.split('\n').count().max(1);
        (width, height.min(u16::MAX as usize) as u16)
    }

    pub(crate) fn render(&self, canvas: &mut Canvas, area: Rect, style: Style) -> Result<()> {
        let mut lines = self.text.split('\n');
        for row in 0..area.height {
            let line = lines.next().unwrap_or("");
            canvas.put_str(area.x, area.y + row, &fit_line(line, area.width, self.align), style)?;
        }
        Ok(())
    }
}
