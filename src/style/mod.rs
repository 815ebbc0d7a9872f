//! Cell styling - colors, text attributes, alignment and borders
//!
//! Styles are plain values compared field by field; the screen buffer uses
//! that equality to decide whether a cell changed.

mod border;
mod color;

pub use border::{Border, BorderChars, BorderStyle};
pub use color::{AnsiColor, Color, ColorDepth, ResolvedColor};

/// Horizontal placement of text inside a content window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Column offset for text of `text_width` cells inside `available` cells
    pub fn offset(&self, available: u16, text_width: u16) -> u16 {
        let spare = available.saturating_sub(text_width);
        match self {
            TextAlign::Left => 0,
            TextAlign::Center => spare / 2,
            TextAlign::Right => spare,
        }
    }
}

/// Visual attributes of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Foreground color (`None` keeps the terminal default)
    pub fg: Option<Color>,
    /// Background color (`None` keeps the terminal default)
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub reverse: bool,
}

impl Style {
    /// Create a new empty style
    pub fn new() -> Self {
        Style::default()
    }

    pub fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn dim(mut self, dim: bool) -> Self {
        self.dim = dim;
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    pub fn blink(mut self, blink: bool) -> Self {
        self.blink = blink;
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Check whether this is the terminal's default rendition
    pub fn is_plain(&self) -> bool {
        *self == Style::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_value_equality() {
        let a = Style::new().bold(true).fg(Color::rgb(1, 2, 3));
        let b = Style::new().fg(Color::rgb(1, 2, 3)).bold(true);
        assert_eq!(a, b);
        assert_ne!(a, a.underline(true));
        assert!(Style::new().is_plain());
        assert!(!a.is_plain());
    }

    #[test]
    fn test_text_align_offset() {
        assert_eq!(TextAlign::Left.offset(10, 4), 0);
        assert_eq!(TextAlign::Center.offset(10, 4), 3);
        assert_eq!(TextAlign::Right.offset(10, 4), 6);
        // Text wider than the window never produces a negative offset
        assert_eq!(TextAlign::Right.offset(3, 8), 0);
    }
}
