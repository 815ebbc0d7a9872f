//! Border glyph sets and per-widget border settings

/// Glyph set used to draw a border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    Single,
    Double,
    Rounded,
    Heavy,
    Ascii,
}

impl BorderStyle {
    /// Get border characters for this style
    pub fn chars(&self) -> BorderChars {
        match self {
            BorderStyle::Single => BorderChars::single(),
            BorderStyle::Double => BorderChars::double(),
            BorderStyle::Rounded => BorderChars::rounded(),
            BorderStyle::Heavy => BorderChars::heavy(),
            BorderStyle::Ascii => BorderChars::ascii(),
        }
    }
}

/// Border of a widget: glyph set plus visibility
///
/// A visible border is always one cell wide on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Border {
    pub style: BorderStyle,
    pub visible: bool,
}

impl Border {
    pub fn none() -> Self {
        Border::default()
    }

    pub fn new(style: BorderStyle) -> Self {
        Border {
            style,
            visible: true,
        }
    }

    /// Width of the border on one side, in cells
    pub fn width(&self) -> u16 {
        if self.visible {
            1
        } else {
            0
        }
    }
}

/// Border characters for drawing boxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderChars {
    pub horizontal: char,
    pub vertical: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
}

impl BorderChars {
    pub fn single() -> Self {
        BorderChars {
            horizontal: '─',
            vertical: '│',
            top_left: '┌',
            top_right: '┐',
            bottom_left: '└',
            bottom_right: '┘',
        }
    }

    pub fn double() -> Self {
        BorderChars {
            horizontal: '═',
            vertical: '║',
            top_left: '╔',
            top_right: '╗',
            bottom_left: '╚',
            bottom_right: '╝',
        }
    }

    pub fn rounded() -> Self {
        BorderChars {
            horizontal: '─',
            vertical: '│',
            top_left: '╭',
            top_right: '╮',
            bottom_left: '╰',
            bottom_right: '╯',
        }
    }

    pub fn heavy() -> Self {
        BorderChars {
            horizontal: '━',
            vertical: '┃',
            top_left: '┏',
            top_right: '┓',
            bottom_left: '┗',
            bottom_right: '┛',
        }
    }

    pub fn ascii() -> Self {
        BorderChars {
            horizontal: '-',
            vertical: '|',
            top_left: '+',
            top_right: '+',
            bottom_left: '+',
            bottom_right: '+',
        }
    }
}
