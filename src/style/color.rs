//! Colors and their degradation to what the terminal can show

/// A foreground or background color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// 24-bit color, shown as is only on truecolor terminals
    Rgb(u8, u8, u8),
    /// Index into the xterm 256-color palette
    Palette256(u8),
    /// One of the 16 named terminal colors
    Ansi16(AnsiColor),
}

/// The 16 named terminal colors, in palette order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AnsiColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

/// How many colors the output terminal can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColorDepth {
    Ansi8,
    Ansi16,
    Palette256,
    TrueColor,
}

/// A color after degradation to what the terminal supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedColor {
    /// Palette index for `setaf`/`setab`
    Indexed(u8),
    /// Direct 24-bit color
    Rgb(u8, u8, u8),
}

const ANSI: [AnsiColor; 16] = [
    AnsiColor::Black,
    AnsiColor::Red,
    AnsiColor::Green,
    AnsiColor::Yellow,
    AnsiColor::Blue,
    AnsiColor::Magenta,
    AnsiColor::Cyan,
    AnsiColor::White,
    AnsiColor::BrightBlack,
    AnsiColor::BrightRed,
    AnsiColor::BrightGreen,
    AnsiColor::BrightYellow,
    AnsiColor::BrightBlue,
    AnsiColor::BrightMagenta,
    AnsiColor::BrightCyan,
    AnsiColor::BrightWhite,
];

/// VGA values for the 16 named colors
const ANSI_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (170, 0, 0),
    (0, 170, 0),
    (170, 85, 0),
    (0, 0, 170),
    (170, 0, 170),
    (0, 170, 170),
    (170, 170, 170),
    (85, 85, 85),
    (255, 85, 85),
    (85, 255, 85),
    (255, 255, 85),
    (85, 85, 255),
    (255, 85, 255),
    (85, 255, 255),
    (255, 255, 255),
];

/// Channel levels of the xterm 6x6x6 color cube (indices 16..=231)
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb(r, g, b)
    }

    pub fn white() -> Self {
        Color::Ansi16(AnsiColor::White)
    }

    pub fn black() -> Self {
        Color::Ansi16(AnsiColor::Black)
    }

    /// The smallest depth that shows this color without loss
    pub fn required_depth(&self) -> ColorDepth {
        match *self {
            Color::Rgb(..) => ColorDepth::TrueColor,
            Color::Palette256(idx) => match idx {
                0..=7 => ColorDepth::Ansi8,
                8..=15 => ColorDepth::Ansi16,
                _ => ColorDepth::Palette256,
            },
            Color::Ansi16(a) if a.index() < 8 => ColorDepth::Ansi8,
            Color::Ansi16(_) => ColorDepth::Ansi16,
        }
    }

    /// Map onto the closest color `depth` can show
    pub fn resolve(&self, depth: ColorDepth) -> ResolvedColor {
        if let (Color::Rgb(r, g, b), ColorDepth::TrueColor) = (*self, depth) {
            return ResolvedColor::Rgb(r, g, b);
        }
        let index = match depth {
            ColorDepth::TrueColor | ColorDepth::Palette256 => self.palette_index(),
            ColorDepth::Ansi16 => self.nearest_ansi().index(),
            // Bright variants fold onto their base color
            ColorDepth::Ansi8 => self.nearest_ansi().index() & 0x7,
        };
        ResolvedColor::Indexed(index)
    }

    /// Approximate RGB value, for distance comparisons
    pub fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Rgb(r, g, b) => (r, g, b),
            Color::Palette256(idx) => palette_rgb(idx),
            Color::Ansi16(a) => ANSI_RGB[a.index() as usize],
        }
    }

    fn palette_index(self) -> u8 {
        match self {
            Color::Palette256(idx) => idx,
            Color::Ansi16(a) => a.index(),
            Color::Rgb(r, g, b) => nearest_palette_index(r, g, b),
        }
    }

    fn nearest_ansi(self) -> AnsiColor {
        match self {
            Color::Ansi16(a) => a,
            Color::Palette256(idx) if idx < 16 => AnsiColor::from_index(idx),
            other => {
                let rgb = other.to_rgb();
                ANSI.iter()
                    .copied()
                    .min_by_key(|a| distance(rgb, ANSI_RGB[a.index() as usize]))
                    .unwrap_or(AnsiColor::White)
            }
        }
    }
}

impl From<AnsiColor> for Color {
    fn from(value: AnsiColor) -> Self {
        Color::Ansi16(value)
    }
}

impl AnsiColor {
    /// Palette index (0-15) as understood by `setaf`
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Color at palette index `idx`; indices past 15 clamp to bright white
    pub fn from_index(idx: u8) -> Self {
        ANSI[usize::from(idx.min(15))]
    }
}

fn distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> u32 {
    let d = |x: u8, y: u8| (i32::from(x) - i32::from(y)).pow(2) as u32;
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}

fn palette_rgb(idx: u8) -> (u8, u8, u8) {
    match idx {
        0..=15 => ANSI_RGB[usize::from(idx)],
        16..=231 => {
            let i = idx - 16;
            let level = |n: u8| CUBE_LEVELS[usize::from(n)];
            (level(i / 36), level((i / 6) % 6), level(i % 6))
        }
        _ => {
            let gray = 8 + (idx - 232) * 10;
            (gray, gray, gray)
        }
    }
}

/// Closest entry in the cube or the grayscale ramp (indices 232..=255)
fn nearest_palette_index(r: u8, g: u8, b: u8) -> u8 {
    let nearest_level = |v: u8| -> u8 {
        (0..CUBE_LEVELS.len() as u8)
            .min_by_key(|&i| CUBE_LEVELS[usize::from(i)].abs_diff(v))
            .unwrap_or(0)
    };
    let cube = 16 + 36 * nearest_level(r) + 6 * nearest_level(g) + nearest_level(b);

    let avg = ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8;
    let gray = 232 + (avg.saturating_sub(3) / 10).min(23);

    let rgb = (r, g, b);
    if distance(rgb, palette_rgb(gray)) < distance(rgb, palette_rgb(cube)) {
        gray
    } else {
        cube
    }
}
