//! Geometry primitives - rectangles, box sides and side selectors

use crate::error::{Error, Result};
use std::str::FromStr;

/// Rectangle bounds in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Create rectangle from terminal dimensions (fills entire screen)
    pub fn fullscreen(cols: u16, rows: u16) -> Self {
        Rect::new(0, 0, cols, rows)
    }

    /// Get right edge x-coordinate (exclusive)
    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Get bottom edge y-coordinate (exclusive)
    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if point is inside rectangle
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink the rectangle by per-side amounts
    pub fn inset(&self, sides: Sides) -> Self {
        Rect {
            x: self.x.saturating_add(sides.left),
            y: self.y.saturating_add(sides.top),
            width: self.width.saturating_sub(sides.horizontal()),
            height: self.height.saturating_sub(sides.vertical()),
        }
    }

    /// Clip this rectangle to another one
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect {
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
        }
    }
}

/// One side of a box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertex {
    Top,
    Right,
    Bottom,
    Left,
}

impl Vertex {
    /// Map an index in `[top, right, bottom, left]` order to a side
    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Vertex::Top),
            1 => Ok(Vertex::Right),
            2 => Ok(Vertex::Bottom),
            3 => Ok(Vertex::Left),
            other => Err(Error::invalid(format!("vertex index {other} is not 0..=3"))),
        }
    }
}

impl FromStr for Vertex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Vertex::Top),
            "right" => Ok(Vertex::Right),
            "bottom" => Ok(Vertex::Bottom),
            "left" => Ok(Vertex::Left),
            other => Err(Error::invalid(format!("unknown vertex `{other}`"))),
        }
    }
}

/// Per-side spacing used for padding and margin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Sides {
    pub fn new(top: u16, right: u16, bottom: u16, left: u16) -> Self {
        Sides {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Same amount on every side
    pub fn all(n: u16) -> Self {
        Sides::new(n, n, n, n)
    }

    /// Vertical and horizontal amounts, CSS shorthand style
    pub fn symmetric(vertical: u16, horizontal: u16) -> Self {
        Sides::new(vertical, horizontal, vertical, horizontal)
    }

    pub fn horizontal(&self) -> u16 {
        self.left.saturating_add(self.right)
    }

    pub fn vertical(&self) -> u16 {
        self.top.saturating_add(self.bottom)
    }

    pub fn get(&self, vertex: Vertex) -> u16 {
        match vertex {
            Vertex::Top => self.top,
            Vertex::Right => self.right,
            Vertex::Bottom => self.bottom,
            Vertex::Left => self.left,
        }
    }

    pub fn with(mut self, vertex: Vertex, value: u16) -> Self {
        match vertex {
            Vertex::Top => self.top = value,
            Vertex::Right => self.right = value,
            Vertex::Bottom => self.bottom = value,
            Vertex::Left => self.left = value,
        }
        self
    }
}

impl From<[u16; 4]> for Sides {
    fn from(v: [u16; 4]) -> Self {
        Sides::new(v[0], v[1], v[2], v[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(10, 10, 20, 20);
        assert!(r.contains(15, 15));
        assert!(r.contains(10, 10));
        assert!(!r.contains(30, 30));
        assert!(!r.contains(5, 15));
    }

    #[test]
    fn test_rect_inset() {
        let r = Rect::new(0, 0, 20, 10);
        let inner = r.inset(Sides::new(1, 2, 3, 4));
        assert_eq!(inner, Rect::new(4, 1, 14, 6));

        // Insets larger than the rect collapse to zero size
        let tiny = Rect::new(0, 0, 2, 2).inset(Sides::all(5));
        assert!(tiny.is_empty());
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Rect::new(5, 5, 5, 5));

        let disjoint = Rect::new(20, 20, 2, 2);
        assert!(a.intersect(&disjoint).is_empty());
    }

    #[test]
    fn test_sides_accessors() {
        let s = Sides::from([1, 2, 3, 4]);
        assert_eq!(s.vertical(), 4);
        assert_eq!(s.horizontal(), 6);
        assert_eq!(s.get(Vertex::Left), 4);
        assert_eq!(s.with(Vertex::Top, 9).top, 9);
    }

    #[test]
    fn test_vertex_parsing() {
        assert_eq!("Bottom".parse::<Vertex>().unwrap(), Vertex::Bottom);
        assert!("middle".parse::<Vertex>().is_err());
        assert_eq!(Vertex::from_index(3).unwrap(), Vertex::Left);
        assert!(matches!(
            Vertex::from_index(4),
            Err(Error::InvalidArgument(_))
        ));
    }
}
