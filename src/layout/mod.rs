//! Layout system - flex-based positioning and sizing
//!
//! The flex solver in [`flex`] is written once against the [`Axis`] strategy
//! trait. [`HorizontalAxis`] treats width as the main axis and height as the
//! cross axis; [`VerticalAxis`] swaps them. A panel picks its strategy from
//! its [`Direction`].

pub mod flex;

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::widget::Widget;
use std::str::FromStr;

/// Flex direction for container layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Children placed left to right
    Horizontal,
    /// Children stacked top to bottom
    #[default]
    Vertical,
}

impl Direction {
    /// Strategy object mapping main/cross axes onto widget geometry
    pub fn axis(&self) -> &'static dyn Axis {
        match self {
            Direction::Horizontal => &HorizontalAxis,
            Direction::Vertical => &VerticalAxis,
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "horizontal" | "row" => Ok(Direction::Horizontal),
            "vertical" | "column" => Ok(Direction::Vertical),
            other => Err(Error::invalid(format!("unknown direction `{other}`"))),
        }
    }
}

/// Alignment options for flex containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

impl FromStr for Alignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(Alignment::Start),
            "center" => Ok(Alignment::Center),
            "end" => Ok(Alignment::End),
            "stretch" => Ok(Alignment::Stretch),
            other => Err(Error::invalid(format!("unknown alignment `{other}`"))),
        }
    }
}

/// Main/cross axis mapping used by the flex solver
pub trait Axis: Send + Sync {
    fn direction(&self) -> Direction;

    /// Box size along the main axis
    fn main_size(&self, widget: &Widget) -> u16;

    /// Box size along the cross axis
    fn cross_size(&self, widget: &Widget) -> u16;

    /// Set the main-axis box size (clamped to the widget's minimum);
    /// returns true if it changed
    fn set_main_size(&self, widget: &mut Widget, size: u16) -> bool;

    fn set_cross_size(&self, widget: &mut Widget, size: u16) -> bool;

    /// Smallest main-axis box size the widget accepts
    fn min_main(&self, widget: &Widget) -> u16;

    fn min_cross(&self, widget: &Widget) -> u16;

    /// Leading and trailing margin along the main axis
    fn main_margins(&self, widget: &Widget) -> (u16, u16);

    fn cross_margins(&self, widget: &Widget) -> (u16, u16);

    /// Position the widget; returns true if it moved
    fn place(&self, widget: &mut Widget, main: u16, cross: u16) -> bool;

    /// Split a rectangle into (main origin, cross origin, main length, cross length)
    fn split(&self, rect: Rect) -> (u16, u16, u16, u16);
}

/// Width is the main axis
#[derive(Debug, Clone, Copy, Default)]
pub struct HorizontalAxis;

/// Height is the main axis
#[derive(Debug, Clone, Copy, Default)]
pub struct VerticalAxis;

impl Axis for HorizontalAxis {
    fn direction(&self) -> Direction {
        Direction::Horizontal
    }

    fn main_size(&self, widget: &Widget) -> u16 {
        widget.width()
    }

    fn cross_size(&self, widget: &Widget) -> u16 {
        widget.height()
    }

    fn set_main_size(&self, widget: &mut Widget, size: u16) -> bool {
        widget.apply_size(size, widget.height())
    }

    fn set_cross_size(&self, widget: &mut Widget, size: u16) -> bool {
        widget.apply_size(widget.width(), size)
    }

    fn min_main(&self, widget: &Widget) -> u16 {
        widget.floor_size().0
    }

    fn min_cross(&self, widget: &Widget) -> u16 {
        widget.floor_size().1
    }

    fn main_margins(&self, widget: &Widget) -> (u16, u16) {
        (widget.margin().left, widget.margin().right)
    }

    fn cross_margins(&self, widget: &Widget) -> (u16, u16) {
        (widget.margin().top, widget.margin().bottom)
    }

    fn place(&self, widget: &mut Widget, main: u16, cross: u16) -> bool {
        widget.apply_pos(main, cross)
    }

    fn split(&self, rect: Rect) -> (u16, u16, u16, u16) {
        (rect.x, rect.y, rect.width, rect.height)
    }
}

impl Axis for VerticalAxis {
    fn direction(&self) -> Direction {
        Direction::Vertical
    }

    fn main_size(&self, widget: &Widget) -> u16 {
        widget.height()
    }

    fn cross_size(&self, widget: &Widget) -> u16 {
        widget.width()
    }

    fn set_main_size(&self, widget: &mut Widget, size: u16) -> bool {
        widget.apply_size(widget.width(), size)
    }

    fn set_cross_size(&self, widget: &mut Widget, size: u16) -> bool {
        widget.apply_size(size, widget.height())
    }

    fn min_main(&self, widget: &Widget) -> u16 {
        widget.floor_size().1
    }

    fn min_cross(&self, widget: &Widget) -> u16 {
        widget.floor_size().0
    }

    fn main_margins(&self, widget: &Widget) -> (u16, u16) {
        (widget.margin().top, widget.margin().bottom)
    }

    fn cross_margins(&self, widget: &Widget) -> (u16, u16) {
        (widget.margin().left, widget.margin().right)
    }

    fn place(&self, widget: &mut Widget, main: u16, cross: u16) -> bool {
        widget.apply_pos(cross, main)
    }

    fn split(&self, rect: Rect) -> (u16, u16, u16, u16) {
        (rect.y, rect.x, rect.height, rect.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Sides;

    #[test]
    fn test_direction_parsing() {
        assert_eq!("row".parse::<Direction>().unwrap(), Direction::Horizontal);
        assert_eq!("Vertical".parse::<Direction>().unwrap(), Direction::Vertical);
        assert!(matches!(
            "diagonal".parse::<Direction>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_alignment_parsing() {
        assert_eq!("stretch".parse::<Alignment>().unwrap(), Alignment::Stretch);
        assert!("middle".parse::<Alignment>().is_err());
    }

    #[test]
    fn test_axis_mapping_swaps() {
        let w = Widget::label("l", "hello")
            .with_size(7, 3)
            .with_margin(Sides::new(1, 2, 3, 4));

        let h = Direction::Horizontal.axis();
        assert_eq!(h.main_size(&w), 7);
        assert_eq!(h.cross_size(&w), 3);
        assert_eq!(h.main_margins(&w), (4, 2));
        assert_eq!(h.cross_margins(&w), (1, 3));

        let v = Direction::Vertical.axis();
        assert_eq!(v.main_size(&w), 3);
        assert_eq!(v.cross_size(&w), 7);
        assert_eq!(v.main_margins(&w), (1, 3));
        assert_eq!(v.cross_margins(&w), (4, 2));
    }

    #[test]
    fn test_axis_place() {
        let mut w = Widget::label("l", "x");
        assert!(VerticalAxis.place(&mut w, 5, 2));
        assert_eq!((w.pos_x(), w.pos_y()), (2, 5));
        assert!(!VerticalAxis.place(&mut w, 5, 2));

        HorizontalAxis.place(&mut w, 5, 2);
        assert_eq!((w.pos_x(), w.pos_y()), (5, 2));
    }
}
