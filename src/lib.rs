//! panelkit - a retained-mode terminal widget toolkit
//!
//! Widgets live in an arena tree and are laid out by a flex-style packer:
//! - Panels stack children horizontally or vertically with grow/shrink factors
//! - A cell buffer records changes and flushes only what differs on screen
//! - Escape sequences come from a built-in capability table per terminal family
//! - Input is read on a background thread and decoded into typed events
//!
//! [`App`] ties it together: it takes over the terminal, runs the frame loop
//! and restores the terminal on exit, including on errors and panics.

pub mod app;
pub mod buffer;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod screen;
pub mod signal;
pub mod style;
pub mod terminal;
pub mod widget;

// Re-export commonly used types
pub use app::{App, Control, FrameTimer};
pub use buffer::{Cell, ScreenBuffer};
pub use config::Config;
pub use error::{Error, Result};
pub use geometry::{Rect, Sides, Vertex};
pub use input::{Decoder, Event, EventHandler, EventKind, MouseReport, OverflowPolicy};
pub use layout::{Alignment, Direction};
pub use screen::Screen;
pub use signal::{Connection, LifetimeToken, Signal};
pub use style::{Border, BorderStyle, Color, Style, TextAlign};
pub use terminal::{CapabilityDb, Renderer, TerminalGeometry, TerminalGuard};
pub use widget::{
    Button, Container, InputBox, Label, ListBox, Panel, Widget, WidgetId, WidgetKind, WidgetTree,
};
