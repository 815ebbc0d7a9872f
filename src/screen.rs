//! One terminal screen: widget tree, screen buffer and output
//!
//! A frame is pack (layout) → draw (widgets write into the buffer) → flush
//! (the buffer writes only changed cells). [`Screen::dispatch`] routes input
//! events to widgets: pointer reports by hit testing, keys to the focused
//! widget.

use crate::buffer::ScreenBuffer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::input::{ArrowDirection, Event, EventKind, MouseAction, MouseButton, MouseReport};
use crate::terminal::{CapabilityDb, Renderer, TerminalGeometry};
use crate::widget::{draw, Widget, WidgetId, WidgetTree};
use std::io::{self, BufWriter, Write};

/// Id of the root panel every screen starts with
pub const ROOT_ID: &str = "root";

pub struct Screen<W: Write = BufWriter<io::Stdout>> {
    tree: WidgetTree,
    buffer: ScreenBuffer,
    renderer: Renderer<W>,
    geometry: TerminalGeometry,
    focused: Option<WidgetId>,
    hovered: Option<WidgetId>,
    needs_full_redraw: bool,
}

impl Screen {
    /// A screen sized to the current terminal, writing to stdout
    pub fn new(config: &Config) -> Result<Self> {
        let geometry = TerminalGeometry::detect()?;
        let renderer = Renderer::new(config.capabilities());
        Screen::with_renderer(geometry, renderer)
    }
}

impl Screen<Vec<u8>> {
    /// A screen rendering into memory, for tests and tooling
    pub fn headless(cols: u16, rows: u16, caps: CapabilityDb) -> Result<Self> {
        Screen::with_renderer(TerminalGeometry::new(cols, rows), Renderer::headless(caps))
    }
}

impl<W: Write> Screen<W> {
    pub fn with_renderer(geometry: TerminalGeometry, renderer: Renderer<W>) -> Result<Self> {
        let mut tree = WidgetTree::new(ROOT_ID);
        tree.set_size(tree.root(), geometry.cols, geometry.rows)?;
        Ok(Screen {
            tree,
            buffer: ScreenBuffer::new(geometry.rows, geometry.cols),
            renderer,
            geometry,
            focused: None,
            hovered: None,
            needs_full_redraw: true,
        })
    }

    pub fn root(&self) -> WidgetId {
        self.tree.root()
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn buffer(&self) -> &ScreenBuffer {
        &self.buffer
    }

    pub fn renderer(&self) -> &Renderer<W> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<W> {
        &mut self.renderer
    }

    pub fn geometry(&self) -> TerminalGeometry {
        self.geometry
    }

    /// Attach `widget` to the root panel
    pub fn add_widget(&mut self, widget: Widget) -> Result<WidgetId> {
        self.tree.add_child(self.tree.root(), widget)
    }

    pub fn add_widget_to(&mut self, parent: WidgetId, widget: Widget) -> Result<WidgetId> {
        self.tree.add_child(parent, widget)
    }

    pub fn pack(&mut self) -> Result<()> {
        self.tree.pack()
    }

    /// Render one frame; returns the number of cells written to the terminal
    pub fn draw(&mut self) -> Result<usize> {
        self.tree.pack()?;
        self.forget_removed();

        if self.needs_full_redraw {
            self.needs_full_redraw = false;
            self.renderer.hide_cursor()?;
            self.renderer.clear()?;
            self.renderer.invalidate_style();
            self.buffer.invalidate();
        }

        draw::draw_tree(&mut self.tree, &mut self.buffer)?;
        let written = self.buffer.flush(&mut self.renderer)?;
        self.renderer.take_cells_written();
        Ok(written)
    }

    /// Adapt to a new terminal size; the next frame repaints everything
    pub fn resize(&mut self, cols: u16, rows: u16) -> Result<()> {
        if (cols, rows) == (self.geometry.cols, self.geometry.rows) {
            return Ok(());
        }
        tracing::debug!(cols, rows, "screen resized");
        self.geometry = TerminalGeometry::new(cols, rows);
        self.buffer.resize(rows, cols);
        self.tree.set_size(self.tree.root(), cols, rows)?;
        self.needs_full_redraw = true;
        Ok(())
    }

    /// Topmost visible widget covering the cell
    pub fn get_colliding_widget(&self, x: u16, y: u16) -> Option<WidgetId> {
        self.tree.widget_at(x, y)
    }

    pub fn focused(&self) -> Option<WidgetId> {
        self.focused
    }

    pub fn hovered(&self) -> Option<WidgetId> {
        self.hovered
    }

    /// Give keyboard focus to a focusable widget
    pub fn focus(&mut self, id: WidgetId) -> Result<()> {
        if !self.tree.get(id)?.is_focusable() {
            return Err(Error::invalid(format!(
                "widget `{}` cannot take focus",
                self.tree.get(id)?.absolute_id()
            )));
        }
        if self.focused == Some(id) {
            return Ok(());
        }
        if let Some(previous) = self.focused.take() {
            if self.tree.contains(previous) {
                self.tree.set_focused(previous, false)?;
            }
        }
        self.tree.set_focused(id, true)?;
        self.focused = Some(id);
        Ok(())
    }

    /// Move focus to the next shown focusable widget in tree order, wrapping
    pub fn focus_next(&mut self) -> Option<WidgetId> {
        let order: Vec<WidgetId> = self
            .tree
            .descendants(self.tree.root())
            .ok()?
            .into_iter()
            .filter(|&id| self.is_shown(id))
            .filter(|&id| self.tree.get(id).is_ok_and(Widget::is_focusable))
            .collect();
        let next = match self.focused.and_then(|f| order.iter().position(|&id| id == f)) {
            Some(i) => order[(i + 1) % order.len()],
            None => *order.first()?,
        };
        self.focus(next).ok()?;
        Some(next)
    }

    /// Visible, with every ancestor up to the root visible too
    fn is_shown(&self, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            match self.tree.get(node) {
                Ok(widget) if widget.is_visible() => current = widget.parent(),
                _ => return false,
            }
        }
        true
    }

    /// Drop focus and hover pointing at widgets that left the tree
    fn forget_removed(&mut self) {
        if self.focused.is_some_and(|id| !self.tree.contains(id)) {
            self.focused = None;
        }
        if self.hovered.is_some_and(|id| !self.tree.contains(id)) {
            self.hovered = None;
        }
    }

    /// Route an input event; true if any widget reacted
    pub fn dispatch(&mut self, event: &Event) -> bool {
        self.forget_removed();
        match &event.kind {
            EventKind::Mouse(report) => self.dispatch_mouse(report),
            kind if kind.is_tab() => self.focus_next().is_some(),
            kind => match self.focused {
                Some(id) => self
                    .tree
                    .get_mut(id)
                    .map(|w| w.handle_key(kind))
                    .unwrap_or(false),
                None => false,
            },
        }
    }

    fn dispatch_mouse(&mut self, report: &MouseReport) -> bool {
        let hit = self.get_colliding_widget(report.x, report.y);
        let mut reacted = false;

        if hit != self.hovered {
            if let Some(previous) = self.hovered {
                if let Ok(widget) = self.tree.get_mut(previous) {
                    widget.signals.mouse_exit.emit(report);
                }
            }
            if let Some(current) = hit {
                if let Ok(widget) = self.tree.get_mut(current) {
                    widget.signals.mouse_enter.emit(report);
                }
            }
            self.hovered = hit;
            reacted = true;
        }

        let Some(id) = hit else {
            return reacted;
        };
        match (report.action, report.button) {
            (MouseAction::Press, MouseButton::Left | MouseButton::Middle | MouseButton::Right) => {
                let focusable = self.tree.get(id).is_ok_and(Widget::is_focusable);
                if focusable {
                    reacted |= self.focus(id).is_ok();
                }
                if let Ok(widget) = self.tree.get_mut(id) {
                    widget.signals.clicked.emit(report);
                    widget.handle_press(report);
                    reacted = true;
                }
            }
            (MouseAction::Press, MouseButton::WheelUp | MouseButton::WheelDown) => {
                let direction = if report.button == MouseButton::WheelUp {
                    ArrowDirection::Up
                } else {
                    ArrowDirection::Down
                };
                let scroll = EventKind::ArrowKey {
                    key_code: 0,
                    direction,
                };
                if let Ok(widget) = self.tree.get_mut(id) {
                    reacted |= widget.handle_key(&scroll);
                }
            }
            _ => {}
        }
        reacted
    }
}
