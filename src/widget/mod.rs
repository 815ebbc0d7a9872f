//! Widgets and the box model
//!
//! Every widget is a box: `border + padding + content`, with the margin lying
//! outside. The stored `width`/`height` are the box size. Widgets live in a
//! [`WidgetTree`] arena and refer to each other by [`WidgetId`] handles; the
//! tree owns every operation that has to reach a parent (resizing, reparenting,
//! repack propagation).

mod button;
pub(crate) mod draw;
mod input_box;
mod label;
mod list_box;
mod panel;
mod tree;

pub use button::Button;
pub use draw::Canvas;
pub use input_box::InputBox;
pub use label::Label;
pub use list_box::ListBox;
pub use panel::{Container, Panel};
pub use tree::WidgetTree;

use crate::error::{Error, Result};
use crate::geometry::{Rect, Sides};
use crate::input::{EventKind, MouseReport};
use crate::layout::Direction;
use crate::signal::Signal;
use crate::style::{Border, Style};

/// Handle into a [`WidgetTree`]
///
/// A handle outlives its widget only as a stale value: once the slot is freed
/// the generation no longer matches and lookups fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Widget-specific state
#[derive(Debug)]
pub enum WidgetKind {
    Panel(Panel),
    Label(Label),
    Button(Button),
    ListBox(ListBox),
    InputBox(InputBox),
}

/// Discriminant of [`WidgetKind`], used for type-filtered child queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    Panel,
    Label,
    Button,
    ListBox,
    InputBox,
}

impl WidgetKind {
    pub fn tag(&self) -> KindTag {
        match self {
            WidgetKind::Panel(_) => KindTag::Panel,
            WidgetKind::Label(_) => KindTag::Label,
            WidgetKind::Button(_) => KindTag::Button,
            WidgetKind::ListBox(_) => KindTag::ListBox,
            WidgetKind::InputBox(_) => KindTag::InputBox,
        }
    }

    /// Content size that fits the widget's own content
    fn natural_size(&self) -> (u16, u16) {
        match self {
            WidgetKind::Panel(_) => (0, 0),
            WidgetKind::Label(l) => l.natural_size(),
            WidgetKind::Button(b) => b.natural_size(),
            WidgetKind::ListBox(l) => l.natural_size(),
            WidgetKind::InputBox(_) => (1, 1),
        }
    }
}

macro_rules! impl_from_kind {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for WidgetKind {
                fn from(value: $variant) -> Self {
                    WidgetKind::$variant(value)
                }
            }
        )*
    };
}

impl_from_kind!(Panel, Label, Button, ListBox, InputBox);

/// Mouse signals every widget publishes
#[derive(Debug, Default)]
pub struct WidgetSignals {
    pub clicked: Signal<MouseReport>,
    pub mouse_enter: Signal<MouseReport>,
    pub mouse_exit: Signal<MouseReport>,
}

#[derive(Debug)]
pub struct Widget {
    id: String,
    absolute_id: String,
    pos_x: u16,
    pos_y: u16,
    width: u16,
    height: u16,
    padding: Sides,
    margin: Sides,
    border: Border,
    grow_factor: f64,
    shrink_factor: f64,
    min_width: u16,
    min_height: u16,
    visible: bool,
    focused: bool,
    parent: Option<WidgetId>,
    needs_clear: bool,
    last_drawn: Option<Rect>,
    style: Style,
    pub signals: WidgetSignals,
    kind: WidgetKind,
}

impl PartialEq for Widget {
    fn eq(&self, other: &Self) -> bool {
        self.absolute_id == other.absolute_id
    }
}

fn check_factor(name: &str, factor: f64) -> Result<f64> {
    if factor.is_nan() || factor < 0.0 {
        return Err(Error::invalid(format!(
            "{name} must be a non-negative number, got {factor}"
        )));
    }
    Ok(factor)
}

impl Widget {
    /// Create a detached widget sized to fit its content
    pub fn new(id: impl Into<String>, kind: impl Into<WidgetKind>) -> Self {
        let id = id.into();
        let kind = kind.into();
        let (w, h) = kind.natural_size();
        Widget {
            absolute_id: id.clone(),
            id,
            pos_x: 0,
            pos_y: 0,
            width: w,
            height: h,
            padding: Sides::default(),
            margin: Sides::default(),
            border: Border::none(),
            grow_factor: 0.0,
            shrink_factor: 0.0,
            min_width: 0,
            min_height: 0,
            visible: true,
            focused: false,
            parent: None,
            needs_clear: false,
            last_drawn: None,
            style: Style::default(),
            signals: WidgetSignals::default(),
            kind,
        }
    }

    pub fn panel(id: impl Into<String>, direction: Direction) -> Self {
        Widget::new(id, Panel::new(direction))
    }

    pub fn label(id: impl Into<String>, text: impl Into<String>) -> Self {
        Widget::new(id, Label::new(text))
    }

    pub fn button(id: impl Into<String>, caption: impl Into<String>) -> Self {
        Widget::new(id, Button::new(caption))
    }

    pub fn list_box<I, S>(id: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Widget::new(id, ListBox::new(items))
    }

    /// An empty input box `width` cells wide
    pub fn input_box(id: impl Into<String>, width: u16) -> Self {
        Widget::new(id, InputBox::new()).with_content_size(width, 1)
    }

    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.apply_size(width, height);
        self
    }

    pub fn with_content_size(mut self, width: u16, height: u16) -> Self {
        self.apply_content_size(width, height);
        self
    }

    /// Set padding, keeping the content size
    pub fn with_padding(mut self, padding: Sides) -> Self {
        self.apply_padding(padding);
        self
    }

    pub fn with_margin(mut self, margin: Sides) -> Self {
        self.margin = margin;
        self
    }

    /// Set the border, keeping the content size
    pub fn with_border(mut self, border: Border) -> Self {
        self.apply_border(border);
        self
    }

    pub fn with_min_size(mut self, width: u16, height: u16) -> Self {
        self.apply_min_size(width, height);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_grow_factor(mut self, factor: f64) -> Result<Self> {
        self.grow_factor = check_factor("grow factor", factor)?;
        Ok(self)
    }

    pub fn with_shrink_factor(mut self, factor: f64) -> Result<Self> {
        self.shrink_factor = check_factor("shrink factor", factor)?;
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Dot-separated path of ids from the root, e.g. `root.sidebar.list`
    pub fn absolute_id(&self) -> &str {
        &self.absolute_id
    }

    pub fn pos_x(&self) -> u16 {
        self.pos_x
    }

    pub fn pos_y(&self) -> u16 {
        self.pos_y
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Box rectangle in screen coordinates
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos_x, self.pos_y, self.width, self.height)
    }

    pub fn padding(&self) -> Sides {
        self.padding
    }

    pub fn margin(&self) -> Sides {
        self.margin
    }

    pub fn border(&self) -> Border {
        self.border
    }

    pub fn grow_factor(&self) -> f64 {
        self.grow_factor
    }

    pub fn shrink_factor(&self) -> f64 {
        self.shrink_factor
    }

    pub fn min_size(&self) -> (u16, u16) {
        (self.min_width, self.min_height)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn needs_clear(&self) -> bool {
        self.needs_clear
    }

    /// Area painted by the last draw, if any
    pub fn last_drawn(&self) -> Option<Rect> {
        self.last_drawn
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut WidgetKind {
        &mut self.kind
    }

    pub fn tag(&self) -> KindTag {
        self.kind.tag()
    }

    pub fn as_panel(&self) -> Option<&Panel> {
        match &self.kind {
            WidgetKind::Panel(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_panel_mut(&mut self) -> Option<&mut Panel> {
        match &mut self.kind {
            WidgetKind::Panel(p) => Some(p),
            _ => None,
        }
    }

    /// Widgets that take keyboard focus
    pub fn is_focusable(&self) -> bool {
        matches!(
            self.kind,
            WidgetKind::Button(_) | WidgetKind::ListBox(_) | WidgetKind::InputBox(_)
        )
    }

    /// Box size minus border and padding on each axis
    pub fn content_window_size(&self) -> (u16, u16) {
        let bw = self.border.width() * 2;
        (
            self.width
                .saturating_sub(bw)
                .saturating_sub(self.padding.horizontal()),
            self.height
                .saturating_sub(bw)
                .saturating_sub(self.padding.vertical()),
        )
    }

    /// Content window in screen coordinates
    pub fn content_rect(&self) -> Rect {
        let bw = self.border.width();
        let (w, h) = self.content_window_size();
        Rect::new(
            self.pos_x.saturating_add(bw).saturating_add(self.padding.left),
            self.pos_y.saturating_add(bw).saturating_add(self.padding.top),
            w,
            h,
        )
    }

    /// Box width plus left and right margin
    pub fn outer_width(&self) -> u16 {
        self.width.saturating_add(self.margin.horizontal())
    }

    pub fn outer_height(&self) -> u16 {
        self.height.saturating_add(self.margin.vertical())
    }

    /// Smallest box size the widget accepts
    pub(crate) fn floor_size(&self) -> (u16, u16) {
        let bw = self.border.width() * 2;
        (self.min_width.max(bw), self.min_height.max(bw))
    }

    /// Set the box size, clamped up to the floor; true if it changed
    pub(crate) fn apply_size(&mut self, width: u16, height: u16) -> bool {
        let (fw, fh) = self.floor_size();
        let (width, height) = (width.max(fw), height.max(fh));
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        self.needs_clear = true;
        true
    }

    pub(crate) fn apply_content_size(&mut self, width: u16, height: u16) -> bool {
        let bw = self.border.width() * 2;
        self.apply_size(
            width
                .saturating_add(bw)
                .saturating_add(self.padding.horizontal()),
            height
                .saturating_add(bw)
                .saturating_add(self.padding.vertical()),
        )
    }

    pub(crate) fn apply_padding(&mut self, padding: Sides) -> bool {
        let (cw, ch) = self.content_window_size();
        self.padding = padding;
        self.apply_content_size(cw, ch)
    }

    pub(crate) fn apply_border(&mut self, border: Border) -> bool {
        let (cw, ch) = self.content_window_size();
        self.border = border;
        self.apply_content_size(cw, ch)
    }

    pub(crate) fn apply_min_size(&mut self, width: u16, height: u16) -> bool {
        self.min_width = width;
        self.min_height = height;
        self.apply_size(self.width, self.height)
    }

    /// Move the box; true if it moved
    pub(crate) fn apply_pos(&mut self, x: u16, y: u16) -> bool {
        if (x, y) == (self.pos_x, self.pos_y) {
            return false;
        }
        self.pos_x = x;
        self.pos_y = y;
        self.needs_clear = true;
        true
    }

    /// Resize to fit the current content, keeping border and padding
    pub(crate) fn fit_content(&mut self) -> bool {
        let (w, h) = self.kind.natural_size();
        match self.kind {
            // Input boxes keep their width, only the height follows content
            WidgetKind::InputBox(_) => {
                let (cw, _) = self.content_window_size();
                self.apply_content_size(cw, h)
            }
            _ => self.apply_content_size(w, h),
        }
    }

    pub(crate) fn set_absolute_id(&mut self, absolute_id: String) {
        self.absolute_id = absolute_id;
    }

    pub(crate) fn set_parent_link(&mut self, parent: Option<WidgetId>) {
        self.parent = parent;
    }

    pub(crate) fn set_grow(&mut self, factor: f64) -> Result<bool> {
        let factor = check_factor("grow factor", factor)?;
        let changed = factor != self.grow_factor;
        self.grow_factor = factor;
        Ok(changed)
    }

    pub(crate) fn set_shrink(&mut self, factor: f64) -> Result<bool> {
        let factor = check_factor("shrink factor", factor)?;
        let changed = factor != self.shrink_factor;
        self.shrink_factor = factor;
        Ok(changed)
    }

    pub(crate) fn set_margin_fields(&mut self, margin: Sides) -> bool {
        let changed = self.margin != margin;
        self.margin = margin;
        changed
    }

    pub(crate) fn set_visible_flag(&mut self, visible: bool) -> bool {
        let changed = self.visible != visible;
        self.visible = visible;
        if changed {
            self.needs_clear = true;
        }
        changed
    }

    pub(crate) fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub(crate) fn set_style_fields(&mut self, style: Style) {
        self.style = style;
    }

    pub(crate) fn mark_needs_clear(&mut self) {
        self.needs_clear = true;
    }

    pub(crate) fn take_needs_clear(&mut self) -> bool {
        std::mem::take(&mut self.needs_clear)
    }

    pub(crate) fn set_last_drawn(&mut self, area: Option<Rect>) -> Option<Rect> {
        std::mem::replace(&mut self.last_drawn, area)
    }

    /// Deliver a key event; true if the widget consumed it
    pub(crate) fn handle_key(&mut self, kind: &EventKind) -> bool {
        let (_, page) = self.content_window_size();
        match &mut self.kind {
            WidgetKind::Button(b) => b.handle_key(kind),
            WidgetKind::ListBox(l) => l.handle_key(kind, page),
            WidgetKind::InputBox(i) => i.handle_key(kind),
            WidgetKind::Panel(_) | WidgetKind::Label(_) => false,
        }
    }

    /// Deliver a mouse press inside the box
    pub(crate) fn handle_press(&mut self, report: &MouseReport) -> bool {
        let content = self.content_rect();
        match &mut self.kind {
            WidgetKind::Button(b) => {
                b.press();
                true
            }
            WidgetKind::ListBox(l) if content.contains(report.x, report.y) => {
                l.click_row(report.y - content.y, content.height)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::BorderStyle;
    use proptest::prelude::*;

    #[test]
    fn test_natural_sizes() {
        assert_eq!(
            (Widget::label("l", "hello").width(), Widget::label("l", "hello").height()),
            (5, 1)
        );
        let button = Widget::button("b", "OK");
        assert_eq!((button.width(), button.height()), (6, 1));
        let input = Widget::input_box("i", 12);
        assert_eq!((input.width(), input.height()), (12, 1));
    }

    #[test]
    fn test_box_model() {
        let w = Widget::label("l", "abc")
            .with_border(Border::new(BorderStyle::Single))
            .with_padding(Sides::new(1, 2, 1, 2));
        // content 3x1 + border 2 + padding 4x2
        assert_eq!((w.width(), w.height()), (9, 5));
        assert_eq!(w.content_window_size(), (3, 1));
        assert_eq!(w.content_rect(), Rect::new(3, 2, 3, 1));

        let w = w.with_margin(Sides::all(1));
        assert_eq!((w.outer_width(), w.outer_height()), (11, 7));
        assert_eq!(w.width(), 9);
    }

    #[test]
    fn test_border_keeps_content() {
        let w = Widget::label("l", "").with_size(10, 4);
        let w = w.with_border(Border::new(BorderStyle::Double));
        assert_eq!((w.width(), w.height()), (12, 6));
        assert_eq!(w.content_window_size(), (10, 4));
        let w = w.with_border(Border::none());
        assert_eq!((w.width(), w.height()), (10, 4));
    }

    #[test]
    fn test_size_clamps_to_floor() {
        let w = Widget::label("l", "")
            .with_border(Border::new(BorderStyle::Single))
            .with_size(0, 0);
        assert_eq!((w.width(), w.height()), (2, 2));

        let w = Widget::label("l", "").with_min_size(5, 3).with_size(1, 1);
        assert_eq!((w.width(), w.height()), (5, 3));
    }

    #[test]
    fn test_invalid_factors() {
        assert!(matches!(
            Widget::label("l", "").with_grow_factor(-1.0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(Widget::label("l", "").with_shrink_factor(f64::NAN).is_err());
        assert!(Widget::label("l", "").with_shrink_factor(0.0).is_ok());
    }

    #[test]
    fn test_apply_size_reports_change_and_marks_clear() {
        let mut w = Widget::label("l", "abc");
        assert!(!w.needs_clear());
        assert!(!w.apply_size(3, 1));
        assert!(w.apply_size(4, 1));
        assert!(w.take_needs_clear());
        assert!(!w.needs_clear());
    }

    #[test]
    fn test_focusable_kinds() {
        assert!(Widget::button("b", "x").is_focusable());
        assert!(!Widget::label("l", "x").is_focusable());
        assert!(!Widget::panel("p", Direction::Vertical).is_focusable());
    }

    proptest! {
        #[test]
        fn box_never_smaller_than_floor(
            w in 0u16..50, h in 0u16..50,
            min_w in 0u16..20, min_h in 0u16..20,
            bordered in any::<bool>(),
            pad in 0u16..4,
        ) {
            let border = if bordered { Border::new(BorderStyle::Single) } else { Border::none() };
            let widget = Widget::label("l", "")
                .with_border(border)
                .with_padding(Sides::all(pad))
                .with_min_size(min_w, min_h)
                .with_size(w, h);
            let bw = border.width() * 2;
            prop_assert!(widget.width() >= bw && widget.height() >= bw);
            prop_assert!(widget.width() >= min_w && widget.height() >= min_h);
        }
    }
}
