//! Drawing the widget tree into a screen buffer
//!
//! Drawing runs in two passes. The first blanks every area that is stale:
//! widgets that moved, resized or were hidden since the last draw, and
//! widgets removed from the tree. The second paints every visible widget in
//! pre-order, each one clipped to its parent's content window.
//!
//! Panels paint only their border and title. Content widgets paint every
//! cell of their content window exactly once per frame, so redrawing an
//! unchanged tree leaves the buffer with nothing to flush.

use super::{Widget, WidgetId, WidgetKind, WidgetTree};
use crate::buffer::ScreenBuffer;
use crate::error::Result;
use crate::geometry::Rect;
use crate::style::{BorderChars, Style, TextAlign};
use unicode_width::UnicodeWidthChar;

/// Display width of a character in cells
pub(crate) fn char_width(c: char) -> u16 {
    c.width().unwrap_or(0) as u16
}

/// Display width of a string in cells
pub(crate) fn text_width(s: &str) -> u16 {
    s.chars()
        .fold(0u16, |acc, c| acc.saturating_add(char_width(c)))
}

/// Truncate or pad `text` to exactly `width` cells
pub(crate) fn fit_line(text: &str, width: u16, align: TextAlign) -> String {
    let mut out = String::with_capacity(width as usize);
    let mut used = 0u16;
    for c in text.chars() {
        let w = char_width(c);
        if w == 0 {
            continue;
        }
        if used + w > width {
            break;
        }
        out.push(c);
        used += w;
    }
    let lead = align.offset(width, used);
    let trail = width - used - lead;
    let mut line = " ".repeat(lead as usize);
    line.push_str(&out);
    line.extend(std::iter::repeat_n(' ', trail as usize));
    line
}

/// A clipped view of the screen buffer
pub struct Canvas<'a> {
    buffer: &'a mut ScreenBuffer,
    clip: Rect,
}

impl<'a> Canvas<'a> {
    pub fn new(buffer: &'a mut ScreenBuffer, clip: Rect) -> Self {
        let bounds = Rect::new(0, 0, buffer.cols(), buffer.rows());
        Canvas {
            clip: clip.intersect(&bounds),
            buffer,
        }
    }

    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Narrow the clip area for a nested drawing
    pub fn with_clip(&mut self, clip: Rect) -> Canvas<'_> {
        Canvas {
            clip: clip.intersect(&self.clip),
            buffer: &mut *self.buffer,
        }
    }

    /// Write `text` starting at cell (x, y), dropping whatever falls outside
    /// the clip area; returns the number of cells written
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style) -> Result<usize> {
        if y < self.clip.y || y >= self.clip.bottom() {
            return Ok(0);
        }
        let mut col = x;
        let mut start = None;
        let mut visible = String::new();
        for c in text.chars() {
            let w = char_width(c);
            if w == 0 {
                continue;
            }
            if col < self.clip.x {
                col = col.saturating_add(w);
                continue;
            }
            if col.saturating_add(w) > self.clip.right() {
                break;
            }
            start.get_or_insert(col);
            visible.push(c);
            col = col.saturating_add(w);
        }
        match start {
            Some(start) => self.buffer.set(&visible, y, start, style),
            None => Ok(0),
        }
    }

    pub fn fill(&mut self, rect: Rect, ch: char, style: Style) -> usize {
        self.buffer.fill(rect.intersect(&self.clip), ch, style)
    }
}

/// Draw every visible widget of `tree` into `buffer`
pub(crate) fn draw_tree(tree: &mut WidgetTree, buffer: &mut ScreenBuffer) -> Result<()> {
    let screen = Rect::new(0, 0, buffer.cols(), buffer.rows());
    for area in tree.take_stale_areas() {
        buffer.fill(area.intersect(&screen), ' ', Style::default());
    }
    let root = tree.root();
    clear_stale(tree, buffer, root, true)?;

    let mut canvas = Canvas::new(buffer, screen);
    draw_widget(tree, &mut canvas, root)
}

fn clear_stale(
    tree: &mut WidgetTree,
    buffer: &mut ScreenBuffer,
    id: WidgetId,
    parent_shown: bool,
) -> Result<()> {
    let widget = tree.get_mut(id)?;
    let shown = parent_shown && widget.is_visible();
    let moved = widget.take_needs_clear();
    let stale = if !shown {
        widget.set_last_drawn(None)
    } else if moved {
        widget.last_drawn()
    } else {
        None
    };
    if let Some(area) = stale {
        buffer.fill(area, ' ', Style::default());
    }

    let children = child_list(widget);
    for child in children {
        clear_stale(tree, buffer, child, shown)?;
    }
    Ok(())
}

fn child_list(widget: &Widget) -> Vec<WidgetId> {
    widget
        .as_panel()
        .map(|p| p.container().children().to_vec())
        .unwrap_or_default()
}

fn draw_widget(tree: &mut WidgetTree, canvas: &mut Canvas, id: WidgetId) -> Result<()> {
    let widget = tree.get(id)?;
    if !widget.is_visible() {
        return Ok(());
    }
    let painted = widget.rect().intersect(&canvas.clip());
    paint(widget, canvas)?;
    let content = widget.content_rect();
    let children = child_list(widget);

    tree.get_mut(id)?
        .set_last_drawn((!painted.is_empty()).then_some(painted));

    let mut inner = canvas.with_clip(content);
    for child in children {
        draw_widget(tree, &mut inner, child)?;
    }
    Ok(())
}

fn paint(widget: &Widget, canvas: &mut Canvas) -> Result<()> {
    let style = widget.style();
    let border = widget.border();
    if border.visible {
        let title = widget.as_panel().and_then(|p| p.title());
        draw_border(canvas, widget.rect(), border.style.chars(), title, style)?;
    }

    let area = widget.content_rect();
    let focused = widget.is_focused();
    match widget.kind() {
        WidgetKind::Panel(_) => Ok(()),
        WidgetKind::Label(l) => l.render(canvas, area, style),
        WidgetKind::Button(b) => b.render(canvas, area, style, focused),
        WidgetKind::ListBox(l) => l.render(canvas, area, style, focused),
        WidgetKind::InputBox(i) => i.render(canvas, area, style, focused),
    }
}

fn draw_border(
    canvas: &mut Canvas,
    rect: Rect,
    chars: BorderChars,
    title: Option<&str>,
    style: Style,
) -> Result<()> {
    if rect.width < 2 || rect.height < 2 {
        return Ok(());
    }
    let inner = rect.width - 2;

    let mut top = String::new();
    top.push(chars.top_left);
    match title {
        Some(title) if inner > 2 => {
            let label = format!(" {title} ");
            let label_width = text_width(&label).min(inner);
            let lead = TextAlign::Center.offset(inner, label_width);
            let trail = inner - lead - label_width;
            top.extend(std::iter::repeat_n(chars.horizontal, lead as usize));
            top.push_str(&fit_line(&label, label_width, TextAlign::Left));
            top.extend(std::iter::repeat_n(chars.horizontal, trail as usize));
        }
        _ => top.extend(std::iter::repeat_n(chars.horizontal, inner as usize)),
    }
    top.push(chars.top_right);
    canvas.put_str(rect.x, rect.y, &top, style)?;

    let vertical = chars.vertical.to_string();
    for row in 1..rect.height - 1 {
        canvas.put_str(rect.x, rect.y + row, &vertical, style)?;
        canvas.put_str(rect.right() - 1, rect.y + row, &vertical, style)?;
    }

    let mut bottom = String::new();
    bottom.push(chars.bottom_left);
    bottom.extend(std::iter::repeat_n(chars.horizontal, inner as usize));
    bottom.push(chars.bottom_right);
    canvas.put_str(rect.x, rect.bottom() - 1, &bottom, style)?;
    Ok(())
}
