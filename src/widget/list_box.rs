//! Scrollable list with a single selection
//!
//! Provides a navigable list with:
//! - Up/Down, Home/End and PageUp/PageDown navigation
//! - Selection highlighting (reversed row)
//! - Virtual scrolling for lists taller than the widget
//!
//! `selection_changed` fires with the new index whenever the selection moves.

use super::draw::{fit_line, text_width, Canvas};
use crate::error::Result;
use crate::geometry::Rect;
use crate::input::{ArrowDirection, EventKind, NavKey};
use crate::signal::Signal;
use crate::style::{Style, TextAlign};

#[derive(Debug, Default)]
pub struct ListBox {
    items: Vec<String>,
    selected: Option<usize>,
    /// Index of the first visible row
    offset: usize,
    pub selection_changed: Signal<usize>,
}

impl ListBox {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ListBox {
            items: items.into_iter().map(Into::into).collect(),
            selected: None,
            offset: 0,
            selection_changed: Signal::new(),
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.items.get(i))
            .map(String::as_str)
    }

    pub fn scroll_offset(&self) -> usize {
        self.offset
    }

    /// Replace the items, resetting selection and scroll
    pub(crate) fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.selected = None;
        self.offset = 0;
    }

    /// Content size that shows every item
    pub fn natural_size(&self) -> (u16, u16) {
        let width = self
            .items
            .iter()
            .map(|s| text_width(s))
            .max()
            .unwrap_or(0)
            .max(1);
        let height = self.items.len().clamp(1, u16::MAX as usize) as u16;
        (width, height)
    }

    /// Select an item by index, scrolling it into a viewport of `page` rows
    pub fn select(&mut self, index: usize, page: u16) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.ensure_visible(index, page);
        if self.selected != Some(index) {
            self.selected = Some(index);
            self.selection_changed.emit(&index);
        }
        true
    }

    fn ensure_visible(&mut self, index: usize, page: u16) {
        let page = page.max(1) as usize;
        if index < self.offset {
            self.offset = index;
        } else if index >= self.offset + page {
            self.offset = index + 1 - page;
        }
    }

    pub fn select_next(&mut self, page: u16) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let next = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            Some(i) => i, // Stay at end
            None => 0,
        };
        self.select(next, page)
    }

    pub fn select_prev(&mut self, page: u16) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let prev = match self.selected {
            Some(i) => i.saturating_sub(1),
            None => self.items.len() - 1,
        };
        self.select(prev, page)
    }

    pub fn select_first(&mut self, page: u16) -> bool {
        !self.items.is_empty() && self.select(0, page)
    }

    pub fn select_last(&mut self, page: u16) -> bool {
        !self.items.is_empty() && self.select(self.items.len() - 1, page)
    }

    /// Move selection down by a page
    pub fn page_down(&mut self, page: u16) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let step = page.max(1) as usize;
        let target = self
            .selected
            .map(|i| (i + step).min(self.items.len() - 1))
            .unwrap_or(0);
        self.select(target, page)
    }

    /// Move selection up by a page
    pub fn page_up(&mut self, page: u16) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let step = page.max(1) as usize;
        let target = self.selected.map(|i| i.saturating_sub(step)).unwrap_or(0);
        self.select(target, page)
    }

    pub(crate) fn handle_key(&mut self, kind: &EventKind, page: u16) -> bool {
        match kind {
            EventKind::ArrowKey {
                direction: ArrowDirection::Down,
                ..
            } => self.select_next(page),
            EventKind::ArrowKey {
                direction: ArrowDirection::Up,
                ..
            } => self.select_prev(page),
            EventKind::NavigationKey { key, .. } => match key {
                NavKey::Home => self.select_first(page),
                NavKey::End => self.select_last(page),
                NavKey::PageDown => self.page_down(page),
                NavKey::PageUp => self.page_up(page),
                _ => false,
            },
            _ => false,
        }
    }

    /// Select the item shown on content row `row`
    pub(crate) fn click_row(&mut self, row: u16, page: u16) -> bool {
        self.select(self.offset + row as usize, page)
    }

    pub(crate) fn render(
        &self,
        canvas: &mut Canvas,
        area: Rect,
        style: Style,
        focused: bool,
    ) -> Result<()> {
        let highlight = if focused {
            style.reverse(true)
        } else {
            style.underline(true)
        };
        for row in 0..area.height {
            let index = self.offset + row as usize;
            let (text, row_style) = match self.items.get(index) {
                Some(item) if self.selected == Some(index) => (item.as_str(), highlight),
                Some(item) => (item.as_str(), style),
                None => ("", style),
            };
            canvas.put_str(
                area.x,
                area.y + row,
                &fit_line(text, area.width, TextAlign::Left),
                row_style,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn letters() -> ListBox {
        ListBox::new(["a", "b", "c", "d", "e"])
    }

    #[test]
    fn test_navigation() {
        let mut list = letters();
        assert_eq!(list.selected(), None);

        list.select_next(3);
        assert_eq!(list.selected(), Some("a"));
        list.select_next(3);
        list.select_next(3);
        assert_eq!(list.selected(), Some("c"));
        list.select_prev(3);
        assert_eq!(list.selected(), Some("b"));

        list.select_last(3);
        assert_eq!(list.selected(), Some("e"));
        list.select_next(3); // Should stay at end
        assert_eq!(list.selected(), Some("e"));
        list.select_first(3);
        assert_eq!(list.selected_index(), Some(0));
    }

    #[test]
    fn test_scroll_follows_selection() {
        let mut list = letters();
        list.select(4, 2);
        assert_eq!(list.scroll_offset(), 3);
        list.select(1, 2);
        assert_eq!(list.scroll_offset(), 1);
    }

    #[test]
    fn test_paging() {
        let mut list = letters();
        list.select(0, 2);
        list.page_down(2);
        assert_eq!(list.selected_index(), Some(2));
        list.page_down(2);
        list.page_down(2);
        assert_eq!(list.selected_index(), Some(4));
        list.page_up(2);
        assert_eq!(list.selected_index(), Some(2));
    }

    #[test]
    fn test_selection_changed_fires_once_per_move() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut list = letters();
        let s = seen.clone();
        list.selection_changed.connect(move |i| s.borrow_mut().push(*i));

        list.select(2, 5);
        list.select(2, 5);
        list.handle_key(
            &EventKind::ArrowKey {
                key_code: 0x02,
                direction: ArrowDirection::Down,
            },
            5,
        );
        assert_eq!(*seen.borrow(), vec![2, 3]);
    }

    #[test]
    fn test_empty_list() {
        let mut list = ListBox::new(Vec::<String>::new());
        assert!(list.is_empty());
        assert!(!list.select_next(3));
        assert!(!list.select_prev(3));
        assert!(!list.click_row(0, 3));
        assert_eq!(list.natural_size(), (1, 1));
    }
}
