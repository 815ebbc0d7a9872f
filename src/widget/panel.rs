//! Panels - the only widgets that hold children

use super::WidgetId;
use crate::layout::{Alignment, Direction};

/// Ordered child list plus the direction children are laid out in
#[derive(Debug, Clone, Default)]
pub struct Container {
    children: Vec<WidgetId>,
    direction: Direction,
}

impl Container {
    pub fn new(direction: Direction) -> Self {
        Container {
            children: Vec::new(),
            direction,
        }
    }

    /// Children in draw and layout order
    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.children.contains(&id)
    }

    pub(crate) fn push(&mut self, id: WidgetId) {
        if !self.contains(id) {
            self.children.push(id);
        }
    }

    pub(crate) fn remove(&mut self, id: WidgetId) -> bool {
        let before = self.children.len();
        self.children.retain(|c| *c != id);
        before != self.children.len()
    }
}

/// A bordered box that lays out its children with the flex solver
#[derive(Debug, Clone)]
pub struct Panel {
    container: Container,
    needs_repacking: bool,
    title: Option<String>,
    align: (Alignment, Alignment),
}

impl Default for Panel {
    fn default() -> Self {
        Panel::new(Direction::default())
    }
}

impl Panel {
    pub fn new(direction: Direction) -> Self {
        Panel {
            container: Container::new(direction),
            needs_repacking: true,
            title: None,
            align: (Alignment::Start, Alignment::Start),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set main-axis and cross-axis alignment
    pub fn with_alignment(mut self, primary: Alignment, cross: Alignment) -> Self {
        self.align = (primary, cross);
        self
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn direction(&self) -> Direction {
        self.container.direction
    }

    /// (main axis, cross axis)
    pub fn alignment(&self) -> (Alignment, Alignment) {
        self.align
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn needs_repacking(&self) -> bool {
        self.needs_repacking
    }

    pub(crate) fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    pub(crate) fn set_needs_repacking(&mut self, dirty: bool) {
        self.needs_repacking = dirty;
    }

    pub(crate) fn set_direction(&mut self, direction: Direction) -> bool {
        let changed = self.container.direction != direction;
        self.container.direction = direction;
        changed
    }

    pub(crate) fn set_alignment(&mut self, primary: Alignment, cross: Alignment) -> bool {
        let changed = self.align != (primary, cross);
        self.align = (primary, cross);
        changed
    }

    pub(crate) fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }
}
