//! Widget arena
//!
//! The tree owns every widget; parents and children refer to each other by
//! [`WidgetId`] handles. Freed slots bump their generation so old handles go
//! stale instead of aliasing a new widget.
//!
//! Repack propagation: whenever a widget's geometry changes, its parent and
//! every ancestor up to the root are marked `needs_repacking`. [`WidgetTree::pack`]
//! then walks the dirty panels top-down until the root is clean.

use super::{KindTag, Panel, Widget, WidgetId, WidgetKind};
use crate::error::{Error, Result};
use crate::geometry::{Rect, Sides, Vertex};
use crate::layout::{flex, Alignment, Direction};
use crate::style::{Border, Style, TextAlign};
use tracing::warn;

/// Upper bound on layout passes per `pack` call
pub const MAX_PACK_PASSES: usize = 8;

#[derive(Debug)]
struct Slot {
    generation: u32,
    widget: Option<Widget>,
}

#[derive(Debug)]
pub struct WidgetTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: WidgetId,
    /// Areas last painted by widgets that have since left the tree
    stale_areas: Vec<Rect>,
}

impl WidgetTree {
    /// Create a tree whose root is a vertical panel
    pub fn new(root_id: impl Into<String>) -> Self {
        Self::with_panel(root_id, Panel::default())
    }

    pub fn with_panel(root_id: impl Into<String>, panel: Panel) -> Self {
        let mut tree = WidgetTree {
            slots: Vec::new(),
            free: Vec::new(),
            root: WidgetId {
                index: 0,
                generation: 0,
            },
            stale_areas: Vec::new(),
        };
        tree.root = tree.insert(Widget::new(root_id, panel));
        tree
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }

    /// Number of live widgets, attached or not
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.widget.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.get(id).is_ok()
    }

    pub fn get(&self, id: WidgetId) -> Result<&Widget> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.widget.as_ref())
            .ok_or_else(|| stale(id))
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Result<&mut Widget> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.widget.as_mut())
            .ok_or_else(|| stale(id))
    }

    fn panel_mut(&mut self, id: WidgetId) -> Result<&mut Panel> {
        let widget = self.get_mut(id)?;
        let path = widget.absolute_id().to_string();
        widget
            .as_panel_mut()
            .ok_or_else(|| Error::invalid(format!("`{path}` is not a panel")))
    }

    /// Add a detached widget to the arena
    pub fn insert(&mut self, mut widget: Widget) -> WidgetId {
        widget.set_parent_link(None);
        let own = widget.id().to_string();
        widget.set_absolute_id(own);

        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.widget = Some(widget);
                WidgetId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    widget: Some(widget),
                });
                WidgetId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Insert `widget` and attach it as the last child of `parent`
    pub fn add_child(&mut self, parent: WidgetId, widget: Widget) -> Result<WidgetId> {
        let id = self.insert(widget);
        if let Err(err) = self.set_parent(id, parent) {
            self.free_slot(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Attach `child` as the last child of `parent`, detaching it from any
    /// previous parent first
    pub fn set_parent(&mut self, child: WidgetId, parent: WidgetId) -> Result<()> {
        let child_name = self.get(child)?.id().to_string();
        if child == self.root {
            return Err(Error::invalid("the root panel cannot have a parent"));
        }
        let parent_widget = self.get(parent)?;
        let parent_path = parent_widget.absolute_id().to_string();
        let Some(panel) = parent_widget.as_panel() else {
            return Err(Error::invalid(format!(
                "cannot attach `{child_name}` to `{parent_path}`: not a panel"
            )));
        };
        if panel.container().contains(child) {
            return Ok(());
        }
        for &sibling in panel.container().children() {
            if self.get(sibling)?.id() == child_name {
                return Err(Error::invalid(format!(
                    "`{parent_path}` already has a child named `{child_name}`"
                )));
            }
        }

        // The new parent must not be the child itself or one of its descendants
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(Error::invalid(format!(
                    "cannot attach `{child_name}` under its own descendant `{parent_path}`"
                )));
            }
            cursor = self.get(id)?.parent();
        }

        self.detach(child)?;
        self.panel_mut(parent)?.container_mut().push(child);
        let widget = self.get_mut(child)?;
        widget.set_parent_link(Some(parent));
        widget.mark_needs_clear();
        self.refresh_absolute_ids(child)?;
        self.mark_repack(parent);
        Ok(())
    }

    /// Remove `child` from its parent; the widget stays in the arena
    pub fn detach(&mut self, child: WidgetId) -> Result<()> {
        let Some(parent) = self.get(child)?.parent() else {
            return Ok(());
        };
        self.panel_mut(parent)?.container_mut().remove(child);
        self.get_mut(child)?.set_parent_link(None);
        self.refresh_absolute_ids(child)?;
        self.collect_stale_areas(child)?;
        self.mark_repack(parent);
        Ok(())
    }

    /// Remove a widget and its whole subtree from the arena
    pub fn remove(&mut self, id: WidgetId) -> Result<()> {
        if id == self.root {
            return Err(Error::invalid("the root panel cannot be removed"));
        }
        self.detach(id)?;
        for node in self.descendants(id)? {
            self.free_slot(node);
        }
        Ok(())
    }

    fn free_slot(&mut self, id: WidgetId) {
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            if slot.generation == id.generation && slot.widget.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
            }
        }
    }

    fn collect_stale_areas(&mut self, id: WidgetId) -> Result<()> {
        for node in self.descendants(id)? {
            if let Some(area) = self.get_mut(node)?.set_last_drawn(None) {
                self.stale_areas.push(area);
            }
        }
        Ok(())
    }

    pub(crate) fn take_stale_areas(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.stale_areas)
    }

    pub fn parent(&self, id: WidgetId) -> Result<Option<WidgetId>> {
        Ok(self.get(id)?.parent())
    }

    /// Children of a panel in draw order (empty for other widgets)
    pub fn children(&self, id: WidgetId) -> Result<&[WidgetId]> {
        Ok(self
            .get(id)?
            .as_panel()
            .map(|p| p.container().children())
            .unwrap_or(&[]))
    }

    pub fn children_of_kind(&self, id: WidgetId, tag: KindTag) -> Result<Vec<WidgetId>> {
        let mut out = Vec::new();
        for &child in self.children(id)? {
            if self.get(child)?.tag() == tag {
                out.push(child);
            }
        }
        Ok(out)
    }

    /// `id` and everything below it, pre-order
    pub fn descendants(&self, id: WidgetId) -> Result<Vec<WidgetId>> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node)?.iter().rev());
        }
        Ok(out)
    }

    /// Look up a widget by its dot-separated path from the root
    pub fn find_by_absolute_id(&self, path: &str) -> Option<WidgetId> {
        let mut parts = path.split('.');
        let root = self.get(self.root).ok()?;
        if parts.next()? != root.id() {
            return None;
        }
        let mut current = self.root;
        for part in parts {
            current = self
                .children(current)
                .ok()?
                .iter()
                .copied()
                .find(|c| self.get(*c).map(|w| w.id() == part).unwrap_or(false))?;
        }
        Some(current)
    }

    /// True when both handles name the same attached widget path
    pub fn same_widget(&self, a: WidgetId, b: WidgetId) -> bool {
        match (self.get(a), self.get(b)) {
            (Ok(wa), Ok(wb)) => wa == wb,
            _ => false,
        }
    }

    fn refresh_absolute_ids(&mut self, id: WidgetId) -> Result<()> {
        for node in self.descendants(id)? {
            let prefix = match self.get(node)?.parent() {
                Some(parent) => Some(self.get(parent)?.absolute_id().to_string()),
                None => None,
            };
            let widget = self.get_mut(node)?;
            let path = match prefix {
                Some(prefix) => format!("{prefix}.{}", widget.id()),
                None => widget.id().to_string(),
            };
            widget.set_absolute_id(path);
        }
        Ok(())
    }

    /// Mark `panel` and every ancestor as needing a repack
    pub fn mark_repack(&mut self, panel: WidgetId) {
        let mut cursor = Some(panel);
        while let Some(id) = cursor {
            let Ok(widget) = self.get_mut(id) else {
                break;
            };
            if let Some(p) = widget.as_panel_mut() {
                p.set_needs_repacking(true);
            }
            cursor = widget.parent();
        }
    }

    /// Mark the parent of `id` (and its ancestors) as needing a repack
    pub fn force_parent_repack(&mut self, id: WidgetId) {
        if let Ok(Some(parent)) = self.parent(id) {
            self.mark_repack(parent);
        }
    }

    /// Whether the root still has layout work pending
    pub fn needs_repacking(&self) -> bool {
        self.get(self.root)
            .ok()
            .and_then(Widget::as_panel)
            .map(Panel::needs_repacking)
            .unwrap_or(false)
    }

    fn geometry_changed(&mut self, id: WidgetId) {
        self.force_parent_repack(id);
        if matches!(self.get(id).map(Widget::tag), Ok(KindTag::Panel)) {
            self.mark_repack(id);
        }
    }

    /// Lay out every dirty panel, top-down, until the root is clean
    pub fn pack(&mut self) -> Result<()> {
        let mut passes = 0;
        while self.needs_repacking() {
            if passes == MAX_PACK_PASSES {
                warn!(
                    passes,
                    "layout did not settle; giving up until the next pack"
                );
                break;
            }
            passes += 1;
            self.repack_subtree(self.root)?;
        }
        Ok(())
    }

    fn repack_subtree(&mut self, id: WidgetId) -> Result<()> {
        let dirty = match self.get_mut(id)?.as_panel_mut() {
            Some(panel) => {
                let dirty = panel.needs_repacking();
                panel.set_needs_repacking(false);
                dirty
            }
            None => return Ok(()),
        };
        if dirty {
            if let Err(err) = flex::layout(self, id) {
                self.mark_repack(id);
                return Err(err);
            }
        }
        for child in self.children(id)?.to_vec() {
            let widget = self.get(child)?;
            let pending = widget.is_visible()
                && widget.as_panel().map(Panel::needs_repacking).unwrap_or(false);
            if pending {
                self.repack_subtree(child)?;
            }
        }
        Ok(())
    }

    /// Deepest visible widget whose box contains the cell; later siblings
    /// are drawn on top and win
    pub fn widget_at(&self, x: u16, y: u16) -> Option<WidgetId> {
        self.hit(self.root, x, y)
    }

    fn hit(&self, id: WidgetId, x: u16, y: u16) -> Option<WidgetId> {
        let widget = self.get(id).ok()?;
        if !widget.is_visible() || !widget.rect().contains(x, y) {
            return None;
        }
        if let Some(panel) = widget.as_panel() {
            if widget.content_rect().contains(x, y) {
                for &child in panel.container().children().iter().rev() {
                    if let Some(found) = self.hit(child, x, y) {
                        return Some(found);
                    }
                }
            }
        }
        Some(id)
    }

    /// Set the box size
    pub fn set_size(&mut self, id: WidgetId, width: u16, height: u16) -> Result<()> {
        if self.get_mut(id)?.apply_size(width, height) {
            self.geometry_changed(id);
        }
        Ok(())
    }

    /// Set the content window size; the box follows with border and padding
    pub fn set_content_size(&mut self, id: WidgetId, width: u16, height: u16) -> Result<()> {
        if self.get_mut(id)?.apply_content_size(width, height) {
            self.geometry_changed(id);
        }
        Ok(())
    }

    /// Replace the padding, growing or shrinking the box by the delta
    pub fn set_padding(&mut self, id: WidgetId, padding: Sides) -> Result<()> {
        self.get_mut(id)?.apply_padding(padding);
        self.geometry_changed(id);
        Ok(())
    }

    pub fn set_padding_side(&mut self, id: WidgetId, side: Vertex, amount: u16) -> Result<()> {
        let padding = self.get(id)?.padding().with(side, amount);
        self.set_padding(id, padding)
    }

    /// Replace the margin; the box size is unchanged
    pub fn set_margin(&mut self, id: WidgetId, margin: Sides) -> Result<()> {
        self.get_mut(id)?.set_margin_fields(margin);
        self.force_parent_repack(id);
        Ok(())
    }

    /// Replace the border, keeping the content size
    pub fn set_border(&mut self, id: WidgetId, border: Border) -> Result<()> {
        let widget = self.get_mut(id)?;
        widget.apply_border(border);
        widget.mark_needs_clear();
        self.geometry_changed(id);
        Ok(())
    }

    pub fn set_grow_factor(&mut self, id: WidgetId, factor: f64) -> Result<()> {
        if self.get_mut(id)?.set_grow(factor)? {
            self.force_parent_repack(id);
        }
        Ok(())
    }

    pub fn set_shrink_factor(&mut self, id: WidgetId, factor: f64) -> Result<()> {
        if self.get_mut(id)?.set_shrink(factor)? {
            self.force_parent_repack(id);
        }
        Ok(())
    }

    /// Set the minimum box size and clamp the current size up to it
    pub fn set_min_size(&mut self, id: WidgetId, width: u16, height: u16) -> Result<()> {
        self.get_mut(id)?.apply_min_size(width, height);
        self.geometry_changed(id);
        Ok(())
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<()> {
        if self.get_mut(id)?.set_visible_flag(visible) {
            self.geometry_changed(id);
        }
        Ok(())
    }

    pub fn set_style(&mut self, id: WidgetId, style: Style) -> Result<()> {
        self.get_mut(id)?.set_style_fields(style);
        Ok(())
    }

    /// Replace the text of a label, the caption of a button or the value of
    /// an input box; labels and buttons resize to fit
    pub fn set_text(&mut self, id: WidgetId, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        let widget = self.get_mut(id)?;
        let path = widget.absolute_id().to_string();
        match widget.kind_mut() {
            WidgetKind::Label(label) => label.set_text(text),
            WidgetKind::Button(button) => button.set_caption(text),
            WidgetKind::InputBox(input) => {
                input.set_value(text);
                return Ok(());
            }
            WidgetKind::Panel(_) | WidgetKind::ListBox(_) => {
                return Err(Error::invalid(format!("`{path}` has no text to set")));
            }
        }
        if widget.fit_content() {
            self.geometry_changed(id);
        }
        Ok(())
    }

    pub fn set_text_align(&mut self, id: WidgetId, align: TextAlign) -> Result<()> {
        let widget = self.get_mut(id)?;
        let path = widget.absolute_id().to_string();
        match widget.kind_mut() {
            WidgetKind::Label(label) => {
                label.set_align(align);
                Ok(())
            }
            _ => Err(Error::invalid(format!("`{path}` is not a label"))),
        }
    }

    /// Replace the items of a list box, resizing it to fit
    pub fn set_items<I, S>(&mut self, id: WidgetId, items: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let widget = self.get_mut(id)?;
        let path = widget.absolute_id().to_string();
        match widget.kind_mut() {
            WidgetKind::ListBox(list) => list.set_items(items.into_iter().map(Into::into).collect()),
            _ => return Err(Error::invalid(format!("`{path}` is not a list box"))),
        }
        if widget.fit_content() {
            self.geometry_changed(id);
        }
        Ok(())
    }

    pub fn set_direction(&mut self, id: WidgetId, direction: Direction) -> Result<()> {
        if self.panel_mut(id)?.set_direction(direction) {
            self.mark_repack(id);
        }
        Ok(())
    }

    pub fn set_alignment(&mut self, id: WidgetId, primary: Alignment, cross: Alignment) -> Result<()> {
        if self.panel_mut(id)?.set_alignment(primary, cross) {
            self.mark_repack(id);
        }
        Ok(())
    }

    pub fn set_title(&mut self, id: WidgetId, title: Option<String>) -> Result<()> {
        self.panel_mut(id)?.set_title(title);
        Ok(())
    }

    pub(crate) fn set_focused(&mut self, id: WidgetId, focused: bool) -> Result<()> {
        self.get_mut(id)?.set_focused(focused);
        Ok(())
    }
}

fn stale(id: WidgetId) -> Error {
    Error::invalid(format!(
        "widget handle {}:{} is stale",
        id.index, id.generation
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::BorderStyle;
    use proptest::prelude::*;

    fn tree_with_children() -> (WidgetTree, WidgetId, WidgetId) {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        tree.set_size(root, 40, 20).unwrap();
        let side = tree
            .add_child(root, Widget::panel("side", Direction::Vertical).with_size(20, 10))
            .unwrap();
        let label = tree.add_child(side, Widget::label("name", "hello")).unwrap();
        tree.pack().unwrap();
        (tree, side, label)
    }

    #[test]
    fn test_absolute_ids() {
        let (tree, side, label) = tree_with_children();
        assert_eq!(tree.get(side).unwrap().absolute_id(), "root.side");
        assert_eq!(tree.get(label).unwrap().absolute_id(), "root.side.name");
        assert_eq!(tree.find_by_absolute_id("root.side.name"), Some(label));
        assert_eq!(tree.find_by_absolute_id("root.nope"), None);
    }

    #[test]
    fn test_reparent_refreshes_ids_and_dirties_both_parents() {
        let (mut tree, side, label) = tree_with_children();
        let root = tree.root();
        let other = tree
            .add_child(root, Widget::panel("other", Direction::Horizontal))
            .unwrap();
        tree.pack().unwrap();
        assert!(!tree.needs_repacking());

        tree.set_parent(label, other).unwrap();
        assert_eq!(tree.get(label).unwrap().absolute_id(), "root.other.name");
        assert!(tree.children(side).unwrap().is_empty());
        assert_eq!(tree.children(other).unwrap(), &[label]);
        assert!(tree.get(side).unwrap().as_panel().unwrap().needs_repacking());
        assert!(tree.get(other).unwrap().as_panel().unwrap().needs_repacking());
        assert!(tree.needs_repacking());
    }

    #[test]
    fn test_non_panel_parent_rejected() {
        let (mut tree, _, label) = tree_with_children();
        let err = tree.add_child(label, Widget::label("x", "")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        // The failed insert does not leak a widget
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_cycle_rejected() {
        let (mut tree, side, _) = tree_with_children();
        let inner = tree
            .add_child(side, Widget::panel("inner", Direction::Vertical))
            .unwrap();
        assert!(tree.set_parent(side, inner).is_err());
        assert!(tree.set_parent(side, side).is_err());
    }

    #[test]
    fn test_duplicate_sibling_id_rejected() {
        let (mut tree, side, _) = tree_with_children();
        assert!(tree.add_child(side, Widget::label("name", "again")).is_err());
    }

    #[test]
    fn test_remove_invalidates_handles() {
        let (mut tree, side, label) = tree_with_children();
        tree.remove(side).unwrap();
        assert!(tree.get(side).is_err());
        assert!(tree.get(label).is_err());
        assert!(tree.children(tree.root()).unwrap().is_empty());

        // Slot reuse does not revive the old handle
        let fresh = tree.insert(Widget::label("fresh", ""));
        assert!(tree.get(fresh).is_ok());
        assert!(tree.get(side).is_err());
        assert!(tree.remove(tree.root()).is_err());
    }

    #[test]
    fn test_propagation_reaches_root() {
        let (mut tree, side, label) = tree_with_children();
        assert!(!tree.needs_repacking());
        tree.set_size(label, 9, 1).unwrap();
        assert!(tree.get(side).unwrap().as_panel().unwrap().needs_repacking());
        assert!(tree.needs_repacking());
        tree.pack().unwrap();
        assert!(!tree.needs_repacking());
    }

    #[test]
    fn test_unchanged_size_does_not_dirty() {
        let (mut tree, _, label) = tree_with_children();
        let (w, h) = {
            let l = tree.get(label).unwrap();
            (l.width(), l.height())
        };
        tree.set_size(label, w, h).unwrap();
        assert!(!tree.needs_repacking());
        tree.set_visible(label, true).unwrap();
        assert!(!tree.needs_repacking());
    }

    #[test]
    fn test_padding_changes_box_by_delta() {
        let (mut tree, _, label) = tree_with_children();
        tree.set_padding_side(label, Vertex::Left, 2).unwrap();
        tree.set_padding_side(label, Vertex::Top, 1).unwrap();
        let l = tree.get(label).unwrap();
        assert_eq!((l.width(), l.height()), (7, 2));
        assert_eq!(l.content_window_size(), (5, 1));
    }

    #[test]
    fn test_margin_keeps_size_but_dirties_parent() {
        let (mut tree, side, label) = tree_with_children();
        tree.set_margin(label, Sides::all(1)).unwrap();
        assert_eq!(tree.get(label).unwrap().width(), 5);
        assert!(tree.get(side).unwrap().as_panel().unwrap().needs_repacking());
    }

    #[test]
    fn test_set_border_keeps_content() {
        let (mut tree, _, label) = tree_with_children();
        tree.set_border(label, Border::new(BorderStyle::Single)).unwrap();
        let l = tree.get(label).unwrap();
        assert_eq!((l.width(), l.height()), (7, 3));
        assert_eq!(l.content_window_size(), (5, 1));
    }

    #[test]
    fn test_invalid_factor_rejected_eagerly() {
        let (mut tree, _, label) = tree_with_children();
        assert!(tree.set_grow_factor(label, -0.5).is_err());
        assert!(tree.set_shrink_factor(label, f64::NAN).is_err());
        assert_eq!(tree.get(label).unwrap().grow_factor(), 0.0);
    }

    #[test]
    fn test_set_text_resizes_label() {
        let (mut tree, side, label) = tree_with_children();
        tree.set_text(label, "a longer line\nand another").unwrap();
        let l = tree.get(label).unwrap();
        assert_eq!((l.width(), l.height()), (13, 2));
        assert!(tree.get(side).unwrap().as_panel().unwrap().needs_repacking());
        assert!(tree.set_text(side, "x").is_err());
    }

    #[test]
    fn test_children_of_kind() {
        let (mut tree, side, label) = tree_with_children();
        let button = tree.add_child(side, Widget::button("ok", "OK")).unwrap();
        assert_eq!(tree.children_of_kind(side, KindTag::Button).unwrap(), vec![button]);
        assert_eq!(tree.children_of_kind(side, KindTag::Label).unwrap(), vec![label]);
    }

    #[test]
    fn test_widget_at_prefers_deepest_and_latest() {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        tree.set_size(root, 20, 10).unwrap();
        let panel = tree
            .add_child(root, Widget::panel("p", Direction::Horizontal).with_size(20, 5))
            .unwrap();
        let a = tree.add_child(panel, Widget::label("a", "aaaa")).unwrap();
        let b = tree.add_child(panel, Widget::label("b", "bbbb")).unwrap();
        tree.pack().unwrap();

        assert_eq!(tree.widget_at(1, 0), Some(a));
        assert_eq!(tree.widget_at(5, 0), Some(b));
        assert_eq!(tree.widget_at(15, 3), Some(panel));
        assert_eq!(tree.widget_at(15, 8), Some(root));
        assert_eq!(tree.widget_at(50, 50), None);

        tree.set_visible(b, false).unwrap();
        assert_eq!(tree.widget_at(5, 0), Some(panel));
    }

    #[test]
    fn test_same_widget() {
        let (tree, side, label) = tree_with_children();
        assert!(tree.same_widget(label, label));
        assert!(!tree.same_widget(side, label));
    }

    /// One box-model mutation applied through the tree
    #[derive(Debug, Clone)]
    enum BoxOp {
        Size(u16, u16),
        ContentSize(u16, u16),
        Padding(Sides),
        PaddingSide(Vertex, u16),
        Margin(Sides),
        Border(bool),
        MinSize(u16, u16),
        Visible(bool),
    }

    fn arb_sides() -> impl Strategy<Value = Sides> {
        (0u16..4, 0u16..4, 0u16..4, 0u16..4).prop_map(|(t, r, b, l)| Sides::new(t, r, b, l))
    }

    fn arb_op() -> impl Strategy<Value = BoxOp> {
        prop_oneof![
            (0u16..30, 0u16..30).prop_map(|(w, h)| BoxOp::Size(w, h)),
            (0u16..20, 0u16..20).prop_map(|(w, h)| BoxOp::ContentSize(w, h)),
            arb_sides().prop_map(BoxOp::Padding),
            (0usize..4, 0u16..5).prop_map(|(v, n)| {
                BoxOp::PaddingSide(Vertex::from_index(v).unwrap(), n)
            }),
            arb_sides().prop_map(BoxOp::Margin),
            any::<bool>().prop_map(BoxOp::Border),
            (0u16..25, 0u16..25).prop_map(|(w, h)| BoxOp::MinSize(w, h)),
            any::<bool>().prop_map(BoxOp::Visible),
        ]
    }

    proptest! {
        #[test]
        fn attached_box_respects_floor_after_any_mutations(
            ops in proptest::collection::vec(arb_op(), 1..24),
            shrink in any::<bool>(),
        ) {
            let mut tree = WidgetTree::with_panel("root", Panel::new(Direction::Horizontal));
            let root = tree.root();
            tree.set_size(root, 60, 40).unwrap();
            tree.add_child(root, Widget::label("left", "fixed")).unwrap();
            let id = tree
                .add_child(
                    root,
                    Widget::label("subject", "text")
                        .with_shrink_factor(if shrink { 1.0 } else { 0.0 })
                        .unwrap(),
                )
                .unwrap();

            for op in ops {
                match op {
                    BoxOp::Size(w, h) => tree.set_size(id, w, h).unwrap(),
                    BoxOp::ContentSize(w, h) => tree.set_content_size(id, w, h).unwrap(),
                    BoxOp::Padding(p) => tree.set_padding(id, p).unwrap(),
                    BoxOp::PaddingSide(v, n) => tree.set_padding_side(id, v, n).unwrap(),
                    BoxOp::Margin(m) => tree.set_margin(id, m).unwrap(),
                    BoxOp::Border(on) => {
                        let border = if on { Border::new(BorderStyle::Single) } else { Border::none() };
                        tree.set_border(id, border).unwrap();
                    }
                    BoxOp::MinSize(w, h) => tree.set_min_size(id, w, h).unwrap(),
                    BoxOp::Visible(v) => tree.set_visible(id, v).unwrap(),
                }
                // Layout may resize the widget too; an overflow leaves it untouched
                let _ = tree.pack();

                let widget = tree.get(id).unwrap();
                let (min_w, min_h) = widget.min_size();
                let bw = widget.border().width() * 2;
                prop_assert!(widget.width() >= min_w.max(bw));
                prop_assert!(widget.height() >= min_h.max(bw));
                prop_assert!(widget.outer_width() >= widget.width());
                prop_assert!(widget.outer_height() >= widget.height());
            }
        }
    }
}
