//! Flex solver: measure, cross-axis settle, slack distribution, placement

use super::Alignment;
use crate::error::{Error, Result};
use crate::widget::{WidgetId, WidgetTree};
use tracing::warn;

/// One child as seen by the slack distribution pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexItem {
    /// Current main-axis box size
    pub size: u16,
    /// Leading plus trailing main-axis margin
    pub margin: u16,
    pub grow: f64,
    pub shrink: f64,
    /// Smallest main-axis size the child accepts
    pub min: u16,
}

impl FlexItem {
    fn outer(&self) -> i64 {
        self.size as i64 + self.margin as i64
    }
}

/// Result of distributing slack across children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    /// New main-axis box size per child, in input order
    pub sizes: Vec<u16>,
    /// Cells still missing after every shrinkable child hit its floor
    pub overflow: u16,
}

/// Distribute `available - needed` across the items by grow or shrink factor
///
/// Shares are computed from floating-point factor ratios and truncated. When
/// growing, the rounding loss stays unused. When shrinking, whatever the
/// shares and the minimum sizes leave over is trimmed off the last
/// shrinkable children, so the items fit unless every one of them is at its
/// minimum. Fails with the needed and available totals when the items do not
/// fit and none of them may shrink.
pub fn distribute(items: &[FlexItem], available: i64) -> std::result::Result<Distribution, (i64, i64)> {
    let needed: i64 = items.iter().map(FlexItem::outer).sum();
    let slack = available - needed;
    let mut sizes: Vec<u16> = items.iter().map(|i| i.size).collect();

    if slack > 0 {
        let total_grow: f64 = items.iter().map(|i| i.grow).sum();
        if total_grow > 0.0 {
            for (item, size) in items.iter().zip(sizes.iter_mut()) {
                if item.grow <= 0.0 {
                    continue;
                }
                let share = (slack as f64 * (item.grow / total_grow)) as i64;
                *size = clamp_cells(item.size as i64 + share);
            }
        }
    } else if slack < 0 {
        let total_shrink: f64 = items.iter().map(|i| i.shrink).sum();
        if total_shrink <= 0.0 {
            return Err((needed, available));
        }

        for (item, size) in items.iter().zip(sizes.iter_mut()) {
            if item.shrink <= 0.0 {
                continue;
            }
            let share = (slack as f64 * (item.shrink / total_shrink)) as i64;
            *size = clamp_cells((item.size as i64 + share).max(item.min as i64));
        }

        // Floors and truncated shares leave the row too long; trim the
        // excess off shrinkable children, last first, down to their floors
        let mut occupied: i64 = items
            .iter()
            .zip(sizes.iter())
            .map(|(item, size)| *size as i64 + item.margin as i64)
            .sum();
        for (item, size) in items.iter().zip(sizes.iter_mut()).rev() {
            if occupied <= available {
                break;
            }
            if item.shrink <= 0.0 {
                continue;
            }
            let trim = (occupied - available).min(*size as i64 - item.min as i64).max(0);
            *size = clamp_cells(*size as i64 - trim);
            occupied -= trim;
        }

        return Ok(Distribution {
            sizes,
            overflow: clamp_cells(occupied - available),
        });
    }

    Ok(Distribution { sizes, overflow: 0 })
}

fn clamp_cells(n: i64) -> u16 {
    n.clamp(0, u16::MAX as i64) as u16
}

/// Lay out the visible children of `panel_id` inside its content window
///
/// Children are only resized once the whole pass has succeeded, so a
/// `LayoutOverflow` leaves every child as it was.
pub fn layout(tree: &mut WidgetTree, panel_id: WidgetId) -> Result<()> {
    let (axis, primary, cross_align, children, panel_path) = {
        let panel_widget = tree.get(panel_id)?;
        let panel = panel_widget
            .as_panel()
            .ok_or_else(|| Error::invalid(format!("`{}` is not a panel", panel_widget.absolute_id())))?;
        let (primary, cross) = panel.alignment();
        (
            panel.direction().axis(),
            primary,
            cross,
            panel.container().children().to_vec(),
            panel_widget.absolute_id().to_string(),
        )
    };

    let mut visible = Vec::with_capacity(children.len());
    for id in children {
        if tree.get(id)?.is_visible() {
            visible.push(id);
        }
    }
    if visible.is_empty() {
        return Ok(());
    }

    // Measure pass
    let mut items = Vec::with_capacity(visible.len());
    let mut max_cross: u16 = 0;
    for &id in &visible {
        let child = tree.get(id)?;
        let (lead, trail) = axis.main_margins(child);
        let (cross_lead, cross_trail) = axis.cross_margins(child);
        let cross_outer = axis
            .cross_size(child)
            .saturating_add(cross_lead)
            .saturating_add(cross_trail);
        max_cross = max_cross.max(cross_outer);
        items.push(FlexItem {
            size: axis.main_size(child),
            margin: lead.saturating_add(trail),
            grow: child.grow_factor(),
            shrink: child.shrink_factor(),
            min: axis.min_main(child),
        });
    }

    // Cross-axis settle: the panel grows to fit its largest child
    let content = {
        let panel = tree.get(panel_id)?;
        let (_, _, _, cross_len) = axis.split(panel.content_rect());
        cross_len
    };
    if content < max_cross {
        let grown = {
            let panel = tree.get_mut(panel_id)?;
            let (cw, ch) = panel.content_window_size();
            let (w, h) = match axis.direction() {
                super::Direction::Horizontal => (cw, max_cross),
                super::Direction::Vertical => (max_cross, ch),
            };
            panel.apply_content_size(w, h)
        };
        if grown {
            tree.force_parent_repack(panel_id);
        }
    }

    let (main_origin, cross_origin, available_main, available_cross) =
        axis.split(tree.get(panel_id)?.content_rect());

    // Slack distribution
    let dist = distribute(&items, available_main as i64).map_err(|(needed, available)| {
        Error::LayoutOverflow {
            panel: panel_path.clone(),
            needed,
            available,
        }
    })?;
    if dist.overflow > 0 {
        warn!(
            panel = %panel_path,
            overflow = dist.overflow,
            "children still overflow after shrinking to their minimum sizes"
        );
    }

    // Placement pass
    let used: i64 = items
        .iter()
        .zip(dist.sizes.iter())
        .map(|(item, size)| *size as i64 + item.margin as i64)
        .sum();
    let leftover = (available_main as i64 - used).max(0) as u16;
    let lead_offset = match primary {
        Alignment::Start | Alignment::Stretch => 0,
        Alignment::Center => leftover / 2,
        Alignment::End => leftover,
    };

    let mut cursor = main_origin.saturating_add(lead_offset);
    for (&id, &size) in visible.iter().zip(dist.sizes.iter()) {
        let child = tree.get_mut(id)?;
        let (lead, trail) = axis.main_margins(child);
        let (cross_lead, cross_trail) = axis.cross_margins(child);

        let mut changed = axis.set_main_size(child, size);

        let cross_pos = match cross_align {
            Alignment::Start => cross_origin.saturating_add(cross_lead),
            Alignment::Center => {
                let outer = axis
                    .cross_size(child)
                    .saturating_add(cross_lead)
                    .saturating_add(cross_trail);
                cross_origin
                    .saturating_add(available_cross.saturating_sub(outer) / 2)
                    .saturating_add(cross_lead)
            }
            Alignment::End => {
                let end = cross_origin
                    .saturating_add(available_cross)
                    .saturating_sub(cross_trail)
                    .saturating_sub(axis.cross_size(child));
                end.max(cross_origin)
            }
            Alignment::Stretch => {
                let span = available_cross
                    .saturating_sub(cross_lead)
                    .saturating_sub(cross_trail)
                    .max(axis.min_cross(child));
                changed |= axis.set_cross_size(child, span);
                cross_origin.saturating_add(cross_lead)
            }
        };

        let main_pos = cursor.saturating_add(lead);
        changed |= axis.place(child, main_pos, cross_pos);
        cursor = main_pos
            .saturating_add(axis.main_size(child))
            .saturating_add(trail);

        // A moved or resized panel has to lay out its own children again
        if changed {
            if let Some(panel) = child.as_panel_mut() {
                panel.set_needs_repacking(true);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Sides;
    use crate::layout::Direction;
    use crate::widget::{Panel, Widget};
    use proptest::prelude::*;

    fn item(size: u16, grow: f64, shrink: f64, min: u16) -> FlexItem {
        FlexItem {
            size,
            margin: 0,
            grow,
            shrink,
            min,
        }
    }

    fn horizontal_tree(width: u16, height: u16) -> WidgetTree {
        let mut tree = WidgetTree::with_panel("root", Panel::new(Direction::Horizontal));
        let root = tree.root();
        tree.set_size(root, width, height).unwrap();
        tree
    }

    #[test]
    fn test_grow_two_children() {
        let dist = distribute(&[item(10, 1.0, 0.0, 0), item(20, 1.0, 0.0, 0)], 40).unwrap();
        assert_eq!(dist.sizes, vec![15, 25]);
        assert_eq!(dist.overflow, 0);
    }

    #[test]
    fn test_zero_grow_keeps_natural_size() {
        let dist = distribute(&[item(10, 0.0, 0.0, 0), item(10, 2.0, 0.0, 0)], 40).unwrap();
        assert_eq!(dist.sizes, vec![10, 30]);
    }

    #[test]
    fn test_no_grow_factor_leaves_slack() {
        let dist = distribute(&[item(10, 0.0, 0.0, 0), item(10, 0.0, 0.0, 0)], 40).unwrap();
        assert_eq!(dist.sizes, vec![10, 10]);
    }

    #[test]
    fn test_truncation_drift() {
        // 10 cells split three ways: each share truncates to 3
        let items = [item(0, 1.0, 0.0, 0), item(0, 1.0, 0.0, 0), item(0, 1.0, 0.0, 0)];
        let dist = distribute(&items, 10).unwrap();
        assert_eq!(dist.sizes, vec![3, 3, 3]);
    }

    #[test]
    fn test_shrink_proportional() {
        let dist = distribute(&[item(30, 0.0, 1.0, 0), item(30, 0.0, 1.0, 0)], 40).unwrap();
        assert_eq!(dist.sizes, vec![20, 20]);
    }

    #[test]
    fn test_shrink_floor_carries_to_next_child() {
        // First child may only lose 5 of its 10-cell share; the rest moves on
        let dist = distribute(&[item(30, 0.0, 1.0, 25), item(30, 0.0, 1.0, 0)], 40).unwrap();
        assert_eq!(dist.sizes, vec![25, 15]);
        assert_eq!(dist.overflow, 0);
    }

    #[test]
    fn test_shrink_rounding_loss_trimmed_off_last_child() {
        // -10 split three ways truncates to -3 each, one cell too long
        let items = [item(10, 0.0, 1.0, 0), item(10, 0.0, 1.0, 0), item(10, 0.0, 1.0, 0)];
        let dist = distribute(&items, 20).unwrap();
        assert_eq!(dist.sizes, vec![7, 7, 6]);
        assert_eq!(dist.overflow, 0);
    }

    #[test]
    fn test_shrunk_children_stay_inside_panel() {
        let mut tree = horizontal_tree(20, 3);
        let root = tree.root();
        let ids: Vec<WidgetId> = ["a", "b", "c"]
            .into_iter()
            .map(|id| {
                let widget = Widget::label(id, "")
                    .with_size(10, 1)
                    .with_shrink_factor(1.0)
                    .unwrap();
                tree.add_child(root, widget).unwrap()
            })
            .collect();

        tree.pack().unwrap();
        let last = tree.get(ids[2]).unwrap();
        assert!(last.pos_x() + last.width() <= 20);
        let total: u16 = ids.iter().map(|&id| tree.get(id).unwrap().width()).sum();
        assert_eq!(total, 20);
    }

    #[test]
    fn test_shrink_floor_reports_residual_overflow() {
        let dist = distribute(&[item(30, 0.0, 1.0, 28), item(30, 0.0, 0.0, 0)], 40).unwrap();
        assert_eq!(dist.sizes, vec![28, 30]);
        assert_eq!(dist.overflow, 18);
    }

    #[test]
    fn test_overflow_without_shrink() {
        let err = distribute(&[item(30, 1.0, 0.0, 0), item(30, 1.0, 0.0, 0)], 40).unwrap_err();
        assert_eq!(err, (60, 40));
    }

    #[test]
    fn test_end_to_end_horizontal_grow() {
        let mut tree = horizontal_tree(40, 5);
        let root = tree.root();
        let a = tree
            .add_child(root, Widget::label("a", "").with_size(10, 1).with_grow_factor(1.0).unwrap())
            .unwrap();
        let b = tree
            .add_child(root, Widget::label("b", "").with_size(20, 1).with_grow_factor(1.0).unwrap())
            .unwrap();

        tree.pack().unwrap();

        let wa = tree.get(a).unwrap();
        let wb = tree.get(b).unwrap();
        assert_eq!(wa.width(), 15);
        assert_eq!(wb.width(), 25);
        assert_eq!(wa.pos_x(), 0);
        assert_eq!(wb.pos_x(), 15);
    }

    #[test]
    fn test_overflow_is_all_or_nothing() {
        let mut tree = horizontal_tree(40, 5);
        let root = tree.root();
        let a = tree
            .add_child(root, Widget::label("a", "").with_size(30, 1))
            .unwrap();
        let b = tree
            .add_child(root, Widget::label("b", "").with_size(30, 1))
            .unwrap();

        let err = tree.pack().unwrap_err();
        assert!(matches!(err, Error::LayoutOverflow { needed: 60, available: 40, .. }));
        assert_eq!(tree.get(a).unwrap().width(), 30);
        assert_eq!(tree.get(b).unwrap().width(), 30);
    }

    #[test]
    fn test_hidden_children_skipped() {
        let mut tree = horizontal_tree(40, 5);
        let root = tree.root();
        let a = tree
            .add_child(root, Widget::label("a", "").with_size(10, 1))
            .unwrap();
        let hidden = tree
            .add_child(root, Widget::label("h", "").with_size(100, 1))
            .unwrap();
        let b = tree
            .add_child(root, Widget::label("b", "").with_size(10, 1))
            .unwrap();
        tree.set_visible(hidden, false).unwrap();

        tree.pack().unwrap();
        assert_eq!(tree.get(b).unwrap().pos_x(), 10);
        assert_eq!(tree.get(a).unwrap().pos_x(), 0);
        assert_eq!(tree.get(hidden).unwrap().width(), 100);
    }

    #[test]
    fn test_margins_and_padding_offset_placement() {
        let mut tree = horizontal_tree(40, 10);
        let root = tree.root();
        tree.set_padding(root, Sides::new(1, 0, 0, 2)).unwrap();
        let a = tree
            .add_child(
                root,
                Widget::label("a", "").with_size(5, 1).with_margin(Sides::new(1, 1, 0, 3)),
            )
            .unwrap();
        let b = tree
            .add_child(root, Widget::label("b", "").with_size(5, 1))
            .unwrap();

        tree.pack().unwrap();
        let wa = tree.get(a).unwrap();
        assert_eq!((wa.pos_x(), wa.pos_y()), (5, 2));
        // 2 padding + 3 margin + 5 width + 1 margin
        assert_eq!(tree.get(b).unwrap().pos_x(), 11);
    }

    #[test]
    fn test_cross_alignment() {
        for (align, expected_y, expected_h) in [
            (Alignment::Start, 0, 2),
            (Alignment::Center, 4, 2),
            (Alignment::End, 8, 2),
            (Alignment::Stretch, 0, 10),
        ] {
            let mut tree = WidgetTree::with_panel(
                "root",
                Panel::new(Direction::Horizontal).with_alignment(Alignment::Start, align),
            );
            let root = tree.root();
            tree.set_size(root, 20, 10).unwrap();
            let a = tree
                .add_child(root, Widget::label("a", "").with_size(4, 2))
                .unwrap();
            tree.pack().unwrap();
            let w = tree.get(a).unwrap();
            assert_eq!(w.pos_y(), expected_y, "{align:?}");
            assert_eq!(w.height(), expected_h, "{align:?}");
        }
    }

    #[test]
    fn test_stretch_respects_cross_minimum() {
        let mut tree = WidgetTree::with_panel(
            "root",
            Panel::new(Direction::Horizontal).with_alignment(Alignment::Start, Alignment::Stretch),
        );
        let root = tree.root();
        tree.set_size(root, 20, 10).unwrap();
        let a = tree
            .add_child(
                root,
                Widget::label("a", "")
                    .with_min_size(0, 6)
                    .with_margin(Sides::new(3, 0, 3, 0)),
            )
            .unwrap();

        tree.pack().unwrap();
        let w = tree.get(a).unwrap();
        assert_eq!(w.pos_y(), 3);
        assert!(w.height() >= 6);
        assert!(tree.get(root).unwrap().height() >= 12);
    }

    #[test]
    fn test_primary_alignment_uses_leftover() {
        let mut tree = WidgetTree::with_panel(
            "root",
            Panel::new(Direction::Horizontal).with_alignment(Alignment::End, Alignment::Start),
        );
        let root = tree.root();
        tree.set_size(root, 20, 3).unwrap();
        let a = tree
            .add_child(root, Widget::label("a", "").with_size(5, 1))
            .unwrap();
        tree.pack().unwrap();
        assert_eq!(tree.get(a).unwrap().pos_x(), 15);
    }

    #[test]
    fn test_cross_settle_grows_panel() {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        tree.set_size(root, 40, 20).unwrap();
        let row = tree
            .add_child(root, Widget::panel("row", Direction::Horizontal).with_size(10, 1))
            .unwrap();
        tree.add_child(row, Widget::label("tall", "").with_size(3, 4))
            .unwrap();

        tree.pack().unwrap();
        assert!(tree.get(row).unwrap().height() >= 4);
        assert!(!tree.needs_repacking());
    }

    #[test]
    fn test_vertical_layout_stacks() {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        tree.set_size(root, 10, 10).unwrap();
        let a = tree
            .add_child(root, Widget::label("a", "").with_size(10, 2))
            .unwrap();
        let b = tree
            .add_child(root, Widget::label("b", "").with_size(10, 2).with_grow_factor(1.0).unwrap())
            .unwrap();
        tree.pack().unwrap();
        assert_eq!(tree.get(a).unwrap().pos_y(), 0);
        assert_eq!(tree.get(b).unwrap().pos_y(), 2);
        assert_eq!(tree.get(b).unwrap().height(), 8);
    }

    fn arb_item() -> impl Strategy<Value = FlexItem> {
        (0u16..40, 0u16..4, 0u8..4, 0u8..4, 0u16..20).prop_map(|(size, margin, g, s, min)| {
            FlexItem {
                size: size.max(min),
                margin,
                grow: g as f64,
                shrink: s as f64,
                min,
            }
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn grow_conserves_available_space(
            items in proptest::collection::vec(arb_item(), 1..8),
            extra in 0i64..200,
        ) {
            let mut items = items;
            items[0].grow = items[0].grow.max(1.0);
            let needed: i64 = items.iter().map(|i| i.size as i64 + i.margin as i64).sum();
            let available = needed + extra;

            let dist = distribute(&items, available).unwrap();
            let used: i64 = items.iter().zip(&dist.sizes)
                .map(|(i, s)| *s as i64 + i.margin as i64)
                .sum();
            prop_assert!(used <= available);
            prop_assert!(available - used <= items.len() as i64);
        }

        #[test]
        fn shrink_never_goes_below_minimum(
            items in proptest::collection::vec(arb_item(), 1..8),
            deficit in 1i64..100,
        ) {
            let mut items = items;
            items[0].shrink = items[0].shrink.max(1.0);
            let needed: i64 = items.iter().map(|i| i.size as i64 + i.margin as i64).sum();

            let available = needed - deficit;
            let dist = distribute(&items, available).unwrap();
            for (item, size) in items.iter().zip(&dist.sizes) {
                if item.shrink > 0.0 {
                    prop_assert!(*size >= item.min);
                } else {
                    prop_assert_eq!(*size, item.size);
                }
            }

            // Whenever the floors leave room, the shrunk row fits exactly
            let floors: i64 = items.iter()
                .map(|i| {
                    let floor = if i.shrink > 0.0 { i.min } else { i.size };
                    floor as i64 + i.margin as i64
                })
                .sum();
            let used: i64 = items.iter().zip(&dist.sizes)
                .map(|(i, s)| *s as i64 + i.margin as i64)
                .sum();
            if floors <= available {
                prop_assert!(used <= available);
                prop_assert_eq!(dist.overflow, 0);
            } else {
                prop_assert_eq!(used, floors);
            }
        }

        #[test]
        fn overflow_without_shrink_always_fails(
            sizes in proptest::collection::vec(1u16..40, 1..8),
            deficit in 1i64..50,
        ) {
            let items: Vec<FlexItem> = sizes.iter().map(|&s| item(s, 1.0, 0.0, 0)).collect();
            let needed: i64 = sizes.iter().map(|&s| s as i64).sum();
            prop_assert!(distribute(&items, needed - deficit).is_err());
        }
    }
}
