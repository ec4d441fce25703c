// crates/gridkit-layout/src/placement.rs

use glam::Vec2;
use gridkit_core::{GridError, Rect, Result, WidgetId, WidgetTree, WrapAxis};
use tracing::debug;

use crate::{GridPlacement, LayoutResult, SizeCompliance};

/// Run a placement pass over `root` and every grid container reachable
/// from it.
///
/// Child geometries are written into the tree; everything else the pass
/// derives (scan order, row/column counts, size compliance) is returned
/// in the `LayoutResult` so callers thread it explicitly into render
/// and navigation.
pub fn compute_layout(tree: &mut WidgetTree, root: WidgetId) -> Result<LayoutResult> {
    let mut result = LayoutResult::default();
    place_grid(tree, root, &mut result)?;
    Ok(result)
}

fn place_grid(tree: &mut WidgetTree, id: WidgetId, result: &mut LayoutResult) -> Result<()> {
    let settings = tree
        .widget(id)?
        .grid_settings()
        .cloned()
        .ok_or(GridError::NotAGrid(id))?;

    let cell = settings.cell_size;
    let outer = settings.outer_margin;
    let inner = settings.inner_margin;

    // Cross-axis extent as it was when the pass started; compliance is
    // reported against this value.
    let original_cross = match settings.wrap_axis {
        WrapAxis::Horizontal => tree.widget(id)?.geometry.size.y,
        WrapAxis::Vertical => tree.widget(id)?.geometry.size.x,
    };

    // A zero-stretch container never collapses below a single
    // row/column: its cross-axis minimum is one cell plus both outer
    // margins.
    if settings.stretch_factor == 0 {
        let widget = tree.widget_mut(id)?;
        match settings.wrap_axis {
            WrapAxis::Horizontal => {
                let min_cross = cell.y + 2.0 * outer.vertical;
                widget.min_size.y = min_cross;
                widget.geometry.size.y = widget.geometry.size.y.max(min_cross);
            }
            WrapAxis::Vertical => {
                let min_cross = cell.x + 2.0 * outer.horizontal;
                widget.min_size.x = min_cross;
                widget.geometry.size.x = widget.geometry.size.x.max(min_cross);
            }
        }
    }

    // Visibility is read exactly once per pass; toggles mid-scan do not
    // affect the current pass.
    let order = tree.visible_children(id)?;
    if order.is_empty() {
        result.grids.insert(
            id,
            GridPlacement {
                order: Vec::new(),
                focus_order: Vec::new(),
                num_rows: 0,
                num_columns: 0,
                compliance: SizeCompliance::compliant(),
            },
        );
        return Ok(());
    }

    let base = tree.widget(id)?.geometry;
    let mut cursor = base.origin + Vec2::new(outer.horizontal, outer.vertical);

    // `lines` counts rows (row-major) or columns (column-major); the
    // perpendicular count is the number of items packed into the first
    // line.
    let mut lines: usize = 1;
    let mut line_len: usize = 0;

    for (i, &child_id) in order.iter().enumerate() {
        if lines == 1 {
            line_len += 1;
        }

        {
            let child = tree.widget_mut(child_id)?;
            if settings.force_children_size {
                child.min_size = cell;
            }
            child.geometry = Rect::new(cursor, cell);
        }

        // Nested layouts are fully resolved before this pass's
        // bookkeeping continues.
        if tree.widget(child_id)?.kind.is_grid() {
            place_grid(tree, child_id, result)?;
        }

        let last = i + 1 == order.len();
        match settings.wrap_axis {
            WrapAxis::Horizontal => {
                cursor.x += cell.x + inner.horizontal;

                let next_overflows = cursor.x + cell.x > base.right();
                let past_end = cursor.x > base.right();
                if (!settings.partial_visibility && next_overflows) || past_end {
                    cursor.x = base.origin.x + outer.horizontal;
                    cursor.y += cell.y + inner.vertical;
                    // The last item never opens an empty trailing row.
                    if !last {
                        lines += 1;
                    }
                }
            }
            WrapAxis::Vertical => {
                cursor.y += cell.y + inner.vertical;

                let next_overflows = cursor.y + cell.y > base.bottom() - outer.vertical;
                let past_end = cursor.y > base.bottom();
                if (!settings.partial_visibility && next_overflows) || past_end {
                    cursor.y = base.origin.y + outer.vertical;
                    cursor.x += cell.x + inner.horizontal;
                    if !last {
                        lines += 1;
                    }
                }
            }
        }
    }

    let (num_rows, num_columns) = match settings.wrap_axis {
        WrapAxis::Horizontal => (lines, line_len),
        WrapAxis::Vertical => (line_len, lines),
    };

    // Content-driven containers take exactly the packed extent on the
    // cross axis, as both minimum and base size.
    if settings.stretch_factor == 0 || settings.match_content {
        let widget = tree.widget_mut(id)?;
        match settings.wrap_axis {
            WrapAxis::Horizontal => {
                let packed = num_rows as f32 * cell.y
                    + 2.0 * outer.vertical
                    + (num_rows - 1) as f32 * inner.vertical;
                widget.min_size.y = packed;
                widget.geometry.size.y = packed;
            }
            WrapAxis::Vertical => {
                let packed = num_columns as f32 * cell.x
                    + 2.0 * outer.horizontal
                    + (num_columns - 1) as f32 * inner.horizontal;
                widget.min_size.x = packed;
                widget.geometry.size.x = packed;
            }
        }
    }

    let new_cross = match settings.wrap_axis {
        WrapAxis::Horizontal => tree.widget(id)?.geometry.size.y,
        WrapAxis::Vertical => tree.widget(id)?.geometry.size.x,
    };

    let mut compliance = SizeCompliance::empty();
    match settings.wrap_axis {
        WrapAxis::Horizontal => {
            compliance |= SizeCompliance::COMPLIANT_WIDTH;
            if new_cross > original_cross {
                compliance |= SizeCompliance::LARGER_HEIGHT;
            } else if new_cross < original_cross {
                compliance |= SizeCompliance::SMALLER_HEIGHT;
            } else {
                compliance |= SizeCompliance::COMPLIANT_HEIGHT;
            }
        }
        WrapAxis::Vertical => {
            compliance |= SizeCompliance::COMPLIANT_HEIGHT;
            if new_cross > original_cross {
                compliance |= SizeCompliance::LARGER_WIDTH;
            } else if new_cross < original_cross {
                compliance |= SizeCompliance::SMALLER_WIDTH;
            } else {
                compliance |= SizeCompliance::COMPLIANT_WIDTH;
            }
        }
    }

    let focus_order: Vec<WidgetId> = order
        .iter()
        .copied()
        .filter(|&child| tree.get(child).is_some_and(|w| w.focusable))
        .collect();

    debug!(
        "placed grid {}: {} columns x {} rows, {} visible children, compliance {:?}",
        id,
        num_columns,
        num_rows,
        order.len(),
        compliance
    );

    result.grids.insert(
        id,
        GridPlacement {
            order,
            focus_order,
            num_rows,
            num_columns,
            compliance,
        },
    );
    Ok(())
}
