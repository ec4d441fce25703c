// crates/gridkit-runtime/src/navigation.rs

use gridkit_core::{GridError, Result, WidgetId, WidgetKind, WidgetTree, WrapAxis};
use gridkit_layout::LayoutResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Outcome of a directional navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Focus moves to this sibling.
    Transfer(WidgetId),
    /// The request crossed a grid edge and is forwarded to the parent.
    Escalate,
    /// Grid edge with no parent to forward to; focus stays put.
    NoTransfer,
}

/// Grid movement relative to the wrap axis: along the packing
/// direction (adjacent positions) or across it (whole-line jumps).
#[derive(Debug, Clone, Copy)]
enum Step {
    BackAlong,
    ForwardAlong,
    BackAcross,
    ForwardAcross,
}

fn step_for(wrap_axis: WrapAxis, direction: Direction) -> Step {
    match (wrap_axis, direction) {
        (WrapAxis::Horizontal, Direction::Left) => Step::BackAlong,
        (WrapAxis::Horizontal, Direction::Right) => Step::ForwardAlong,
        (WrapAxis::Horizontal, Direction::Up) => Step::BackAcross,
        (WrapAxis::Horizontal, Direction::Down) => Step::ForwardAcross,
        (WrapAxis::Vertical, Direction::Up) => Step::BackAlong,
        (WrapAxis::Vertical, Direction::Down) => Step::ForwardAlong,
        (WrapAxis::Vertical, Direction::Left) => Step::BackAcross,
        (WrapAxis::Vertical, Direction::Right) => Step::ForwardAcross,
    }
}

/// Translate a directional key press on `container` into a focus
/// transfer.
///
/// Positions are ranks in the placement's focusable order, so
/// non-focusable siblings are transparent to the row/column arithmetic.
/// Edges report `Escalate` when the container has a parent to forward
/// to and `NoTransfer` at the root.
pub fn navigate(
    tree: &WidgetTree,
    layout: &LayoutResult,
    container: WidgetId,
    focused: Option<WidgetId>,
    direction: Direction,
) -> Result<NavOutcome> {
    let placement = layout.placement(container)?;
    let widget = tree.widget(container)?;
    let settings = widget
        .grid_settings()
        .ok_or(GridError::NotAGrid(container))?;
    let has_parent = widget.parent.is_some();

    let focus = &placement.focus_order;
    if focus.is_empty() {
        return Ok(NavOutcome::NoTransfer);
    }

    let edge = if has_parent {
        NavOutcome::Escalate
    } else {
        NavOutcome::NoTransfer
    };

    // Items without a focus position (unset focus, or a widget that is
    // not part of this grid's focusable order) restart navigation.
    let position = match focused.and_then(|f| placement.focus_position(f)) {
        Some(position) => position,
        None => {
            return Ok(match direction {
                Direction::Down if has_parent => NavOutcome::Escalate,
                Direction::Down => NavOutcome::Transfer(focus[focus.len() - 1]),
                _ => NavOutcome::Transfer(focus[0]),
            });
        }
    };

    // Cells per line along the packing axis, and the number of lines.
    let line_len = match settings.wrap_axis {
        WrapAxis::Horizontal => placement.num_columns,
        WrapAxis::Vertical => placement.num_rows,
    };
    let lines = match settings.wrap_axis {
        WrapAxis::Horizontal => placement.num_rows,
        WrapAxis::Vertical => placement.num_columns,
    };

    let outcome = match step_for(settings.wrap_axis, direction) {
        Step::BackAlong => {
            if position % line_len == 0 {
                edge
            } else {
                NavOutcome::Transfer(focus[position - 1])
            }
        }
        Step::ForwardAlong => {
            if (position + 1) % line_len == 0 || position + 1 >= focus.len() {
                edge
            } else {
                NavOutcome::Transfer(focus[position + 1])
            }
        }
        Step::BackAcross => {
            if position < line_len {
                edge
            } else {
                NavOutcome::Transfer(focus[position - line_len])
            }
        }
        Step::ForwardAcross => {
            // Last line, or a short last line that has no cell below
            // the requested position.
            if position >= line_len * (lines - 1) || position + line_len >= focus.len() {
                edge
            } else {
                NavOutcome::Transfer(focus[position + line_len])
            }
        }
    };
    Ok(outcome)
}

/// Tab-order style traversal: step through the focusable order and
/// descend into grid candidates, in the same direction, until a leaf is
/// found. Returns `None` when the walk runs off either end of the
/// children or crosses a line boundary.
pub fn key_nav_iteration(
    tree: &WidgetTree,
    layout: &LayoutResult,
    container: WidgetId,
    from: Option<WidgetId>,
    direction: Direction,
) -> Result<Option<WidgetId>> {
    let placement = layout.placement(container)?;
    let settings = tree
        .widget(container)?
        .grid_settings()
        .ok_or(GridError::NotAGrid(container))?;

    let focus = &placement.focus_order;
    if focus.is_empty() {
        return Ok(None);
    }

    // With no focused item the scan starts at the front of the list.
    let position = match from.and_then(|f| placement.focus_position(f)) {
        Some(position) => position,
        None => return resolve_candidate(tree, layout, focus[0], direction),
    };

    let line_len = match settings.wrap_axis {
        WrapAxis::Horizontal => placement.num_columns,
        WrapAxis::Vertical => placement.num_rows,
    };
    let lines = match settings.wrap_axis {
        WrapAxis::Horizontal => placement.num_rows,
        WrapAxis::Vertical => placement.num_columns,
    };

    match step_for(settings.wrap_axis, direction) {
        Step::ForwardAlong => {
            let mut position = position;
            loop {
                if (position + 1) % line_len == 0 || position + 1 >= focus.len() {
                    return Ok(None);
                }
                position += 1;
                if let Some(hit) = resolve_candidate(tree, layout, focus[position], direction)? {
                    return Ok(Some(hit));
                }
            }
        }
        Step::BackAlong => {
            let mut position = position;
            loop {
                if position % line_len == 0 {
                    return Ok(None);
                }
                position -= 1;
                if let Some(hit) = resolve_candidate(tree, layout, focus[position], direction)? {
                    return Ok(Some(hit));
                }
            }
        }
        Step::BackAcross => {
            if position < line_len {
                return Ok(None);
            }
            resolve_candidate(tree, layout, focus[position - line_len], direction)
        }
        Step::ForwardAcross => {
            if position >= line_len * (lines - 1) || position + line_len >= focus.len() {
                return Ok(None);
            }
            resolve_candidate(tree, layout, focus[position + line_len], direction)
        }
    }
}

/// Enter a grid from outside: land on the focusable child nearest the
/// edge the traversal came in through, descending into nested grids.
pub fn enter_grid(
    tree: &WidgetTree,
    layout: &LayoutResult,
    grid: WidgetId,
    direction: Direction,
) -> Result<Option<WidgetId>> {
    let placement = layout.placement(grid)?;
    let focus = &placement.focus_order;
    if focus.is_empty() {
        return Ok(None);
    }

    let entry = match direction {
        Direction::Right | Direction::Down => focus[0],
        Direction::Left | Direction::Up => focus[focus.len() - 1],
    };
    resolve_candidate(tree, layout, entry, direction)
}

fn resolve_candidate(
    tree: &WidgetTree,
    layout: &LayoutResult,
    candidate: WidgetId,
    direction: Direction,
) -> Result<Option<WidgetId>> {
    match tree.widget(candidate)?.kind {
        WidgetKind::Leaf => Ok(Some(candidate)),
        WidgetKind::Grid(_) => enter_grid(tree, layout, candidate, direction),
    }
}
