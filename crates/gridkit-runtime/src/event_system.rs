// crates/gridkit-runtime/src/event_system.rs

use gridkit_core::{Result, WidgetId, WidgetKind, WidgetTree};
use gridkit_layout::LayoutResult;
use tracing::debug;

use crate::navigation::{self, Direction, NavOutcome};

#[derive(Debug, Clone)]
pub enum UIEvent {
    /// Directional key press routed to the focused widget's grid.
    FocusDirection(Direction),
    /// Programmatic focus request.
    FocusWidget(WidgetId),
    TabNext,
    TabPrevious,
}

/// Queue of focus events, drained once per frame. Processing never
/// mutates the tree; it only moves the focus reference.
#[derive(Debug, Default)]
pub struct EventSystem {
    event_queue: Vec<UIEvent>,
}

impl EventSystem {
    pub fn new() -> Self {
        Self {
            event_queue: Vec::new(),
        }
    }

    pub fn queue_event(&mut self, event: UIEvent) {
        self.event_queue.push(event);
    }

    pub fn pending(&self) -> usize {
        self.event_queue.len()
    }

    pub fn update(
        &mut self,
        tree: &WidgetTree,
        layout: &LayoutResult,
        root: WidgetId,
        focused: &mut Option<WidgetId>,
    ) -> Result<()> {
        let events: Vec<_> = self.event_queue.drain(..).collect();
        for event in events {
            Self::process_event(event, tree, layout, root, focused)?;
        }
        Ok(())
    }

    fn process_event(
        event: UIEvent,
        tree: &WidgetTree,
        layout: &LayoutResult,
        root: WidgetId,
        focused: &mut Option<WidgetId>,
    ) -> Result<()> {
        match event {
            UIEvent::FocusWidget(id) => {
                if tree.widget(id)?.focusable {
                    debug!("focus set to widget {}", id);
                    *focused = Some(id);
                }
            }
            UIEvent::FocusDirection(direction) => {
                match directional_transfer(tree, layout, root, *focused, direction)? {
                    Some(next) => {
                        debug!("focus transferred to widget {} ({:?})", next, direction);
                        *focused = Some(next);
                    }
                    None => debug!("focus unchanged at grid edge ({:?})", direction),
                }
            }
            UIEvent::TabNext => {
                let container = containing_grid(tree, root, *focused)?;
                if let Some(next) =
                    navigation::key_nav_iteration(tree, layout, container, *focused, Direction::Right)?
                {
                    debug!("tab focus to widget {}", next);
                    *focused = Some(next);
                }
            }
            UIEvent::TabPrevious => {
                let container = containing_grid(tree, root, *focused)?;
                if let Some(previous) =
                    navigation::key_nav_iteration(tree, layout, container, *focused, Direction::Left)?
                {
                    debug!("tab focus back to widget {}", previous);
                    *focused = Some(previous);
                }
            }
        }
        Ok(())
    }
}

/// The grid that owns `focused`, or the root when focus is unset.
fn containing_grid(tree: &WidgetTree, root: WidgetId, focused: Option<WidgetId>) -> Result<WidgetId> {
    let Some(focused) = focused else {
        return Ok(root);
    };
    Ok(nearest_grid_ancestor(tree, focused)?.unwrap_or(root))
}

fn nearest_grid_ancestor(tree: &WidgetTree, id: WidgetId) -> Result<Option<WidgetId>> {
    let mut current = tree.widget(id)?.parent;
    while let Some(ancestor) = current {
        let widget = tree.widget(ancestor)?;
        if widget.kind.is_grid() {
            return Ok(Some(ancestor));
        }
        current = widget.parent;
    }
    Ok(None)
}

/// Resolve a directional request to its final leaf target, bubbling
/// `Escalate` outcomes up through the ancestor grids and descending
/// into grid targets toward their near edge.
pub fn directional_transfer(
    tree: &WidgetTree,
    layout: &LayoutResult,
    root: WidgetId,
    focused: Option<WidgetId>,
    direction: Direction,
) -> Result<Option<WidgetId>> {
    let mut container = containing_grid(tree, root, focused)?;
    let mut current = focused;

    loop {
        match navigation::navigate(tree, layout, container, current, direction)? {
            NavOutcome::Transfer(target) => {
                return match tree.widget(target)?.kind {
                    WidgetKind::Leaf => Ok(Some(target)),
                    WidgetKind::Grid(_) => navigation::enter_grid(tree, layout, target, direction),
                };
            }
            NavOutcome::Escalate => {
                // The containing grid becomes the focused item of its
                // own parent grid and the request is retried there.
                let Some(parent) = nearest_grid_ancestor(tree, container)? else {
                    return Ok(None);
                };
                current = Some(container);
                container = parent;
            }
            NavOutcome::NoTransfer => return Ok(None),
        }
    }
}
