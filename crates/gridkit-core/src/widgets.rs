// crates/gridkit-core/src/widgets.rs
use glam::Vec2;
use std::collections::HashMap;

use crate::{GridError, GridSettings, Rect, Result};

pub type WidgetId = u32;

/// Capability tag: a widget is either a plain drawable leaf or a grid
/// container that owns an ordered list of children.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Leaf,
    Grid(GridSettings),
}

impl WidgetKind {
    pub fn is_grid(&self) -> bool {
        matches!(self, WidgetKind::Grid(_))
    }
}

/// A positionable item in the widget tree.
///
/// `geometry` is written by the placement pass and is stored in the
/// same coordinate space as the owning container's geometry (placement
/// cursors start at the container origin plus the outer margin).
#[derive(Debug, Clone)]
pub struct Widget {
    pub name: String,
    pub kind: WidgetKind,
    pub parent: Option<WidgetId>,
    pub children: Vec<WidgetId>,

    pub geometry: Rect,
    pub min_size: Vec2,

    pub visible: bool,
    pub focusable: bool,

    /// Set when the widget wants to be redrawn; cleared by the render
    /// traversal once the draw completes.
    pub queued_draw: bool,
}

impl Widget {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn grid(name: impl Into<String>, settings: GridSettings) -> Self {
        Self {
            name: name.into(),
            kind: WidgetKind::Grid(settings),
            focusable: false,
            ..Self::default()
        }
    }

    pub fn with_geometry(mut self, geometry: Rect) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn grid_settings(&self) -> Option<&GridSettings> {
        match &self.kind {
            WidgetKind::Grid(settings) => Some(settings),
            WidgetKind::Leaf => None,
        }
    }
}

impl Default for Widget {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: WidgetKind::Leaf,
            parent: None,
            children: Vec::new(),
            geometry: Rect::default(),
            min_size: Vec2::ZERO,
            visible: true,
            focusable: true,
            queued_draw: true,
        }
    }
}

/// Arena of widgets. Insertion order of children is the placement and
/// navigation order.
#[derive(Debug, Default)]
pub struct WidgetTree {
    widgets: HashMap<WidgetId, Widget>,
    next_id: WidgetId,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a widget with no parent. Roots keep whatever geometry
    /// they were constructed with.
    pub fn insert_root(&mut self, widget: Widget) -> WidgetId {
        let id = self.next_id;
        self.next_id += 1;
        self.widgets.insert(id, widget);
        id
    }

    /// Insert a widget as the last child of `parent`.
    pub fn insert_child(&mut self, parent: WidgetId, mut widget: Widget) -> Result<WidgetId> {
        if let Some(existing) = widget.parent {
            return Err(GridError::AlreadyParented(existing));
        }

        let id = self.next_id;
        self.next_id += 1;
        widget.parent = Some(parent);

        self.widgets
            .get_mut(&parent)
            .ok_or(GridError::UnknownWidget(parent))?
            .children
            .push(id);
        self.widgets.insert(id, widget);
        Ok(id)
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(&id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(&id)
    }

    /// Like `get`, but a missing id is a precondition violation.
    pub fn widget(&self, id: WidgetId) -> Result<&Widget> {
        self.widgets.get(&id).ok_or(GridError::UnknownWidget(id))
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> Result<&mut Widget> {
        self.widgets
            .get_mut(&id)
            .ok_or(GridError::UnknownWidget(id))
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Detach `id` from its parent and drop it together with its
    /// subtree.
    pub fn remove(&mut self, id: WidgetId) -> Result<()> {
        let widget = self.widgets.remove(&id).ok_or(GridError::UnknownWidget(id))?;
        tracing::trace!("removed widget {} ({})", id, widget.name);

        if let Some(parent) = widget.parent {
            if let Some(parent_widget) = self.widgets.get_mut(&parent) {
                parent_widget.children.retain(|&child| child != id);
            }
        }

        for child in widget.children {
            // Children were parented to `id`, which is already gone.
            if let Some(child_widget) = self.widgets.get_mut(&child) {
                child_widget.parent = None;
                self.remove(child)?;
            }
        }
        Ok(())
    }

    /// Geometry composed with the ancestor chain. Placement already
    /// writes cursor positions in root space, so this is a checked read
    /// that fails fast on a dangling parent link.
    pub fn absolute_geometry(&self, id: WidgetId) -> Result<Rect> {
        let widget = self.widget(id)?;
        let mut ancestor = widget.parent;
        while let Some(current) = ancestor {
            ancestor = self.widget(current)?.parent;
        }
        Ok(widget.geometry)
    }

    /// Currently visible children of `id`, in insertion order.
    pub fn visible_children(&self, id: WidgetId) -> Result<Vec<WidgetId>> {
        let widget = self.widget(id)?;
        let mut visible = Vec::with_capacity(widget.children.len());
        for &child in &widget.children {
            if self.widget(child)?.visible {
                visible.push(child);
            }
        }
        Ok(visible)
    }

    /// Recursively collect the leaf widgets under `id`, descending into
    /// nested grids in order.
    pub fn composite_list(&self, id: WidgetId, out: &mut Vec<WidgetId>) -> Result<()> {
        for &child in &self.widget(id)?.children {
            match self.widget(child)?.kind {
                WidgetKind::Leaf => out.push(child),
                WidgetKind::Grid(_) => self.composite_list(child, out)?,
            }
        }
        Ok(())
    }
}
