// crates/gridkit-render/src/lib.rs

use glam::Vec2;
use gridkit_core::{GridError, Rect, WidgetId, WidgetKind, WidgetTree, WrapAxis};
use gridkit_layout::LayoutResult;
use tracing::trace;

pub mod events;
pub use events::*;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Layout error: {0}")]
    Layout(#[from] GridError),
    #[error("Render operation failed: {0}")]
    RenderFailed(String),
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// High-level rendering commands. Clip rectangles nest: every
/// `PushClip` is balanced by a `PopClip`.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    PushClip { rect: Rect },
    PopClip,
    DrawWidget { widget: WidgetId, rect: Rect },
}

/// Backend that consumes batches of render commands.
pub trait CommandRenderer {
    fn execute_commands(&mut self, commands: &[RenderCommand]) -> RenderResult<()>;
    fn viewport_size(&self) -> Vec2;
}

/// Test/debug backend that records every command it is handed.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub commands: Vec<RenderCommand>,
    viewport: Vec2,
}

impl RecordingRenderer {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            commands: Vec::new(),
            viewport,
        }
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawWidget { .. }))
            .count()
    }
}

impl CommandRenderer for RecordingRenderer {
    fn execute_commands(&mut self, commands: &[RenderCommand]) -> RenderResult<()> {
        self.commands.extend_from_slice(commands);
        Ok(())
    }

    fn viewport_size(&self) -> Vec2 {
        self.viewport
    }
}

/// Walks a placed grid in packing order and issues draw commands for
/// the cells intersecting the visible region.
pub struct GridRenderer<R: CommandRenderer> {
    backend: R,
}

impl<R: CommandRenderer> GridRenderer<R> {
    pub fn new(backend: R) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &R {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut R {
        &mut self.backend
    }

    /// Draw `container` against `visible_region`. A container whose
    /// draw flag is clear is skipped entirely unless `force_draw` is
    /// set; the flag is cleared once the traversal completes.
    pub fn process_draw(
        &mut self,
        tree: &mut WidgetTree,
        layout: &LayoutResult,
        container: WidgetId,
        visible_region: Rect,
        force_draw: bool,
    ) -> RenderResult<()> {
        {
            let widget = tree.widget(container)?;
            if !force_draw && !widget.queued_draw {
                return Ok(());
            }
        }

        let mut commands = Vec::new();
        emit_grid(tree, layout, container, visible_region, &mut commands)?;
        self.backend.execute_commands(&commands)?;
        Ok(())
    }
}

fn emit_grid(
    tree: &mut WidgetTree,
    layout: &LayoutResult,
    container: WidgetId,
    visible_region: Rect,
    commands: &mut Vec<RenderCommand>,
) -> RenderResult<()> {
    let placement = layout.placement(container)?;
    let (base, settings) = {
        let widget = tree.widget(container)?;
        let settings = widget
            .grid_settings()
            .cloned()
            .ok_or(GridError::NotAGrid(container))?;
        (widget.geometry, settings)
    };

    commands.push(RenderCommand::PushClip { rect: base });

    let cell = settings.cell_size;
    let outer = settings.outer_margin;
    let inner = settings.inner_margin;

    // Cells are laid out in strictly increasing packing order with no
    // interior gaps, so after the first visible cell the first miss
    // marks the end of the visible span.
    let mut seen_hit = false;

    for (index, &child_id) in placement.order.iter().enumerate() {
        let (row, col) = match settings.wrap_axis {
            WrapAxis::Horizontal => (
                index / placement.num_columns,
                index % placement.num_columns,
            ),
            WrapAxis::Vertical => (index % placement.num_rows, index / placement.num_rows),
        };

        // Cheap re-derivation from the grid shape; the child's stored
        // geometry is not consulted.
        let cell_rect = Rect::new(
            Vec2::new(
                base.origin.x + outer.horizontal + col as f32 * (cell.x + inner.horizontal),
                base.origin.y + outer.vertical + row as f32 * (cell.y + inner.vertical),
            ),
            cell,
        );

        let overlap = match cell_rect.intersect(&visible_region) {
            Some(overlap) => overlap,
            None => {
                if seen_hit {
                    trace!(
                        "grid {}: early exit at cell {} of {}",
                        container,
                        index,
                        placement.order.len()
                    );
                    break;
                }
                continue;
            }
        };
        seen_hit = true;

        commands.push(RenderCommand::PushClip { rect: cell_rect });
        match tree.widget(child_id)?.kind {
            WidgetKind::Leaf => commands.push(RenderCommand::DrawWidget {
                widget: child_id,
                rect: cell_rect,
            }),
            WidgetKind::Grid(_) => emit_grid(tree, layout, child_id, overlap, commands)?,
        }
        commands.push(RenderCommand::PopClip);
    }

    commands.push(RenderCommand::PopClip);
    tree.widget_mut(container)?.queued_draw = false;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridkit_core::{GridSettings, Margins, Widget};
    use gridkit_layout::compute_layout;

    fn settings_3col() -> GridSettings {
        GridSettings {
            cell_size: Vec2::new(64.0, 64.0),
            outer_margin: Margins::uniform(4.0),
            inner_margin: Margins::uniform(4.0),
            ..GridSettings::default()
        }
    }

    fn placed_grid(tile_count: usize) -> (WidgetTree, WidgetId, Vec<WidgetId>, LayoutResult) {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(
            Widget::grid("grid", settings_3col())
                .with_geometry(Rect::from_xywh(0.0, 0.0, 220.0, 300.0)),
        );
        let tiles: Vec<WidgetId> = (0..tile_count)
            .map(|i| tree.insert_child(root, Widget::leaf(format!("tile{i}"))).unwrap())
            .collect();
        let layout = compute_layout(&mut tree, root).unwrap();
        (tree, root, tiles, layout)
    }

    #[test]
    fn test_clip_nesting_and_draw_order() {
        let (mut tree, root, tiles, layout) = placed_grid(7);
        let mut renderer = GridRenderer::new(RecordingRenderer::new(Vec2::new(220.0, 300.0)));
        let region = Rect::from_xywh(0.0, 0.0, 220.0, 300.0);

        renderer
            .process_draw(&mut tree, &layout, root, region, false)
            .unwrap();

        let commands = &renderer.backend().commands;
        // Container clip, then clip/draw/unclip per visible cell.
        assert_eq!(
            commands[0],
            RenderCommand::PushClip {
                rect: Rect::from_xywh(0.0, 0.0, 220.0, 300.0)
            }
        );
        assert_eq!(*commands.last().unwrap(), RenderCommand::PopClip);

        let pushes = commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::PushClip { .. }))
            .count();
        let pops = commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::PopClip))
            .count();
        assert_eq!(pushes, 8);
        assert_eq!(pops, 8);
        assert_eq!(renderer.backend().draw_count(), 7);

        // First cell draws in row-major order.
        assert_eq!(
            commands[2],
            RenderCommand::DrawWidget {
                widget: tiles[0],
                rect: Rect::from_xywh(4.0, 4.0, 64.0, 64.0)
            }
        );
    }

    #[test]
    fn test_cell_rect_is_rederived_not_read() {
        let (mut tree, root, tiles, layout) = placed_grid(4);
        // Corrupt a stored geometry after placement; the draw pass must
        // not pick it up.
        tree.widget_mut(tiles[3]).unwrap().geometry = Rect::from_xywh(999.0, 999.0, 1.0, 1.0);

        let mut renderer = GridRenderer::new(RecordingRenderer::new(Vec2::new(220.0, 300.0)));
        let region = Rect::from_xywh(0.0, 0.0, 220.0, 300.0);
        renderer
            .process_draw(&mut tree, &layout, root, region, false)
            .unwrap();

        let expected = Rect::from_xywh(4.0, 72.0, 64.0, 64.0);
        assert!(renderer.backend().commands.contains(&RenderCommand::DrawWidget {
            widget: tiles[3],
            rect: expected
        }));
    }

    #[test]
    fn test_early_exit_past_last_visible_row() {
        let (mut tree, root, _, layout) = placed_grid(9);
        let mut renderer = GridRenderer::new(RecordingRenderer::new(Vec2::new(220.0, 300.0)));

        // Only the first row fits the region; the scan stops at the
        // first miss after a hit.
        let region = Rect::from_xywh(0.0, 0.0, 220.0, 70.0);
        renderer
            .process_draw(&mut tree, &layout, root, region, false)
            .unwrap();
        assert_eq!(renderer.backend().draw_count(), 3);
    }

    #[test]
    fn test_scrolled_region_skips_leading_rows() {
        let (mut tree, root, tiles, layout) = placed_grid(9);
        let mut renderer = GridRenderer::new(RecordingRenderer::new(Vec2::new(220.0, 300.0)));

        // Region covering only the second row: the first row misses
        // before any hit, so the scan keeps going until it lands.
        let region = Rect::from_xywh(0.0, 72.0, 220.0, 64.0);
        renderer
            .process_draw(&mut tree, &layout, root, region, false)
            .unwrap();

        assert_eq!(renderer.backend().draw_count(), 3);
        let drawn: Vec<WidgetId> = renderer
            .backend()
            .commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawWidget { widget, .. } => Some(*widget),
                _ => None,
            })
            .collect();
        assert_eq!(drawn, vec![tiles[3], tiles[4], tiles[5]]);
    }

    #[test]
    fn test_queued_draw_cleared_and_skipped() {
        let (mut tree, root, _, layout) = placed_grid(4);
        let mut renderer = GridRenderer::new(RecordingRenderer::new(Vec2::new(220.0, 300.0)));
        let region = Rect::from_xywh(0.0, 0.0, 220.0, 300.0);

        renderer
            .process_draw(&mut tree, &layout, root, region, false)
            .unwrap();
        assert!(!tree.widget(root).unwrap().queued_draw);
        let first_len = renderer.backend().commands.len();

        // Nothing queued: the second pass is a no-op...
        renderer
            .process_draw(&mut tree, &layout, root, region, false)
            .unwrap();
        assert_eq!(renderer.backend().commands.len(), first_len);

        // ...unless the draw is forced.
        renderer
            .process_draw(&mut tree, &layout, root, region, true)
            .unwrap();
        assert!(renderer.backend().commands.len() > first_len);
    }

    #[test]
    fn test_nested_grid_recursion_clips() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(
            Widget::grid("outer", settings_3col())
                .with_geometry(Rect::from_xywh(0.0, 0.0, 220.0, 300.0)),
        );
        let inner = tree
            .insert_child(
                root,
                Widget::grid(
                    "inner",
                    GridSettings {
                        cell_size: Vec2::new(16.0, 16.0),
                        ..GridSettings::default()
                    },
                ),
            )
            .unwrap();
        let nested = tree.insert_child(inner, Widget::leaf("nested")).unwrap();
        let layout = compute_layout(&mut tree, root).unwrap();

        let mut renderer = GridRenderer::new(RecordingRenderer::new(Vec2::new(220.0, 300.0)));
        let region = Rect::from_xywh(0.0, 0.0, 220.0, 300.0);
        renderer
            .process_draw(&mut tree, &layout, root, region, false)
            .unwrap();

        let commands = &renderer.backend().commands;
        assert!(commands.iter().any(|c| matches!(
            c,
            RenderCommand::DrawWidget { widget, .. } if *widget == nested
        )));
        // outer container + outer cell + inner container + inner cell.
        let pushes = commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::PushClip { .. }))
            .count();
        assert_eq!(pushes, 4);
        assert!(!tree.widget(inner).unwrap().queued_draw);
    }

    #[test]
    fn test_draw_without_placement_fails() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(
            Widget::grid("grid", settings_3col())
                .with_geometry(Rect::from_xywh(0.0, 0.0, 220.0, 300.0)),
        );
        let _tile = tree.insert_child(root, Widget::leaf("tile")).unwrap();

        let mut renderer = GridRenderer::new(RecordingRenderer::new(Vec2::new(220.0, 300.0)));
        let region = Rect::from_xywh(0.0, 0.0, 220.0, 300.0);
        let result = renderer.process_draw(&mut tree, &LayoutResult::default(), root, region, false);
        assert!(matches!(
            result,
            Err(RenderError::Layout(GridError::MissingPlacement(id))) if id == root
        ));
    }
}
