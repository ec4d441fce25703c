// crates/gridkit-runtime/src/lib.rs

use glam::Vec2;
use gridkit_core::{Rect, WidgetId, WidgetTree};
use gridkit_layout::{compute_layout, LayoutResult, SizeCompliance};
use gridkit_render::{CommandRenderer, GridRenderer, InputEvent, KeyCode};

pub mod event_system;
pub mod navigation;

pub use event_system::*;
pub use navigation::*;

/// Owns a widget tree and threads each placement pass into the render
/// and focus-navigation engines.
pub struct GridApp<R: CommandRenderer> {
    tree: WidgetTree,
    root: WidgetId,

    layout: LayoutResult,
    renderer: GridRenderer<R>,
    event_system: EventSystem,

    focused: Option<WidgetId>,
    needs_layout: bool,
    needs_render: bool,
}

impl<R: CommandRenderer> GridApp<R> {
    pub fn new(tree: WidgetTree, root: WidgetId, backend: R) -> anyhow::Result<Self> {
        if !tree.widget(root)?.kind.is_grid() {
            anyhow::bail!("root widget {} is not a grid container", root);
        }

        let mut app = Self {
            tree,
            root,
            layout: LayoutResult::default(),
            renderer: GridRenderer::new(backend),
            event_system: EventSystem::new(),
            focused: None,
            needs_layout: true,
            needs_render: true,
        };
        app.update_layout()?;
        Ok(app)
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    /// Mutable tree access invalidates the current placement: the next
    /// update or render re-runs the pass before anything reads the
    /// derived counts.
    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        self.needs_layout = true;
        self.needs_render = true;
        &mut self.tree
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    pub fn focused(&self) -> Option<WidgetId> {
        self.focused
    }

    pub fn set_focus(&mut self, id: WidgetId) {
        self.event_system.queue_event(UIEvent::FocusWidget(id));
    }

    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    pub fn backend(&self) -> &R {
        self.renderer.backend()
    }

    pub fn backend_mut(&mut self) -> &mut R {
        self.renderer.backend_mut()
    }

    /// Re-run placement over the whole tree and queue a redraw for
    /// every grid it touched.
    pub fn update_layout(&mut self) -> anyhow::Result<SizeCompliance> {
        let layout = compute_layout(&mut self.tree, self.root)?;
        for &grid in layout.grids.keys() {
            if let Some(widget) = self.tree.get_mut(grid) {
                widget.queued_draw = true;
            }
        }
        let compliance = layout.placement(self.root)?.compliance;
        tracing::debug!("layout pass complete, root compliance {:?}", compliance);

        self.layout = layout;
        self.needs_layout = false;
        self.needs_render = true;
        Ok(compliance)
    }

    /// Map raw input to focus events. Unrecognized input is ignored.
    pub fn handle_input(&mut self, event: InputEvent) {
        if let InputEvent::KeyPress { key, modifiers } = event {
            match key {
                KeyCode::ArrowLeft => self
                    .event_system
                    .queue_event(UIEvent::FocusDirection(Direction::Left)),
                KeyCode::ArrowRight => self
                    .event_system
                    .queue_event(UIEvent::FocusDirection(Direction::Right)),
                KeyCode::ArrowUp => self
                    .event_system
                    .queue_event(UIEvent::FocusDirection(Direction::Up)),
                KeyCode::ArrowDown => self
                    .event_system
                    .queue_event(UIEvent::FocusDirection(Direction::Down)),
                KeyCode::Tab if modifiers.shift => {
                    self.event_system.queue_event(UIEvent::TabPrevious)
                }
                KeyCode::Tab => self.event_system.queue_event(UIEvent::TabNext),
                _ => {}
            }
        }
    }

    /// Drain pending focus events. Placement re-runs first when the
    /// tree changed, so navigation never reads stale counts.
    pub fn update(&mut self) -> anyhow::Result<()> {
        if self.needs_layout {
            self.update_layout()?;
        }
        self.event_system
            .update(&self.tree, &self.layout, self.root, &mut self.focused)?;
        Ok(())
    }

    pub fn render(&mut self, visible_region: Rect, force_draw: bool) -> anyhow::Result<()> {
        if self.needs_layout {
            self.update_layout()?;
        }
        self.renderer
            .process_draw(&mut self.tree, &self.layout, self.root, visible_region, force_draw)?;
        self.needs_render = false;
        Ok(())
    }

    /// Viewport-sized visible region, for callers that do not scroll.
    pub fn full_region(&self) -> Rect {
        Rect::new(Vec2::ZERO, self.renderer.backend().viewport_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridkit_core::{GridSettings, Margins, Widget};
    use gridkit_render::{KeyModifiers, RecordingRenderer};

    fn settings_3col() -> GridSettings {
        GridSettings {
            cell_size: Vec2::new(64.0, 64.0),
            outer_margin: Margins::uniform(4.0),
            inner_margin: Margins::uniform(4.0),
            ..GridSettings::default()
        }
    }

    fn app_with_tiles(tile_count: usize) -> (GridApp<RecordingRenderer>, Vec<WidgetId>) {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(
            Widget::grid("grid", settings_3col())
                .with_geometry(Rect::from_xywh(0.0, 0.0, 220.0, 300.0)),
        );
        let tiles: Vec<WidgetId> = (0..tile_count)
            .map(|i| tree.insert_child(root, Widget::leaf(format!("tile{i}"))).unwrap())
            .collect();
        let app = GridApp::new(tree, root, RecordingRenderer::new(Vec2::new(220.0, 300.0))).unwrap();
        (app, tiles)
    }

    fn press(app: &mut GridApp<RecordingRenderer>, key: KeyCode) {
        app.handle_input(InputEvent::KeyPress {
            key,
            modifiers: KeyModifiers::none(),
        });
        app.update().unwrap();
    }

    #[test]
    fn test_arrow_keys_move_focus() {
        let (mut app, tiles) = app_with_tiles(9);
        app.set_focus(tiles[0]);
        app.update().unwrap();
        assert_eq!(app.focused(), Some(tiles[0]));

        press(&mut app, KeyCode::ArrowRight);
        assert_eq!(app.focused(), Some(tiles[1]));
        press(&mut app, KeyCode::ArrowDown);
        assert_eq!(app.focused(), Some(tiles[4]));
        press(&mut app, KeyCode::ArrowLeft);
        assert_eq!(app.focused(), Some(tiles[3]));
        press(&mut app, KeyCode::ArrowUp);
        assert_eq!(app.focused(), Some(tiles[0]));
    }

    #[test]
    fn test_focus_stays_at_root_edge() {
        let (mut app, tiles) = app_with_tiles(9);
        app.set_focus(tiles[0]);
        app.update().unwrap();

        press(&mut app, KeyCode::ArrowLeft);
        assert_eq!(app.focused(), Some(tiles[0]));
        press(&mut app, KeyCode::ArrowUp);
        assert_eq!(app.focused(), Some(tiles[0]));
    }

    #[test]
    fn test_tab_traversal() {
        let (mut app, tiles) = app_with_tiles(9);
        app.set_focus(tiles[0]);
        app.update().unwrap();

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused(), Some(tiles[1]));

        app.handle_input(InputEvent::KeyPress {
            key: KeyCode::Tab,
            modifiers: KeyModifiers::shift(),
        });
        app.update().unwrap();
        assert_eq!(app.focused(), Some(tiles[0]));
    }

    #[test]
    fn test_tree_mutation_invalidates_layout() {
        let (mut app, tiles) = app_with_tiles(7);
        assert_eq!(app.layout().placement(app.root()).unwrap().num_rows, 3);

        // Hiding a child goes through tree_mut, which marks the layout
        // stale; the next update recomputes before navigating.
        app.tree_mut().widget_mut(tiles[6]).unwrap().visible = false;
        app.update().unwrap();
        assert_eq!(app.layout().placement(app.root()).unwrap().num_rows, 2);
    }

    #[test]
    fn test_render_after_layout() {
        let (mut app, _) = app_with_tiles(4);
        let region = app.full_region();
        app.render(region, false).unwrap();
        assert!(!app.needs_render());
        assert_eq!(app.backend().draw_count(), 4);
    }

    #[test]
    fn test_escalation_bubbles_to_outer_grid() {
        // Outer 1x2 grid of nested 3-column grids; Right at the inner
        // edge re-navigates in the outer grid and descends into the
        // next inner grid.
        let mut tree = WidgetTree::new();
        let outer_settings = GridSettings {
            cell_size: Vec2::new(220.0, 300.0),
            ..GridSettings::default()
        };
        let outer = tree.insert_root(
            Widget::grid("outer", outer_settings)
                .with_geometry(Rect::from_xywh(0.0, 0.0, 460.0, 320.0)),
        );
        let left_grid = tree
            .insert_child(outer, Widget::grid("left", settings_3col()).with_focusable(true))
            .unwrap();
        let right_grid = tree
            .insert_child(outer, Widget::grid("right", settings_3col()).with_focusable(true))
            .unwrap();
        let left_tiles: Vec<WidgetId> = (0..3)
            .map(|i| tree.insert_child(left_grid, Widget::leaf(format!("l{i}"))).unwrap())
            .collect();
        let right_tiles: Vec<WidgetId> = (0..3)
            .map(|i| tree.insert_child(right_grid, Widget::leaf(format!("r{i}"))).unwrap())
            .collect();

        let mut app = GridApp::new(tree, outer, RecordingRenderer::new(Vec2::new(460.0, 320.0))).unwrap();
        app.set_focus(left_tiles[2]);
        app.update().unwrap();

        press(&mut app, KeyCode::ArrowRight);
        assert_eq!(app.focused(), Some(right_tiles[0]));

        // And back across the boundary.
        press(&mut app, KeyCode::ArrowLeft);
        assert_eq!(app.focused(), Some(left_tiles[2]));
    }
}
