use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use tracing::info;

use gridkit_core::{GridSettings, Margins, Rect, Widget, WidgetTree, WrapAxis};
use gridkit_render::{InputEvent, KeyCode, KeyModifiers, RecordingRenderer, RenderCommand};
use gridkit_runtime::GridApp;

#[derive(Parser)]
#[command(name = "gridkit-demo")]
#[command(about = "Build a tile grid, run placement and replay keyboard navigation")]
struct Args {
    /// Number of tiles in the grid
    #[arg(long, default_value_t = 11)]
    tiles: usize,

    /// Container width in pixels
    #[arg(long, default_value_t = 288.0)]
    width: f32,

    /// Container height in pixels
    #[arg(long, default_value_t = 300.0)]
    height: f32,

    /// Cell edge length in pixels
    #[arg(long, default_value_t = 64.0)]
    cell: f32,

    /// Outer and inner margin in pixels
    #[arg(long, default_value_t = 4.0)]
    margin: f32,

    /// Pack top-to-bottom instead of left-to-right
    #[arg(long)]
    vertical: bool,

    /// Let cells overhang the container edge instead of wrapping early
    #[arg(long)]
    partial_visibility: bool,

    /// Resize the container to exactly fit the packed content
    #[arg(long)]
    match_content: bool,

    /// Navigation script: one letter per key press (L, R, U, D, T)
    #[arg(long, default_value = "")]
    keys: String,

    /// Dump the recorded render commands
    #[arg(long)]
    show_commands: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let settings = GridSettings {
        cell_size: Vec2::new(args.cell, args.cell),
        outer_margin: Margins::uniform(args.margin),
        inner_margin: Margins::uniform(args.margin),
        partial_visibility: args.partial_visibility,
        match_content: args.match_content,
        wrap_axis: if args.vertical {
            WrapAxis::Vertical
        } else {
            WrapAxis::Horizontal
        },
        ..GridSettings::default()
    };

    let mut tree = WidgetTree::new();
    let root = tree.insert_root(
        Widget::grid("demo-grid", settings)
            .with_geometry(Rect::from_xywh(0.0, 0.0, args.width, args.height)),
    );
    let tiles: Vec<_> = (0..args.tiles)
        .map(|i| tree.insert_child(root, Widget::leaf(format!("tile{i}"))))
        .collect::<gridkit_core::Result<_>>()?;

    let viewport = Vec2::new(args.width, args.height);
    let mut app = GridApp::new(tree, root, RecordingRenderer::new(viewport))?;

    let placement = app.layout().placement(root)?;
    info!(
        "placed {} tiles as {} columns x {} rows, compliance {:?}",
        args.tiles, placement.num_columns, placement.num_rows, placement.compliance
    );

    if let Some(&first) = tiles.first() {
        app.set_focus(first);
        app.update()?;
    }

    for letter in args.keys.chars() {
        let key = match letter.to_ascii_uppercase() {
            'L' => KeyCode::ArrowLeft,
            'R' => KeyCode::ArrowRight,
            'U' => KeyCode::ArrowUp,
            'D' => KeyCode::ArrowDown,
            'T' => KeyCode::Tab,
            other => anyhow::bail!("Unknown key '{}' in --keys (use L/R/U/D/T)", other),
        };
        app.handle_input(InputEvent::KeyPress {
            key,
            modifiers: KeyModifiers::none(),
        });
        app.update()?;

        let name = app
            .focused()
            .and_then(|id| app.tree().get(id).map(|w| w.name.clone()))
            .unwrap_or_else(|| "none".into());
        info!("{}: focus on {}", letter, name);
    }

    let region = app.full_region();
    app.render(region, false)?;
    info!(
        "rendered {} widgets into {} commands",
        app.backend().draw_count(),
        app.backend().commands.len()
    );

    if args.show_commands {
        for command in &app.backend().commands {
            match command {
                RenderCommand::PushClip { rect } => println!(
                    "push clip ({}, {}) {}x{}",
                    rect.origin.x, rect.origin.y, rect.size.x, rect.size.y
                ),
                RenderCommand::PopClip => println!("pop clip"),
                RenderCommand::DrawWidget { widget, rect } => println!(
                    "draw #{widget} at ({}, {}) {}x{}",
                    rect.origin.x, rect.origin.y, rect.size.x, rect.size.y
                ),
            }
        }
    }

    Ok(())
}
