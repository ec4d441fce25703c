// crates/gridkit-core/src/grid.rs
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Margins;

/// Axis along which consecutive cells are packed before wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapAxis {
    /// Row-major: fill left to right, wrap to a new row.
    Horizontal,
    /// Column-major: fill top to bottom, wrap to a new column.
    Vertical,
}

/// Configuration of a grid container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    /// Size applied to every cell.
    pub cell_size: Vec2,
    /// Spacing between the container border and the outermost cells.
    pub outer_margin: Margins,
    /// Spacing between adjacent cells.
    pub inner_margin: Margins,
    /// When false, a cell that would overflow the container extent is
    /// pushed to the next row/column instead of being clipped.
    pub partial_visibility: bool,
    /// Overwrite each child's minimum size with `cell_size` during
    /// placement.
    pub force_children_size: bool,
    /// Resize the container on the cross axis to exactly fit the packed
    /// content, even when the stretch factor is non-zero.
    pub match_content: bool,
    pub wrap_axis: WrapAxis,
    /// Zero means the container's cross-axis size is content-driven.
    pub stretch_factor: u32,
}

impl GridSettings {
    pub fn horizontal() -> Self {
        Self {
            wrap_axis: WrapAxis::Horizontal,
            ..Self::default()
        }
    }

    pub fn vertical() -> Self {
        Self {
            wrap_axis: WrapAxis::Vertical,
            ..Self::default()
        }
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            cell_size: Vec2::new(64.0, 64.0),
            outer_margin: Margins::default(),
            inner_margin: Margins::default(),
            partial_visibility: false,
            force_children_size: true,
            match_content: false,
            wrap_axis: WrapAxis::Horizontal,
            stretch_factor: 1,
        }
    }
}
