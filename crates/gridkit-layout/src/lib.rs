// crates/gridkit-layout/src/lib.rs

use gridkit_core::WidgetId;
use std::collections::HashMap;

pub mod placement;

pub use placement::compute_layout;

bitflags::bitflags! {
    /// Relationship between a container's size before and after a
    /// placement pass. The packing axis is never autosized, so it is
    /// always reported compliant; the cross axis reports whether the
    /// container grew or shrank to fit its content.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SizeCompliance: u8 {
        const COMPLIANT_WIDTH  = 1 << 0;
        const COMPLIANT_HEIGHT = 1 << 1;
        const LARGER_WIDTH     = 1 << 2;
        const SMALLER_WIDTH    = 1 << 3;
        const LARGER_HEIGHT    = 1 << 4;
        const SMALLER_HEIGHT   = 1 << 5;
    }
}

impl SizeCompliance {
    pub fn compliant() -> Self {
        SizeCompliance::COMPLIANT_WIDTH | SizeCompliance::COMPLIANT_HEIGHT
    }
}

/// Per-container output of a placement pass.
#[derive(Debug, Clone)]
pub struct GridPlacement {
    /// Visible children in scan order. For child `i`, the assigned row
    /// is `i / num_columns` and the column `i % num_columns` (row-major
    /// grids; transposed for column-major ones).
    pub order: Vec<WidgetId>,
    /// The focusable subset of `order`, in order. Navigation indexes
    /// into this instead of rescanning the child list.
    pub focus_order: Vec<WidgetId>,
    pub num_rows: usize,
    pub num_columns: usize,
    pub compliance: SizeCompliance,
}

impl GridPlacement {
    /// Rank of `id` among the focusable children, if it has one.
    pub fn focus_position(&self, id: WidgetId) -> Option<usize> {
        self.focus_order.iter().position(|&widget| widget == id)
    }
}

/// Result of a layout pass over a container tree: one placement per
/// grid reached from the root. Render and navigation consume this
/// instead of reading derived state back off the containers.
#[derive(Debug, Clone, Default)]
pub struct LayoutResult {
    pub grids: HashMap<WidgetId, GridPlacement>,
}

impl LayoutResult {
    pub fn placement(&self, container: WidgetId) -> gridkit_core::Result<&GridPlacement> {
        self.grids
            .get(&container)
            .ok_or(gridkit_core::GridError::MissingPlacement(container))
    }
}
