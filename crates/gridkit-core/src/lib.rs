// crates/gridkit-core/src/lib.rs
pub mod geometry;
pub mod grid;
pub mod widgets;

pub use geometry::*;
pub use grid::*;
pub use widgets::*;

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Unknown widget id: {0}")]
    UnknownWidget(WidgetId),

    #[error("Widget {0} is not a grid container")]
    NotAGrid(WidgetId),

    #[error("No placement has been computed for container {0}")]
    MissingPlacement(WidgetId),

    #[error("Widget is already parented to {0}")]
    AlreadyParented(WidgetId),
}

pub type Result<T> = std::result::Result<T, GridError>;
