use crate::grid::{GridConfig, GridPosition};

/// The default margin around the grid, in canvas units.
pub const DEFAULT_MARGIN: f64 = 0.5;

/// Physical canvas dimensions, in whatever unit the output format uses
/// (inches, points, pixels).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An absolute rectangle on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Project a grid position onto a canvas.
///
/// The margin is applied on all four sides; cells divide the remaining area
/// evenly. Purely arithmetic, no rounding, so adjacent positions share edges
/// exactly.
pub fn project(
    position: &GridPosition,
    grid: &GridConfig,
    canvas: &CanvasSize,
    margin: f64,
) -> Rect {
    let cell_width = (canvas.width - 2.0 * margin) / f64::from(grid.cols);
    let cell_height = (canvas.height - 2.0 * margin) / f64::from(grid.rows);
    let span_cols = f64::from(position.col_end.saturating_sub(position.col_start)) + 1.0;
    let span_rows = f64::from(position.row_end.saturating_sub(position.row_start)) + 1.0;
    Rect {
        x: margin + f64::from(position.col_start - 1) * cell_width,
        y: margin + f64::from(position.row_start - 1) * cell_height,
        width: span_cols * cell_width,
        height: span_rows * cell_height,
    }
}
