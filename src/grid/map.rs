use crate::{
    grid::{GridConfig, GridPosition},
    markdown::elements::PlacedElement,
};

/// A single cell in a [GridMap].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub occupied: bool,
    pub owner: Option<usize>,
}

/// The occupancy map for one slide's grid.
///
/// Cells are stored in a flat row-major vector. A map is created empty per
/// slide layout call, mutated while elements are placed, and discarded once
/// the draw order is resolved; it is never shared across layout calls.
#[derive(Clone, Debug)]
pub struct GridMap {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl GridMap {
    pub fn new(cols: u16, rows: u16) -> Self {
        let cells = vec![Cell::default(); usize::from(cols) * usize::from(rows)];
        Self { cols, rows, cells }
    }

    /// Rebuild a map from already placed elements, in their draw order.
    ///
    /// This is the read-only diagnostic copy handed back to callers that want
    /// to inspect or preview a layout.
    pub fn from_placed(elements: &[PlacedElement], grid: &GridConfig) -> Self {
        let mut map = Self::new(grid.cols, grid.rows);
        for (index, element) in elements.iter().enumerate() {
            map.place(&element.position, index);
        }
        map
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Look up a cell by 1-indexed row and column.
    pub fn cell(&self, row: u16, col: u16) -> Option<&Cell> {
        if row < 1 || row > self.rows || col < 1 || col > self.cols {
            return None;
        }
        Some(&self.cells[self.index(row, col)])
    }

    /// Whether every cell in the rectangle is free and within bounds.
    pub fn is_area_available(&self, position: &GridPosition) -> bool {
        if position.col_start < 1
            || position.row_start < 1
            || position.col_end > self.cols
            || position.row_end > self.rows
        {
            return false;
        }
        for row in position.row_start..=position.row_end {
            for col in position.col_start..=position.col_end {
                if self.cells[self.index(row, col)].occupied {
                    return false;
                }
            }
        }
        true
    }

    /// Mark every cell in the rectangle as owned by `owner`.
    ///
    /// Cells outside the map are silently clipped: positions reaching this
    /// point have already been validated, and the overlap-permitting explicit
    /// placement path writes without an availability check.
    pub fn place(&mut self, position: &GridPosition, owner: usize) {
        for row in position.row_start.max(1)..=position.row_end.min(self.rows) {
            for col in position.col_start.max(1)..=position.col_end.min(self.cols) {
                let index = self.index(row, col);
                self.cells[index] = Cell { occupied: true, owner: Some(owner) };
            }
        }
    }

    fn index(&self, row: u16, col: u16) -> usize {
        usize::from(row - 1) * usize::from(self.cols) + usize::from(col - 1)
    }
}
