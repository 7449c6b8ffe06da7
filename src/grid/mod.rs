pub mod map;

use crate::markdown::elements::ElementKind;
use std::fmt::{self, Display};

/// A rectangular region in a slide grid.
///
/// Coordinates are 1-indexed and inclusive on both ends: `[1-12, 1-9]` covers
/// every cell of a 12x9 grid. A position is only meaningful relative to a
/// [GridConfig] and must be validated against it before use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridPosition {
    pub col_start: u16,
    pub col_end: u16,
    pub row_start: u16,
    pub row_end: u16,
}

impl GridPosition {
    pub fn new(col_start: u16, col_end: u16, row_start: u16, row_end: u16) -> Self {
        Self { col_start, col_end, row_start, row_end }
    }

    /// The number of cells this region covers.
    pub fn area(&self) -> u32 {
        let cols = u32::from(self.col_end.saturating_sub(self.col_start)) + 1;
        let rows = u32::from(self.row_end.saturating_sub(self.row_start)) + 1;
        cols * rows
    }

    /// Check this position against a grid's bounds.
    ///
    /// This is the single validation routine used both when an annotation is
    /// extracted from text and when an explicitly positioned element reaches
    /// the placement engine, so the same input always produces the same
    /// error regardless of which path hits it first.
    pub fn validate(&self, grid: &GridConfig) -> Result<(), GridError> {
        use GridErrorKind::*;
        let kind = if self.col_start < 1 || self.col_start > grid.cols {
            ColumnStartOutOfRange { start: self.col_start, cols: grid.cols }
        } else if self.col_end < 1 || self.col_end > grid.cols {
            ColumnEndOutOfRange { end: self.col_end, cols: grid.cols }
        } else if self.row_start < 1 || self.row_start > grid.rows {
            RowStartOutOfRange { start: self.row_start, rows: grid.rows }
        } else if self.row_end < 1 || self.row_end > grid.rows {
            RowEndOutOfRange { end: self.row_end, rows: grid.rows }
        } else if self.col_start > self.col_end {
            ColumnRangeInverted { start: self.col_start, end: self.col_end }
        } else if self.row_start > self.row_end {
            RowRangeInverted { start: self.row_start, end: self.row_end }
        } else {
            return Ok(());
        };
        Err(GridError::new(kind, Some(*self)))
    }
}

impl Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}, {}-{}]", self.col_start, self.col_end, self.row_start, self.row_end)
    }
}

/// The dimensions of a slide grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConfig {
    pub cols: u16,
    pub rows: u16,
}

impl GridConfig {
    /// Parse a `"<cols>x<rows>"` grid size string, e.g. `"12x9"`.
    ///
    /// The separator is case insensitive and may be surrounded by
    /// whitespace. Malformed input falls back to the default grid rather
    /// than failing.
    pub fn parse(input: &str) -> Self {
        match Self::parse_strict(input) {
            Some(config) => config,
            None => {
                log::debug!("malformed grid size {input:?}, falling back to {}", Self::default());
                Self::default()
            }
        }
    }

    fn parse_strict(input: &str) -> Option<Self> {
        let (cols, rows) = input.trim().split_once(['x', 'X'])?;
        let cols = cols.trim().parse().ok()?;
        let rows = rows.trim().parse().ok()?;
        if cols == 0 || rows == 0 {
            return None;
        }
        Some(Self { cols, rows })
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { cols: 12, rows: 9 }
    }
}

impl Display for GridConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

/// An invalid or unsatisfiable grid position.
///
/// This is the only error intrinsic to the layout core. It is synchronous and
/// fatal to the slide or element being processed; whether to skip the slide or
/// abort the document is the caller's call.
#[derive(thiserror::Error, Debug)]
pub struct GridError {
    pub kind: GridErrorKind,
    pub position: Option<GridPosition>,
    pub suggestion: String,
}

impl GridError {
    pub(crate) fn new(kind: GridErrorKind, position: Option<GridPosition>) -> Self {
        let suggestion = kind.suggestion();
        Self { kind, position, suggestion }
    }

    pub(crate) fn unplaceable(kind: ElementKind, slide: Option<usize>) -> Self {
        Self::new(GridErrorKind::Unplaceable { kind, slide }, None)
    }

    pub(crate) fn alias_cycle(name: &str) -> Self {
        Self::new(GridErrorKind::AliasCycle { name: name.into() }, None)
    }
}

impl Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grid error")?;
        if let Some(position) = &self.position {
            write!(f, " at {position}")?;
        }
        write!(f, ": {}; suggestion: {}", self.kind, self.suggestion)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum GridErrorKind {
    ColumnStartOutOfRange { start: u16, cols: u16 },
    ColumnEndOutOfRange { end: u16, cols: u16 },
    RowStartOutOfRange { start: u16, rows: u16 },
    RowEndOutOfRange { end: u16, rows: u16 },
    ColumnRangeInverted { start: u16, end: u16 },
    RowRangeInverted { start: u16, end: u16 },
    Unplaceable { kind: ElementKind, slide: Option<usize> },
    AliasCycle { name: String },
}

impl GridErrorKind {
    fn suggestion(&self) -> String {
        use GridErrorKind::*;
        match self {
            ColumnStartOutOfRange { cols, .. } | ColumnEndOutOfRange { cols, .. } => {
                format!("use column numbers between 1 and {cols}")
            }
            RowStartOutOfRange { rows, .. } | RowEndOutOfRange { rows, .. } => {
                format!("use row numbers between 1 and {rows}")
            }
            ColumnRangeInverted { .. } => "column start should not be greater than column end".into(),
            RowRangeInverted { .. } => "row start should not be greater than row end".into(),
            Unplaceable { .. } => "try reducing the number of elements or increasing the grid size".into(),
            AliasCycle { .. } => "remove the circular reference from the alias table".into(),
        }
    }
}

impl Display for GridErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use GridErrorKind::*;
        match self {
            ColumnStartOutOfRange { start, cols } => write!(f, "column start {start} is outside the grid (1-{cols})"),
            ColumnEndOutOfRange { end, cols } => write!(f, "column end {end} is outside the grid (1-{cols})"),
            RowStartOutOfRange { start, rows } => write!(f, "row start {start} is outside the grid (1-{rows})"),
            RowEndOutOfRange { end, rows } => write!(f, "row end {end} is outside the grid (1-{rows})"),
            ColumnRangeInverted { start, end } => {
                write!(f, "column start {start} is greater than column end {end}")
            }
            RowRangeInverted { start, end } => write!(f, "row start {start} is greater than row end {end}"),
            Unplaceable { kind, slide } => {
                write!(f, "cannot place element of type {kind} on the grid")?;
                if let Some(slide) = slide {
                    write!(f, " (slide {slide})")?;
                }
                Ok(())
            }
            AliasCycle { name } => write!(f, "alias '{name}' resolves back to itself"),
        }
    }
}
