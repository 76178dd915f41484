//! Firmware keymaps from a routed keyboard: a QMK C fragment and a VIA
//! definition.

pub mod error;
mod qmk;
mod via;

pub use error::KeymapError;
pub use qmk::NO_KEY;
pub use via::{substitute_layout, ViaDefinition, ViaLayouts, ViaMatrix, VENDOR_ID};

use keywire_core::Mainboard;
use keywire_route::RouteResult;

/// One cell of the matrix: the key wired there and its code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub key: usize,
    pub id: String,
    pub code: Option<String>,
}

impl Cell {
    #[must_use]
    pub fn new(key: usize, id: impl Into<String>, code: Option<String>) -> Self {
        Self {
            key,
            id: id.into(),
            code,
        }
    }
}

/// Fixed `rows x cols` table of the logical matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapTable {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Cell>>,
}

impl KeymapTable {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Place every routed key at its logical row and column.
    pub fn from_route(result: &RouteResult, mainboard: &Mainboard) -> Result<Self, KeymapError> {
        let mut table = Self::new(mainboard.logical_rows, mainboard.logical_cols);
        for a in &result.assignments {
            let key = &result.keys[a.key];
            table.place(
                a.logical_row(),
                a.logical_col(),
                Cell::new(key.index, &key.id, key.code.clone()),
            )?;
        }
        Ok(table)
    }

    pub fn place(&mut self, row: usize, col: usize, cell: Cell) -> Result<(), KeymapError> {
        if row >= self.rows || col >= self.cols {
            return Err(KeymapError::OutOfRange {
                key: cell.id,
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let slot = &mut self.cells[row * self.cols + col];
        if let Some(existing) = slot {
            return Err(KeymapError::CellConflict {
                row,
                col,
                first: existing.id.clone(),
                second: cell.id,
            });
        }
        *slot = Some(cell);
        Ok(())
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[row * self.cols + col].as_ref()
    }

    /// Firmware code of a cell, [`NO_KEY`] when empty or uncoded.
    #[must_use]
    pub fn code(&self, row: usize, col: usize) -> &str {
        self.get(row, col)
            .and_then(|c| c.code.as_deref())
            .unwrap_or(NO_KEY)
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn populated(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Codes row by row; always `rows x cols`.
    #[must_use]
    pub fn codes(&self) -> Vec<Vec<&str>> {
        (0..self.rows)
            .map(|r| (0..self.cols).map(|c| self.code(r, c)).collect())
            .collect()
    }

    #[must_use]
    pub fn to_qmk(&self) -> String {
        qmk::render(self)
    }
}
