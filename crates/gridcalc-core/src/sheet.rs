use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use tracing::{debug, trace};

use crate::cell::Cell;
use crate::dependency;
use crate::error::{FormulaError, Result, SheetError};
use crate::formula::FormulaEngine;
use crate::position::Position;
use crate::value::CellValue;

/// Printable area of a sheet, anchored at A1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub rows: i32,
    pub cols: i32,
}

impl Size {
    pub const fn new(rows: i32, cols: i32) -> Self {
        Size { rows, cols }
    }
}

/// A spreadsheet: sparse cell storage plus the reference graph between cells
///
/// The sheet owns every cell. Cells only know each other by position, so the
/// forward/reverse edges are plain position sets stored on each cell.
///
/// # Invariants
///
/// 1. **Bidirectional consistency:** `b` is in `a.dependents` iff `a` is in
///    `b.references`. Reverse edges of a position with no cell are parked in
///    `detached_dependents` until a cell appears there again.
/// 2. **Acyclic:** committed forward references never form a cycle.
/// 3. **Coherent memo:** a cell holding a cached value has no edited cell in
///    the transitive closure of its references since that value was computed.
#[derive(Debug)]
pub struct Sheet {
    cells: HashMap<Position, Cell>,
    detached_dependents: HashMap<Position, HashSet<Position>>,
    size: Size,
    engine: Box<dyn FormulaEngine>,
}

impl Sheet {
    /// Create an empty sheet evaluating formulas with `engine`
    pub fn new(engine: Box<dyn FormulaEngine>) -> Self {
        Self {
            cells: HashMap::new(),
            detached_dependents: HashMap::new(),
            size: Size::default(),
            engine,
        }
    }

    /// Set the content of a cell from user text
    ///
    /// Either the whole edit is committed or, on error, the sheet is left
    /// exactly as it was.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        ensure_valid(pos)?;

        let mut cell = Cell::new(pos);
        if let Err(err) = cell.set(text, self.engine.as_ref(), self) {
            debug!(cell = %pos, error = %err, "rejected edit");
            return Err(err);
        }

        // Commit: the new cell takes over the reverse edges of the position
        let dependents = match self.cells.remove(&pos) {
            Some(old) => {
                self.unlink(pos, old.references());
                old.into_dependents()
            }
            None => self.detached_dependents.remove(&pos).unwrap_or_default(),
        };
        cell.set_dependents(dependents);
        self.link(pos, cell.references());

        let roots: Vec<Position> = cell.dependents().iter().copied().collect();
        self.cells.insert(pos, cell);
        let invalidated = dependency::invalidate_dependents(&self.cells, roots);
        self.grow(pos);

        debug!(cell = %pos, invalidated, "committed edit");
        Ok(())
    }

    /// Get a reference to the cell at `pos`, if one is stored
    pub fn get_cell(&self, pos: Position) -> Result<Option<&Cell>> {
        ensure_valid(pos)?;
        Ok(self.cells.get(&pos))
    }

    /// Get a mutable reference to the cell at `pos`, if one is stored
    pub fn get_cell_mut(&mut self, pos: Position) -> Result<Option<&mut Cell>> {
        ensure_valid(pos)?;
        Ok(self.cells.get_mut(&pos))
    }

    /// Remove the cell at `pos`
    ///
    /// Cells that read `pos` keep their references and now see it as empty.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        ensure_valid(pos)?;

        let Some(old) = self.cells.remove(&pos) else {
            return Ok(());
        };
        self.unlink(pos, old.references());

        let dependents = old.into_dependents();
        let roots: Vec<Position> = dependents.iter().copied().collect();
        if !dependents.is_empty() {
            self.detached_dependents.insert(pos, dependents);
        }
        let invalidated = dependency::invalidate_dependents(&self.cells, roots);
        self.shrink();

        debug!(cell = %pos, invalidated, "cleared cell");
        Ok(())
    }

    /// Value at `pos`; a position without a cell reads like an empty cell
    pub fn value(&self, pos: Position) -> Result<CellValue> {
        ensure_valid(pos)?;
        Ok(self.value_at(pos))
    }

    /// Stored text at `pos`; a position without a cell reads as ""
    pub fn text(&self, pos: Position) -> Result<String> {
        ensure_valid(pos)?;
        Ok(self.cells.get(&pos).map(Cell::text).unwrap_or_default())
    }

    /// Cells that transitively read `pos`, nearest first
    pub fn transitive_dependents(&self, pos: Position) -> Result<Vec<Position>> {
        ensure_valid(pos)?;
        // A cleared position keeps its readers parked outside the cell map
        let roots: Vec<Position> = match self.cells.get(&pos) {
            Some(cell) => cell.dependents().iter().copied().collect(),
            None => self
                .detached_dependents
                .get(&pos)
                .map(|parked| parked.iter().copied().collect())
                .unwrap_or_default(),
        };
        Ok(dependency::transitive_dependents(&self.cells, roots))
    }

    /// Size of the printable area
    pub fn printable_size(&self) -> Size {
        self.size
    }

    /// Get the number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the sheet is empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Evaluated values over the printable area, row-major; `None` for absent cells
    pub fn values_grid(&self) -> Vec<Vec<Option<CellValue>>> {
        self.grid(|cell| self.value_at(cell.position()))
    }

    /// Stored texts over the printable area, row-major; "" for absent cells
    pub fn texts_grid(&self) -> Vec<Vec<String>> {
        self.grid(Cell::text)
            .into_iter()
            .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
            .collect()
    }

    /// Print evaluated values as a tab-separated table
    pub fn print_values<W: Write>(&self, output: &mut W) -> io::Result<()> {
        self.print_with(output, |cell| self.value_at(cell.position()).to_string())
    }

    /// Print stored texts as a tab-separated table
    pub fn print_texts<W: Write>(&self, output: &mut W) -> io::Result<()> {
        self.print_with(output, Cell::text)
    }

    pub(crate) fn cells(&self) -> &HashMap<Position, Cell> {
        &self.cells
    }

    /// Value lookup used by reads and during formula evaluation
    ///
    /// Formulas the cell depends on are evaluated first, bottom-up, so the
    /// call depth stays constant however long the reference chain is.
    pub(crate) fn value_at(&self, pos: Position) -> CellValue {
        if !pos.is_valid() {
            return CellValue::Error(FormulaError::Ref);
        }
        let Some(cell) = self.cells.get(&pos) else {
            return CellValue::default();
        };

        if cell.is_formula() && !cell.has_cached_value() {
            let order = dependency::evaluation_order(&self.cells, pos);
            trace!(cell = %pos, pending = order.len(), "evaluating");
            for dep in order {
                if let Some(pending) = self.cells.get(&dep) {
                    pending.value(self);
                }
            }
        }
        cell.value(self)
    }

    /// Register `from` as a dependent of each of `references`
    ///
    /// Referenced positions without a cell get an empty placeholder.
    fn link(&mut self, from: Position, references: &[Position]) {
        for &target in references {
            if let Some(cell) = self.cells.get_mut(&target) {
                cell.add_dependent(from);
                continue;
            }

            let mut placeholder = Cell::new(target);
            placeholder.set_dependents(
                self.detached_dependents
                    .remove(&target)
                    .unwrap_or_default(),
            );
            placeholder.add_dependent(from);
            self.cells.insert(target, placeholder);
            self.grow(target);
            trace!(cell = %target, "created placeholder");
        }
    }

    /// Remove `from` from the dependents of each of `references`
    fn unlink(&mut self, from: Position, references: &[Position]) {
        for target in references {
            if let Some(cell) = self.cells.get_mut(target) {
                cell.remove_dependent(from);
            } else if let Some(parked) = self.detached_dependents.get_mut(target) {
                parked.remove(&from);
                if parked.is_empty() {
                    self.detached_dependents.remove(target);
                }
            }
        }
    }

    fn grow(&mut self, pos: Position) {
        self.size.rows = self.size.rows.max(pos.row + 1);
        self.size.cols = self.size.cols.max(pos.col + 1);
    }

    /// Recompute the printable area from the remaining cells
    fn shrink(&mut self) {
        let mut size = Size::default();
        for pos in self.cells.keys() {
            size.rows = size.rows.max(pos.row + 1);
            size.cols = size.cols.max(pos.col + 1);
        }
        self.size = size;
    }

    fn grid<T>(&self, render: impl Fn(&Cell) -> T) -> Vec<Vec<Option<T>>> {
        (0..self.size.rows)
            .map(|row| {
                (0..self.size.cols)
                    .map(|col| self.cells.get(&Position::new(row, col)).map(&render))
                    .collect()
            })
            .collect()
    }

    fn print_with<W: Write>(
        &self,
        output: &mut W,
        render: impl Fn(&Cell) -> String,
    ) -> io::Result<()> {
        for row in self.grid(render) {
            let fields: Vec<String> = row.into_iter().map(Option::unwrap_or_default).collect();
            writeln!(output, "{}", fields.join("\t"))?;
        }
        Ok(())
    }
}

fn ensure_valid(pos: Position) -> Result<()> {
    if pos.is_valid() {
        Ok(())
    } else {
        Err(SheetError::InvalidPosition(pos))
    }
}
