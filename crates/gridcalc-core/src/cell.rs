use std::cell::RefCell;
use std::collections::HashSet;

use crate::dependency;
use crate::error::{Result, SheetError};
use crate::formula::{Formula, FormulaEngine};
use crate::position::Position;
use crate::sheet::Sheet;
use crate::value::CellValue;

/// Leading character marking text as a formula
pub const FORMULA_SIGN: char = '=';
/// Leading character forcing the rest of the text to be literal
pub const ESCAPE_SIGN: char = '\'';

/// The content of a cell
#[derive(Debug, Default)]
pub enum CellContent {
    #[default]
    Empty,
    /// Literal text, kept verbatim including any escape sign
    Text(String),
    Formula(Box<dyn Formula>),
}

impl CellContent {
    /// Check if this is a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellContent::Formula(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }
}

/// A single cell: content, memoized value and its edges in the reference graph
#[derive(Debug)]
pub struct Cell {
    position: Position,
    content: CellContent,
    /// Memoized formula result, absent until first read after a change
    cached_value: RefCell<Option<CellValue>>,
    /// Cells this formula reads, deduplicated in first-occurrence order
    references: Vec<Position>,
    /// Cells whose formulas read this one
    dependents: HashSet<Position>,
}

impl Cell {
    pub(crate) fn new(position: Position) -> Self {
        Cell {
            position,
            content: CellContent::Empty,
            cached_value: RefCell::new(None),
            references: Vec::new(),
            dependents: HashSet::new(),
        }
    }

    /// Accept new content text
    ///
    /// Classifies the text, parses formulas, validates their references and
    /// rejects edits that would close a cycle in `sheet`. Nothing is stored on
    /// failure. Edges to other cells are left for the sheet to register.
    pub(crate) fn set(
        &mut self,
        text: &str,
        engine: &dyn FormulaEngine,
        sheet: &Sheet,
    ) -> Result<()> {
        let (content, references) = match text.strip_prefix(FORMULA_SIGN) {
            Some(expression) if !expression.is_empty() => {
                let formula = engine.parse(expression)?;
                let references = dedup_references(formula.referenced_cells());

                if let Some(invalid) = references.iter().find(|pos| !pos.is_valid()) {
                    return Err(SheetError::InvalidReference(*invalid));
                }
                if dependency::would_create_cycle(sheet.cells(), self.position, &references) {
                    return Err(SheetError::CircularDependency(self.position));
                }

                (CellContent::Formula(formula), references)
            }
            _ if text.is_empty() => (CellContent::Empty, Vec::new()),
            _ => (CellContent::Text(text.to_string()), Vec::new()),
        };

        self.content = content;
        self.references = references;
        self.invalidate_cache();
        Ok(())
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// Get the value of the cell, evaluating and memoizing formulas
    ///
    /// `sheet` must be the sheet holding this cell; outside the crate values
    /// are read through [`Sheet::value`].
    pub(crate) fn value(&self, sheet: &Sheet) -> CellValue {
        if let Some(value) = self.cached_value.borrow().clone() {
            return value;
        }

        match &self.content {
            CellContent::Empty => CellValue::Number(0.0),
            CellContent::Text(text) => {
                CellValue::Text(text.strip_prefix(ESCAPE_SIGN).unwrap_or(text).to_string())
            }
            CellContent::Formula(formula) => {
                let value = CellValue::from(formula.evaluate(&|pos| sheet.value_at(pos)));
                *self.cached_value.borrow_mut() = Some(value.clone());
                value
            }
        }
    }

    /// Get the stored text: `=expression` for formulas, verbatim text otherwise
    pub fn text(&self) -> String {
        match &self.content {
            CellContent::Empty => String::new(),
            CellContent::Text(text) => text.clone(),
            CellContent::Formula(formula) => format!("{}{}", FORMULA_SIGN, formula.expression()),
        }
    }

    /// Cells this formula reads
    pub fn references(&self) -> &[Position] {
        &self.references
    }

    /// Cells that read this one
    pub fn dependents(&self) -> &HashSet<Position> {
        &self.dependents
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_formula(&self) -> bool {
        self.content.is_formula()
    }

    pub fn has_cached_value(&self) -> bool {
        self.cached_value.borrow().is_some()
    }

    /// Drop the memoized value
    pub fn invalidate_cache(&self) {
        self.cached_value.replace(None);
    }

    pub(crate) fn add_dependent(&mut self, pos: Position) {
        self.dependents.insert(pos);
    }

    pub(crate) fn remove_dependent(&mut self, pos: Position) {
        self.dependents.remove(&pos);
    }

    pub(crate) fn set_dependents(&mut self, dependents: HashSet<Position>) {
        self.dependents = dependents;
    }

    pub(crate) fn into_dependents(self) -> HashSet<Position> {
        self.dependents
    }
}

/// Drop repeated positions, keeping the first occurrence
fn dedup_references(positions: Vec<Position>) -> Vec<Position> {
    let mut seen = HashSet::new();
    positions.into_iter().filter(|pos| seen.insert(*pos)).collect()
}
