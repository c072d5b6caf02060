//! Contract between cells and a formula engine.
//!
//! The core never parses or evaluates expressions itself. A [`Sheet`] is
//! handed a [`FormulaEngine`] at construction, and each formula cell keeps
//! the opaque [`Formula`] object the engine produced for it.
//!
//! [`Sheet`]: crate::Sheet

use std::fmt;

use thiserror::Error;

use crate::error::FormulaError;
use crate::position::Position;
use crate::value::CellValue;

/// Error returned when formula text cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at position {position}: {message}")]
pub struct FormulaParseError {
    pub message: String,
    pub position: usize,
}

impl FormulaParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// A parsed formula expression
pub trait Formula: fmt::Debug {
    /// Positions the expression reads, in order of appearance
    ///
    /// May contain duplicates and positions outside the sheet; the cell
    /// deduplicates and validates them.
    fn referenced_cells(&self) -> Vec<Position>;

    /// Canonical expression text without the leading `=`
    fn expression(&self) -> String;

    /// Evaluate against the values produced by `lookup`
    fn evaluate(&self, lookup: &dyn Fn(Position) -> CellValue) -> Result<f64, FormulaError>;
}

/// Parses formula text into [`Formula`] objects
pub trait FormulaEngine: fmt::Debug {
    /// Parse `expression` (the text after the formula sign)
    fn parse(&self, expression: &str) -> Result<Box<dyn Formula>, FormulaParseError>;
}
