use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::formula::FormulaParseError;
use crate::position::Position;

/// Runtime formula errors (Excel-compatible tokens)
///
/// These are values, not failures: a formula that divides by zero evaluates
/// to `FormulaError::DivisionByZero` and the error flows through any formula
/// that reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormulaError {
    /// #REF! - Invalid cell reference
    Ref,
    /// #VALUE! - Invalid value type
    Value,
    /// #DIV/0! - Division by zero
    DivisionByZero,
    /// #NUM! - Non-finite numeric result
    Num,
}

impl FormulaError {
    pub fn token(&self) -> &'static str {
        match self {
            FormulaError::Ref => "#REF!",
            FormulaError::Value => "#VALUE!",
            FormulaError::DivisionByZero => "#DIV/0!",
            FormulaError::Num => "#NUM!",
        }
    }
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Structural failures of a sheet edit or lookup
///
/// Any of these aborts the operation and leaves the sheet untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SheetError {
    #[error("invalid position {0}")]
    InvalidPosition(Position),

    #[error("formula syntax error: {0}")]
    FormulaSyntax(#[from] FormulaParseError),

    #[error("formula references invalid position {0}")]
    InvalidReference(Position),

    #[error("circular dependency detected at {0}")]
    CircularDependency(Position),
}

impl SheetError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            SheetError::InvalidPosition(_) => "INVALID_POSITION",
            SheetError::FormulaSyntax(_) => "FORMULA_SYNTAX",
            SheetError::InvalidReference(_) => "INVALID_REFERENCE",
            SheetError::CircularDependency(_) => "CIRCULAR_DEPENDENCY",
        }
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
