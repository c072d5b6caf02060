use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FormulaError;

/// The evaluated value of a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(FormulaError),
}

impl Default for CellValue {
    /// Empty cells read as numeric zero
    fn default() -> Self {
        CellValue::Number(0.0)
    }
}

impl CellValue {
    /// Coerce the value to a number for arithmetic
    ///
    /// Empty text reads as zero, text must otherwise parse as a number in
    /// full, and errors propagate unchanged. Infinite and NaN numbers,
    /// including text such as `inf`, are [`FormulaError::Num`].
    pub fn as_number(&self) -> Result<f64, FormulaError> {
        let n = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) if s.is_empty() => 0.0,
            CellValue::Text(s) => s.parse::<f64>().map_err(|_| FormulaError::Value)?,
            CellValue::Error(e) => return Err(*e),
        };
        if n.is_finite() {
            Ok(n)
        } else {
            Err(FormulaError::Num)
        }
    }
}

impl From<Result<f64, FormulaError>> for CellValue {
    fn from(result: Result<f64, FormulaError>) -> Self {
        match result {
            Ok(n) => CellValue::Number(n),
            Err(e) => CellValue::Error(e),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => f.write_str(s),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}
