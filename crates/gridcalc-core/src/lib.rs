pub mod cell;
pub mod dependency;
pub mod error;
pub mod formula;
pub mod position;
pub mod sheet;
pub mod value;

#[cfg(test)]
mod test_support;

pub use cell::{Cell, CellContent, ESCAPE_SIGN, FORMULA_SIGN};
pub use error::{FormulaError, Result, SheetError};
pub use formula::{Formula, FormulaEngine, FormulaParseError};
pub use position::{col_from_label, col_to_label, Position, PositionParseError};
pub use sheet::{Sheet, Size};
pub use value::CellValue;
