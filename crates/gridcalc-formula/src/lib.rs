pub mod ast;
pub mod evaluator;
pub mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use evaluator::Evaluator;
pub use parser::parse;

use gridcalc_core::{CellValue, Formula, FormulaEngine, FormulaError, FormulaParseError, Position};

/// Arithmetic formula engine handed to a [`gridcalc_core::Sheet`]
#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

impl FormulaEngine for Engine {
    fn parse(&self, expression: &str) -> Result<Box<dyn Formula>, FormulaParseError> {
        Ok(Box::new(ParsedFormula::parse(expression)?))
    }
}

/// A formula parsed into an AST
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFormula {
    ast: Expr,
}

impl ParsedFormula {
    pub fn parse(expression: &str) -> Result<Self, FormulaParseError> {
        Ok(Self {
            ast: parser::parse(expression)?,
        })
    }
}

impl Formula for ParsedFormula {
    fn referenced_cells(&self) -> Vec<Position> {
        self.ast.references()
    }

    fn expression(&self) -> String {
        self.ast.to_string()
    }

    fn evaluate(&self, lookup: &dyn Fn(Position) -> CellValue) -> Result<f64, FormulaError> {
        Evaluator::new(lookup).evaluate(&self.ast)
    }
}
