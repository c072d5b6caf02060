use crate::ast::{BinaryOp, Expr, UnaryOp};
use gridcalc_core::{CellValue, FormulaError, Position};

/// Evaluator for formula AST
pub struct Evaluator<F>
where
    F: Fn(Position) -> CellValue,
{
    get_cell_value: F,
}

impl<F> Evaluator<F>
where
    F: Fn(Position) -> CellValue,
{
    pub fn new(get_cell_value: F) -> Self {
        Self { get_cell_value }
    }

    /// Evaluate an expression AST to a number
    ///
    /// The first error met in left-to-right order wins.
    pub fn evaluate(&self, expr: &Expr) -> Result<f64, FormulaError> {
        match expr {
            Expr::Number(n) => finite(*n),

            Expr::CellRef(pos) => {
                if !pos.is_valid() {
                    return Err(FormulaError::Ref);
                }
                (self.get_cell_value)(*pos).as_number().and_then(finite)
            }

            Expr::Binary { left, op, right } => self.evaluate_binary(left, *op, right),

            Expr::Unary { op, operand } => self.evaluate_unary(*op, operand),
        }
    }

    fn evaluate_binary(&self, left: &Expr, op: BinaryOp, right: &Expr) -> Result<f64, FormulaError> {
        let a = self.evaluate(left)?;
        let b = self.evaluate(right)?;

        let result = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => {
                if b == 0.0 {
                    return Err(FormulaError::DivisionByZero);
                }
                a / b
            }
        };

        finite(result)
    }

    fn evaluate_unary(&self, op: UnaryOp, operand: &Expr) -> Result<f64, FormulaError> {
        let n = self.evaluate(operand)?;
        match op {
            UnaryOp::Neg => finite(-n),
            UnaryOp::Pos => finite(n),
        }
    }
}

fn finite(n: f64) -> Result<f64, FormulaError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(FormulaError::Num)
    }
}
