use gridcalc_core::Position;

/// Abstract Syntax Tree for formula expressions
///
/// Parentheses are not kept as nodes; [`Display`](std::fmt::Display)
/// re-inserts only the ones the tree shape requires.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),

    // Cell reference (e.g., A1)
    CellRef(Position),

    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    Unary { op: UnaryOp, operand: Box<Expr> },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// Get the precedence of this operator (higher = binds tighter)
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }

    /// Whether `a op (b op' c)` differs from `a op b op' c` for same-precedence `op'`
    fn groups_right_operand(&self) -> bool {
        matches!(self, BinaryOp::Sub | BinaryOp::Div)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg, // -
    Pos, // +
}

impl Expr {
    /// Create a number expression
    pub fn number(n: f64) -> Self {
        Expr::Number(n)
    }

    /// Create a cell reference expression
    pub fn cell_ref(row: i32, col: i32) -> Self {
        Expr::CellRef(Position::new(row, col))
    }

    /// Create a binary expression
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    fn binary_precedence(&self) -> Option<u8> {
        match self {
            Expr::Binary { op, .. } => Some(op.precedence()),
            _ => None,
        }
    }

    /// Collect cell references in order of appearance (duplicates kept)
    pub fn references(&self) -> Vec<Position> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, refs: &mut Vec<Position>) {
        match self {
            Expr::CellRef(pos) => refs.push(*pos),
            Expr::Binary { left, right, .. } => {
                left.collect_references(refs);
                right.collect_references(refs);
            }
            Expr::Unary { operand, .. } => operand.collect_references(refs),
            Expr::Number(_) => {}
        }
    }
}

fn write_operand(f: &mut std::fmt::Formatter<'_>, expr: &Expr, grouped: bool) -> std::fmt::Result {
    if grouped {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Number(n) => {
                // Format numbers without unnecessary decimals
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Expr::CellRef(pos) => write!(f, "{}", pos),
            Expr::Binary { left, op, right } => {
                let prec = op.precedence();
                let left_grouped = left.binary_precedence().is_some_and(|p| p < prec);
                let right_grouped = right.binary_precedence().is_some_and(|p| {
                    p < prec || (p == prec && op.groups_right_operand())
                });

                write_operand(f, left, left_grouped)?;
                write!(f, "{}", op)?;
                write_operand(f, right, right_grouped)
            }
            Expr::Unary { op, operand } => {
                let grouped = operand.binary_precedence().is_some();
                match op {
                    UnaryOp::Neg => write!(f, "-")?,
                    UnaryOp::Pos => write!(f, "+")?,
                }
                write_operand(f, operand, grouped)
            }
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
        }
    }
}
