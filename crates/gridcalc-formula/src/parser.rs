//! Nom-based formula parser.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr     := term (('+' | '-') term)*
//! term     := unary (('*' | '/') unary)*
//! unary    := ('+' | '-') unary | primary
//! primary  := number | cell_ref | '(' expr ')'
//! ```
//!
//! Whitespace between tokens is insignificant.

use nom::{
    branch::alt,
    character::complete::{alpha1, char, digit0, digit1, multispace0, one_of},
    combinator::{map, map_res, opt, recognize, value},
    multi::fold_many0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::ast::{BinaryOp, Expr, UnaryOp};
use gridcalc_core::{col_from_label, FormulaParseError, Position};

// =============================================================================
// Helper Combinators
// =============================================================================

/// Skip whitespace
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse a decimal number (integer or float, optional exponent)
///
/// Literals too large for an `f64` are rejected rather than read as infinity.
fn parse_number(input: &str) -> IResult<&str, Expr> {
    map_res(
        recognize(tuple((
            digit1,
            opt(pair(char('.'), digit0)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |num_str: &str| match num_str.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Expr::Number(n)),
            _ => Err("number out of range"),
        },
    )(input)
}

/// Parse a cell reference (e.g., A1, AA10)
///
/// Coordinates that overflow or lie outside the sheet still parse; they come
/// back as invalid positions for the caller to reject.
fn parse_cell_ref(input: &str) -> IResult<&str, Expr> {
    let (input, (col_letters, row_digits)) = pair(alpha1, digit1)(input)?;

    let col = col_from_label(col_letters);
    let row = row_digits.parse::<i32>().ok();

    let pos = match (row, col) {
        (Some(row), Some(col)) => Position::new(row - 1, col), // Convert to 0-indexed
        _ => Position::NONE,
    };

    Ok((input, Expr::CellRef(pos)))
}

// =============================================================================
// Operator Parsers
// =============================================================================

fn parse_additive_op(input: &str) -> IResult<&str, BinaryOp> {
    alt((
        value(BinaryOp::Add, char('+')),
        value(BinaryOp::Sub, char('-')),
    ))(input)
}

fn parse_multiplicative_op(input: &str) -> IResult<&str, BinaryOp> {
    alt((
        value(BinaryOp::Mul, char('*')),
        value(BinaryOp::Div, char('/')),
    ))(input)
}

// =============================================================================
// Expression Parsers (Precedence Climbing)
// =============================================================================

/// Parse a primary expression (literals, cell refs, parentheses)
fn parse_primary(input: &str) -> IResult<&str, Expr> {
    preceded(
        multispace0,
        alt((
            delimited(char('('), parse_expression, char(')')),
            parse_number,
            parse_cell_ref,
        )),
    )(input)
}

/// Parse a unary expression (prefix - or +)
fn parse_unary(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;

    alt((
        map(preceded(char('-'), parse_unary), |e| {
            Expr::unary(UnaryOp::Neg, e)
        }),
        map(preceded(char('+'), parse_unary), |e| {
            Expr::unary(UnaryOp::Pos, e)
        }),
        parse_primary,
    ))(input)
}

/// Parse multiplicative expressions (*, /)
fn parse_multiplicative(input: &str) -> IResult<&str, Expr> {
    let (input, init) = parse_unary(input)?;

    fold_many0(
        pair(ws(parse_multiplicative_op), parse_unary),
        move || init.clone(),
        |acc, (op, val)| Expr::binary(acc, op, val),
    )(input)
}

/// Parse additive expressions (+, -)
fn parse_additive(input: &str) -> IResult<&str, Expr> {
    let (input, init) = parse_multiplicative(input)?;

    fold_many0(
        pair(ws(parse_additive_op), parse_multiplicative),
        move || init.clone(),
        |acc, (op, val)| Expr::binary(acc, op, val),
    )(input)
}

/// Parse a complete expression
pub fn parse_expression(input: &str) -> IResult<&str, Expr> {
    ws(parse_additive)(input)
}

// =============================================================================
// Public API
// =============================================================================

/// Parse formula text (without the leading `=`) into an AST
pub fn parse(input: &str) -> Result<Expr, FormulaParseError> {
    match parse_expression(input) {
        Ok(("", expr)) => Ok(expr),
        Ok((remaining, _)) => Err(FormulaParseError::new(
            format!("unexpected input: '{}'", remaining),
            input.len() - remaining.len(),
        )),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(FormulaParseError::new(
            format!("expected expression ({:?})", e.code),
            input.len() - e.input.len(),
        )),
        Err(nom::Err::Incomplete(_)) => Err(FormulaParseError::new(
            "incomplete expression",
            input.len(),
        )),
    }
}

// =============================================================================
// Tests
// =============================================================================
