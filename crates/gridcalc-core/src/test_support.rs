//! A minimal formula engine for exercising cells and sheets in isolation.
//!
//! Expressions are `+`-separated terms, each a number or an A1 reference.
//! `REF!` stands for a reference outside the sheet and `DIV0` evaluates to a
//! division-by-zero error. Every evaluation bumps a shared counter.

use std::cell::Cell as CounterCell;
use std::rc::Rc;

use crate::error::FormulaError;
use crate::formula::{Formula, FormulaEngine, FormulaParseError};
use crate::position::Position;
use crate::sheet::Sheet;
use crate::value::CellValue;

pub fn pos(a1: &str) -> Position {
    Position::from_a1(a1).unwrap()
}

/// A sheet backed by a [`CountingEngine`], plus a handle to that engine
pub fn counting_sheet() -> (Sheet, CountingEngine) {
    let engine = CountingEngine::default();
    (Sheet::new(Box::new(engine.clone())), engine)
}

#[derive(Debug, Default, Clone)]
pub struct CountingEngine {
    evaluations: Rc<CounterCell<usize>>,
}

impl CountingEngine {
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }
}

#[derive(Debug, Clone)]
enum Term {
    Number(f64),
    Ref(Position),
    DivZero,
}

#[derive(Debug)]
struct SumFormula {
    source: Vec<String>,
    terms: Vec<Term>,
    evaluations: Rc<CounterCell<usize>>,
}

impl FormulaEngine for CountingEngine {
    fn parse(&self, expression: &str) -> Result<Box<dyn Formula>, FormulaParseError> {
        let mut source = Vec::new();
        let mut terms = Vec::new();

        for (i, raw) in expression.split('+').enumerate() {
            let raw = raw.trim();
            let term = if let Ok(n) = raw.parse::<f64>() {
                Term::Number(n)
            } else if raw == "REF!" {
                Term::Ref(Position::NONE)
            } else if raw == "DIV0" {
                Term::DivZero
            } else if let Some(pos) = Position::from_a1(raw) {
                Term::Ref(pos)
            } else {
                return Err(FormulaParseError::new(format!("bad term {raw:?}"), i));
            };
            source.push(raw.to_string());
            terms.push(term);
        }

        Ok(Box::new(SumFormula {
            source,
            terms,
            evaluations: Rc::clone(&self.evaluations),
        }))
    }
}

impl Formula for SumFormula {
    fn referenced_cells(&self) -> Vec<Position> {
        self.terms
            .iter()
            .filter_map(|term| match term {
                Term::Ref(pos) => Some(*pos),
                _ => None,
            })
            .collect()
    }

    fn expression(&self) -> String {
        self.source.join("+")
    }

    fn evaluate(&self, lookup: &dyn Fn(Position) -> CellValue) -> Result<f64, FormulaError> {
        self.evaluations.set(self.evaluations.get() + 1);

        let mut total = 0.0;
        for term in &self.terms {
            total += match term {
                Term::Number(n) => *n,
                Term::Ref(pos) => lookup(*pos).as_number()?,
                Term::DivZero => return Err(FormulaError::DivisionByZero),
            };
        }
        Ok(total)
    }
}
