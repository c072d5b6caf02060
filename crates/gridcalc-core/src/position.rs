use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Cell coordinate (0-indexed internally)
///
/// Coordinates are signed so that out-of-range references produced by a
/// formula can still be represented and rejected through [`Position::is_valid`].
#[derive(
    Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    /// Maximum number of rows
    pub const MAX_ROWS: i32 = 16_384;
    /// Maximum number of columns (column XFD)
    pub const MAX_COLS: i32 = 16_384;
    /// Canonical invalid position
    pub const NONE: Position = Position { row: -1, col: -1 };

    pub const fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    /// Check if this position lies inside the sheet
    pub fn is_valid(&self) -> bool {
        (0..Self::MAX_ROWS).contains(&self.row) && (0..Self::MAX_COLS).contains(&self.col)
    }

    /// Create from A1 notation (e.g., "A1" -> (0, 0), "B2" -> (1, 1))
    pub fn from_a1(notation: &str) -> Option<Self> {
        let notation = notation.trim();
        let digits_at = notation.find(|c: char| c.is_ascii_digit())?;
        let (col_str, row_str) = notation.split_at(digits_at);

        if col_str.is_empty() || !row_str.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let col = col_from_label(col_str)?;
        let row: i32 = row_str.parse().ok()?;

        if row == 0 {
            return None; // Rows are 1-indexed in A1 notation
        }

        let pos = Position::new(row - 1, col);
        pos.is_valid().then_some(pos)
    }

    /// Convert to A1 notation (e.g., (0, 0) -> "A1")
    pub fn to_a1(&self) -> String {
        if !self.is_valid() {
            return String::new();
        }
        format!("{}{}", col_to_label(self.col), self.row + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.to_a1())
        } else {
            write!(f, "({}, {})", self.row, self.col)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cell position: {0:?}")]
pub struct PositionParseError(pub String);

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_a1(s).ok_or_else(|| PositionParseError(s.to_string()))
    }
}

/// Convert column index (0-indexed) to label (A, B, ..., Z, AA, AB, ...)
pub fn col_to_label(col: i32) -> String {
    let mut label = String::new();
    let mut n = i64::from(col) + 1; // 1-indexed for calculation

    while n > 0 {
        n -= 1;
        label.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }

    label
}

/// Convert column label (A, B, ..., Z, AA, AB, ...) to index (0-indexed)
///
/// Labels are case-insensitive. Returns `None` for non-alphabetic input or
/// labels too long to fit a column index.
pub fn col_from_label(label: &str) -> Option<i32> {
    let mut col: i32 = 0;

    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as i32 + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }

    if col == 0 {
        None
    } else {
        Some(col - 1) // Convert to 0-indexed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_labels() {
        assert_eq!(col_to_label(0), "A");
        assert_eq!(col_to_label(25), "Z");
        assert_eq!(col_to_label(26), "AA");
        assert_eq!(col_to_label(701), "ZZ");
        assert_eq!(col_to_label(702), "AAA");

        assert_eq!(col_from_label("A"), Some(0));
        assert_eq!(col_from_label("z"), Some(25));
        assert_eq!(col_from_label("AA"), Some(26));
        assert_eq!(col_from_label(""), None);
        assert_eq!(col_from_label("A1"), None);
    }

    #[test]
    fn test_from_a1() {
        assert_eq!(Position::from_a1("A1"), Some(Position::new(0, 0)));
        assert_eq!(Position::from_a1("b3"), Some(Position::new(2, 1)));
        assert_eq!(Position::from_a1("AA10"), Some(Position::new(9, 26)));

        // Malformed
        assert_eq!(Position::from_a1("A0"), None);
        assert_eq!(Position::from_a1("1A"), None);
        assert_eq!(Position::from_a1("A"), None);
        assert_eq!(Position::from_a1("A1B"), None);
        assert_eq!(Position::from_a1(""), None);

        // Outside the sheet or overflowing
        assert_eq!(Position::from_a1("A16385"), None);
        assert_eq!(Position::from_a1("XFE1"), None);
        assert_eq!(Position::from_a1(&format!("{}1", "Z".repeat(40))), None);
    }

    #[test]
    fn test_to_a1() {
        assert_eq!(Position::new(0, 0).to_a1(), "A1");
        assert_eq!(Position::new(9, 26).to_string(), "AA10");
        assert_eq!(Position::new(16_383, 16_383).to_a1(), "XFD16384");
        assert_eq!(Position::NONE.to_a1(), "");
    }

    #[test]
    fn test_validity() {
        assert!(Position::new(0, 0).is_valid());
        assert!(Position::new(Position::MAX_ROWS - 1, Position::MAX_COLS - 1).is_valid());
        assert!(!Position::new(Position::MAX_ROWS, 0).is_valid());
        assert!(!Position::new(0, Position::MAX_COLS).is_valid());
        assert!(!Position::new(-1, 0).is_valid());
        assert!(!Position::NONE.is_valid());
    }

    #[test]
    fn test_from_str() {
        let pos: Position = "C7".parse().unwrap();
        assert_eq!(pos, Position::new(6, 2));
        assert!("??".parse::<Position>().is_err());
    }
}
