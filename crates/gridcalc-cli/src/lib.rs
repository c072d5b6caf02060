pub mod config;

use std::io::Write;

use anyhow::{bail, Context};
use serde::Serialize;

use gridcalc_core::{CellValue, Position, Sheet};
use gridcalc_formula::Engine;

pub use config::{Config, OutputFormat};

/// A single `position content` pair from the input
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    /// Position as written; kept for diagnostics
    pub label: String,
    pub position: Position,
    pub content: String,
}

/// JSON view of a sheet
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub rows: i32,
    pub cols: i32,
    pub values: Vec<Vec<Option<CellValue>>>,
    pub texts: Vec<Vec<String>>,
}

impl Snapshot {
    pub fn of(sheet: &Sheet) -> Self {
        let size = sheet.printable_size();
        Self {
            rows: size.rows,
            cols: size.cols,
            values: sheet.values_grid(),
            texts: sheet.texts_grid(),
        }
    }
}

/// Parse whitespace-separated input: an edit count, then that many pairs
///
/// Positions that are not valid A1 notation become [`Position::NONE`] so the
/// sheet rejects them like any other out-of-range edit.
pub fn parse_edits(input: &str) -> anyhow::Result<Vec<Edit>> {
    let mut tokens = input.split_whitespace();

    let count_token = tokens.next().context("missing edit count")?;
    let count: usize = count_token
        .parse()
        .with_context(|| format!("invalid edit count '{}'", count_token))?;

    let mut edits = Vec::new();
    for index in 0..count {
        let label = tokens
            .next()
            .with_context(|| format!("edit {} of {}: missing position", index + 1, count))?;
        let content = tokens
            .next()
            .with_context(|| format!("edit {} of {}: missing content for {}", index + 1, count, label))?;

        edits.push(Edit {
            label: label.to_string(),
            position: label.parse().unwrap_or(Position::NONE),
            content: content.to_string(),
        });
    }

    if let Some(extra) = tokens.next() {
        bail!("unexpected input after {} edits: '{}'", count, extra);
    }

    Ok(edits)
}

/// Apply `edits` to `sheet`
///
/// Returns the number of rejected edits; without `keep_going` the first
/// rejection is returned as an error instead.
pub fn apply_edits(sheet: &mut Sheet, edits: &[Edit], keep_going: bool) -> anyhow::Result<usize> {
    let mut rejected = 0;

    for edit in edits {
        match sheet.set_cell(edit.position, &edit.content) {
            Ok(()) => tracing::debug!(cell = %edit.label, "applied edit"),
            Err(err) if keep_going => {
                tracing::warn!(cell = %edit.label, code = err.code(), "skipping edit: {}", err);
                rejected += 1;
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("cannot set {} to '{}'", edit.label, edit.content)
                });
            }
        }
    }

    Ok(rejected)
}

/// Print the sheet in the configured format
pub fn render<W: Write>(sheet: &Sheet, config: &Config, out: &mut W) -> anyhow::Result<()> {
    match config.format {
        OutputFormat::Tsv => {
            if config.headers {
                writeln!(out, "Values:")?;
            }
            sheet.print_values(out)?;
            if config.headers {
                writeln!(out, "Texts:")?;
            }
            sheet.print_texts(out)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, &Snapshot::of(sheet))?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Run the whole pipeline over `input`, writing the tables to `out`
pub fn run<W: Write>(config: &Config, input: &str, out: &mut W) -> anyhow::Result<()> {
    let edits = parse_edits(input)?;
    let mut sheet = Sheet::new(Box::new(Engine));

    let rejected = apply_edits(&mut sheet, &edits, config.keep_going)?;
    tracing::info!(
        edits = edits.len(),
        rejected,
        cells = sheet.cell_count(),
        "sheet built"
    );

    render(&sheet, config, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_string(config: &Config, input: &str) -> anyhow::Result<String> {
        let mut out = Vec::new();
        run(config, input, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_edits() {
        let edits = parse_edits("2\nA1 10\n b2  =A1*2\n").unwrap();
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].position, Position::new(0, 0));
        assert_eq!(edits[1].position, Position::new(1, 1));
        assert_eq!(edits[1].content, "=A1*2");
    }

    #[test]
    fn test_parse_edits_malformed() {
        assert!(parse_edits("").is_err());
        assert!(parse_edits("two A1 1").is_err());
        assert!(parse_edits("2 A1 1 B1").is_err());
        assert!(parse_edits("1 A1 1 B1 2").is_err());
    }

    #[test]
    fn test_parse_edits_huge_count_is_an_error() {
        let err = parse_edits("1000000000000000000 A1 1").unwrap_err();
        assert!(err.to_string().contains("missing position"));
        assert!(parse_edits("99999999999999999999999 A1 1").is_err());
    }

    #[test]
    fn test_parse_edits_keeps_bad_positions() {
        let edits = parse_edits("1 1A x").unwrap();
        assert_eq!(edits[0].position, Position::NONE);
    }

    #[test]
    fn test_run_tsv() {
        let config = Config {
            headers: true,
            ..Config::default()
        };
        let output = run_to_string(&config, "3 A1 10 B1 =A1*2 A2 '=x").unwrap();
        assert_eq!(
            output,
            "Values:\n10\t20\n=x\t\nTexts:\n10\t=A1*2\n'=x\t\n"
        );
    }

    #[test]
    fn test_run_json() {
        let config = Config {
            format: OutputFormat::Json,
            ..Config::default()
        };
        let output = run_to_string(&config, "2 A1 =1/0 B2 hi").unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["rows"], 2);
        assert_eq!(json["cols"], 2);
        assert_eq!(json["values"][0][0]["type"], "Error");
        assert_eq!(json["values"][0][1], serde_json::Value::Null);
        assert_eq!(json["values"][1][1]["value"], "hi");
        assert_eq!(json["texts"][0][0], "=1/0");
        assert_eq!(json["texts"][1][0], "");
    }

    #[test]
    fn test_rejected_edit_aborts() {
        let err = run_to_string(&Config::default(), "2 A1 =B1 B1 =A1").unwrap_err();
        assert!(err.to_string().contains("B1"));
    }

    #[test]
    fn test_keep_going_skips_rejected_edits() {
        let config = Config {
            keep_going: true,
            ..Config::default()
        };
        let output = run_to_string(&config, "4 A1 =B1 B1 =A1 ZZ0 5 B1 3").unwrap();
        assert_eq!(output, "3\t3\n=B1\t3\n");
    }
}
