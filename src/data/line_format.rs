//! Text rendering of rows.
//!
//! One row per line, samples in channel order separated by commas, newline terminated:
//!
//! ```text
//! 2048,1997,2310,4095
//! <no-data>
//! # fault: sample source initialization failed: ADC not responding
//! ```
//!
//! A drain slot that found the buffer empty produces the `<no-data>` sentinel line. Lines
//! starting with `#` carry faults and are skipped by the parser, as are blank lines.

use crate::data::Sample;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, Write};
use thiserror::Error;

/// Line emitted when a drain slot found no row.
pub const NO_DATA_SENTINEL: &str = "<no-data>";

/// Prefix of fault lines.
pub const FAULT_PREFIX: &str = "# fault: ";

static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,\s]+").expect("valid separator regex"));

/// Reasons a received line could not be turned into a row.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineError {
    /// A token was not an integer.
    #[error("non-integer value '{token}' in line: {line}")]
    NotInteger {
        /// Offending token.
        token: String,
        /// Whole line, trimmed.
        line: String,
    },

    /// The line had the wrong number of samples.
    #[error("expected {expected} values, got {got}: {line}")]
    WrongWidth {
        /// Configured channel count.
        expected: usize,
        /// Values found.
        got: usize,
        /// Whole line, trimmed.
        line: String,
    },
}

/// Write `row` as one comma-separated line.
pub fn write_row<W: Write + ?Sized>(out: &mut W, row: &[Sample]) -> io::Result<()> {
    let mut samples = row.iter();
    if let Some(first) = samples.next() {
        write!(out, "{first}")?;
        for sample in samples {
            write!(out, ",{sample}")?;
        }
    }
    out.write_all(b"\n")
}

/// Write the empty-slot sentinel line.
pub fn write_empty_marker<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{NO_DATA_SENTINEL}")
}

/// Write a fault line. Newlines in `message` are flattened so the fault stays one line.
pub fn write_fault<W: Write + ?Sized>(out: &mut W, message: &str) -> io::Result<()> {
    let flat = message.replace(['\r', '\n'], " ");
    writeln!(out, "{FAULT_PREFIX}{flat}")
}

/// Render a row to an owned line, without the trailing newline.
pub fn format_row(row: &[Sample]) -> String {
    row.iter()
        .map(|sample| sample.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse one received line.
///
/// Commas and/or whitespace separate values. Returns `Ok(None)` for blank lines, the
/// `<no-data>` sentinel and `#` lines.
pub fn parse_line(line: &str, channels: usize) -> Result<Option<Vec<Sample>>, LineError> {
    let line = line.trim();
    if line.is_empty() || line == NO_DATA_SENTINEL || line.starts_with('#') {
        return Ok(None);
    }

    let values = SEPARATOR
        .split(line)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<Sample>().map_err(|_| LineError::NotInteger {
                token: token.to_string(),
                line: line.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() != channels {
        return Err(LineError::WrongWidth {
            expected: channels,
            got: values.len(),
            line: line.to_string(),
        });
    }

    Ok(Some(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_row_and_marker() {
        let mut out = Vec::new();
        write_row(&mut out, &[10, 20, -3]).unwrap();
        write_empty_marker(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "10,20,-3\n<no-data>\n");
    }

    #[test]
    fn test_fault_line_is_single_line() {
        let mut out = Vec::new();
        write_fault(&mut out, "adc\nnot responding").unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# fault: adc not responding\n"
        );
    }

    #[test]
    fn test_parse_accepts_mixed_separators() {
        assert_eq!(parse_line("1, 2 3,4\r\n", 4), Ok(Some(vec![1, 2, 3, 4])));
        assert_eq!(parse_line(&format_row(&[5, 6]), 2), Ok(Some(vec![5, 6])));
    }

    #[test]
    fn test_parse_skips_sentinel_and_faults() {
        assert_eq!(parse_line("<no-data>", 2), Ok(None));
        assert_eq!(parse_line("   ", 2), Ok(None));
        assert_eq!(parse_line("# fault: sink init", 2), Ok(None));
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert!(matches!(
            parse_line("1,x", 2),
            Err(LineError::NotInteger { token, .. }) if token == "x"
        ));
        assert!(matches!(
            parse_line("1,2,3", 2),
            Err(LineError::WrongWidth { expected: 2, got: 3, .. })
        ));
    }
}
