//! Naive comma-separated text parsing.
//!
//! Lines are split on `\n`, fields on `,`. No quoting, no escaping: a comma
//! inside a value starts a new field. The loader has already converted CRLF
//! line endings by the time text reaches this module.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Header;

/// Lines made of nothing but dots are treated as filler above the header.
static DOTS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.+$").unwrap());

/// A dataset split into its header and candidate data rows.
#[derive(Debug, Clone)]
pub struct ParsedDataset<'a> {
    pub header: Header,
    /// Data lines after the header, blank lines removed, text untouched.
    pub rows: Vec<&'a str>,
}

/// Split text into lines on `\n`.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Split a line into positional values on `,`. Values are not trimmed.
pub fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').collect()
}

fn is_header_candidate(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !DOTS_ONLY.is_match(trimmed) && trimmed.contains(',')
}

/// Find the header line.
///
/// The first line that is not blank, not made only of `.` characters, and
/// contains a comma is the header. Everything above it is discarded.
/// When no line qualifies, the header is empty and `start_index` points past
/// the end so that no data rows are produced.
///
/// # Example
/// ```
/// use csvreconcile::parser::locate_header;
///
/// let header = locate_header(&["", ".", "a,b,c", "1,2,3"]);
/// assert_eq!(header.headers, vec!["a", "b", "c"]);
/// assert_eq!(header.header_index, Some(2));
/// assert_eq!(header.start_index, 3);
/// ```
pub fn locate_header<S: AsRef<str>>(lines: &[S]) -> Header {
    match lines.iter().position(|l| is_header_candidate(l.as_ref())) {
        Some(idx) => Header {
            headers: split_fields(lines[idx].as_ref())
                .into_iter()
                .map(String::from)
                .collect(),
            header_index: Some(idx),
            start_index: idx + 1,
        },
        None => Header {
            headers: Vec::new(),
            header_index: None,
            start_index: lines.len() + 1,
        },
    }
}

/// Lines from `start_index` on, skipping blank ones.
pub fn data_rows<'a>(lines: &[&'a str], start_index: usize) -> Vec<&'a str> {
    lines
        .iter()
        .skip(start_index)
        .filter(|line| !line.trim().is_empty())
        .copied()
        .collect()
}

/// Locate the header and collect the data rows of a text blob.
pub fn parse_dataset(text: &str) -> ParsedDataset<'_> {
    let lines = split_lines(text);
    let header = locate_header(&lines);
    let rows = data_rows(&lines, header.start_index);
    ParsedDataset { header, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_after_filler_lines() {
        let header = locate_header(&["", ".", "a,b,c", "1,2,3"]);
        assert_eq!(header.headers, vec!["a", "b", "c"]);
        assert_eq!(header.header_index, Some(2));
        assert_eq!(header.start_index, 3);
    }

    #[test]
    fn test_dot_runs_and_commaless_lines_skipped() {
        let header = locate_header(&["Report", "  ...  ", "x, y", "1, 2"]);
        assert_eq!(header.headers, vec!["x", " y"]);
        assert_eq!(header.start_index, 3);
    }

    #[test]
    fn test_no_header_found() {
        let lines = ["", "   ", "...", "no commas here"];
        let header = locate_header(&lines);
        assert!(header.headers.is_empty());
        assert_eq!(header.header_index, None);
        assert_eq!(header.start_index, lines.len() + 1);
        assert!(data_rows(&lines, header.start_index).is_empty());
    }

    #[test]
    fn test_empty_input() {
        let header = locate_header::<&str>(&[]);
        assert!(header.headers.is_empty());
        assert_eq!(header.start_index, 1);
    }

    #[test]
    fn test_blank_rows_filtered() {
        let parsed = parse_dataset("id,name\n1,Alice\n\n   \n2,Bob\n");
        assert_eq!(parsed.header.headers, vec!["id", "name"]);
        assert_eq!(parsed.rows, vec!["1,Alice", "2,Bob"]);
    }

    #[test]
    fn test_duplicate_headers_kept() {
        let parsed = parse_dataset("a,a,b\n1,2,3");
        assert_eq!(parsed.header.headers, vec!["a", "a", "b"]);
    }

    #[test]
    fn test_split_fields_is_naive() {
        assert_eq!(split_fields("\"x,y\",z"), vec!["\"x", "y\"", "z"]);
        assert_eq!(split_fields(" a ,b"), vec![" a ", "b"]);
        assert_eq!(split_fields(""), vec![""]);
    }
}
