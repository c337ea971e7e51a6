//! Reconciliation engine.
//!
//! Two separately named modes, both pure:
//!
//! - **Normalized** ([`compare`]): rows are projected and compared with
//!   [`rows_equal`](super::equality::rows_equal) semantics; the exclusive rows
//!   of each side are re-serialized from their projected values.
//! - **Raw** ([`intersect`], [`difference`]): rows are compared by their exact
//!   line text; output lines are returned unmodified.
//!
//! Both modes return `None` when either dataset is empty.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌───────────────┐   ┌──────────────┐
//! │ raw text │──▶│ Header Locator│──▶│ Row Projector │──▶│ RowKey index │──▶ only-left / only-right
//! └──────────┘   └───────────────┘   └───────────────┘   └──────────────┘
//! ```
//!
//! Exclusive rows are found by indexing the other side's row keys in a hash
//! set (O(n + m)). [`Strategy::Pairwise`] keeps the direct O(n * m) scan and
//! produces identical output.

use std::collections::HashSet;

use super::equality::{rows_equal, RowKey};
use super::projector::RowProjector;
use crate::models::{ComparisonOptions, ComparisonResult, IntersectionResult, RawDifference, Record};
use crate::normalize::operations;
use crate::parser::parse_dataset;

/// How exclusive rows are located in normalized mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Group rows by [`RowKey`].
    #[default]
    Hashed,
    /// Scan every row of the other side.
    Pairwise,
}

/// One side projected under the active options.
struct ProjectedDataset {
    has_header: bool,
    output_headers: Vec<String>,
    records: Vec<Record>,
    keys: Vec<RowKey>,
}

impl ProjectedDataset {
    fn build(text: &str, options: &ComparisonOptions) -> Self {
        let parsed = parse_dataset(text);
        let projector = RowProjector::new(&parsed.header.headers, options);
        let ops = operations(options);

        let records: Vec<Record> = parsed.rows.iter().map(|line| projector.project(line)).collect();
        let keys = records.iter().map(|r| RowKey::with_ops(r, &ops)).collect();

        Self {
            has_header: parsed.header.header_index.is_some(),
            output_headers: options.output_headers(&parsed.header.headers),
            records,
            keys,
        }
    }

    fn serialize(&self, record: &Record) -> String {
        self.output_headers
            .iter()
            .map(|h| record.get(h).map(String::as_str).unwrap_or(""))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Header line followed by the rows for which `keep(index)` holds.
    /// A dataset without a header contributes nothing.
    fn lines_where(&self, keep: impl Fn(usize) -> bool) -> Vec<String> {
        if !self.has_header {
            return Vec::new();
        }
        std::iter::once(self.output_headers.join(","))
            .chain(
                self.records
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| keep(*i))
                    .map(|(_, r)| self.serialize(r)),
            )
            .collect()
    }

    fn exclusive_against(&self, other: &ProjectedDataset, options: &ComparisonOptions, strategy: Strategy) -> Vec<String> {
        match strategy {
            Strategy::Hashed => {
                let index: HashSet<&RowKey> = other.keys.iter().collect();
                self.lines_where(|i| !index.contains(&self.keys[i]))
            }
            Strategy::Pairwise => self.lines_where(|i| {
                !other
                    .records
                    .iter()
                    .any(|r| rows_equal(&self.records[i], r, options))
            }),
        }
    }
}

/// Normalized-mode comparison.
///
/// # Example
/// ```
/// use csvreconcile::models::ComparisonOptions;
/// use csvreconcile::reconcile::compare;
///
/// let result = compare("id,name\n1,Alice\n2,Bob", "id,name\n2, BOB \n3,Carol", &ComparisonOptions::default()).unwrap();
/// assert_eq!(result.only_in_left, vec!["id,name", "1,alice"]);
/// assert_eq!(result.only_in_right, vec!["id,name", "3,carol"]);
/// ```
pub fn compare(left: &str, right: &str, options: &ComparisonOptions) -> Option<ComparisonResult> {
    compare_with(left, right, options, Strategy::default())
}

/// [`compare`] with an explicit matching strategy.
pub fn compare_with(
    left: &str,
    right: &str,
    options: &ComparisonOptions,
    strategy: Strategy,
) -> Option<ComparisonResult> {
    if left.is_empty() || right.is_empty() {
        return None;
    }

    let left = ProjectedDataset::build(left, options);
    let right = ProjectedDataset::build(right, options);

    Some(ComparisonResult {
        only_in_left: left.exclusive_against(&right, options, strategy),
        only_in_right: right.exclusive_against(&left, options, strategy),
    })
}

/// Raw-mode intersection: left data lines found verbatim among the right
/// data lines, with the left header.
pub fn intersect(left: &str, right: &str) -> Option<IntersectionResult> {
    if left.is_empty() || right.is_empty() {
        return None;
    }

    let left = parse_dataset(left);
    let right = parse_dataset(right);
    let index: HashSet<&str> = right.rows.iter().copied().collect();

    Some(IntersectionResult {
        headers: left.header.headers,
        intersection: left
            .rows
            .iter()
            .filter(|row| index.contains(*row))
            .map(|row| row.to_string())
            .collect(),
    })
}

/// Raw-mode exclusivity: data lines of each side not found verbatim on the
/// other, with the left header.
pub fn difference(left: &str, right: &str) -> Option<RawDifference> {
    if left.is_empty() || right.is_empty() {
        return None;
    }

    let left = parse_dataset(left);
    let right = parse_dataset(right);
    let left_index: HashSet<&str> = left.rows.iter().copied().collect();
    let right_index: HashSet<&str> = right.rows.iter().copied().collect();

    let exclusive = |rows: &[&str], other: &HashSet<&str>| -> Vec<String> {
        rows.iter()
            .filter(|row| !other.contains(*row))
            .map(|row| row.to_string())
            .collect()
    };

    Some(RawDifference {
        only_in_left: exclusive(left.rows.as_slice(), &right_index),
        only_in_right: exclusive(right.rows.as_slice(), &left_index),
        headers: left.header.headers,
    })
}
