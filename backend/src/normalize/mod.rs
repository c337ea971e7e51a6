//! Value normalization.
//!
//! [`ComparisonOptions`] is turned into an ordered list of [`Operation`]s
//! which are then applied in sequence to each value:
//!
//! | caseSensitive | normalizeWhitespace | operations |
//! |---|---|---|
//! | false | true | lowercase, collapse whitespace |
//! | false | false | lowercase, strip whitespace |
//! | true | true | collapse whitespace |
//! | true | false | strip whitespace |
//!
//! Every combination is idempotent: normalizing an already normalized value
//! returns it unchanged.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::ComparisonOptions;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One normalization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Convert to lowercase
    Lowercase,
    /// Collapse whitespace runs to a single space, then trim both ends
    CollapseWhitespace,
    /// Remove every whitespace character
    StripWhitespace,
}

impl Operation {
    /// Apply this operation to a value
    pub fn apply(&self, value: &str) -> String {
        match self {
            Operation::Lowercase => value.to_lowercase(),
            Operation::CollapseWhitespace => {
                WHITESPACE_RUN.replace_all(value, " ").trim().to_string()
            }
            Operation::StripWhitespace => value.chars().filter(|c| !c.is_whitespace()).collect(),
        }
    }
}

/// Operations implied by `options`, in application order.
pub fn operations(options: &ComparisonOptions) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(2);
    if !options.case_sensitive {
        ops.push(Operation::Lowercase);
    }
    ops.push(if options.normalize_whitespace {
        Operation::CollapseWhitespace
    } else {
        Operation::StripWhitespace
    });
    ops
}

/// Normalize a single value.
///
/// # Example
/// ```
/// use csvreconcile::models::ComparisonOptions;
/// use csvreconcile::normalize::normalize;
///
/// let options = ComparisonOptions::default();
/// assert_eq!(normalize("  Foo   Bar ", &options), "foo bar");
/// ```
pub fn normalize(value: &str, options: &ComparisonOptions) -> String {
    apply_all(value, &operations(options))
}

/// Apply a precomputed operation list.
///
/// Callers normalizing many values with the same options should compute
/// [`operations`] once and use this.
pub fn apply_all(value: &str, ops: &[Operation]) -> String {
    if value.is_empty() {
        return String::new();
    }
    ops.iter()
        .fold(value.to_string(), |acc, op| op.apply(&acc))
}

/// Human-readable description of the normalization policy.
pub fn policy_description() -> String {
    r#"Normalization policy (applied to every compared value):

| caseSensitive | normalizeWhitespace | effect |
|---------------|---------------------|--------|
| false         | -                   | lowercase first |
| -             | true                | collapse whitespace runs to one space, trim ends |
| -             | false               | remove all whitespace characters |

Merge rules join the normalized, non-empty source values with the rule's
separator (default " ") and store the result under the target column.

Example options in JSON:
{
  "caseSensitive": false,
  "normalizeWhitespace": true,
  "mergeColumns": [
    {"sourceColumns": ["first", "last"], "targetColumn": "name", "separator": " "}
  ]
}"#
    .to_string()
}
