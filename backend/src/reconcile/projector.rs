//! Row projection: one raw line to a [`Record`].
//!
//! Header columns take the normalized positional value. Merge rules then
//! synthesize their target column from the non-empty source values, each
//! normalized, joined with the rule's separator.

use crate::models::{ComparisonOptions, Record};
use crate::normalize::{apply_all, operations, Operation};
use crate::parser::split_fields;

/// Projects every row of one dataset with the same headers and options.
pub struct RowProjector<'a> {
    headers: &'a [String],
    options: &'a ComparisonOptions,
    ops: Vec<Operation>,
}

impl<'a> RowProjector<'a> {
    pub fn new(headers: &'a [String], options: &'a ComparisonOptions) -> Self {
        Self {
            headers,
            options,
            ops: operations(options),
        }
    }

    /// Project one data line.
    ///
    /// Missing trailing fields project to the empty string; extra fields
    /// beyond the header count are ignored.
    pub fn project(&self, line: &str) -> Record {
        let values = split_fields(line);
        let mut record = Record::with_capacity(self.headers.len() + self.options.merge_columns.len());

        for (i, header) in self.headers.iter().enumerate() {
            let value = values.get(i).copied().unwrap_or("");
            record.insert(header.clone(), apply_all(value, &self.ops));
        }

        for rule in &self.options.merge_columns {
            let parts: Vec<String> = rule
                .source_columns
                .iter()
                .map(|source| self.positional(&values, source))
                .filter(|v| !v.is_empty())
                .map(|v| apply_all(v, &self.ops))
                .collect();

            record.insert(rule.target_column.clone(), parts.join(&rule.separator));
        }

        record
    }

    /// Raw value of `column` in this row; the first matching header wins.
    fn positional<'v>(&self, values: &[&'v str], column: &str) -> &'v str {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|i| values.get(i).copied())
            .unwrap_or("")
    }
}

/// Project a single line. See [`RowProjector::project`].
pub fn project_row(line: &str, headers: &[String], options: &ComparisonOptions) -> Record {
    RowProjector::new(headers, options).project(line)
}
