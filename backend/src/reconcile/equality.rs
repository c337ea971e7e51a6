//! Row equality.
//!
//! Two records are equal when every key present on either side normalizes
//! to the same value, an absent key counting as the empty string.
//! [`RowKey`] is the hashable form of that relation: the sorted
//! `(key, normalized value)` pairs whose value is non-empty.

use std::collections::BTreeMap;

use crate::models::{ComparisonOptions, Record};
use crate::normalize::{apply_all, operations, Operation};

/// Canonical, hashable form of a record under a set of options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(Vec<(String, String)>);

impl RowKey {
    pub fn from_record(record: &Record, options: &ComparisonOptions) -> Self {
        Self::with_ops(record, &operations(options))
    }

    pub(crate) fn with_ops(record: &Record, ops: &[Operation]) -> Self {
        let fields: BTreeMap<&str, String> = record
            .iter()
            .map(|(k, v)| (k.as_str(), apply_all(v, ops)))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        RowKey(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

/// Field-by-field equality over the union of both records' keys.
pub fn rows_equal(a: &Record, b: &Record, options: &ComparisonOptions) -> bool {
    let ops = operations(options);
    let value = |r: &Record, key: &str| apply_all(r.get(key).map(String::as_str).unwrap_or(""), &ops);

    a.keys()
        .chain(b.keys())
        .all(|key| value(a, key.as_str()) == value(b, key.as_str()))
}
