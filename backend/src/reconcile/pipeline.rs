//! High-level pipeline API for reconciling two dataset files.
//!
//! Combines loading, header detection and every comparison view in one call.
//!
//! # Example
//!
//! ```rust,ignore
//! use csvreconcile::models::ComparisonOptions;
//! use csvreconcile::reconcile::reconcile_files;
//! use std::path::Path;
//!
//! let report = reconcile_files(
//!     Path::new("january.csv"),
//!     Path::new("february.csv"),
//!     ComparisonOptions::default(),
//! )?;
//! println!("{} rows in common", report.intersection.map_or(0, |i| i.intersection.len()));
//! ```

use serde::Serialize;
use std::path::Path;

use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult};
use crate::loader::{load_bytes_limited, load_file, LoadedDataset};
use crate::models::{
    ComparisonContext, ComparisonOptions, ComparisonResult, IntersectionResult, RawDifference, Side,
};
use crate::parser::parse_dataset;

/// What was found in one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
    pub encoding: String,
    pub headers: Vec<String>,
    /// Non-blank data rows after the header
    pub row_count: usize,
}

impl DatasetInfo {
    fn from_loaded(dataset: &LoadedDataset) -> Self {
        let parsed = parse_dataset(&dataset.text);
        Self {
            encoding: dataset.encoding.clone(),
            headers: parsed.header.headers,
            row_count: parsed.rows.len(),
        }
    }
}

/// Every view of one reconciliation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub left: DatasetInfo,
    pub right: DatasetInfo,
    /// Options actually applied
    pub options: ComparisonOptions,
    pub comparison: Option<ComparisonResult>,
    pub difference: Option<RawDifference>,
    pub intersection: Option<IntersectionResult>,
}

/// Reconcile two dataset files.
///
/// This is the main entry point. It:
/// 1. Checks the options
/// 2. Loads and decodes both files
/// 3. Runs the normalized comparison and both raw views
pub fn reconcile_files(left: &Path, right: &Path, options: ComparisonOptions) -> PipelineResult<ReconcileReport> {
    options.validate()?;

    log_info(format!("📖 Reading {}...", left.display()));
    let left = load_file(left).map_err(PipelineError::Left)?;
    log_info(format!("📖 Reading {}...", right.display()));
    let right = load_file(right).map_err(PipelineError::Right)?;

    reconcile_loaded(left, right, options)
}

/// Same as [`reconcile_files`] but accepts raw bytes.
pub fn reconcile_bytes(left: &[u8], right: &[u8], options: ComparisonOptions) -> PipelineResult<ReconcileReport> {
    reconcile_bytes_limited(left, right, options, usize::MAX)
}

/// [`reconcile_bytes`] rejecting any input over `limit` bytes.
pub fn reconcile_bytes_limited(
    left: &[u8],
    right: &[u8],
    options: ComparisonOptions,
    limit: usize,
) -> PipelineResult<ReconcileReport> {
    options.validate()?;

    log_info(format!("📖 Reading uploads ({} + {} bytes)...", left.len(), right.len()));
    let left = load_bytes_limited(left, limit).map_err(PipelineError::Left)?;
    let right = load_bytes_limited(right, limit).map_err(PipelineError::Right)?;

    reconcile_loaded(left, right, options)
}

fn reconcile_loaded(
    left: LoadedDataset,
    right: LoadedDataset,
    options: ComparisonOptions,
) -> PipelineResult<ReconcileReport> {
    let left_info = DatasetInfo::from_loaded(&left);
    let right_info = DatasetInfo::from_loaded(&right);
    describe(Side::Left, &left_info);
    describe(Side::Right, &right_info);

    if left_info.headers != right_info.headers && !left_info.headers.is_empty() && !right_info.headers.is_empty() {
        log_warning("Header rows differ; normalized comparison runs over each side's own columns");
    }
    for rule in &options.merge_columns {
        log_info(format!("🔗 Merge rule: {}", rule));
    }

    let context = ComparisonContext::new(options)
        .with_dataset(Side::Left, left.text)
        .with_dataset(Side::Right, right.text);

    log_info("⚙️  Comparing normalized rows...");
    let comparison = context.compare();
    if let Some(ref c) = comparison {
        log_success(format!(
            "{} only in left, {} only in right",
            c.only_in_left.len().saturating_sub(1),
            c.only_in_right.len().saturating_sub(1)
        ));
    }

    log_info("⚙️  Matching raw rows...");
    let difference = context.difference();
    let intersection = context.intersect();
    if let Some(ref i) = intersection {
        log_success(format!("{} identical rows", i.intersection.len()));
    }

    Ok(ReconcileReport {
        left: left_info,
        right: right_info,
        options: context.options,
        comparison,
        difference,
        intersection,
    })
}

fn describe(side: Side, info: &DatasetInfo) {
    if info.headers.is_empty() {
        log_warning(format!("No header row found in {} dataset", side));
        return;
    }
    log_success(format!(
        "{} dataset: {} columns, {} rows ({})",
        side,
        info.headers.len(),
        info.row_count,
        info.encoding
    ));
    for (i, col) in info.headers.iter().enumerate() {
        log_info_indent(format!("[{:2}] {}", i + 1, col), 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::models::MergeRule;
    use std::io::Write;

    #[test]
    fn test_reconcile_bytes_all_views() {
        let report = reconcile_bytes(
            b"export 2024\n\n\nid,name\n1,Alice\n2,Bob\n",
            b"id,name\r\n2,bob\r\n3,Carol\r\n",
            ComparisonOptions::default(),
        )
        .unwrap();

        assert_eq!(report.left.headers, vec!["id", "name"]);
        assert_eq!(report.left.row_count, 2);
        assert_eq!(report.right.row_count, 2);

        let comparison = report.comparison.unwrap();
        assert_eq!(comparison.only_in_left, vec!["id,name", "1,alice"]);
        assert_eq!(comparison.only_in_right, vec!["id,name", "3,carol"]);

        // raw mode is case sensitive
        assert!(report.intersection.unwrap().intersection.is_empty());
        assert_eq!(report.difference.unwrap().only_in_left, vec!["1,Alice", "2,Bob"]);
    }

    #[test]
    fn test_load_errors_name_the_side() {
        let err = reconcile_bytes(b"a,b\n1,2", b"", ComparisonOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Right(LoadError::EmptyFile)));
    }

    #[test]
    fn test_upload_limit() {
        let err = reconcile_bytes_limited(b"a\n1", b"a,b,c,d\n1,2,3,4", ComparisonOptions::default(), 8).unwrap_err();
        assert!(matches!(err, PipelineError::Right(LoadError::TooLarge { limit: 8, .. })));
    }

    #[test]
    fn test_invalid_options_rejected_before_loading() {
        let options = ComparisonOptions {
            merge_columns: vec![MergeRule::new(&[], "x")],
            ..ComparisonOptions::default()
        };
        let err = reconcile_bytes(b"", b"", options).unwrap_err();
        assert!(matches!(err, PipelineError::Options(_)));
    }

    #[test]
    fn test_reconcile_files() {
        let mut left = tempfile::NamedTempFile::new().unwrap();
        let mut right = tempfile::NamedTempFile::new().unwrap();
        write!(left, "id,name\n1,Alice\n2,Bob").unwrap();
        write!(right, "id,name\n2,Bob\n3,Carol").unwrap();

        let report = reconcile_files(left.path(), right.path(), ComparisonOptions::default()).unwrap();
        assert_eq!(report.intersection.unwrap().intersection, vec!["2,Bob"]);
        assert_eq!(report.left.encoding, "utf-8");
    }
}
