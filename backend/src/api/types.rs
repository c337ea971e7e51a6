//! REST API types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{ComparisonOptions, ComparisonResult, IntersectionResult, RawDifference};
use crate::reconcile::{DatasetInfo, ReconcileReport};

/// Response sent after two datasets are uploaded and reconciled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    /// Unique job identifier
    pub job_id: String,

    /// "ready", or "empty" when no view could be produced
    pub status: String,

    pub generated_at: DateTime<Utc>,

    /// Normalized-mode exclusive rows
    pub comparison: Option<ComparisonResult>,

    /// Raw-mode exclusive rows
    pub difference: Option<RawDifference>,

    /// Raw-mode shared rows
    pub intersection: Option<IntersectionResult>,

    pub metadata: ResponseMetadata,
}

/// Metadata about the reconciliation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub left: DatasetMetadata,
    pub right: DatasetMetadata,
    pub options: ComparisonOptions,
    /// Rows present in both datasets, byte for byte
    pub identical_rows: usize,
}

/// Per-dataset metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub file_name: Option<String>,
    pub encoding: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl DatasetMetadata {
    pub fn new(info: DatasetInfo, file_name: Option<String>) -> Self {
        Self {
            file_name,
            encoding: info.encoding,
            row_count: info.row_count,
            columns: info.headers,
        }
    }
}

impl CompareResponse {
    /// Build a response from a report and the uploaded file names.
    pub fn from_report(report: ReconcileReport, left_name: Option<String>, right_name: Option<String>) -> Self {
        let status = if report.comparison.is_some() { "ready" } else { "empty" };
        let identical_rows = report.intersection.as_ref().map_or(0, |i| i.intersection.len());

        CompareResponse {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            generated_at: Utc::now(),
            comparison: report.comparison,
            difference: report.difference,
            intersection: report.intersection,
            metadata: ResponseMetadata {
                left: DatasetMetadata::new(report.left, left_name),
                right: DatasetMetadata::new(report.right, right_name),
                options: report.options,
                identical_rows,
            },
        }
    }
}

impl From<ReconcileReport> for CompareResponse {
    fn from(report: ReconcileReport) -> Self {
        Self::from_report(report, None, None)
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "generatedAt": Utc::now(),
        "error": error,
        "comparison": null,
        "difference": null,
        "intersection": null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile_bytes;

    #[test]
    fn test_response_from_report() {
        let report = reconcile_bytes(b"id,name\n1,a\n2,b", b"id,name\n2,b", ComparisonOptions::default()).unwrap();
        let response = CompareResponse::from_report(report, Some("left.csv".into()), None);

        assert_eq!(response.status, "ready");
        assert_eq!(response.metadata.identical_rows, 1);
        assert_eq!(response.metadata.left.file_name.as_deref(), Some("left.csv"));
        assert_eq!(response.metadata.right.row_count, 1);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["comparison"]["onlyInLeft"][1], "1,a");
        assert_eq!(json["metadata"]["options"]["normalizeWhitespace"], true);
        assert!(json["jobId"].as_str().is_some());
    }

    #[test]
    fn test_error_response_shape() {
        let json = error_response("No left file provided");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "No left file provided");
        assert!(json["comparison"].is_null());
    }
}
