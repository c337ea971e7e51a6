//! # csvreconcile - tabular dataset reconciliation
//!
//! Compares two comma-separated exports of the same data and reports which
//! rows exist on only one side, either after normalization (case, whitespace,
//! merged columns) or byte for byte.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  File/Bytes │────▶│   Loader    │────▶│   Parser    │────▶│  Reconcile  │
//! │  (ISO/UTF8) │     │ (auto-enc)  │     │  (header)   │     │ (norm/raw)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use csvreconcile::{compare, intersect, ComparisonOptions};
//!
//! let left = "id,name\n1,Alice\n2,Bob";
//! let right = "id,name\n2,Bob\n3,Carol";
//!
//! let common = intersect(left, right).unwrap();
//! assert_eq!(common.intersection, vec!["2,Bob"]);
//!
//! let diff = compare(left, right, &ComparisonOptions::default()).unwrap();
//! assert_eq!(diff.only_in_right, vec!["id,name", "3,carol"]);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Options, headers, records, results
//! - [`parser`] - Header location and naive field splitting
//! - [`normalize`] - Value normalization
//! - [`reconcile`] - Projection, equality, engine and pipeline
//! - [`loader`] - File reading with encoding detection
//! - [`validation`] - Options schema validation
//! - [`config`] - Runtime configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod loader;
pub mod normalize;
pub mod parser;

// Reconciliation
pub mod reconcile;

// Validation
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{LoadError, OptionsError, PipelineError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ComparisonContext,
    ComparisonOptions,
    ComparisonResult,
    Header,
    IntersectionResult,
    MergeRule,
    OptionsPatch,
    RawDifference,
    Record,
    Side,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use loader::{load_bytes, load_file, LoadedDataset};
pub use normalize::{normalize, policy_description};
pub use parser::{locate_header, parse_dataset};

// =============================================================================
// Re-exports - Reconciliation
// =============================================================================

pub use reconcile::{
    compare,
    compare_with,
    difference,
    intersect,
    project_row,
    reconcile_bytes,
    reconcile_files,
    rows_equal,
    DatasetInfo,
    ReconcileReport,
    RowKey,
    Strategy,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{load_options_file, parse_options, validate, validate_options_document};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, CompareResponse, DatasetMetadata, ResponseMetadata};
pub use config::ServerConfig;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
