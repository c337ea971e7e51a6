//! Error types for the reconciliation crate.
//!
//! The reconciliation engine itself never fails: missing input, short rows and
//! header-less files all degrade to empty results. Errors only exist at the
//! edges:
//!
//! - [`LoadError`] - reading and decoding a source file
//! - [`OptionsError`] - parsing or validating comparison options
//! - [`PipelineError`] - top-level orchestration (wraps the above)
//! - [`ServerError`] - HTTP surface
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Loader Errors
// =============================================================================

/// Errors while turning a file or byte buffer into dataset text.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Empty source.
    #[error("Dataset is empty")]
    EmptyFile,

    /// Source larger than the configured limit.
    #[error("Dataset is too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },
}

// =============================================================================
// Options Errors
// =============================================================================

/// Errors while reading comparison options.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Document does not match the options schema.
    #[error("Options do not match schema: {errors:?}")]
    Schema { errors: Vec<String> },

    /// JSON syntax or shape error.
    #[error("Options JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A merge rule that cannot produce a column.
    #[error("Invalid merge rule '{rule}': {message}")]
    InvalidMergeRule { rule: String, message: String },

    /// Options file could not be read.
    #[error("Failed to read options file: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::reconcile::pipeline::reconcile_files`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Left dataset could not be loaded.
    #[error("Left dataset: {0}")]
    Left(#[source] LoadError),

    /// Right dataset could not be loaded.
    #[error("Right dataset: {0}")]
    Right(#[source] LoadError),

    /// Options error.
    #[error("Options error: {0}")]
    Options(#[from] OptionsError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upload body could not be read; `status` is the HTTP status to report.
    #[error("Upload error: {message}")]
    Upload { status: u16, message: String },

    /// Environment variable with an unusable value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Socket bind or serve failure.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for options parsing.
pub type OptionsResult<T> = Result<T, OptionsError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // OptionsError -> PipelineError
        let opt_err = OptionsError::InvalidMergeRule {
            rule: "=full".into(),
            message: "no source columns".into(),
        };
        let pipeline_err: PipelineError = opt_err.into();
        assert!(pipeline_err.to_string().contains("no source columns"));

        // PipelineError -> ServerError
        let server_err: ServerError = PipelineError::Left(LoadError::EmptyFile).into();
        assert!(server_err.to_string().contains("Left dataset"));
        assert!(server_err.to_string().contains("empty"));
    }

    #[test]
    fn test_too_large_format() {
        let err = LoadError::TooLarge { size: 10, limit: 5 };
        let msg = err.to_string();
        assert!(msg.contains("10 bytes"));
        assert!(msg.contains("limit 5"));
    }
}
