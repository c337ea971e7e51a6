//! JSON Schema validation for comparison options documents.
//!
//! Options arrive as JSON from a file (`--options`) or a multipart field.
//! The document is checked against an embedded Draft 7 schema before it is
//! deserialized, so unknown keys and wrong types are reported as a list
//! rather than as the first serde error.
//!
//! # Embedded Schemas
//!
//! Embedded at compile time from the `schemas/` directory:
//! - `comparison-options.json`
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use csvreconcile::validation::validate_options_document;
//!
//! let doc = json!({ "caseSensitive": true, "mergeColumns": [] });
//! assert!(validate_options_document(&doc).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;
use std::path::Path;

use crate::error::{OptionsError, OptionsResult};
use crate::models::ComparisonOptions;

static OPTIONS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/comparison-options.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every error otherwise
///
/// # Example
/// ```
/// use serde_json::json;
/// use csvreconcile::validation::validate;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["name"],
///     "properties": { "name": { "type": "string" } }
/// });
///
/// assert!(validate(&schema, &json!({ "name": "test" })).is_ok());
/// assert!(validate(&schema, &json!({ "age": 42 })).is_err());
/// ```
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate against the embedded comparison options schema.
pub fn validate_options_document(data: &Value) -> Result<(), Vec<String>> {
    validate(&OPTIONS_SCHEMA, data)
}

/// Parse options JSON: schema check, deserialize, then merge-rule checks.
pub fn parse_options(text: &str) -> OptionsResult<ComparisonOptions> {
    let document: Value = serde_json::from_str(text)?;
    validate_options_document(&document).map_err(|errors| OptionsError::Schema { errors })?;

    let options: ComparisonOptions = serde_json::from_value(document)?;
    options.validate()?;
    Ok(options)
}

/// Read and parse an options file.
pub fn load_options_file<P: AsRef<Path>>(path: P) -> OptionsResult<ComparisonOptions> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_options(&text)
}

impl ComparisonOptions {
    /// See [`parse_options`].
    pub fn from_json(text: &str) -> OptionsResult<Self> {
        parse_options(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_valid_document() {
        let doc = json!({
            "caseSensitive": true,
            "normalizeWhitespace": false,
            "mergeColumns": [
                { "sourceColumns": ["first", "last"], "targetColumn": "name", "separator": "-" }
            ]
        });
        assert!(validate_options_document(&doc).is_ok());
        assert!(validate_options_document(&json!({})).is_ok());
    }

    #[test]
    fn test_invalid_document_lists_errors() {
        let doc = json!({
            "caseSensitive": "yes",
            "mergeColumns": [{ "sourceColumns": [], "targetColumn": "" }],
            "colour": "red"
        });
        let errors = validate_options_document(&doc).unwrap_err();
        assert!(errors.len() >= 3, "errors: {:?}", errors);
    }

    #[test]
    fn test_from_json_applies_defaults() {
        let options = ComparisonOptions::from_json(
            r#"{"mergeColumns":[{"sourceColumns":["a","b"],"targetColumn":"ab"}]}"#,
        )
        .unwrap();

        assert!(!options.case_sensitive);
        assert!(options.normalize_whitespace);
        assert_eq!(options.merge_columns[0].separator, " ");
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(ComparisonOptions::from_json("{"), Err(OptionsError::Json(_))));
        assert!(matches!(
            ComparisonOptions::from_json(r#"{"caseSensitive": 1}"#),
            Err(OptionsError::Schema { .. })
        ));
    }

    #[test]
    fn test_load_options_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"caseSensitive": true}}"#).unwrap();

        let options = load_options_file(file.path()).unwrap();
        assert!(options.case_sensitive);

        assert!(matches!(load_options_file("/no/such/options.json"), Err(OptionsError::Io(_))));
    }
}
