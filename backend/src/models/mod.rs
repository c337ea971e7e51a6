//! Domain models for the reconciliation engine.
//!
//! - [`ComparisonOptions`] / [`MergeRule`] / [`OptionsPatch`] - normalization and merge policy
//! - [`Header`] - located header row and data offset
//! - [`Record`] - one projected row
//! - [`ComparisonResult`] / [`IntersectionResult`] / [`RawDifference`] - engine outputs
//! - [`Side`] / [`ComparisonContext`] - the two datasets plus options for one call

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::OptionsError;

// =============================================================================
// Options
// =============================================================================

/// A synthetic column built by joining several source columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRule {
    /// Columns to join, in order.
    pub source_columns: Vec<String>,
    /// Column receiving the joined value.
    pub target_column: String,
    /// Placed between non-empty source values.
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    " ".to_string()
}

impl MergeRule {
    pub fn new(sources: &[&str], target: impl Into<String>) -> Self {
        Self {
            source_columns: sources.iter().map(|s| s.to_string()).collect(),
            target_column: target.into(),
            separator: default_separator(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Reject rules that can never produce a value.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.target_column.is_empty() {
            return Err(OptionsError::InvalidMergeRule {
                rule: self.to_string(),
                message: "target column is empty".into(),
            });
        }
        if self.source_columns.is_empty() {
            return Err(OptionsError::InvalidMergeRule {
                rule: self.to_string(),
                message: "no source columns".into(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for MergeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.source_columns.join("+"), self.target_column)?;
        if self.separator != default_separator() {
            write!(f, ":{}", self.separator)?;
        }
        Ok(())
    }
}

/// Parses the CLI form `first+last=full_name`, optionally followed by
/// `:SEP` to set the separator (`first+last=full_name:-`).
impl FromStr for MergeRule {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sources, rest) = s.split_once('=').ok_or_else(|| OptionsError::InvalidMergeRule {
            rule: s.to_string(),
            message: "expected 'source+source=target[:separator]'".into(),
        })?;
        let (target, separator) = match rest.split_once(':') {
            Some((target, separator)) => (target, separator.to_string()),
            None => (rest, default_separator()),
        };

        let rule = MergeRule {
            source_columns: sources
                .split('+')
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect(),
            target_column: target.to_string(),
            separator,
        };
        rule.validate()?;
        Ok(rule)
    }
}

/// Normalization and merge policy for one comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOptions {
    /// When false, values are lowercased before comparison.
    #[serde(default)]
    pub case_sensitive: bool,
    /// When true, whitespace runs collapse to one space and ends are trimmed.
    /// When false, all whitespace is removed.
    #[serde(default = "default_true")]
    pub normalize_whitespace: bool,
    #[serde(default)]
    pub merge_columns: Vec<MergeRule>,
}

fn default_true() -> bool {
    true
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            normalize_whitespace: true,
            merge_columns: Vec::new(),
        }
    }
}

impl ComparisonOptions {
    /// Apply the fields present in `patch`, leaving the others untouched.
    pub fn merge(&mut self, patch: OptionsPatch) {
        if let Some(case_sensitive) = patch.case_sensitive {
            self.case_sensitive = case_sensitive;
        }
        if let Some(normalize_whitespace) = patch.normalize_whitespace {
            self.normalize_whitespace = normalize_whitespace;
        }
        if let Some(merge_columns) = patch.merge_columns {
            self.merge_columns = merge_columns;
        }
    }

    /// Same as [`merge`](Self::merge) but by value.
    pub fn merged(mut self, patch: OptionsPatch) -> Self {
        self.merge(patch);
        self
    }

    /// Check every merge rule.
    pub fn validate(&self) -> Result<(), OptionsError> {
        self.merge_columns.iter().try_for_each(MergeRule::validate)
    }

    /// Output columns for a dataset: its headers followed by merge targets
    /// not already among them.
    pub fn output_headers(&self, headers: &[String]) -> Vec<String> {
        let mut out = headers.to_vec();
        for rule in &self.merge_columns {
            if !out.contains(&rule.target_column) {
                out.push(rule.target_column.clone());
            }
        }
        out
    }
}

/// Partial update for [`ComparisonOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalize_whitespace: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_columns: Option<Vec<MergeRule>>,
}

impl OptionsPatch {
    pub fn is_empty(&self) -> bool {
        self.case_sensitive.is_none()
            && self.normalize_whitespace.is_none()
            && self.merge_columns.is_none()
    }
}

// =============================================================================
// Header + Record
// =============================================================================

/// Header row of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Column names, untrimmed, duplicates kept.
    pub headers: Vec<String>,
    /// Zero-based line index of the header, if one was found.
    pub header_index: Option<usize>,
    /// Line offset where data rows begin.
    pub start_index: usize,
}

/// Column name to value, built fresh for every row.
pub type Record = HashMap<String, String>;

// =============================================================================
// Results
// =============================================================================

/// Normalized-mode output: serialized exclusive rows, header line first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub only_in_left: Vec<String>,
    pub only_in_right: Vec<String>,
}

/// Raw-mode intersection: left headers plus the shared raw lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionResult {
    pub headers: Vec<String>,
    pub intersection: Vec<String>,
}

/// Raw-mode exclusivity: raw lines present on one side only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDifference {
    pub headers: Vec<String>,
    pub only_in_left: Vec<String>,
    pub only_in_right: Vec<String>,
}

// =============================================================================
// Context
// =============================================================================

/// Which of the two datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Both datasets and the options snapshot for one reconciliation.
///
/// Owned by the caller and passed into the engine; nothing is cached
/// between calls.
#[derive(Debug, Clone, Default)]
pub struct ComparisonContext {
    pub left: Option<String>,
    pub right: Option<String>,
    pub options: ComparisonOptions,
}

impl ComparisonContext {
    pub fn new(options: ComparisonOptions) -> Self {
        Self {
            left: None,
            right: None,
            options,
        }
    }

    pub fn with_dataset(mut self, side: Side, text: impl Into<String>) -> Self {
        self.set_dataset(side, text);
        self
    }

    pub fn set_dataset(&mut self, side: Side, text: impl Into<String>) {
        let slot = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        *slot = Some(text.into());
    }

    pub fn dataset(&self, side: Side) -> Option<&str> {
        match side {
            Side::Left => self.left.as_deref(),
            Side::Right => self.right.as_deref(),
        }
    }

    fn pair(&self) -> Option<(&str, &str)> {
        Some((self.left.as_deref()?, self.right.as_deref()?))
    }

    /// Normalized-mode comparison of the two datasets.
    pub fn compare(&self) -> Option<ComparisonResult> {
        let (left, right) = self.pair()?;
        crate::reconcile::compare(left, right, &self.options)
    }

    /// Raw-mode intersection of the two datasets.
    pub fn intersect(&self) -> Option<IntersectionResult> {
        let (left, right) = self.pair()?;
        crate::reconcile::intersect(left, right)
    }

    /// Raw-mode exclusive rows of the two datasets.
    pub fn difference(&self) -> Option<RawDifference> {
        let (left, right) = self.pair()?;
        crate::reconcile::difference(left, right)
    }
}
