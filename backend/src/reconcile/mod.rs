//! Reconciliation of two datasets.
//!
//! - [`projector`] - one raw line to a normalized [`Record`](crate::models::Record)
//! - [`equality`] - row equality and its hashable [`RowKey`] form
//! - [`engine`] - normalized `compare`, raw `intersect` / `difference`
//! - [`pipeline`] - load two sources, run every view, log progress

pub mod engine;
pub mod equality;
pub mod pipeline;
pub mod projector;

pub use engine::{compare, compare_with, difference, intersect, Strategy};
pub use equality::{rows_equal, RowKey};
pub use pipeline::{reconcile_bytes, reconcile_bytes_limited, reconcile_files, DatasetInfo, ReconcileReport};
pub use projector::{project_row, RowProjector};
