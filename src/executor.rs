//! Executor layer for query execution.
//!
//! Volcano-style iterators: each executor produces one row at a time via
//! `next()`. A scan publishes the row it returns as the current row of its
//! table filter in the [`Session`], which is where column references read
//! their values from.

use crate::access::Value;
use crate::catalog::ColumnInfo;
use crate::session::Session;
use anyhow::Result;

pub mod filter;
pub mod values_scan;

pub use filter::FilterExecutor;
pub use values_scan::ValuesScanExecutor;

/// Trait for all query executors
pub trait Executor: Send {
    /// Initialize (or rewind) the executor. This must be called before `next()`.
    fn init(&mut self, session: &mut Session) -> Result<()>;

    /// Get the next row from the executor.
    /// Returns None when there are no more rows.
    fn next(&mut self, session: &mut Session) -> Result<Option<Vec<Value>>>;

    /// Get the output schema of this executor
    fn output_schema(&self) -> &[ColumnInfo];
}
