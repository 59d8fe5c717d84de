//! Name resolution for column references.
//!
//! A [`ColumnResolver`] exposes the columns of one access path (a table in
//! the FROM clause) to the binder. Every [`TableFilter`] carries a
//! process-unique [`FilterId`], so two joined copies of the same base table
//! stay distinguishable even though they share names.

pub mod column_info;
pub mod table_filter;

pub use column_info::ColumnInfo;
pub use table_filter::TableFilter;

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_FILTER_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of an access path within the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterId(pub u32);

impl FilterId {
    /// Allocate a fresh identity
    pub fn next() -> Self {
        FilterId(NEXT_FILTER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Resolves column names for the binder
pub trait ColumnResolver {
    fn filter_id(&self) -> FilterId;

    fn table_alias(&self) -> &str;

    fn columns(&self) -> &[ColumnInfo];

    /// Find a column by name, returning its position
    fn find_column(&self, name: &str) -> Option<(usize, &ColumnInfo)> {
        self.columns()
            .iter()
            .enumerate()
            .find(|(_, column)| column.matches(name))
    }
}
