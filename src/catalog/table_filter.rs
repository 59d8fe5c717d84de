//! A table in the FROM clause: resolver for its columns and sink for the
//! index conditions the planner pushes down to it.

use crate::access::DataType;
use crate::catalog::{ColumnInfo, ColumnResolver, FilterId};
use crate::expression::ExpressionResult;
use crate::index::{IndexCondition, RangeSink, ScanRange};
use crate::session::Session;
use log::trace;

#[derive(Debug, Clone)]
pub struct TableFilter {
    id: FilterId,
    alias: String,
    columns: Vec<ColumnInfo>,
    index_conditions: Vec<IndexCondition>,
}

impl TableFilter {
    pub fn new(alias: impl Into<String>, columns: Vec<ColumnInfo>) -> Self {
        Self {
            id: FilterId::next(),
            alias: alias.into(),
            columns,
            index_conditions: Vec::new(),
        }
    }

    /// Shorthand for tests and tools: `(name, type)` pairs
    pub fn with_columns(alias: impl Into<String>, columns: &[(&str, DataType)]) -> Self {
        Self::new(
            alias,
            columns
                .iter()
                .map(|(name, data_type)| ColumnInfo::new(*name, *data_type))
                .collect(),
        )
    }

    pub fn id(&self) -> FilterId {
        self.id
    }

    pub fn index_conditions(&self) -> &[IndexCondition] {
        &self.index_conditions
    }

    pub fn clear_index_conditions(&mut self) {
        self.index_conditions.clear();
    }

    /// Fold the collected conditions on one column into a scan range
    pub fn scan_range(&self, session: &Session, column_index: usize) -> ExpressionResult<ScanRange> {
        ScanRange::from_conditions(session, &self.index_conditions, column_index)
    }
}

impl ColumnResolver for TableFilter {
    fn filter_id(&self) -> FilterId {
        self.id
    }

    fn table_alias(&self) -> &str {
        &self.alias
    }

    fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }
}

impl RangeSink for TableFilter {
    fn filter_id(&self) -> FilterId {
        self.id
    }

    fn add_index_condition(&mut self, condition: IndexCondition) {
        trace!("{} {}: index condition {}", self.alias, self.id, condition.to_sql());
        self.index_conditions.push(condition);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_lookup() {
        let filter = TableFilter::with_columns("T", &[("A", DataType::Int32), ("B", DataType::Varchar)]);
        let (index, column) = filter.find_column("b").unwrap();
        assert_eq!(index, 1);
        assert_eq!(column.column_type, DataType::Varchar);
        assert!(filter.find_column("C").is_none());
        assert_eq!(filter.table_alias(), "T");
    }

    #[test]
    fn test_same_table_twice_has_distinct_ids() {
        let left = TableFilter::with_columns("T", &[("A", DataType::Int32)]);
        let right = TableFilter::with_columns("T", &[("A", DataType::Int32)]);
        assert_ne!(left.id(), right.id());
    }
}
