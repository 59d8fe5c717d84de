//! Scan over an in-memory row set.
//!
//! Rows whose range column falls outside the filter's pushed-down
//! [`ScanRange`](crate::index::ScanRange) are skipped without being
//! published; every other row becomes the filter's current row.

use crate::access::Value;
use crate::catalog::{ColumnInfo, ColumnResolver, TableFilter};
use crate::executor::Executor;
use crate::index::ScanRange;
use crate::session::Session;
use anyhow::{bail, Result};
use log::debug;

/// Executor for scans over literal rows
pub struct ValuesScanExecutor {
    filter: TableFilter,
    rows: Vec<Vec<Value>>,
    range_column: Option<usize>,
    range: ScanRange,
    position: usize,
    scanned: usize,
    skipped: usize,
    initialized: bool,
}

impl ValuesScanExecutor {
    pub fn new(filter: TableFilter, rows: Vec<Vec<Value>>) -> Self {
        Self {
            filter,
            rows,
            range_column: None,
            range: ScanRange::default(),
            position: 0,
            scanned: 0,
            skipped: 0,
            initialized: false,
        }
    }

    /// Prune on the index conditions collected for this column
    pub fn with_range_column(mut self, column_index: usize) -> Self {
        self.range_column = Some(column_index);
        self
    }

    pub fn filter(&self) -> &TableFilter {
        &self.filter
    }

    /// Mutable access for the planner to push index conditions
    pub fn filter_mut(&mut self) -> &mut TableFilter {
        &mut self.filter
    }

    pub fn range(&self) -> &ScanRange {
        &self.range
    }

    /// Rows returned since the last `init`
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Rows pruned by the scan range since the last `init`
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn in_range(&self, session: &Session, row: &[Value]) -> Result<bool> {
        let Some(column) = self.range_column else {
            return Ok(true);
        };
        match row.get(column) {
            Some(value) => Ok(self.range.contains(session, value)?),
            None => bail!(
                "row has {} columns, range column is {}",
                row.len(),
                column
            ),
        }
    }
}

impl Executor for ValuesScanExecutor {
    fn init(&mut self, session: &mut Session) -> Result<()> {
        self.range = match self.range_column {
            Some(column) => self.filter.scan_range(session, column)?,
            None => ScanRange::default(),
        };
        debug!(
            "scan {} {}: range {:?}",
            self.filter.table_alias(),
            self.filter.id(),
            self.range
        );
        self.position = 0;
        self.scanned = 0;
        self.skipped = 0;
        session.clear_current_row(self.filter.id());
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self, session: &mut Session) -> Result<Option<Vec<Value>>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        while self.position < self.rows.len() {
            let row = &self.rows[self.position];
            self.position += 1;
            if !self.in_range(session, row)? {
                self.skipped += 1;
                continue;
            }
            let row = row.clone();
            self.scanned += 1;
            session.set_current_row(self.filter.id(), row.clone());
            return Ok(Some(row));
        }

        session.clear_current_row(self.filter.id());
        Ok(None)
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        self.filter.columns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::DataType;
    use crate::expression::{CompareType, Expression};
    use crate::index::RangeSink;

    fn rows() -> Vec<Vec<Value>> {
        [5, 1, 9, 3, 7]
            .iter()
            .map(|v| vec![Value::Int32(*v), Value::from(format!("r{}", v).as_str())])
            .collect()
    }

    fn push(scan: &mut ValuesScanExecutor, compare_type: CompareType, value: i32) {
        let mut column = Expression::column("ID");
        column.map_columns(scan.filter(), 0).unwrap();
        let Expression::Column(column) = column else {
            panic!("expected column");
        };
        scan.filter_mut().add_index_condition(crate::index::IndexCondition::new(
            compare_type,
            column,
            Expression::literal(value),
        ));
    }

    #[test]
    fn test_scan_publishes_current_row() -> Result<()> {
        let filter = TableFilter::with_columns("T", &[("ID", DataType::Int32), ("NAME", DataType::Varchar)]);
        let id = filter.id();
        let mut scan = ValuesScanExecutor::new(filter, rows());
        let mut session = Session::default();
        scan.init(&mut session)?;

        assert_eq!(scan.output_schema().len(), 2);
        let first = scan.next(&mut session)?.expect("Should have first row");
        assert_eq!(first[0], Value::Int32(5));
        assert_eq!(session.current_row(id), Some(first.as_slice()));

        let mut count = 1;
        while scan.next(&mut session)?.is_some() {
            count += 1;
        }
        assert_eq!(count, 5);
        assert!(session.current_row(id).is_none());
        Ok(())
    }

    #[test]
    fn test_range_pruning() -> Result<()> {
        let filter = TableFilter::with_columns("T", &[("ID", DataType::Int32), ("NAME", DataType::Varchar)]);
        let mut scan = ValuesScanExecutor::new(filter, rows()).with_range_column(0);
        push(&mut scan, CompareType::Ge, 3);
        push(&mut scan, CompareType::Le, 7);

        let mut session = Session::default();
        scan.init(&mut session)?;
        let mut ids = Vec::new();
        while let Some(row) = scan.next(&mut session)? {
            ids.push(row[0].clone());
        }
        assert_eq!(ids, vec![Value::Int32(5), Value::Int32(3), Value::Int32(7)]);
        assert_eq!(scan.scanned(), 3);
        assert_eq!(scan.skipped(), 2);

        // rewinding resets the counters
        scan.init(&mut session)?;
        assert_eq!(scan.scanned(), 0);
        Ok(())
    }

    #[test]
    fn test_next_before_init() {
        let filter = TableFilter::with_columns("T", &[("ID", DataType::Int32)]);
        let mut scan = ValuesScanExecutor::new(filter, vec![]);
        let mut session = Session::default();
        assert!(scan.next(&mut session).is_err());
    }
}
