//! Range conditions pushed from predicates down to an access path.
//!
//! A predicate offers [`IndexCondition`]s to a [`RangeSink`]; the access
//! path folds them into a [`ScanRange`] per column and skips rows outside
//! it. Ranges only ever over-approximate: the exact predicate is still
//! applied to every row that survives the scan.

use crate::access::Value;
use crate::catalog::FilterId;
use crate::expression::{CompareType, Expression, ExpressionColumn, ExpressionResult};
use crate::session::Session;
use log::trace;
use std::cmp::Ordering;

/// Receives the index conditions of the access path being planned
pub trait RangeSink {
    /// Identity of the access path; conditions on other filters are not offered
    fn filter_id(&self) -> FilterId;

    fn add_index_condition(&mut self, condition: IndexCondition);
}

/// `column <compare_type> expression`
#[derive(Debug, Clone)]
pub struct IndexCondition {
    compare_type: CompareType,
    column: ExpressionColumn,
    expression: Expression,
}

impl IndexCondition {
    pub fn new(compare_type: CompareType, column: ExpressionColumn, expression: Expression) -> Self {
        Self {
            compare_type,
            column,
            expression,
        }
    }

    pub fn compare_type(&self) -> CompareType {
        self.compare_type
    }

    pub fn column(&self) -> &ExpressionColumn {
        &self.column
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn to_sql(&self) -> String {
        format!(
            "{} {} {}",
            self.column.to_sql(),
            self.compare_type.as_str(),
            self.expression.to_sql()
        )
    }
}

/// Inclusive bounds on one column; `None` is unbounded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanRange {
    pub start: Option<Value>,
    pub end: Option<Value>,
}

impl ScanRange {
    /// Fold the conditions on `column_index` into the tightest range.
    ///
    /// Strict bounds are kept inclusive. A condition whose value needs a row
    /// that is not available yet, or that evaluates to NULL, is ignored.
    pub fn from_conditions(
        session: &Session,
        conditions: &[IndexCondition],
        column_index: usize,
    ) -> ExpressionResult<ScanRange> {
        let mut range = ScanRange::default();
        for condition in conditions {
            if condition.column.column_index() != Some(column_index) {
                continue;
            }
            let value = match condition.expression.evaluate(session) {
                Ok(value) => value,
                Err(err) if err.is_missing_context() => {
                    trace!("index condition {} ignored: {}", condition.to_sql(), err);
                    continue;
                }
                Err(err) => return Err(err),
            };
            if value.is_null() {
                continue;
            }
            match condition.compare_type {
                CompareType::Eq => {
                    range.raise_start(session, value.clone())?;
                    range.lower_end(session, value)?;
                }
                CompareType::Gt | CompareType::Ge => range.raise_start(session, value)?,
                CompareType::Lt | CompareType::Le => range.lower_end(session, value)?,
                CompareType::Ne => {}
            }
        }
        Ok(range)
    }

    fn raise_start(&mut self, session: &Session, value: Value) -> ExpressionResult<()> {
        let replace = match &self.start {
            Some(start) => session.compare(start, &value)? == Ordering::Less,
            None => true,
        };
        if replace {
            self.start = Some(value);
        }
        Ok(())
    }

    fn lower_end(&mut self, session: &Session, value: Value) -> ExpressionResult<()> {
        let replace = match &self.end {
            Some(end) => session.compare(end, &value)? == Ordering::Greater,
            None => true,
        };
        if replace {
            self.end = Some(value);
        }
        Ok(())
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether a row with `value` in the column may satisfy the conditions
    pub fn contains(&self, session: &Session, value: &Value) -> ExpressionResult<bool> {
        if self.is_unbounded() {
            return Ok(true);
        }
        if value.is_null() {
            return Ok(false);
        }
        if let Some(start) = &self.start {
            if session.compare(value, start)? == Ordering::Less {
                return Ok(false);
            }
        }
        if let Some(end) = &self.end {
            if session.compare(value, end)? == Ordering::Greater {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
