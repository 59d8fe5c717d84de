//! Aggregate functions accumulated row by row.

use crate::access::{DataType, Value};
use crate::catalog::{ColumnResolver, FilterId};
use crate::expression::{Expression, ExpressionError, ExpressionResult, ExpressionVisitor};
use crate::session::Session;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    CountAll,
    Count,
    Sum,
    Min,
    Max,
}

impl AggregateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKind::CountAll | AggregateKind::Count => "COUNT",
            AggregateKind::Sum => "SUM",
            AggregateKind::Min => "MIN",
            AggregateKind::Max => "MAX",
        }
    }
}

/// An aggregate over the rows fed to it through `update_aggregate`
#[derive(Debug, Clone)]
pub struct Aggregate {
    kind: AggregateKind,
    arg: Option<Box<Expression>>,
    count: i64,
    current: Value,
}

impl Aggregate {
    pub fn new(kind: AggregateKind, arg: Option<Expression>) -> Self {
        Self {
            kind,
            arg: arg.map(Box::new),
            count: 0,
            current: Value::Null,
        }
    }

    pub fn kind(&self) -> AggregateKind {
        self.kind
    }

    pub fn arg(&self) -> Option<&Expression> {
        self.arg.as_deref()
    }

    /// Forget every row seen so far
    pub fn reset(&mut self) {
        self.count = 0;
        self.current = Value::Null;
    }

    pub fn data_type(&self) -> Option<DataType> {
        match self.kind {
            AggregateKind::CountAll | AggregateKind::Count | AggregateKind::Sum => {
                Some(DataType::Int64)
            }
            AggregateKind::Min | AggregateKind::Max => self.arg.as_ref().and_then(|a| a.data_type()),
        }
    }

    pub(crate) fn evaluate(&self, _session: &Session) -> ExpressionResult<Value> {
        match self.kind {
            AggregateKind::CountAll | AggregateKind::Count => Ok(Value::Int64(self.count)),
            _ => Ok(self.current.clone()),
        }
    }

    pub(crate) fn update_aggregate(&mut self, session: &Session) -> ExpressionResult<()> {
        if let Some(arg) = self.arg.as_mut() {
            arg.update_aggregate(session)?;
        }
        if self.kind == AggregateKind::CountAll {
            self.count += 1;
            return Ok(());
        }
        let value = match &self.arg {
            Some(arg) => arg.evaluate(session)?,
            None => {
                return Err(ExpressionError::EvaluationError {
                    message: format!("{} requires an argument", self.kind.as_str()),
                })
            }
        };
        if value.is_null() {
            return Ok(());
        }
        self.count += 1;

        self.current = match self.kind {
            AggregateKind::CountAll | AggregateKind::Count => return Ok(()),
            AggregateKind::Sum => self.add(value)?,
            AggregateKind::Min | AggregateKind::Max => {
                let keep = if self.current.is_null() {
                    false
                } else {
                    let ord = session.compare(&self.current, &value)?;
                    match self.kind {
                        AggregateKind::Min => ord != Ordering::Greater,
                        _ => ord != Ordering::Less,
                    }
                };
                if keep {
                    return Ok(());
                }
                value
            }
        };
        Ok(())
    }

    fn add(&self, value: Value) -> ExpressionResult<Value> {
        let addend = match value.convert_to(DataType::Int64) {
            Ok(Value::Int64(v)) => v,
            _ => {
                return Err(ExpressionError::InvalidOperandTypes {
                    operator: "SUM".to_string(),
                    left_type: value.data_type(),
                    right_type: None,
                })
            }
        };
        match &self.current {
            Value::Int64(sum) => sum
                .checked_add(addend)
                .map(Value::Int64)
                .ok_or_else(|| ExpressionError::EvaluationError {
                    message: "SUM overflow".to_string(),
                }),
            _ => Ok(Value::Int64(addend)),
        }
    }

    pub(crate) fn map_columns(
        &mut self,
        resolver: &dyn ColumnResolver,
        level: u32,
    ) -> ExpressionResult<()> {
        match self.arg.as_mut() {
            Some(arg) => arg.map_columns(resolver, level),
            None => Ok(()),
        }
    }

    pub(crate) fn optimize(mut self, session: &Session) -> ExpressionResult<Expression> {
        if let Some(arg) = self.arg.take() {
            self.arg = Some(Box::new(arg.optimize(session)?));
        }
        Ok(Expression::Aggregate(self))
    }

    pub(crate) fn set_evaluatable(&mut self, filter: FilterId, evaluatable: bool) {
        if let Some(arg) = self.arg.as_mut() {
            arg.set_evaluatable(filter, evaluatable);
        }
    }

    pub fn to_sql(&self) -> String {
        match &self.arg {
            None if self.kind == AggregateKind::CountAll => "COUNT(*)".to_string(),
            Some(arg) => format!("{}({})", self.kind.as_str(), arg.to_sql()),
            None => format!("{}()", self.kind.as_str()),
        }
    }

    pub(crate) fn is_everything(&self, visitor: &ExpressionVisitor) -> bool {
        visitor.accepts_aggregate() && self.arg.as_ref().map_or(true, |a| a.is_everything(visitor))
    }

    pub(crate) fn cost(&self) -> u32 {
        1 + self.arg.as_ref().map_or(0, |a| a.cost())
    }
}
