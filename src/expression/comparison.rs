//! Binary comparison predicate.

use crate::access::Value;
use crate::catalog::{ColumnResolver, FilterId};
use crate::expression::{CompareType, Expression, ExpressionResult, ExpressionVisitor};
use crate::index::{IndexCondition, RangeSink};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct Comparison {
    compare_type: CompareType,
    left: Box<Expression>,
    right: Box<Expression>,
}

impl Comparison {
    pub fn new(compare_type: CompareType, left: Expression, right: Expression) -> Self {
        Self {
            compare_type,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn compare_type(&self) -> CompareType {
        self.compare_type
    }

    pub fn left(&self) -> &Expression {
        &self.left
    }

    pub fn right(&self) -> &Expression {
        &self.right
    }

    /// Compare two non-NULL values with the session's collation
    pub fn compare_not_null(
        session: &Session,
        left: &Value,
        right: &Value,
        compare_type: CompareType,
    ) -> ExpressionResult<bool> {
        Ok(compare_type.matches(session.compare(left, right)?))
    }

    pub(crate) fn evaluate(&self, session: &Session) -> ExpressionResult<Value> {
        let left = self.left.evaluate(session)?;
        if left.is_null() {
            return Ok(Value::Null);
        }
        let right = self.right.evaluate(session)?;
        if right.is_null() {
            return Ok(Value::Null);
        }
        Self::compare_not_null(session, &left, &right, self.compare_type).map(Value::Boolean)
    }

    pub(crate) fn map_columns(
        &mut self,
        resolver: &dyn ColumnResolver,
        level: u32,
    ) -> ExpressionResult<()> {
        self.left.map_columns(resolver, level)?;
        self.right.map_columns(resolver, level)
    }

    pub(crate) fn optimize(mut self, session: &Session) -> ExpressionResult<Expression> {
        self.left = Box::new(self.left.optimize(session)?);
        self.right = Box::new(self.right.optimize(session)?);
        if self.left.is_null_literal() || self.right.is_null_literal() {
            return Ok(Expression::null());
        }
        if self.left.is_constant() && self.right.is_constant() {
            return Ok(Expression::literal(self.evaluate(session)?));
        }
        Ok(Expression::Comparison(self))
    }

    pub(crate) fn set_evaluatable(&mut self, filter: FilterId, evaluatable: bool) {
        self.left.set_evaluatable(filter, evaluatable);
        self.right.set_evaluatable(filter, evaluatable);
    }

    pub fn to_sql(&self) -> String {
        format!(
            "({} {} {})",
            self.left.to_sql(),
            self.compare_type.as_str(),
            self.right.to_sql()
        )
    }

    pub(crate) fn update_aggregate(&mut self, session: &Session) -> ExpressionResult<()> {
        self.left.update_aggregate(session)?;
        self.right.update_aggregate(session)
    }

    pub(crate) fn is_everything(&self, visitor: &ExpressionVisitor) -> bool {
        self.left.is_everything(visitor) && self.right.is_everything(visitor)
    }

    pub(crate) fn cost(&self) -> u32 {
        self.left.cost() + self.right.cost() + 1
    }

    /// `column op expr` or `expr op column`, where `expr` can be computed
    /// before the column's row is read
    pub(crate) fn create_index_conditions(&self, sink: &mut dyn RangeSink) {
        if !self.compare_type.is_indexable() {
            return;
        }
        let evaluatable = ExpressionVisitor::evaluatable();
        let target = sink.filter_id();

        if let Expression::Column(column) = self.left.as_ref() {
            if column.filter_id() == Some(target) && self.right.is_everything(&evaluatable) {
                sink.add_index_condition(IndexCondition::new(
                    self.compare_type,
                    column.clone(),
                    self.right.as_ref().clone(),
                ));
                return;
            }
        }
        if let Expression::Column(column) = self.right.as_ref() {
            if column.filter_id() == Some(target) && self.left.is_everything(&evaluatable) {
                sink.add_index_condition(IndexCondition::new(
                    self.compare_type.reverse(),
                    column.clone(),
                    self.left.as_ref().clone(),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::DataType;
    use crate::catalog::TableFilter;
    use crate::expression::ExpressionError;

    fn bound_column(filter: &TableFilter, name: &str) -> Expression {
        let mut column = Expression::column(name);
        column.map_columns(filter, 0).unwrap();
        column
    }

    #[test]
    fn test_evaluate_three_valued() {
        let session = Session::default();
        let cmp = Comparison::new(CompareType::Lt, Expression::literal(1), Expression::literal(2));
        assert_eq!(cmp.evaluate(&session).unwrap(), Value::Boolean(true));

        let cmp = Comparison::new(CompareType::Eq, Expression::null(), Expression::literal(2));
        assert_eq!(cmp.evaluate(&session).unwrap(), Value::Null);

        let cmp = Comparison::new(CompareType::Ne, Expression::literal("a"), Expression::null());
        assert_eq!(cmp.evaluate(&session).unwrap(), Value::Null);
    }

    #[test]
    fn test_evaluate_type_mismatch() {
        let session = Session::default();
        let cmp = Comparison::new(
            CompareType::Eq,
            Expression::literal(true),
            Expression::literal(1),
        );
        assert!(matches!(
            cmp.evaluate(&session),
            Err(ExpressionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_optimize_folds() {
        let session = Session::default();
        let expr = Expression::eq(Expression::literal(3), Expression::literal("3"))
            .optimize(&session)
            .unwrap();
        assert_eq!(expr.to_sql(), "TRUE");

        let filter = TableFilter::with_columns("T", &[("X", DataType::Int32)]);
        let expr = Expression::eq(bound_column(&filter, "X"), Expression::null())
            .optimize(&session)
            .unwrap();
        assert!(expr.is_null_literal());

        let expr = Expression::eq(bound_column(&filter, "X"), Expression::literal(1))
            .optimize(&session)
            .unwrap();
        assert_eq!(expr.to_sql(), "(X = 1)");
    }

    #[test]
    fn test_index_conditions_either_side() {
        let session = Session::default();
        let mut filter = TableFilter::with_columns("T", &[("X", DataType::Int32)]);

        let cmp = Comparison::new(CompareType::Gt, Expression::literal(5), bound_column(&filter, "X"));
        cmp.create_index_conditions(&mut filter);
        let cmp = Comparison::new(CompareType::Ge, bound_column(&filter, "X"), Expression::literal(1));
        cmp.create_index_conditions(&mut filter);
        let cmp = Comparison::new(CompareType::Ne, bound_column(&filter, "X"), Expression::literal(3));
        cmp.create_index_conditions(&mut filter);

        let sql: Vec<String> = filter.index_conditions().iter().map(|c| c.to_sql()).collect();
        assert_eq!(sql, vec!["X < 5", "X >= 1"]);

        let range = filter.scan_range(&session, 0).unwrap();
        assert_eq!(range.start, Some(Value::Int32(1)));
        assert_eq!(range.end, Some(Value::Int32(5)));
    }

    #[test]
    fn test_index_conditions_need_evaluatable_side() {
        let mut left = TableFilter::with_columns("A", &[("X", DataType::Int32)]);
        let right = TableFilter::with_columns("B", &[("Y", DataType::Int32)]);
        let mut cmp = Comparison::new(
            CompareType::Eq,
            bound_column(&left, "X"),
            bound_column(&right, "Y"),
        );

        cmp.create_index_conditions(&mut left);
        assert!(left.index_conditions().is_empty());

        cmp.set_evaluatable(right.id(), true);
        cmp.create_index_conditions(&mut left);
        assert_eq!(left.index_conditions().len(), 1);
        assert_eq!(left.index_conditions()[0].to_sql(), "X = Y");
    }

    #[test]
    fn test_cost() {
        let filter = TableFilter::with_columns("T", &[("X", DataType::Int32)]);
        let cmp = Comparison::new(CompareType::Eq, bound_column(&filter, "X"), Expression::literal(1));
        assert_eq!(cmp.cost(), 3);
    }
}
