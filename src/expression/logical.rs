//! AND / OR with SQL three-valued logic.

use crate::access::Value;
use crate::catalog::{ColumnResolver, FilterId};
use crate::expression::eval::to_tristate;
use crate::expression::{Expression, ExpressionResult, ExpressionVisitor, LogicalOperator};
use crate::index::RangeSink;
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct ConditionAndOr {
    operator: LogicalOperator,
    left: Box<Expression>,
    right: Box<Expression>,
}

impl ConditionAndOr {
    pub fn new(operator: LogicalOperator, left: Expression, right: Expression) -> Self {
        Self {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn operator(&self) -> LogicalOperator {
        self.operator
    }

    pub fn left(&self) -> &Expression {
        &self.left
    }

    pub fn right(&self) -> &Expression {
        &self.right
    }

    /// The value that decides the result on its own: FALSE for AND, TRUE for OR
    fn dominant(&self) -> bool {
        self.operator == LogicalOperator::Or
    }

    pub(crate) fn evaluate(&self, session: &Session) -> ExpressionResult<Value> {
        let dominant = self.dominant();
        let op = self.operator.as_str();

        let left = to_tristate(&self.left.evaluate(session)?, op)?;
        if left == Some(dominant) {
            return Ok(Value::Boolean(dominant));
        }
        let right = to_tristate(&self.right.evaluate(session)?, op)?;
        if right == Some(dominant) {
            return Ok(Value::Boolean(dominant));
        }
        match (left, right) {
            (Some(_), Some(_)) => Ok(Value::Boolean(!dominant)),
            _ => Ok(Value::Null),
        }
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

        if self.left.is_constant() && self.right.is_constant() {
            return Ok(Expression::literal(self.evaluate(session)?));
        }

        // one constant side: dominant decides, neutral drops out, NULL stays
        let dominant = self.dominant();
        let op = self.operator.as_str();
        for (constant, other) in [(&self.left, &self.right), (&self.right, &self.left)] {
            if let Expression::Literal(lit) = constant.as_ref() {
                match to_tristate(&lit.value, op)? {
                    Some(b) if b == dominant => return Ok(Expression::literal(dominant)),
                    Some(_) => return Ok(other.as_ref().clone()),
                    None => {}
                }
            }
        }
        Ok(Expression::AndOr(self))
    }

    pub(crate) fn set_evaluatable(&mut self, filter: FilterId, evaluatable: bool) {
        self.left.set_evaluatable(filter, evaluatable);
        self.right.set_evaluatable(filter, evaluatable);
    }

    pub fn to_sql(&self) -> String {
        format!(
            "({} {} {})",
            self.left.to_sql(),
            self.operator.as_str(),
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
        self.left.cost() + self.right.cost()
    }

    /// Only a conjunction narrows the scan; a disjunction would need a union
    pub(crate) fn create_index_conditions(&self, session: &Session, sink: &mut dyn RangeSink) {
        if self.operator == LogicalOperator::And {
            self.left.create_index_conditions(session, sink);
            self.right.create_index_conditions(session, sink);
        }
    }
}
