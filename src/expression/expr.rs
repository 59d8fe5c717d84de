//! Expression tree definitions and the operations every node supports.

use crate::access::{DataType, Value};
use crate::catalog::{ColumnResolver, FilterId};
use crate::expression::{
    Aggregate, CompareType, Comparison, ConditionAndOr, ConditionIn, ExpressionColumn,
    ExpressionResult, ExpressionVisitor, FunctionCall, LogicalOperator, Parameter,
};
use crate::index::RangeSink;
use crate::session::Session;

/// Literal value in an expression
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
}

impl Literal {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self { value: Value::Null }
    }
}

/// Expression tree node
///
/// Every node exclusively owns its children. `optimize` consumes a node and
/// returns its replacement, which may be of a different kind.
#[derive(Debug, Clone)]
pub enum Expression {
    Literal(Literal),
    Column(ExpressionColumn),
    Parameter(Parameter),
    Comparison(Comparison),
    AndOr(ConditionAndOr),
    In(ConditionIn),
    Function(FunctionCall),
    Aggregate(Aggregate),
}

impl Expression {
    /// Create a literal expression
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(Literal::new(value.into()))
    }

    /// The NULL literal
    pub fn null() -> Self {
        Expression::Literal(Literal::null())
    }

    /// Create an unbound column reference
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column(ExpressionColumn::new(None, name))
    }

    /// Create an unbound column reference qualified by a table alias
    pub fn qualified_column(alias: impl Into<String>, name: impl Into<String>) -> Self {
        Expression::Column(ExpressionColumn::new(Some(alias.into()), name))
    }

    /// Create a parameter reference (`?index`, 1-based)
    pub fn parameter(index: usize) -> Self {
        Expression::Parameter(Parameter::new(index))
    }

    pub fn compare(compare_type: CompareType, left: Expression, right: Expression) -> Self {
        Expression::Comparison(Comparison::new(compare_type, left, right))
    }

    /// Create an equality expression
    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::compare(CompareType::Eq, left, right)
    }

    /// Create an AND expression
    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::AndOr(ConditionAndOr::new(LogicalOperator::And, left, right))
    }

    /// Create an OR expression
    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::AndOr(ConditionAndOr::new(LogicalOperator::Or, left, right))
    }

    /// Create `probe IN (candidates...)`
    pub fn in_list(probe: Expression, candidates: Vec<Expression>) -> Self {
        Expression::In(ConditionIn::new(probe, candidates))
    }

    /// Compute the value of this expression for the session's current rows
    pub fn evaluate(&self, session: &Session) -> ExpressionResult<Value> {
        match self {
            Expression::Literal(lit) => Ok(lit.value.clone()),
            Expression::Column(col) => col.evaluate(session),
            Expression::Parameter(param) => param.evaluate(session),
            Expression::Comparison(cmp) => cmp.evaluate(session),
            Expression::AndOr(cond) => cond.evaluate(session),
            Expression::In(cond) => cond.evaluate(session),
            Expression::Function(func) => func.evaluate(session),
            Expression::Aggregate(agg) => agg.evaluate(session),
        }
    }

    /// Bind column references to `resolver`, which sits at query `level`
    pub fn map_columns(&mut self, resolver: &dyn ColumnResolver, level: u32) -> ExpressionResult<()> {
        match self {
            Expression::Literal(_) | Expression::Parameter(_) => Ok(()),
            Expression::Column(col) => col.map_columns(resolver, level),
            Expression::Comparison(cmp) => cmp.map_columns(resolver, level),
            Expression::AndOr(cond) => cond.map_columns(resolver, level),
            Expression::In(cond) => cond.map_columns(resolver, level),
            Expression::Function(func) => func.map_columns(resolver, level),
            Expression::Aggregate(agg) => agg.map_columns(resolver, level),
        }
    }

    /// Simplify this node, returning the expression that replaces it
    pub fn optimize(self, session: &Session) -> ExpressionResult<Expression> {
        match self {
            Expression::Literal(_) | Expression::Parameter(_) => Ok(self),
            Expression::Column(col) => col.optimize(),
            Expression::Comparison(cmp) => cmp.optimize(session),
            Expression::AndOr(cond) => cond.optimize(session),
            Expression::In(cond) => cond.optimize(session),
            Expression::Function(func) => func.optimize(session),
            Expression::Aggregate(agg) => agg.optimize(session),
        }
    }

    /// Mark the columns of `filter` as (not) evaluatable
    pub fn set_evaluatable(&mut self, filter: FilterId, evaluatable: bool) {
        match self {
            Expression::Literal(_) | Expression::Parameter(_) => {}
            Expression::Column(col) => col.set_evaluatable(filter, evaluatable),
            Expression::Comparison(cmp) => cmp.set_evaluatable(filter, evaluatable),
            Expression::AndOr(cond) => cond.set_evaluatable(filter, evaluatable),
            Expression::In(cond) => cond.set_evaluatable(filter, evaluatable),
            Expression::Function(func) => func.set_evaluatable(filter, evaluatable),
            Expression::Aggregate(agg) => agg.set_evaluatable(filter, evaluatable),
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            Expression::Literal(lit) => lit.value.to_sql(),
            Expression::Column(col) => col.to_sql(),
            Expression::Parameter(param) => param.to_sql(),
            Expression::Comparison(cmp) => cmp.to_sql(),
            Expression::AndOr(cond) => cond.to_sql(),
            Expression::In(cond) => cond.to_sql(),
            Expression::Function(func) => func.to_sql(),
            Expression::Aggregate(agg) => agg.to_sql(),
        }
    }

    /// Feed the session's current row into every aggregate of this tree
    pub fn update_aggregate(&mut self, session: &Session) -> ExpressionResult<()> {
        match self {
            Expression::Literal(_) | Expression::Column(_) | Expression::Parameter(_) => Ok(()),
            Expression::Comparison(cmp) => cmp.update_aggregate(session),
            Expression::AndOr(cond) => cond.update_aggregate(session),
            Expression::In(cond) => cond.update_aggregate(session),
            Expression::Function(func) => func.update_aggregate(session),
            Expression::Aggregate(agg) => agg.update_aggregate(session),
        }
    }

    /// Whether the whole subtree satisfies the visitor's mode
    pub fn is_everything(&self, visitor: &ExpressionVisitor) -> bool {
        match self {
            Expression::Literal(_) => true,
            Expression::Parameter(_) => visitor.accepts_parameter(),
            Expression::Column(col) => visitor.accepts_column(col),
            Expression::Comparison(cmp) => cmp.is_everything(visitor),
            Expression::AndOr(cond) => cond.is_everything(visitor),
            Expression::In(cond) => cond.is_everything(visitor),
            Expression::Function(func) => func.is_everything(visitor),
            Expression::Aggregate(agg) => agg.is_everything(visitor),
        }
    }

    /// Estimated evaluation cost
    pub fn cost(&self) -> u32 {
        match self {
            Expression::Literal(_) | Expression::Parameter(_) => 0,
            Expression::Column(_) => ExpressionColumn::COST,
            Expression::Comparison(cmp) => cmp.cost(),
            Expression::AndOr(cond) => cond.cost(),
            Expression::In(cond) => cond.cost(),
            Expression::Function(func) => func.cost(),
            Expression::Aggregate(agg) => agg.cost(),
        }
    }

    /// Push range conditions usable by `sink`'s access path
    pub fn create_index_conditions(&self, session: &Session, sink: &mut dyn RangeSink) {
        match self {
            Expression::Comparison(cmp) => cmp.create_index_conditions(sink),
            Expression::AndOr(cond) => cond.create_index_conditions(session, sink),
            Expression::In(cond) => cond.create_index_conditions(session, sink),
            _ => {}
        }
    }

    /// Whether the value is known without row context.
    ///
    /// Only literals are; optimization folds every constant subtree into one.
    pub fn is_constant(&self) -> bool {
        matches!(self, Expression::Literal(_))
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self, Expression::Literal(lit) if lit.value.is_null())
    }

    /// Static output type, if known
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Expression::Literal(lit) => lit.value.data_type(),
            Expression::Column(col) => col.data_type(),
            Expression::Parameter(_) => None,
            Expression::Comparison(_) | Expression::AndOr(_) | Expression::In(_) => {
                Some(DataType::Boolean)
            }
            Expression::Function(func) => func.return_type(),
            Expression::Aggregate(agg) => agg.data_type(),
        }
    }

    /// Direct children, in evaluation order
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal(_) | Expression::Column(_) | Expression::Parameter(_) => vec![],
            Expression::Comparison(cmp) => vec![cmp.left(), cmp.right()],
            Expression::AndOr(cond) => vec![cond.left(), cond.right()],
            Expression::In(cond) => std::iter::once(cond.probe())
                .chain(cond.candidates())
                .collect(),
            Expression::Function(func) => func.args().iter().collect(),
            Expression::Aggregate(agg) => agg.arg().into_iter().collect(),
        }
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Literal(Literal::new(value))
    }
}
