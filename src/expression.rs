//! Expression trees for query conditions.
//!
//! This module provides:
//! - The [`Expression`] node set and the operations every node supports
//! - Column binding across nested query scopes
//! - Optimization (constant folding, IN rewrites and range bounds)
//! - Three-valued evaluation against the session's current rows
//! - Whole-tree property queries through [`ExpressionVisitor`]

pub mod aggregate;
pub mod binder;
pub mod column;
pub mod comparison;
pub mod condition_in;
pub mod error;
pub mod eval;
pub mod expr;
pub mod function;
pub mod logical;
pub mod operator;
pub mod parameter;
pub mod prepared;
pub mod visitor;

pub use aggregate::{Aggregate, AggregateKind};
pub use binder::bind_columns;
pub use column::{ColumnBinding, ExpressionColumn};
pub use comparison::Comparison;
pub use condition_in::ConditionIn;
pub use error::{ExpressionError, ExpressionResult};
pub use eval::{evaluate_condition, to_tristate};
pub use expr::{Expression, Literal};
pub use function::{Callable, FunctionCall};
pub use logical::ConditionAndOr;
pub use operator::{CompareType, LogicalOperator};
pub use parameter::Parameter;
pub use prepared::PreparedCondition;
pub use visitor::{ExpressionVisitor, VisitorMode};
