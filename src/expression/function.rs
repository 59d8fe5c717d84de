//! Calls to routines supplied by the host, such as compiled user functions.

use crate::access::{DataType, Value};
use crate::catalog::{ColumnResolver, FilterId};
use crate::expression::{Expression, ExpressionError, ExpressionResult, ExpressionVisitor};
use crate::session::Session;
use std::fmt;
use std::sync::Arc;

/// A routine callable from an expression
pub type Callable = Arc<dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync>;

#[derive(Clone)]
pub struct FunctionCall {
    name: String,
    args: Vec<Expression>,
    callable: Callable,
    deterministic: bool,
    return_type: Option<DataType>,
}

impl FunctionCall {
    const COST: u32 = 5;

    pub fn new(
        name: impl Into<String>,
        args: Vec<Expression>,
        callable: Callable,
        deterministic: bool,
        return_type: Option<DataType>,
    ) -> Self {
        Self {
            name: name.into(),
            args,
            callable,
            deterministic,
            return_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    /// Same arguments always give the same result
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    pub fn return_type(&self) -> Option<DataType> {
        self.return_type
    }

    pub(crate) fn evaluate(&self, session: &Session) -> ExpressionResult<Value> {
        let args = self
            .args
            .iter()
            .map(|arg| arg.evaluate(session))
            .collect::<ExpressionResult<Vec<_>>>()?;
        (self.callable)(&args).map_err(|err| ExpressionError::Function {
            name: self.name.clone(),
            message: format!("{:#}", err),
        })
    }

    pub(crate) fn map_columns(
        &mut self,
        resolver: &dyn ColumnResolver,
        level: u32,
    ) -> ExpressionResult<()> {
        for arg in &mut self.args {
            arg.map_columns(resolver, level)?;
        }
        Ok(())
    }

    pub(crate) fn optimize(mut self, session: &Session) -> ExpressionResult<Expression> {
        self.args = self
            .args
            .into_iter()
            .map(|arg| arg.optimize(session))
            .collect::<ExpressionResult<Vec<_>>>()?;
        if self.deterministic && self.args.iter().all(Expression::is_constant) {
            return Ok(Expression::literal(self.evaluate(session)?));
        }
        Ok(Expression::Function(self))
    }

    pub(crate) fn set_evaluatable(&mut self, filter: FilterId, evaluatable: bool) {
        for arg in &mut self.args {
            arg.set_evaluatable(filter, evaluatable);
        }
    }

    pub fn to_sql(&self) -> String {
        let args: Vec<String> = self.args.iter().map(Expression::to_sql).collect();
        format!("{}({})", self.name, args.join(", "))
    }

    pub(crate) fn update_aggregate(&mut self, session: &Session) -> ExpressionResult<()> {
        for arg in &mut self.args {
            arg.update_aggregate(session)?;
        }
        Ok(())
    }

    pub(crate) fn is_everything(&self, visitor: &ExpressionVisitor) -> bool {
        visitor.accepts_function(self) && self.args.iter().all(|arg| arg.is_everything(visitor))
    }

    pub(crate) fn cost(&self) -> u32 {
        Self::COST + self.args.iter().map(Expression::cost).sum::<u32>()
    }
}

impl fmt::Debug for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionCall")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("deterministic", &self.deterministic)
            .field("return_type", &self.return_type)
            .finish()
    }
}
