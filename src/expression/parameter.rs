use crate::access::Value;
use crate::expression::ExpressionResult;
use crate::session::Session;

/// Prepared statement parameter `?index` (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    index: usize,
}

impl Parameter {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn evaluate(&self, session: &Session) -> ExpressionResult<Value> {
        session.parameter(self.index)
    }

    pub fn to_sql(&self) -> String {
        format!("?{}", self.index)
    }
}
