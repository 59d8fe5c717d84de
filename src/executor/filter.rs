//! Filter executor implementation.
//!
//! This executor passes on the rows of its child for which the condition is
//! TRUE. FALSE and NULL both reject the row. The child's scan may already
//! have pruned rows through pushed-down ranges, but those ranges are only a
//! superset, so the exact test always runs here.

use crate::access::Value;
use crate::catalog::ColumnInfo;
use crate::executor::Executor;
use crate::expression::PreparedCondition;
use crate::session::Session;
use anyhow::{bail, Result};
use std::sync::Arc;

/// Executor that filters rows based on a prepared condition
pub struct FilterExecutor {
    /// Child executor that produces rows
    child: Box<dyn Executor>,
    /// Condition shared with other executions of the same statement
    condition: Arc<PreparedCondition>,
    initialized: bool,
}

impl FilterExecutor {
    pub fn new(child: Box<dyn Executor>, condition: Arc<PreparedCondition>) -> Self {
        Self {
            child,
            condition,
            initialized: false,
        }
    }

    pub fn condition(&self) -> &PreparedCondition {
        &self.condition
    }
}

impl Executor for FilterExecutor {
    fn init(&mut self, session: &mut Session) -> Result<()> {
        self.child.init(session)?;
        self.condition.prepare(session)?;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self, session: &mut Session) -> Result<Option<Vec<Value>>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        while let Some(row) = self.child.next(session)? {
            if self.condition.matches(session)? {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        self.child.output_schema()
    }
}
