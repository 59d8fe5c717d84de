//! A condition shared by concurrent executions of one prepared statement.
//!
//! The tree is optimized once, under the write half of the lock; every
//! evaluation afterwards only takes the read half and sees the frozen
//! optimized tree. Optimization may fold columns of enclosing queries from
//! the preparing session's outer rows, so an embedding that moves to a new
//! outer row calls [`PreparedCondition::reset`] before the next execution.

use crate::access::Value;
use crate::expression::eval::to_tristate;
use crate::expression::{Expression, ExpressionError, ExpressionResult};
use crate::index::RangeSink;
use crate::session::Session;
use log::debug;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};

#[derive(Debug)]
enum State {
    Raw(Expression),
    Optimized {
        source: Expression,
        optimized: Expression,
    },
    Failed {
        source: Expression,
        error: ExpressionError,
    },
}

impl State {
    fn source(&self) -> &Expression {
        match self {
            State::Raw(source)
            | State::Optimized { source, .. }
            | State::Failed { source, .. } => source,
        }
    }
}

#[derive(Debug)]
pub struct PreparedCondition {
    state: RwLock<State>,
}

impl PreparedCondition {
    /// Wrap a bound, not yet optimized condition
    pub fn new(expr: Expression) -> Self {
        Self {
            state: RwLock::new(State::Raw(expr)),
        }
    }

    /// Optimize the condition if no caller has done so yet.
    ///
    /// Concurrent callers block until the first one finishes; a failure is
    /// remembered and returned to every later caller.
    pub fn prepare(&self, session: &Session) -> ExpressionResult<()> {
        match &*self.state.read() {
            State::Optimized { .. } => return Ok(()),
            State::Failed { error, .. } => return Err(error.clone()),
            State::Raw(_) => {}
        }

        let state = self.state.upgradable_read();
        let source = match &*state {
            State::Optimized { .. } => return Ok(()),
            State::Failed { error, .. } => return Err(error.clone()),
            State::Raw(source) => source.clone(),
        };

        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        let before = source.to_sql();
        match source.clone().optimize(session) {
            Ok(optimized) => {
                debug!("prepared {} as {}", before, optimized.to_sql());
                *state = State::Optimized { source, optimized };
                Ok(())
            }
            Err(error) => {
                debug!("preparing {} failed: {}", before, error);
                *state = State::Failed {
                    source,
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    /// Drop the optimized tree (or remembered failure) so the next caller
    /// prepares again from the bound condition.
    pub fn reset(&self) {
        let mut state = self.state.write();
        if !matches!(&*state, State::Raw(_)) {
            let source = state.source().clone();
            debug!("reset prepared condition {}", source.to_sql());
            *state = State::Raw(source);
        }
    }

    pub fn is_prepared(&self) -> bool {
        matches!(&*self.state.read(), State::Optimized { .. })
    }

    /// Evaluate against the session's current rows, preparing first if needed
    pub fn evaluate(&self, session: &Session) -> ExpressionResult<Value> {
        loop {
            match &*self.state.read() {
                State::Optimized { optimized, .. } => return optimized.evaluate(session),
                State::Failed { error, .. } => return Err(error.clone()),
                State::Raw(_) => {}
            }
            self.prepare(session)?;
        }
    }

    /// WHERE semantics: only TRUE accepts the row
    pub fn matches(&self, session: &Session) -> ExpressionResult<bool> {
        let value = self.evaluate(session)?;
        Ok(to_tristate(&value, "condition")?.unwrap_or(false))
    }

    pub fn create_index_conditions(
        &self,
        session: &Session,
        sink: &mut dyn RangeSink,
    ) -> ExpressionResult<()> {
        self.prepare(session)?;
        if let State::Optimized { optimized, .. } = &*self.state.read() {
            optimized.create_index_conditions(session, sink);
        }
        Ok(())
    }

    /// Range cached by an optimized IN condition, as `(min, max)`
    pub fn cached_bounds(&self) -> Option<(Value, Value)> {
        match &*self.state.read() {
            State::Optimized {
                optimized: Expression::In(cond),
                ..
            } => cond.bounds().map(|(min, max)| (min.clone(), max.clone())),
            _ => None,
        }
    }

    pub fn to_sql(&self) -> String {
        match &*self.state.read() {
            State::Raw(expr) | State::Optimized { optimized: expr, .. } => expr.to_sql(),
            State::Failed { error, .. } => format!("<{}>", error),
        }
    }
}
