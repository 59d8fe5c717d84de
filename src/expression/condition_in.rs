//! `probe IN (candidate, ...)` membership predicate.
//!
//! Evaluation is an OR of equalities under three-valued logic: TRUE on the
//! first match, otherwise NULL if any candidate was NULL, otherwise FALSE. A
//! NULL probe yields NULL before any candidate is evaluated.
//!
//! When the probe is a plain column and every candidate can be computed
//! without reference to this query level or to statement parameters,
//! optimization folds the candidates into literals of the column's type and
//! caches their `[min, max]`. The planner pushes that interval down as
//! `column >= min AND column <= max`, which only ever over-approximates the
//! matching rows.

use crate::access::Value;
use crate::catalog::{ColumnResolver, FilterId};
use crate::expression::{
    CompareType, Comparison, Expression, ExpressionResult, ExpressionVisitor,
};
use crate::index::{IndexCondition, RangeSink};
use crate::session::Session;
use log::debug;
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct ConditionIn {
    probe: Box<Expression>,
    candidates: Vec<Expression>,
    query_level: u32,
    bounds: Option<(Value, Value)>,
}

impl ConditionIn {
    pub fn new(probe: Expression, candidates: Vec<Expression>) -> Self {
        Self {
            probe: Box::new(probe),
            candidates,
            query_level: 0,
            bounds: None,
        }
    }

    pub fn probe(&self) -> &Expression {
        &self.probe
    }

    pub fn candidates(&self) -> &[Expression] {
        &self.candidates
    }

    /// Deepest query level seen while binding
    pub fn query_level(&self) -> u32 {
        self.query_level
    }

    /// Cached `(min, max)` of the folded candidates
    pub fn bounds(&self) -> Option<(&Value, &Value)> {
        self.bounds.as_ref().map(|(min, max)| (min, max))
    }

    pub(crate) fn evaluate(&self, session: &Session) -> ExpressionResult<Value> {
        let probe = self.probe.evaluate(session)?;
        if probe.is_null() {
            return Ok(probe);
        }
        let mut has_null = false;
        for candidate in &self.candidates {
            let value = candidate.evaluate(session)?;
            if value.is_null() {
                has_null = true;
            } else if Comparison::compare_not_null(session, &probe, &value, CompareType::Eq)? {
                return Ok(Value::Boolean(true));
            }
        }
        if has_null {
            Ok(Value::Null)
        } else {
            Ok(Value::Boolean(false))
        }
    }

    pub(crate) fn map_columns(
        &mut self,
        resolver: &dyn ColumnResolver,
        level: u32,
    ) -> ExpressionResult<()> {
        self.probe.map_columns(resolver, level)?;
        for candidate in &mut self.candidates {
            candidate.map_columns(resolver, level)?;
        }
        self.query_level = self.query_level.max(level);
        Ok(())
    }

    pub(crate) fn optimize(mut self, session: &Session) -> ExpressionResult<Expression> {
        let probe = self.probe.optimize(session)?;
        if probe.is_null_literal() {
            debug!("IN with NULL probe folded to NULL");
            return Ok(probe);
        }
        self.probe = Box::new(probe);

        self.candidates = self
            .candidates
            .into_iter()
            .map(|candidate| candidate.optimize(session))
            .collect::<ExpressionResult<Vec<_>>>()?;

        let all_constant =
            self.probe.is_constant() && self.candidates.iter().all(Expression::is_constant);
        if all_constant {
            let value = self.evaluate(session)?;
            debug!("{} folded to {}", self.to_sql(), value.to_sql());
            return Ok(Expression::literal(value));
        }

        if self.candidates.len() == 1 {
            if let Some(candidate) = self.candidates.pop() {
                debug!("single-value IN on {} rewritten to equality", self.probe.to_sql());
                return Expression::eq(*self.probe, candidate).optimize(session);
            }
        }

        if session.optimize_in() {
            self.cache_bounds(session)?;
        }
        Ok(Expression::In(self))
    }

    /// Fold independent candidates into literals of the probe column's type
    /// and remember their extrema.
    fn cache_bounds(&mut self, session: &Session) -> ExpressionResult<()> {
        self.bounds = None;

        let independent = ExpressionVisitor::independent(self.query_level);
        if !self.are_all_values(&independent) {
            return Ok(());
        }
        let data_type = match self.probe.as_ref() {
            Expression::Column(column) => match column.data_type() {
                Some(data_type) => data_type,
                None => return Ok(()),
            },
            _ => return Ok(()),
        };

        let mut folded = Vec::with_capacity(self.candidates.len());
        for candidate in &self.candidates {
            let value = match candidate.evaluate(session) {
                Ok(value) => value,
                Err(err) if err.is_missing_context() => {
                    debug!("range fold of {} skipped: {}", self.to_sql(), err);
                    return Ok(());
                }
                Err(err) => return Err(err),
            };
            folded.push(value.convert_to(data_type)?);
        }

        // NULL never matches, so it cannot widen the interval
        let mut bounds: Option<(Value, Value)> = None;
        for value in folded.iter().filter(|v| !v.is_null()) {
            bounds = Some(match bounds {
                None => (value.clone(), value.clone()),
                Some((min, max)) => {
                    let min = if session.compare(&min, value)? == Ordering::Greater {
                        value.clone()
                    } else {
                        min
                    };
                    let max = if session.compare(&max, value)? == Ordering::Less {
                        value.clone()
                    } else {
                        max
                    };
                    (min, max)
                }
            });
        }

        self.candidates = folded.into_iter().map(Expression::literal).collect();
        self.bounds = bounds;
        if let Some((min, max)) = &self.bounds {
            debug!(
                "{} bounded to [{}, {}]",
                self.probe.to_sql(),
                min.to_sql(),
                max.to_sql()
            );
        }
        Ok(())
    }

    pub(crate) fn create_index_conditions(&self, session: &Session, sink: &mut dyn RangeSink) {
        if !session.optimize_in() {
            return;
        }
        let Some((min, max)) = &self.bounds else {
            return;
        };
        let Expression::Column(column) = self.probe.as_ref() else {
            return;
        };
        if column.filter_id() != Some(sink.filter_id()) {
            return;
        }
        sink.add_index_condition(IndexCondition::new(
            CompareType::Ge,
            column.clone(),
            Expression::literal(min.clone()),
        ));
        sink.add_index_condition(IndexCondition::new(
            CompareType::Le,
            column.clone(),
            Expression::literal(max.clone()),
        ));
    }

    pub(crate) fn set_evaluatable(&mut self, filter: FilterId, evaluatable: bool) {
        self.probe.set_evaluatable(filter, evaluatable);
        for candidate in &mut self.candidates {
            candidate.set_evaluatable(filter, evaluatable);
        }
    }

    pub fn to_sql(&self) -> String {
        let candidates: Vec<String> = self.candidates.iter().map(Expression::to_sql).collect();
        format!("({} IN({}))", self.probe.to_sql(), candidates.join(", "))
    }

    pub(crate) fn update_aggregate(&mut self, session: &Session) -> ExpressionResult<()> {
        self.probe.update_aggregate(session)?;
        for candidate in &mut self.candidates {
            candidate.update_aggregate(session)?;
        }
        Ok(())
    }

    pub(crate) fn is_everything(&self, visitor: &ExpressionVisitor) -> bool {
        self.probe.is_everything(visitor) && self.are_all_values(visitor)
    }

    fn are_all_values(&self, visitor: &ExpressionVisitor) -> bool {
        self.candidates.iter().all(|c| c.is_everything(visitor))
    }

    pub(crate) fn cost(&self) -> u32 {
        self.probe.cost() + self.candidates.iter().map(Expression::cost).sum::<u32>()
    }
}
