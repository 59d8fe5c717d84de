//! Whole-tree boolean queries.
//!
//! An [`ExpressionVisitor`] is passed down through
//! [`Expression::is_everything`](crate::expression::Expression::is_everything).
//! Composite nodes answer with the conjunction of their children; the leaf
//! decisions live here.

use crate::expression::{ExpressionColumn, FunctionCall};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorMode {
    /// No column of the given query level or a deeper one, and no parameter
    Independent,
    /// Every column belongs to a filter whose row is available
    Evaluatable,
    /// No non-deterministic routine
    Deterministic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionVisitor {
    mode: VisitorMode,
    query_level: u32,
}

impl ExpressionVisitor {
    pub fn independent(query_level: u32) -> Self {
        Self {
            mode: VisitorMode::Independent,
            query_level,
        }
    }

    pub fn evaluatable() -> Self {
        Self {
            mode: VisitorMode::Evaluatable,
            query_level: 0,
        }
    }

    pub fn deterministic() -> Self {
        Self {
            mode: VisitorMode::Deterministic,
            query_level: 0,
        }
    }

    pub fn mode(&self) -> VisitorMode {
        self.mode
    }

    pub fn query_level(&self) -> u32 {
        self.query_level
    }

    pub(crate) fn accepts_column(&self, column: &ExpressionColumn) -> bool {
        match self.mode {
            VisitorMode::Independent => column
                .query_level()
                .is_some_and(|level| level < self.query_level),
            VisitorMode::Evaluatable => column.is_evaluatable(),
            VisitorMode::Deterministic => true,
        }
    }

    /// Only the routine itself; the caller checks the arguments
    pub(crate) fn accepts_function(&self, function: &FunctionCall) -> bool {
        match self.mode {
            VisitorMode::Independent | VisitorMode::Deterministic => function.is_deterministic(),
            VisitorMode::Evaluatable => true,
        }
    }

    /// Parameter values belong to one execution, never to the shared tree
    pub(crate) fn accepts_parameter(&self) -> bool {
        self.mode != VisitorMode::Independent
    }

    /// Aggregates change value per group, so they never count as independent
    pub(crate) fn accepts_aggregate(&self) -> bool {
        self.mode != VisitorMode::Independent
    }
}
