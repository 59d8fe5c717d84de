//! Operator definitions for expressions.

use std::cmp::Ordering;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareType {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareType {
    /// Whether `left <op> right` holds for the given ordering of left to right
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            CompareType::Eq => ordering == Ordering::Equal,
            CompareType::Ne => ordering != Ordering::Equal,
            CompareType::Lt => ordering == Ordering::Less,
            CompareType::Le => ordering != Ordering::Greater,
            CompareType::Gt => ordering == Ordering::Greater,
            CompareType::Ge => ordering != Ordering::Less,
        }
    }

    /// The operator that holds after swapping the operands
    pub fn reverse(self) -> Self {
        match self {
            CompareType::Lt => CompareType::Gt,
            CompareType::Le => CompareType::Ge,
            CompareType::Gt => CompareType::Lt,
            CompareType::Ge => CompareType::Le,
            other => other,
        }
    }

    /// `<>` cannot narrow a range
    pub fn is_indexable(self) -> bool {
        self != CompareType::Ne
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompareType::Eq => "=",
            CompareType::Ne => "<>",
            CompareType::Lt => "<",
            CompareType::Le => "<=",
            CompareType::Gt => ">",
            CompareType::Ge => ">=",
        }
    }
}

/// Logical connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}
