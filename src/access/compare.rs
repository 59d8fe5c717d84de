//! Total ordering of values.
//!
//! Ordering is defined over non-NULL values only. Callers handle NULL
//! before comparing; `compare_not_null` rejects it. String ordering is
//! delegated to the session's [`CompareMode`], which is how collation is
//! injected into the expression layer.

use crate::access::{DataType, Value};
use crate::expression::{ExpressionError, ExpressionResult};
use std::cmp::Ordering;

/// String collation used by comparisons
pub trait CompareMode: Send + Sync {
    fn compare_str(&self, left: &str, right: &str) -> Ordering;

    fn name(&self) -> &'static str;
}

/// Byte-wise ordering
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCompare;

impl CompareMode for BinaryCompare {
    fn compare_str(&self, left: &str, right: &str) -> Ordering {
        left.cmp(right)
    }

    fn name(&self) -> &'static str {
        "binary"
    }
}

/// Case-insensitive ordering
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreCaseCompare;

impl CompareMode for IgnoreCaseCompare {
    fn compare_str(&self, left: &str, right: &str) -> Ordering {
        let l = left.chars().flat_map(char::to_lowercase);
        let r = right.chars().flat_map(char::to_lowercase);
        l.cmp(r)
    }

    fn name(&self) -> &'static str {
        "ignore_case"
    }
}

/// Compare two non-NULL values.
///
/// Values of different types are both converted to the higher-order type
/// first. A conversion that is undefined yields `TypeMismatch`, one that is
/// defined but fails for this value yields `Conversion`.
pub fn compare_not_null(
    mode: &dyn CompareMode,
    left: &Value,
    right: &Value,
) -> ExpressionResult<Ordering> {
    let (left_type, right_type) = match (left.data_type(), right.data_type()) {
        (Some(l), Some(r)) => (l, r),
        _ => {
            return Err(ExpressionError::UnexpectedNull {
                context: "comparison".to_string(),
            })
        }
    };

    if left_type != right_type {
        let common = DataType::higher_order(left_type, right_type);
        let l = left.convert_to(common).map_err(|e| mismatch(e, left_type, right_type))?;
        let r = right.convert_to(common).map_err(|e| mismatch(e, left_type, right_type))?;
        return compare_same_type(mode, &l, &r);
    }

    compare_same_type(mode, left, right)
}

// Undefined conversions surface as a mismatch between the two operand types.
fn mismatch(err: ExpressionError, left: DataType, right: DataType) -> ExpressionError {
    match err {
        ExpressionError::TypeMismatch { .. } => ExpressionError::TypeMismatch {
            left,
            right,
            context: "comparison".to_string(),
        },
        other => other,
    }
}

fn compare_same_type(
    mode: &dyn CompareMode,
    left: &Value,
    right: &Value,
) -> ExpressionResult<Ordering> {
    match (left, right) {
        (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
        (Value::Int32(a), Value::Int32(b)) => Ok(a.cmp(b)),
        (Value::Int64(a), Value::Int64(b)) => Ok(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Ok(mode.compare_str(a, b)),
        _ => Err(ExpressionError::InvalidOperandTypes {
            operator: "comparison".to_string(),
            left_type: left.data_type(),
            right_type: right.data_type(),
        }),
    }
}
