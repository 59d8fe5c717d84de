//! Helpers for boolean (three-valued) results.

use crate::access::Value;
use crate::expression::{Expression, ExpressionError, ExpressionResult};
use crate::session::Session;

/// Interpret a value as SQL's three-valued boolean: `None` is unknown
pub fn to_tristate(value: &Value, context: &str) -> ExpressionResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Boolean(b) => Ok(Some(*b)),
        other => Err(ExpressionError::InvalidOperandTypes {
            operator: context.to_string(),
            left_type: other.data_type(),
            right_type: None,
        }),
    }
}

/// Evaluate a condition with WHERE semantics: unknown rejects the row
pub fn evaluate_condition(expr: &Expression, session: &Session) -> ExpressionResult<bool> {
    let value = expr.evaluate(session)?;
    Ok(to_tristate(&value, "condition")?.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_tristate() {
        assert_eq!(to_tristate(&Value::Null, "AND").unwrap(), None);
        assert_eq!(to_tristate(&Value::Boolean(true), "AND").unwrap(), Some(true));
        assert!(matches!(
            to_tristate(&Value::Int32(1), "AND"),
            Err(ExpressionError::InvalidOperandTypes { .. })
        ));
    }

    #[test]
    fn test_evaluate_condition() {
        let session = Session::default();
        assert!(evaluate_condition(&Expression::literal(true), &session).unwrap());
        assert!(!evaluate_condition(&Expression::null(), &session).unwrap());
        assert!(evaluate_condition(&Expression::literal(3), &session).is_err());
    }
}
