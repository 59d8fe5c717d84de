//! Error types for expression binding, optimization and evaluation.

use crate::access::DataType;
use thiserror::Error;

/// Errors that can occur in the expression layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Two types that have no common comparable form
    #[error("Type mismatch in {context}: {left:?} and {right:?}")]
    TypeMismatch {
        left: DataType,
        right: DataType,
        context: String,
    },

    /// A value that cannot be represented in the target type
    #[error("Cannot convert {value} to {target:?}")]
    Conversion { value: String, target: DataType },

    /// Column name not found in any scope
    #[error("Column {name} not found")]
    UnresolvedReference { name: String },

    /// Column name exposed by two resolvers of the same scope
    #[error("Ambiguous column name {name}")]
    AmbiguousColumn { name: String },

    /// Invalid operand types for operator
    #[error("Invalid operand types for operator {operator}: left={left_type:?}, right={right_type:?}")]
    InvalidOperandTypes {
        operator: String,
        left_type: Option<DataType>,
        right_type: Option<DataType>,
    },

    /// Column index out of bounds
    #[error("Column index {index} out of bounds for tuple with {tuple_size} columns")]
    ColumnIndexOutOfBounds { index: usize, tuple_size: usize },

    /// Bound column evaluated while its table filter has no current row
    #[error("No current row for column {column}")]
    NoCurrentRow { column: String },

    /// Prepared statement parameter without a value
    #[error("Parameter ?{index} is not set")]
    ParameterNotSet { index: usize },

    /// NULL value in non-nullable context
    #[error("Unexpected NULL value in {context}")]
    UnexpectedNull { context: String },

    /// A compiled routine failed
    #[error("Function {name} failed: {message}")]
    Function { name: String, message: String },

    /// Generic evaluation error
    #[error("Expression evaluation error: {message}")]
    EvaluationError { message: String },
}

impl ExpressionError {
    /// Errors caused by missing run-time context rather than a defect in the
    /// expression itself.
    pub fn is_missing_context(&self) -> bool {
        matches!(
            self,
            ExpressionError::NoCurrentRow { .. } | ExpressionError::ParameterNotSet { .. }
        )
    }
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExpressionError::TypeMismatch {
            left: DataType::Boolean,
            right: DataType::Int32,
            context: "comparison".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch in comparison: Boolean and Int32"
        );

        let err = ExpressionError::Conversion {
            value: "'abc'".to_string(),
            target: DataType::Int32,
        };
        assert_eq!(err.to_string(), "Cannot convert 'abc' to Int32");

        let err = ExpressionError::UnresolvedReference {
            name: "T.X".to_string(),
        };
        assert_eq!(err.to_string(), "Column T.X not found");

        let err = ExpressionError::ColumnIndexOutOfBounds {
            index: 5,
            tuple_size: 3,
        };
        assert_eq!(
            err.to_string(),
            "Column index 5 out of bounds for tuple with 3 columns"
        );

        let err = ExpressionError::ParameterNotSet { index: 2 };
        assert_eq!(err.to_string(), "Parameter ?2 is not set");
    }

    #[test]
    fn test_missing_context() {
        assert!(ExpressionError::ParameterNotSet { index: 1 }.is_missing_context());
        assert!(ExpressionError::NoCurrentRow {
            column: "X".to_string()
        }
        .is_missing_context());
        assert!(!ExpressionError::Conversion {
            value: "1".to_string(),
            target: DataType::Boolean
        }
        .is_missing_context());
    }
}
