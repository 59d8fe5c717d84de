use crate::expression::{ExpressionError, ExpressionResult};
use std::fmt;

/// Data types supported by the expression layer
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean = 1,
    Int32 = 2,
    Int64 = 3,
    Varchar = 4,
}

impl DataType {
    /// Rank used to pick the common type of two operands.
    ///
    /// Strings rank lowest so that `'5' = 5` compares as integers.
    fn order(self) -> u8 {
        match self {
            DataType::Varchar => 0,
            DataType::Boolean => 1,
            DataType::Int32 => 2,
            DataType::Int64 => 3,
        }
    }

    /// The type both sides of a comparison are converted to
    pub fn higher_order(left: DataType, right: DataType) -> DataType {
        if left.order() >= right.order() {
            left
        } else {
            right
        }
    }

    pub fn sql_name(self) -> &'static str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int32 => "INT",
            DataType::Int64 => "BIGINT",
            DataType::Varchar => "VARCHAR",
        }
    }

    /// Parse a SQL type name (case-insensitive)
    pub fn from_sql_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "BOOLEAN" | "BOOL" => Some(DataType::Boolean),
            "INT" | "INTEGER" | "INT4" => Some(DataType::Int32),
            "BIGINT" | "INT8" => Some(DataType::Int64),
            "VARCHAR" | "TEXT" => Some(DataType::Varchar),
            _ => None,
        }
    }
}

/// Values that can flow through an expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    String(String),
}

impl Value {
    /// Get the data type of this value
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Int32(_) => Some(DataType::Int32),
            Value::Int64(_) => Some(DataType::Int64),
            Value::String(_) => Some(DataType::Varchar),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert this value to the given type.
    ///
    /// NULL converts to NULL. Strings parse into any type, every type formats
    /// into a string, and integers widen or narrow with an overflow check.
    /// Booleans and integers do not convert into each other.
    pub fn convert_to(&self, target: DataType) -> ExpressionResult<Value> {
        let source = match self.data_type() {
            None => return Ok(Value::Null),
            Some(t) if t == target => return Ok(self.clone()),
            Some(t) => t,
        };

        let converted = match (self, target) {
            (_, DataType::Varchar) => Some(Value::String(self.to_string())),
            (Value::String(s), DataType::Boolean) => parse_boolean(s.trim()).map(Value::Boolean),
            (Value::String(s), DataType::Int32) => s.trim().parse().ok().map(Value::Int32),
            (Value::String(s), DataType::Int64) => s.trim().parse().ok().map(Value::Int64),
            (Value::Int32(i), DataType::Int64) => Some(Value::Int64(i64::from(*i))),
            (Value::Int64(i), DataType::Int32) => i32::try_from(*i).ok().map(Value::Int32),
            _ => {
                return Err(ExpressionError::TypeMismatch {
                    left: source,
                    right: target,
                    context: "conversion".to_string(),
                })
            }
        };

        converted.ok_or_else(|| ExpressionError::Conversion {
            value: self.to_sql(),
            target,
        })
    }

    /// Render this value as a SQL literal
    pub fn to_sql(&self) -> String {
        match self {
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
            other => other.to_string(),
        }
    }
}

fn parse_boolean(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(true) => write!(f, "TRUE"),
            Value::Boolean(false) => write!(f, "FALSE"),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_names() {
        assert_eq!(DataType::from_sql_name("int"), Some(DataType::Int32));
        assert_eq!(DataType::from_sql_name("BigInt"), Some(DataType::Int64));
        assert_eq!(DataType::from_sql_name("text"), Some(DataType::Varchar));
        assert_eq!(DataType::from_sql_name("bool"), Some(DataType::Boolean));
        assert_eq!(DataType::from_sql_name("blob"), None);
        assert_eq!(DataType::Int64.sql_name(), "BIGINT");
    }

    #[test]
    fn test_higher_order() {
        assert_eq!(
            DataType::higher_order(DataType::Varchar, DataType::Int32),
            DataType::Int32
        );
        assert_eq!(
            DataType::higher_order(DataType::Int64, DataType::Int32),
            DataType::Int64
        );
        assert_eq!(
            DataType::higher_order(DataType::Boolean, DataType::Varchar),
            DataType::Boolean
        );
    }

    #[test]
    fn test_convert_to() {
        assert_eq!(Value::Null.convert_to(DataType::Int32).unwrap(), Value::Null);
        assert_eq!(
            Value::from(" 42 ").convert_to(DataType::Int32).unwrap(),
            Value::Int32(42)
        );
        assert_eq!(
            Value::Int32(7).convert_to(DataType::Int64).unwrap(),
            Value::Int64(7)
        );
        assert_eq!(
            Value::Int64(7).convert_to(DataType::Varchar).unwrap(),
            Value::from("7")
        );
        assert_eq!(
            Value::from("TRUE").convert_to(DataType::Boolean).unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_convert_failures() {
        assert!(matches!(
            Value::from("abc").convert_to(DataType::Int32),
            Err(ExpressionError::Conversion {
                target: DataType::Int32,
                ..
            })
        ));
        assert!(matches!(
            Value::Int64(i64::MAX).convert_to(DataType::Int32),
            Err(ExpressionError::Conversion { .. })
        ));
        assert!(matches!(
            Value::Boolean(true).convert_to(DataType::Int32),
            Err(ExpressionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_to_sql() {
        assert_eq!(Value::Null.to_sql(), "NULL");
        assert_eq!(Value::Boolean(false).to_sql(), "FALSE");
        assert_eq!(Value::Int32(-3).to_sql(), "-3");
        assert_eq!(Value::from("it's").to_sql(), "'it''s'");
    }
}
