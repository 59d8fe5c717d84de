//! Column information and metadata structures.

use crate::access::DataType;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub column_name: String,
    pub column_type: DataType,
}

impl ColumnInfo {
    pub fn new(column_name: impl Into<String>, column_type: DataType) -> Self {
        Self {
            column_name: column_name.into(),
            column_type,
        }
    }

    /// SQL identifiers match case-insensitively
    pub fn matches(&self, name: &str) -> bool {
        self.column_name.eq_ignore_ascii_case(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_info_matches() {
        let column = ColumnInfo::new("Price", DataType::Int32);
        assert!(column.matches("PRICE"));
        assert!(column.matches("price"));
        assert!(!column.matches("prices"));
        assert_eq!(column.column_type, DataType::Int32);
    }
}
