//! Column references.

use crate::access::{DataType, Value};
use crate::catalog::{ColumnResolver, FilterId};
use crate::expression::{Expression, ExpressionError, ExpressionResult};
use crate::session::Session;

/// Where a column reference points after binding
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBinding {
    pub filter: FilterId,
    pub index: usize,
    pub data_type: DataType,
    /// Nesting depth of the query that owns the filter (0 = outermost)
    pub query_level: u32,
}

/// Column reference in an expression
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionColumn {
    table_alias: Option<String>,
    column_name: String,
    binding: Option<ColumnBinding>,
    evaluatable: bool,
}

impl ExpressionColumn {
    pub const COST: u32 = 2;

    pub fn new(table_alias: Option<String>, column_name: impl Into<String>) -> Self {
        Self {
            table_alias,
            column_name: column_name.into(),
            binding: None,
            evaluatable: false,
        }
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn binding(&self) -> Option<&ColumnBinding> {
        self.binding.as_ref()
    }

    pub fn filter_id(&self) -> Option<FilterId> {
        self.binding.as_ref().map(|b| b.filter)
    }

    pub fn column_index(&self) -> Option<usize> {
        self.binding.as_ref().map(|b| b.index)
    }

    pub fn query_level(&self) -> Option<u32> {
        self.binding.as_ref().map(|b| b.query_level)
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.binding.as_ref().map(|b| b.data_type)
    }

    pub fn is_evaluatable(&self) -> bool {
        self.evaluatable
    }

    pub(crate) fn map_columns(
        &mut self,
        resolver: &dyn ColumnResolver,
        level: u32,
    ) -> ExpressionResult<()> {
        if let Some(alias) = &self.table_alias {
            if !alias.eq_ignore_ascii_case(resolver.table_alias()) {
                return Ok(());
            }
        }
        let Some((index, info)) = resolver.find_column(&self.column_name) else {
            return Ok(());
        };

        match &self.binding {
            None => {
                self.binding = Some(ColumnBinding {
                    filter: resolver.filter_id(),
                    index,
                    data_type: info.column_type,
                    query_level: level,
                });
                Ok(())
            }
            Some(bound) if bound.query_level == level && bound.filter != resolver.filter_id() => {
                Err(ExpressionError::AmbiguousColumn {
                    name: self.to_sql(),
                })
            }
            // first (innermost) binding wins
            Some(_) => Ok(()),
        }
    }

    pub(crate) fn evaluate(&self, session: &Session) -> ExpressionResult<Value> {
        let binding = self.bound()?;
        let row = session
            .current_row(binding.filter)
            .ok_or_else(|| ExpressionError::NoCurrentRow {
                column: self.to_sql(),
            })?;
        row.get(binding.index)
            .cloned()
            .ok_or(ExpressionError::ColumnIndexOutOfBounds {
                index: binding.index,
                tuple_size: row.len(),
            })
    }

    pub(crate) fn optimize(self) -> ExpressionResult<Expression> {
        self.bound()?;
        Ok(Expression::Column(self))
    }

    pub(crate) fn set_evaluatable(&mut self, filter: FilterId, evaluatable: bool) {
        if self.filter_id() == Some(filter) {
            self.evaluatable = evaluatable;
        }
    }

    pub fn to_sql(&self) -> String {
        match &self.table_alias {
            Some(alias) => format!("{}.{}", alias, self.column_name),
            None => self.column_name.clone(),
        }
    }

    fn bound(&self) -> ExpressionResult<&ColumnBinding> {
        self.binding
            .as_ref()
            .ok_or_else(|| ExpressionError::UnresolvedReference { name: self.to_sql() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableFilter;

    fn table(alias: &str) -> TableFilter {
        TableFilter::with_columns(alias, &[("ID", DataType::Int32), ("NAME", DataType::Varchar)])
    }

    #[test]
    fn test_map_columns_binds_once() {
        let outer = table("T");
        let inner = table("S");
        let mut column = ExpressionColumn::new(None, "name");

        column.map_columns(&inner, 1).unwrap();
        column.map_columns(&outer, 0).unwrap();

        let binding = column.binding().unwrap();
        assert_eq!(binding.filter, inner.id());
        assert_eq!(binding.index, 1);
        assert_eq!(binding.data_type, DataType::Varchar);
        assert_eq!(binding.query_level, 1);
    }

    #[test]
    fn test_alias_must_match() {
        let filter = table("T");
        let mut column = ExpressionColumn::new(Some("U".to_string()), "ID");
        column.map_columns(&filter, 0).unwrap();
        assert!(column.binding().is_none());

        let mut column = ExpressionColumn::new(Some("t".to_string()), "ID");
        column.map_columns(&filter, 0).unwrap();
        assert_eq!(column.filter_id(), Some(filter.id()));
    }

    #[test]
    fn test_ambiguous_column() {
        let left = table("A");
        let right = table("B");
        let mut column = ExpressionColumn::new(None, "ID");
        column.map_columns(&left, 0).unwrap();
        assert_eq!(
            column.map_columns(&right, 0),
            Err(ExpressionError::AmbiguousColumn {
                name: "ID".to_string()
            })
        );
    }

    #[test]
    fn test_evaluate() {
        let filter = table("T");
        let mut session = Session::default();
        let mut column = ExpressionColumn::new(None, "NAME");

        assert!(matches!(
            column.evaluate(&session),
            Err(ExpressionError::UnresolvedReference { .. })
        ));

        column.map_columns(&filter, 0).unwrap();
        assert!(matches!(
            column.evaluate(&session),
            Err(ExpressionError::NoCurrentRow { .. })
        ));

        session.set_current_row(filter.id(), vec![Value::Int32(1), Value::from("bob")]);
        assert_eq!(column.evaluate(&session).unwrap(), Value::from("bob"));

        session.set_current_row(filter.id(), vec![Value::Int32(1)]);
        assert!(matches!(
            column.evaluate(&session),
            Err(ExpressionError::ColumnIndexOutOfBounds { index: 1, tuple_size: 1 })
        ));
    }

    #[test]
    fn test_set_evaluatable_only_for_own_filter() {
        let filter = table("T");
        let other = table("U");
        let mut column = ExpressionColumn::new(None, "ID");
        column.map_columns(&filter, 0).unwrap();

        column.set_evaluatable(other.id(), true);
        assert!(!column.is_evaluatable());
        column.set_evaluatable(filter.id(), true);
        assert!(column.is_evaluatable());
    }

    #[test]
    fn test_optimize_unbound_fails() {
        let column = ExpressionColumn::new(Some("T".to_string()), "MISSING");
        assert_eq!(
            column.optimize().unwrap_err(),
            ExpressionError::UnresolvedReference {
                name: "T.MISSING".to_string()
            }
        );
    }
}
