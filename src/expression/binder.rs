//! Binding a freshly built tree to the tables in scope.

use crate::catalog::ColumnResolver;
use crate::expression::{Expression, ExpressionError, ExpressionResult};

/// Bind every column of `expr`.
///
/// `scopes[0]` is the outermost query; each following entry is one level
/// deeper. Resolvers are offered innermost first, so a name visible at
/// several levels binds to the nearest one. Any column still unbound
/// afterwards is reported as unresolved.
pub fn bind_columns(
    expr: &mut Expression,
    scopes: &[&[&dyn ColumnResolver]],
) -> ExpressionResult<()> {
    for (level, resolvers) in scopes.iter().enumerate().rev() {
        for resolver in resolvers.iter() {
            expr.map_columns(*resolver, level as u32)?;
        }
    }
    match first_unbound(expr) {
        Some(name) => Err(ExpressionError::UnresolvedReference { name }),
        None => Ok(()),
    }
}

fn first_unbound(expr: &Expression) -> Option<String> {
    if let Expression::Column(column) = expr {
        if column.binding().is_none() {
            return Some(column.to_sql());
        }
    }
    expr.children().into_iter().find_map(first_unbound)
}
