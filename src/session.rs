//! Per-statement evaluation state.

use crate::access::{compare_not_null, CompareMode, Value};
use crate::catalog::FilterId;
use crate::config::ExpressionConfig;
use crate::expression::{ExpressionError, ExpressionResult};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Holds what an expression needs besides its own tree: configuration, the
/// collation, prepared statement parameters and the current row of every
/// table filter in scope (outer queries included).
#[derive(Clone)]
pub struct Session {
    config: ExpressionConfig,
    compare_mode: Arc<dyn CompareMode>,
    parameters: Vec<Option<Value>>,
    rows: HashMap<FilterId, Vec<Value>>,
}

impl Session {
    pub fn new(config: ExpressionConfig) -> Self {
        let compare_mode = config.collation.compare_mode();
        Session {
            config,
            compare_mode,
            parameters: Vec::new(),
            rows: HashMap::new(),
        }
    }

    /// Replace the collation chosen by the configuration
    pub fn with_compare_mode(mut self, compare_mode: Arc<dyn CompareMode>) -> Self {
        self.compare_mode = compare_mode;
        self
    }

    pub fn config(&self) -> &ExpressionConfig {
        &self.config
    }

    pub fn optimize_in(&self) -> bool {
        self.config.optimize_in
    }

    pub fn compare_mode(&self) -> &dyn CompareMode {
        self.compare_mode.as_ref()
    }

    /// Compare two non-NULL values under this session's collation
    pub fn compare(&self, left: &Value, right: &Value) -> ExpressionResult<Ordering> {
        compare_not_null(self.compare_mode(), left, right)
    }

    /// Set parameter `?index` (1-based)
    pub fn set_parameter(&mut self, index: usize, value: Value) {
        if index == 0 {
            return;
        }
        if self.parameters.len() < index {
            self.parameters.resize(index, None);
        }
        self.parameters[index - 1] = Some(value);
    }

    pub fn clear_parameters(&mut self) {
        self.parameters.clear();
    }

    pub fn parameter(&self, index: usize) -> ExpressionResult<Value> {
        index
            .checked_sub(1)
            .and_then(|i| self.parameters.get(i))
            .and_then(|value| value.clone())
            .ok_or(ExpressionError::ParameterNotSet { index })
    }

    pub fn set_current_row(&mut self, filter: FilterId, values: Vec<Value>) {
        self.rows.insert(filter, values);
    }

    pub fn clear_current_row(&mut self, filter: FilterId) {
        self.rows.remove(&filter);
    }

    pub fn current_row(&self, filter: FilterId) -> Option<&[Value]> {
        self.rows.get(&filter).map(Vec::as_slice)
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(ExpressionConfig::default())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("compare_mode", &self.compare_mode.name())
            .field("parameters", &self.parameters)
            .field("rows", &self.rows)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::IgnoreCaseCompare;

    #[test]
    fn test_parameters() {
        let mut session = Session::default();
        assert_eq!(
            session.parameter(1),
            Err(ExpressionError::ParameterNotSet { index: 1 })
        );

        session.set_parameter(2, Value::Int32(9));
        assert_eq!(session.parameter(2).unwrap(), Value::Int32(9));
        assert!(session.parameter(1).is_err());
        assert!(session.parameter(0).is_err());

        session.clear_parameters();
        assert!(session.parameter(2).is_err());
    }

    #[test]
    fn test_current_rows() {
        let mut session = Session::default();
        let filter = FilterId::next();
        assert!(session.current_row(filter).is_none());

        session.set_current_row(filter, vec![Value::Int32(1), Value::Null]);
        assert_eq!(
            session.current_row(filter).unwrap(),
            &[Value::Int32(1), Value::Null]
        );

        session.clear_current_row(filter);
        assert!(session.current_row(filter).is_none());
    }

    #[test]
    fn test_compare_mode_override() {
        let session = Session::default().with_compare_mode(Arc::new(IgnoreCaseCompare));
        assert_eq!(
            session
                .compare(&Value::from("ABC"), &Value::from("abc"))
                .unwrap(),
            Ordering::Equal
        );
    }
}
