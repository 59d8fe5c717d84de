//! Value layer shared by every expression node.
//!
//! - **Value**: tagged scalar with a distinguished NULL
//! - **DataType**: semantic types and the conversions between them
//! - **CompareMode**: injected collation behind the total order of values

pub mod compare;
pub mod value;

pub use compare::{compare_not_null, BinaryCompare, CompareMode, IgnoreCaseCompare};
pub use value::{DataType, Value};
