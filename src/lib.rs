pub mod access;
pub mod catalog;
pub mod compiler;
pub mod config;
pub mod executor;
pub mod expression;
pub mod index;
pub mod session;
