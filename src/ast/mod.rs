//! The expression tree.
//!
//! Nodes are immutable values compared structurally; "modifying" a node
//! means building a new one. Children are shared through [`Expr`] handles, so
//! rewrites reuse every unchanged subtree.

pub mod builders;
pub mod ddl;
pub mod dml;
pub mod expr;
pub mod operators;
pub mod query;
pub mod values;

pub use ddl::*;
pub use dml::*;
pub use expr::*;
pub use operators::*;
pub use query::*;
pub use values::*;
