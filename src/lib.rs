//! # sqlweave
//!
//! Typed SQL expression trees, dialect-aware formatting, and entity
//! materialization.
//!
//! Queries are immutable trees of [`ast::SqlExpression`] nodes shared through
//! [`ast::Expr`] handles. A [`formatter::SqlFormatter`] renders a tree for one
//! [`formatter::SqlDialect`] into SQL text plus ordered parameters. Tables
//! declared with [`schema::TableBuilder`] bind their columns to the fields of
//! an [`entity::EntityType`], so result rows can be turned back into
//! [`entity::Entity`] records, including the rows of referenced tables.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use sqlweave::prelude::*;
//!
//! let employees = table("t_employee");
//! let id = column(Some(&employees), "id", SqlType::Int);
//! let query = SelectBuilder::from(employees)
//!     .column(id.clone())
//!     .filter(id.greater_than(10))
//!     .limit(5)
//!     .build();
//!
//! let statement = format(&PostgresDialect, &query)?;
//! // => SELECT t_employee.id FROM t_employee WHERE t_employee.id > $1 LIMIT 5
//! ```
//!
//! ## Dialects
//!
//! | Dialect      | Quoting   | Pagination                        |
//! |--------------|-----------|-----------------------------------|
//! | `standard`   | `"name"`  | not supported                     |
//! | `postgres`   | `"name"`  | `LIMIT n OFFSET m`                |
//! | `mysql`      | `` `name` `` | `LIMIT m, n`                   |
//! | `sqlite`     | `"name"`  | `LIMIT n OFFSET m`                |
//! | `sqlserver`  | `[name]`  | `ROW_NUMBER()` window             |

pub mod ast;
pub mod codec;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod engine;
pub mod entity;
pub mod error;
pub mod formatter;
pub mod schema;
pub mod visitor;

pub mod prelude {
    pub use crate::ast::builders::*;
    pub use crate::ast::{Expr, SqlExpression, SqlType, Value};
    pub use crate::codec::{CodecRegistry, MemoryRow, Parameter, QueryRow, ResultRow};
    pub use crate::config::{FormatterConfig, KeywordCase};
    #[cfg(feature = "sqlx")]
    pub use crate::engine::WeaveDB;
    pub use crate::entity::{Entity, EntityType, FieldType, FieldValue};
    pub use crate::error::*;
    pub use crate::formatter::sql::{
        MySqlDialect, PostgresDialect, SqlServerDialect, SqliteDialect, StandardDialect,
    };
    pub use crate::formatter::{Dialect, SqlDialect, SqlFormatter, Statement, format, format_schema};
    pub use crate::schema::{Column, ColumnBinding, Table};
    pub use crate::visitor::ExpressionVisitor;
}

pub use formatter::{format, format_schema};
