use crate::ast::{Expr, ExtensionExpression, SqlType};
use crate::error::{WeaveError, WeaveResult};
use crate::formatter::sql::{
    MySqlDialect, PostgresDialect, SqlServerDialect, SqliteDialect, StandardDialect,
};
use crate::formatter::{IdentifierRules, SqlFormatter};
use serde::{Deserialize, Serialize};

/// Bundled dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Standard,
    Postgres,
    MySql,
    Sqlite,
    SqlServer,
}

impl Dialect {
    pub fn generator(&self) -> Box<dyn SqlDialect> {
        match self {
            Dialect::Standard => Box::new(StandardDialect),
            Dialect::Postgres => Box::new(PostgresDialect),
            Dialect::MySql => Box::new(MySqlDialect),
            Dialect::Sqlite => Box::new(SqliteDialect),
            Dialect::SqlServer => Box::new(SqlServerDialect),
        }
    }
}

/// Trait for dialect-specific formatting.
///
/// Every method has a standard-SQL default; a dialect overrides what its
/// database does differently. Methods that write SQL receive the active
/// [`SqlFormatter`] and use its `write_*` helpers.
pub trait SqlDialect: Send + Sync {
    /// Name used in error messages.
    fn name(&self) -> &str;

    fn identifier_rules(&self) -> IdentifierRules;

    /// Keyword casing when the configuration defers to the dialect.
    fn uppercase_keywords(&self) -> bool {
        true
    }

    /// Placeholder for the parameter at `index`, one-based.
    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    /// Type name used by `cast` and column definitions, lower case.
    fn type_name(&self, sql_type: &SqlType) -> String {
        standard_type_name(sql_type)
    }

    /// Keywords appended to an auto-increment column definition.
    fn auto_increment(&self) -> &str {
        "generated by default as identity"
    }

    /// Write a select or union, including its ordering and pagination.
    fn write_query(&self, f: &mut SqlFormatter<'_>, expr: &Expr) -> WeaveResult<()> {
        f.write_query_default(expr)
    }

    /// Write pagination after the ordering of a query.
    ///
    /// Standard SQL has no offset/limit syntax.
    fn write_pagination(
        &self,
        _f: &mut SqlFormatter<'_>,
        _offset: Option<usize>,
        _limit: Option<usize>,
    ) -> WeaveResult<()> {
        Err(WeaveError::UnsupportedPagination {
            dialect: self.name().to_string(),
        })
    }

    /// Write an extension node this dialect understands.
    fn format_extension(
        &self,
        _f: &mut SqlFormatter<'_>,
        _expr: &Expr,
        node: &ExtensionExpression,
    ) -> WeaveResult<()> {
        Err(WeaveError::unsupported(self.name(), node.node.name()))
    }

    /// Write a schema extension node this dialect understands.
    fn format_schema_extension(
        &self,
        _f: &mut SqlFormatter<'_>,
        node: &ExtensionExpression,
    ) -> WeaveResult<()> {
        Err(WeaveError::unsupported(self.name(), node.node.name()))
    }
}

pub fn standard_type_name(sql_type: &SqlType) -> String {
    match sql_type {
        SqlType::Boolean => "boolean",
        SqlType::SmallInt => "smallint",
        SqlType::Int => "integer",
        SqlType::BigInt => "bigint",
        SqlType::Double => "double precision",
        SqlType::Varchar | SqlType::Enum => "varchar(255)",
        SqlType::Text => "clob",
        SqlType::Bytes => "blob",
        SqlType::Date => "date",
        SqlType::Time => "time",
        SqlType::Timestamp => "timestamp",
        SqlType::Custom { name, .. } => name.as_str(),
    }
    .to_string()
}
