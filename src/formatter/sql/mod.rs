//! Bundled SQL dialects.

pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;
pub mod standard;

pub use mysql::{MySqlDialect, NaturalJoinExpression, natural_join};
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;
pub use standard::StandardDialect;

use crate::formatter::SqlFormatter;

/// Write `LIMIT n OFFSET m`, omitting whichever part is unset.
pub(crate) fn write_limit_offset(
    f: &mut SqlFormatter<'_>,
    offset: Option<usize>,
    limit: Option<usize>,
) {
    if let Some(n) = limit {
        f.write(" ");
        f.write_keyword("limit ");
        f.write(&n.to_string());
    }
    if let Some(m) = offset {
        f.write(" ");
        f.write_keyword("offset ");
        f.write(&m.to_string());
    }
}
