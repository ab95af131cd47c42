//! SQL Server pagination through `ROW_NUMBER()`.
//!
//! A paginated query is wrapped so that every row carries its position:
//!
//! ```text
//! SELECT * FROM (SELECT ..., ROW_NUMBER() OVER (ORDER BY ...) AS _rownum FROM ...) _t
//! WHERE _rownum BETWEEN m+1 AND m+n ORDER BY _rownum
//! ```
//!
//! Without an explicit ordering the inner query gets a constant `_order_by`
//! column to number by, one level further down.

use crate::ast::builders::{asc, column, declare, row_number};
use crate::ast::{
    Expr, ExtensionExpression, ExtensionNode, SqlExpression, SqlType, UnionExpression,
    extension_eq,
};
use crate::error::{WeaveError, WeaveResult};
use crate::formatter::{IdentifierRules, SqlDialect, SqlFormatter, standard_type_name};
use crate::visitor::ExpressionVisitor;
use std::any::Any;
use std::hash::Hasher;
use std::sync::Arc;

const RESERVED_WORDS: &[&str] = &[
    "add", "all", "alter", "and", "any", "as", "asc", "authorization", "backup", "begin",
    "between", "break", "browse", "bulk", "by", "cascade", "case", "check", "checkpoint",
    "close", "clustered", "coalesce", "collate", "column", "commit", "compute", "constraint",
    "contains", "containstable", "continue", "convert", "create", "cross", "current",
    "current_date", "current_time", "current_timestamp", "current_user", "cursor", "database",
    "dbcc", "deallocate", "declare", "default", "delete", "deny", "desc", "disk", "distinct",
    "distributed", "double", "drop", "dump", "else", "end", "errlvl", "escape", "except", "exec",
    "execute", "exists", "exit", "external", "fetch", "file", "fillfactor", "for", "foreign",
    "freetext", "freetexttable", "from", "full", "function", "goto", "grant", "group", "having",
    "holdlock", "identity", "identity_insert", "identitycol", "if", "in", "index", "inner",
    "insert", "intersect", "into", "is", "join", "key", "kill", "left", "like", "lineno",
    "load", "merge", "national", "nocheck", "nonclustered", "not", "null", "nullif", "of",
    "off", "offsets", "on", "open", "opendatasource", "openquery", "openrowset", "openxml",
    "option", "or", "order", "outer", "over", "percent", "pivot", "plan", "precision",
    "primary", "print", "proc", "procedure", "public", "raiserror", "read", "readtext",
    "reconfigure", "references", "replication", "restore", "restrict", "return", "revert",
    "revoke", "right", "rollback", "rowcount", "rowguidcol", "rule", "save", "schema",
    "select", "session_user", "set", "setuser", "shutdown", "some", "statistics",
    "system_user", "table", "tablesample", "textsize", "then", "to", "top", "tran",
    "transaction", "trigger", "truncate", "try_convert", "tsequal", "union", "unique",
    "unpivot", "update", "updatetext", "use", "user", "values", "varying", "view", "waitfor",
    "when", "where", "while", "with", "writetext",
];

const ROW_NUMBER_COLUMN: &str = "_rownum";
const ORDER_BY_COLUMN: &str = "_order_by";

/// SQL Server: bracket quoting and row-number pagination.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl SqlDialect for SqlServerDialect {
    fn name(&self) -> &str {
        "sqlserver"
    }

    fn identifier_rules(&self) -> IdentifierRules {
        IdentifierRules {
            reserved_words: RESERVED_WORDS,
            extra_name_characters: "@$#",
            supports_mixed_case: true,
            supports_mixed_case_quoted: true,
            quote_start: "[",
            quote_end: "]",
            max_identifier_length: Some(128),
        }
    }

    fn type_name(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Boolean => "bit".to_string(),
            SqlType::Int => "int".to_string(),
            SqlType::Double => "float".to_string(),
            SqlType::Varchar | SqlType::Enum => "nvarchar(255)".to_string(),
            SqlType::Text => "nvarchar(max)".to_string(),
            SqlType::Bytes => "varbinary(max)".to_string(),
            SqlType::Timestamp => "datetime2".to_string(),
            _ => standard_type_name(sql_type),
        }
    }

    fn auto_increment(&self) -> &str {
        "identity(1,1)"
    }

    fn write_query(&self, f: &mut SqlFormatter<'_>, expr: &Expr) -> WeaveResult<()> {
        let (offset, limit) = expr.query_pagination();
        if offset.is_none() && limit.is_none() {
            return f.write_query_default(expr);
        }
        let Some(inner) = expr.without_ordering_and_pagination() else {
            return Err(WeaveError::Internal(format!(
                "{} is not a query expression",
                expr.kind()
            )));
        };
        let order_by = expr.query_order_by();

        f.write_keyword("select * from (");
        match (&inner, order_by.is_empty()) {
            (SqlExpression::Select(select), false) => {
                let rownum = declare(row_number(order_by.to_vec()), Some(ROW_NUMBER_COLUMN));
                f.write_select(select, &[rownum])?;
            }
            (_, false) => {
                self.write_numbered(f, order_by.to_vec(), |f| match &inner {
                    SqlExpression::Union(union) => f.write_union(union),
                    other => Err(WeaveError::unsupported(self.name(), other.kind())),
                })?;
            }
            (_, true) => {
                let by_marker = vec![asc(column(None, ORDER_BY_COLUMN, SqlType::Int))];
                self.write_numbered(f, by_marker, |f| match &inner {
                    SqlExpression::Select(select) => f.write_select(select, &[order_marker()]),
                    SqlExpression::Union(union) => self.write_marked_union(f, union),
                    other => Err(WeaveError::unsupported(self.name(), other.kind())),
                })?;
            }
        }
        f.write(") _t ");
        f.write_keyword("where ");
        f.write_identifier(ROW_NUMBER_COLUMN);
        // Bounds are computed in u128 so any usize offset and limit fit.
        let m = offset.unwrap_or(0) as u128;
        match limit {
            Some(n) => {
                f.write(" ");
                f.write_keyword("between ");
                f.write(&(m + 1).to_string());
                f.write(" ");
                f.write_keyword("and ");
                f.write(&(m + n as u128).to_string());
            }
            None => f.write(&format!(" > {}", m)),
        }
        f.write(" ");
        f.write_keyword("order by ");
        f.write_identifier(ROW_NUMBER_COLUMN);
        Ok(())
    }

    fn format_extension(
        &self,
        f: &mut SqlFormatter<'_>,
        _expr: &Expr,
        node: &ExtensionExpression,
    ) -> WeaveResult<()> {
        if node.node.as_any().is::<OrderMarker>() {
            f.write("0");
            return Ok(());
        }
        Err(WeaveError::unsupported(self.name(), node.node.name()))
    }
}

impl SqlServerDialect {
    /// `SELECT _n.*, ROW_NUMBER() OVER (ORDER BY ...) AS _rownum FROM (<inner>) _n`
    fn write_numbered(
        &self,
        f: &mut SqlFormatter<'_>,
        order_by: Vec<Expr>,
        inner: impl FnOnce(&mut SqlFormatter<'_>) -> WeaveResult<()>,
    ) -> WeaveResult<()> {
        f.write_keyword("select ");
        f.write("_n.*, ");
        f.write_list(&[declare(row_number(order_by), Some(ROW_NUMBER_COLUMN))])?;
        f.write(" ");
        f.write_keyword("from (");
        inner(f)?;
        f.write(") _n");
        Ok(())
    }

    // Both sides of an unordered union get the constant ordering column.
    fn write_marked_union(&self, f: &mut SqlFormatter<'_>, union: &UnionExpression) -> WeaveResult<()> {
        self.write_marked_side(f, &union.left)?;
        f.write(" ");
        f.write_keyword(if union.union_all { "union all " } else { "union " });
        self.write_marked_side(f, &union.right)
    }

    fn write_marked_side(&self, f: &mut SqlFormatter<'_>, side: &Expr) -> WeaveResult<()> {
        if let SqlExpression::Select(select) = side.as_ref() {
            if select.order_by.is_empty() && select.offset.is_none() && select.limit.is_none() {
                return f.write_select(select, &[order_marker()]);
            }
        }
        f.write_keyword("select *, ");
        f.write_list(&[order_marker()])?;
        f.write(" ");
        f.write_keyword("from (");
        f.visit(side)?;
        f.write(") _s");
        Ok(())
    }
}

/// The constant `0` numbered by when a query has no ordering of its own.
#[derive(Debug, Clone, PartialEq)]
struct OrderMarker;

impl ExtensionNode for OrderMarker {
    fn name(&self) -> &str {
        "OrderMarker"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_leaf(&self) -> bool {
        true
    }

    fn sql_type(&self) -> Option<SqlType> {
        Some(SqlType::Int)
    }

    fn with_children(&self, _children: Vec<Expr>) -> Arc<dyn ExtensionNode> {
        Arc::new(OrderMarker)
    }

    fn dyn_eq(&self, other: &dyn ExtensionNode) -> bool {
        extension_eq(self, other)
    }

    fn dyn_hash(&self, _state: &mut dyn Hasher) {}
}

fn order_marker() -> Expr {
    let marker: Expr = Arc::new(SqlExpression::Extension(ExtensionExpression::new(Arc::new(
        OrderMarker,
    ))));
    declare(marker, Some(ORDER_BY_COLUMN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;
    use crate::formatter::format;
    use pretty_assertions::assert_eq;

    fn employee() -> (Expr, Expr, Expr) {
        let t = table("t_employee");
        let id = column(Some(&t), "id", SqlType::Int);
        let name = column(Some(&t), "name", SqlType::Varchar);
        (t, id, name)
    }

    #[test]
    fn test_unpaginated_query_is_plain() {
        let (t, _, name) = employee();
        let query = SelectBuilder::from(t).column(name.clone()).order_by(name).build();
        let statement = format(&SqlServerDialect, &query).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT t_employee.name FROM t_employee ORDER BY t_employee.name ASC"
        );
    }

    #[test]
    fn test_ordered_pagination_selects_rows_m_plus_one_to_m_plus_n() {
        let (t, id, name) = employee();
        let query = SelectBuilder::from(t)
            .column(name)
            .order_by(desc(id))
            .offset(10)
            .limit(5)
            .build();
        let statement = format(&SqlServerDialect, &query).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT * FROM (SELECT t_employee.name, \
             ROW_NUMBER() OVER (ORDER BY t_employee.id DESC) AS _rownum FROM t_employee) _t \
             WHERE _rownum BETWEEN 11 AND 15 ORDER BY _rownum"
        );
    }

    #[test]
    fn test_first_page() {
        let (t, id, _) = employee();
        let query = SelectBuilder::from(t).order_by(id).limit(3).build();
        let statement = format(&SqlServerDialect, &query).unwrap();
        assert!(statement.sql.ends_with("WHERE _rownum BETWEEN 1 AND 3 ORDER BY _rownum"));
    }

    #[test]
    fn test_largest_offset_and_limit_do_not_overflow() {
        let (t, id, _) = employee();
        let query = SelectBuilder::from(t)
            .order_by(id)
            .offset(usize::MAX)
            .limit(usize::MAX)
            .build();
        let statement = format(&SqlServerDialect, &query).unwrap();
        let first = usize::MAX as u128 + 1;
        let last = usize::MAX as u128 * 2;
        assert!(
            statement
                .sql
                .ends_with(&format!("WHERE _rownum BETWEEN {first} AND {last} ORDER BY _rownum"))
        );
    }

    #[test]
    fn test_unordered_pagination_uses_constant_column() {
        let (t, _, name) = employee();
        let query = SelectBuilder::from(t)
            .column(name)
            .filter(column(None, "active", SqlType::Boolean).equal(true))
            .offset(20)
            .build();
        let statement = format(&SqlServerDialect, &query).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT * FROM (SELECT _n.*, ROW_NUMBER() OVER (ORDER BY _order_by ASC) AS _rownum \
             FROM (SELECT t_employee.name, 0 AS _order_by FROM t_employee WHERE active = ?) _n) _t \
             WHERE _rownum > 20 ORDER BY _rownum"
        );
        assert_eq!(statement.parameters.len(), 1);
    }

    #[test]
    fn test_unordered_union_marks_both_sides() {
        let a = SelectBuilder::from(table("t_a")).build();
        let b = SelectBuilder::from(table("t_b")).build();
        let query = paginate(&union(a, b), None, Some(10));
        let statement = format(&SqlServerDialect, &query).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT * FROM (SELECT _n.*, ROW_NUMBER() OVER (ORDER BY _order_by ASC) AS _rownum \
             FROM (SELECT *, 0 AS _order_by FROM t_a UNION SELECT *, 0 AS _order_by FROM t_b) _n) _t \
             WHERE _rownum BETWEEN 1 AND 10 ORDER BY _rownum"
        );
    }

    #[test]
    fn test_reserved_words_use_brackets() {
        let t = table("user");
        let query = SelectBuilder::from(t.clone())
            .column(column(Some(&t), "key", SqlType::Int))
            .build();
        let statement = format(&SqlServerDialect, &query).unwrap();
        assert_eq!(statement.sql, "SELECT [user].[key] FROM [user]");
    }
}
