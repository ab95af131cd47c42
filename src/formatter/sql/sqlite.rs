use super::write_limit_offset;
use crate::ast::SqlType;
use crate::error::WeaveResult;
use crate::formatter::{IdentifierRules, SQL92_RESERVED_WORDS, SqlDialect, SqlFormatter};

/// SQLite: `LIMIT n OFFSET m`, with `LIMIT -1` standing for "no limit".
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn identifier_rules(&self) -> IdentifierRules {
        IdentifierRules {
            reserved_words: SQL92_RESERVED_WORDS,
            extra_name_characters: "",
            supports_mixed_case: true,
            supports_mixed_case_quoted: true,
            quote_start: "\"",
            quote_end: "\"",
            max_identifier_length: None,
        }
    }

    // Storage classes, not declared types, decide what SQLite keeps.
    fn type_name(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Boolean | SqlType::SmallInt | SqlType::Int | SqlType::BigInt => "integer",
            SqlType::Double => "real",
            SqlType::Bytes => "blob",
            SqlType::Custom { name, .. } => name.as_str(),
            _ => "text",
        }
        .to_string()
    }

    fn auto_increment(&self) -> &str {
        "primary key autoincrement"
    }

    fn write_pagination(
        &self,
        f: &mut SqlFormatter<'_>,
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> WeaveResult<()> {
        if offset.is_some() && limit.is_none() {
            f.write(" ");
            f.write_keyword("limit ");
            f.write("-1");
        }
        write_limit_offset(f, offset, limit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;
    use crate::formatter::format;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_offset_without_limit() {
        let t = table("t_employee");
        let query = SelectBuilder::from(t).offset(5).build();
        let statement = format(&SqliteDialect, &query).unwrap();
        assert_eq!(statement.sql, "SELECT * FROM t_employee LIMIT -1 OFFSET 5");
    }

    #[test]
    fn test_paginated_union() {
        let a = SelectBuilder::from(table("t_a")).build();
        let b = SelectBuilder::from(table("t_b")).build();
        let query = paginate(&union_all(a, b), Some(0), Some(3));
        let statement = format(&SqliteDialect, &query).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT * FROM t_a UNION ALL SELECT * FROM t_b LIMIT 3 OFFSET 0"
        );
    }
}
