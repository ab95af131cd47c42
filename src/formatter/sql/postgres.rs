use super::write_limit_offset;
use crate::ast::SqlType;
use crate::error::WeaveResult;
use crate::formatter::{IdentifierRules, SqlDialect, SqlFormatter, standard_type_name};

const RESERVED_WORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both",
    "case", "cast", "check", "collate", "column", "constraint", "create", "current_catalog",
    "current_date", "current_role", "current_time", "current_timestamp", "current_user",
    "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "false", "fetch",
    "for", "foreign", "from", "grant", "group", "having", "in", "initially", "intersect", "into",
    "lateral", "leading", "limit", "localtime", "localtimestamp", "not", "null", "offset", "on",
    "only", "or", "order", "placing", "primary", "references", "returning", "select",
    "session_user", "some", "symmetric", "table", "then", "to", "trailing", "true", "union",
    "unique", "user", "using", "variadic", "when", "where", "window", "with",
];

/// PostgreSQL: `$n` placeholders, `LIMIT n OFFSET m`, lower-case folding.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn identifier_rules(&self) -> IdentifierRules {
        IdentifierRules {
            reserved_words: RESERVED_WORDS,
            extra_name_characters: "$",
            supports_mixed_case: false,
            supports_mixed_case_quoted: true,
            quote_start: "\"",
            quote_end: "\"",
            max_identifier_length: Some(63),
        }
    }

    fn uppercase_keywords(&self) -> bool {
        false
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn type_name(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Text => "text".to_string(),
            SqlType::Bytes => "bytea".to_string(),
            _ => standard_type_name(sql_type),
        }
    }

    fn write_pagination(
        &self,
        f: &mut SqlFormatter<'_>,
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> WeaveResult<()> {
        write_limit_offset(f, offset, limit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;
    use crate::config::{FormatterConfig, KeywordCase};
    use crate::formatter::format;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numbered_placeholders_and_pagination() {
        let t = table("t_employee");
        let id = column(Some(&t), "id", SqlType::Int);
        let query = SelectBuilder::from(t)
            .column(id.clone())
            .filter(id.between(1, 10))
            .order_by(id)
            .offset(20)
            .limit(10)
            .build();
        let statement = format(&PostgresDialect, &query).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT t_employee.id FROM t_employee WHERE t_employee.id BETWEEN $1 AND $2 \
             ORDER BY t_employee.id ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(statement.parameters.len(), 2);
    }

    #[test]
    fn test_dialect_keyword_case() {
        let t = table("t_employee");
        let query = SelectBuilder::from(t).limit(1).build();
        let config = FormatterConfig::builder()
            .keyword_case(KeywordCase::Dialect)
            .build();
        let statement = SqlFormatter::with_config(&PostgresDialect, config)
            .format(&query)
            .unwrap();
        assert_eq!(statement.sql, "select * from t_employee limit 1");
    }

    #[test]
    fn test_identifier_limit() {
        let f = SqlFormatter::new(&PostgresDialect);
        assert_eq!(f.max_identifier_length(), Some(63));
        let config = FormatterConfig::builder().max_identifier_length(30).build();
        let f = SqlFormatter::with_config(&PostgresDialect, config);
        assert_eq!(f.max_identifier_length(), Some(30));
    }
}
