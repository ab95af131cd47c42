use crate::formatter::{IdentifierRules, SQL92_RESERVED_WORDS, SqlDialect};

/// Plain SQL-92: double-quoted identifiers, `?` placeholders and no
/// pagination syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDialect;

impl SqlDialect for StandardDialect {
    fn name(&self) -> &str {
        "standard"
    }

    fn identifier_rules(&self) -> IdentifierRules {
        IdentifierRules {
            reserved_words: SQL92_RESERVED_WORDS,
            extra_name_characters: "",
            supports_mixed_case: false,
            supports_mixed_case_quoted: true,
            quote_start: "\"",
            quote_end: "\"",
            max_identifier_length: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;
    use crate::ast::SqlType;
    use crate::formatter::format;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reserved_and_mixed_case_identifiers_are_quoted() {
        let t = table("user");
        let query = SelectBuilder::from(t.clone())
            .column(column(Some(&t), "order", SqlType::Int))
            .column(column(Some(&t), "firstName", SqlType::Varchar))
            .column(column(Some(&t), "last_name", SqlType::Varchar))
            .build();
        let statement = format(&StandardDialect, &query).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT \"user\".\"order\", \"user\".\"firstName\", \"user\".last_name FROM \"user\""
        );
    }

    #[test]
    fn test_joins_render_left_to_right() {
        let emp = table_as("t_employee", "e");
        let dept = table_as("t_department", "d");
        let emp_dept = column(Some(&emp), "department_id", SqlType::Int);
        let dept_id = column(Some(&dept), "id", SqlType::Int);
        let query = SelectBuilder::from(left_join(emp.clone(), dept, eq(emp_dept, dept_id)))
            .column(column(Some(&emp), "name", SqlType::Varchar))
            .build();
        let statement = format(&StandardDialect, &query).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT e.name FROM t_employee e LEFT JOIN t_department d ON e.department_id = d.id"
        );
    }
}
