use crate::ast::{
    Expr, ExtensionExpression, ExtensionNode, SqlExpression, SqlType, extension_eq,
};
use crate::error::{WeaveError, WeaveResult};
use crate::formatter::{IdentifierRules, SqlDialect, SqlFormatter, standard_type_name};
use std::any::Any;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const RESERVED_WORDS: &[&str] = &[
    "add", "all", "alter", "analyze", "and", "as", "asc", "before", "between", "bigint", "binary",
    "blob", "both", "by", "call", "cascade", "case", "change", "char", "character", "check",
    "collate", "column", "condition", "constraint", "continue", "convert", "create", "cross",
    "current_date", "current_time", "current_timestamp", "current_user", "cursor", "database",
    "databases", "dec", "decimal", "declare", "default", "delayed", "delete", "desc", "describe",
    "distinct", "div", "double", "drop", "dual", "each", "else", "elseif", "enclosed", "escaped",
    "exists", "exit", "explain", "false", "fetch", "float", "for", "force", "foreign", "from",
    "fulltext", "grant", "group", "having", "if", "ignore", "in", "index", "infile", "inner",
    "insert", "int", "integer", "interval", "into", "is", "join", "key", "keys", "kill",
    "leading", "leave", "left", "like", "limit", "lines", "load", "lock", "long", "loop",
    "match", "mod", "natural", "not", "null", "numeric", "on", "optimize", "option", "or",
    "order", "out", "outer", "precision", "primary", "procedure", "range", "read", "real",
    "references", "regexp", "rename", "repeat", "replace", "require", "restrict", "return",
    "revoke", "right", "rlike", "schema", "select", "set", "show", "smallint", "spatial",
    "sql", "table", "terminated", "then", "to", "trailing", "trigger", "true", "union", "unique",
    "unlock", "unsigned", "update", "usage", "use", "using", "values", "varchar", "when",
    "where", "while", "with", "write", "xor", "zerofill",
];

/// Row count MySQL documents for "all remaining rows" after an offset.
const ALL_ROWS: u64 = u64::MAX;

/// MySQL: backtick quoting, `LIMIT m, n` and `NATURAL JOIN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl SqlDialect for MySqlDialect {
    fn name(&self) -> &str {
        "mysql"
    }

    fn identifier_rules(&self) -> IdentifierRules {
        IdentifierRules {
            reserved_words: RESERVED_WORDS,
            extra_name_characters: "$",
            supports_mixed_case: true,
            supports_mixed_case_quoted: true,
            quote_start: "`",
            quote_end: "`",
            max_identifier_length: Some(64),
        }
    }

    fn type_name(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Double => "double".to_string(),
            SqlType::Text => "longtext".to_string(),
            SqlType::Timestamp => "datetime".to_string(),
            _ => standard_type_name(sql_type),
        }
    }

    fn auto_increment(&self) -> &str {
        "auto_increment"
    }

    fn write_pagination(
        &self,
        f: &mut SqlFormatter<'_>,
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> WeaveResult<()> {
        f.write(" ");
        f.write_keyword("limit ");
        match (offset, limit) {
            (Some(m), Some(n)) => f.write(&format!("{}, {}", m, n)),
            (Some(m), None) => f.write(&format!("{}, {}", m, ALL_ROWS)),
            (None, Some(n)) => f.write(&n.to_string()),
            (None, None) => {}
        }
        Ok(())
    }

    fn format_extension(
        &self,
        f: &mut SqlFormatter<'_>,
        _expr: &Expr,
        node: &ExtensionExpression,
    ) -> WeaveResult<()> {
        let Some(join) = node.node.as_any().downcast_ref::<NaturalJoinExpression>() else {
            return Err(WeaveError::unsupported(self.name(), node.node.name()));
        };
        f.write_source(&join.left)?;
        f.write(" ");
        f.write_keyword("natural join ");
        f.write_source(&join.right)
    }
}

/// `left NATURAL JOIN right`, joined on every column the sources share.
#[derive(Debug, Clone, PartialEq)]
pub struct NaturalJoinExpression {
    pub left: Expr,
    pub right: Expr,
}

impl ExtensionNode for NaturalJoinExpression {
    fn name(&self) -> &str {
        "NaturalJoin"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn children(&self) -> Vec<Expr> {
        vec![self.left.clone(), self.right.clone()]
    }

    fn with_children(&self, children: Vec<Expr>) -> Arc<dyn ExtensionNode> {
        let mut children = children.into_iter();
        let left = children.next().unwrap_or_else(|| self.left.clone());
        let right = children.next().unwrap_or_else(|| self.right.clone());
        Arc::new(NaturalJoinExpression { left, right })
    }

    fn dyn_eq(&self, other: &dyn ExtensionNode) -> bool {
        extension_eq(self, other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.left.hash(&mut state);
        self.right.hash(&mut state);
    }
}

/// A natural join source, formatted by [`MySqlDialect`].
pub fn natural_join(left: Expr, right: Expr) -> Expr {
    Arc::new(SqlExpression::Extension(ExtensionExpression::new(Arc::new(
        NaturalJoinExpression { left, right },
    ))))
}
