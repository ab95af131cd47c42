//! Identifier quoting rules.

/// What a dialect accepts as a bare identifier, and how it quotes the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierRules {
    /// Words that must be quoted when used as identifiers, compared
    /// case-insensitively.
    pub reserved_words: &'static [&'static str],
    /// Characters allowed in bare identifiers besides ASCII letters, digits
    /// and `_`.
    pub extra_name_characters: &'static str,
    /// Unquoted mixed-case identifiers keep their case.
    pub supports_mixed_case: bool,
    /// Quoted mixed-case identifiers keep their case.
    pub supports_mixed_case_quoted: bool,
    pub quote_start: &'static str,
    pub quote_end: &'static str,
    /// `None` when the dialect has no limit.
    pub max_identifier_length: Option<usize>,
}

impl IdentifierRules {
    /// Whether `ident` cannot be written bare.
    ///
    /// An identifier is quoted when it is empty, is a reserved word, contains
    /// characters outside the bare set, starts with a digit, or is mixed case
    /// on a dialect that folds unquoted case but keeps quoted case.
    pub fn should_quote(&self, ident: &str) -> bool {
        let Some(first) = ident.chars().next() else {
            return true;
        };
        if self.is_reserved(ident) {
            return true;
        }
        if !(first.is_ascii_alphabetic() || first == '_') {
            return true;
        }
        if ident.chars().any(|c| !self.is_name_character(c)) {
            return true;
        }
        is_mixed_case(ident) && !self.supports_mixed_case && self.supports_mixed_case_quoted
    }

    pub fn is_reserved(&self, ident: &str) -> bool {
        self.reserved_words
            .iter()
            .any(|word| word.eq_ignore_ascii_case(ident))
    }

    fn is_name_character(&self, c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || self.extra_name_characters.contains(c)
    }

    /// Wrap `ident` in quotes, doubling any embedded closing quote.
    pub fn quote(&self, ident: &str) -> String {
        let doubled = format!("{}{}", self.quote_end, self.quote_end);
        format!(
            "{}{}{}",
            self.quote_start,
            ident.replace(self.quote_end, &doubled),
            self.quote_end
        )
    }
}

fn is_mixed_case(ident: &str) -> bool {
    ident.chars().any(|c| c.is_uppercase()) && ident.chars().any(|c| c.is_lowercase())
}

/// Reserved words of SQL-92 that commonly collide with column names.
pub const SQL92_RESERVED_WORDS: &[&str] = &[
    "absolute", "action", "add", "all", "allocate", "alter", "and", "any", "are", "as", "asc",
    "assertion", "at", "authorization", "avg", "begin", "between", "bit", "bit_length", "both",
    "by", "cascade", "cascaded", "case", "cast", "catalog", "char", "char_length", "character",
    "character_length", "check", "close", "coalesce", "collate", "collation", "column", "commit",
    "connect", "connection", "constraint", "constraints", "continue", "convert", "corresponding",
    "count", "create", "cross", "current", "current_date", "current_time", "current_timestamp",
    "current_user", "cursor", "date", "day", "deallocate", "dec", "decimal", "declare", "default",
    "deferrable", "deferred", "delete", "desc", "describe", "descriptor", "diagnostics",
    "disconnect", "distinct", "domain", "double", "drop", "else", "end", "escape", "except",
    "exception", "exec", "execute", "exists", "external", "extract", "false", "fetch", "first",
    "float", "for", "foreign", "found", "from", "full", "get", "global", "go", "goto", "grant",
    "group", "having", "hour", "identity", "immediate", "in", "indicator", "initially", "inner",
    "input", "insensitive", "insert", "int", "integer", "intersect", "interval", "into", "is",
    "isolation", "join", "key", "language", "last", "leading", "left", "level", "like", "local",
    "lower", "match", "max", "min", "minute", "module", "month", "names", "national", "natural",
    "nchar", "next", "no", "not", "null", "nullif", "numeric", "octet_length", "of", "on", "only",
    "open", "option", "or", "order", "outer", "output", "overlaps", "pad", "partial", "position",
    "precision", "prepare", "preserve", "primary", "prior", "privileges", "procedure", "public",
    "read", "real", "references", "relative", "restrict", "revoke", "right", "rollback", "rows",
    "schema", "scroll", "second", "section", "select", "session", "session_user", "set", "size",
    "smallint", "some", "space", "sql", "sqlcode", "sqlerror", "sqlstate", "substring", "sum",
    "system_user", "table", "temporary", "then", "time", "timestamp", "timezone_hour",
    "timezone_minute", "to", "trailing", "transaction", "translate", "translation", "trim",
    "true", "union", "unique", "unknown", "update", "upper", "usage", "user", "using", "value",
    "values", "varchar", "varying", "view", "when", "whenever", "where", "with", "work", "write",
    "year", "zone",
];

#[cfg(test)]
mod tests {
    use super::*;

    const FOLDING: IdentifierRules = IdentifierRules {
        reserved_words: &["order", "user"],
        extra_name_characters: "$",
        supports_mixed_case: false,
        supports_mixed_case_quoted: true,
        quote_start: "\"",
        quote_end: "\"",
        max_identifier_length: Some(63),
    };

    #[test]
    fn test_plain_lowercase_is_bare() {
        assert!(!FOLDING.should_quote("department_id"));
        assert!(!FOLDING.should_quote("_ref0"));
        assert!(!FOLDING.should_quote("price$"));
    }

    #[test]
    fn test_reserved_words_are_quoted_in_any_case() {
        assert!(FOLDING.should_quote("order"));
        assert!(FOLDING.should_quote("USER"));
    }

    #[test]
    fn test_invalid_characters_are_quoted() {
        assert!(FOLDING.should_quote("first name"));
        assert!(FOLDING.should_quote("1st"));
        assert!(FOLDING.should_quote(""));
        assert!(FOLDING.should_quote("naïve"));
    }

    #[test]
    fn test_mixed_case_depends_on_folding() {
        assert!(FOLDING.should_quote("firstName"));
        assert!(!FOLDING.should_quote("FIRSTNAME"));
        let keeps_case = IdentifierRules {
            supports_mixed_case: true,
            ..FOLDING
        };
        assert!(!keeps_case.should_quote("firstName"));
    }

    #[test]
    fn test_quote_doubles_closing_quote() {
        assert_eq!(FOLDING.quote("a\"b"), "\"a\"\"b\"");
        let brackets = IdentifierRules {
            quote_start: "[",
            quote_end: "]",
            ..FOLDING
        };
        assert_eq!(brackets.quote("order"), "[order]");
    }
}
