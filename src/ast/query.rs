//! Query sources and query expressions.

use crate::ast::{Expr, ExtraProperties, JoinType};

/// A table reference in a query source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableExpression {
    pub name: String,
    pub table_alias: Option<String>,
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub extra: ExtraProperties,
}

impl TableExpression {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_alias: None,
            catalog: None,
            schema: None,
            extra: ExtraProperties::new(),
        }
    }

    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.table_alias = Some(alias.into());
        self
    }

    /// The name columns of this table are qualified with.
    pub fn qualifier(&self) -> &str {
        match &self.table_alias {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinExpression {
    pub join_type: JoinType,
    pub left: Expr,
    pub right: Expr,
    pub condition: Option<Expr>,
    pub extra: ExtraProperties,
}

/// A select statement.
///
/// Used as a nested source when `table_alias` is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectExpression {
    /// Select list, typically [`crate::ast::ColumnDeclaringExpression`] nodes. Empty means `*`.
    pub columns: Vec<Expr>,
    pub from: Expr,
    pub filter: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub distinct: bool,
    /// [`crate::ast::OrderByExpression`] nodes.
    pub order_by: Vec<Expr>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub table_alias: Option<String>,
    pub extra: ExtraProperties,
}

impl SelectExpression {
    /// `select * from <from>`.
    pub fn new(from: Expr) -> Self {
        Self {
            columns: Vec::new(),
            from,
            filter: None,
            group_by: Vec::new(),
            having: None,
            distinct: false,
            order_by: Vec::new(),
            offset: None,
            limit: None,
            table_alias: None,
            extra: ExtraProperties::new(),
        }
    }
}

/// `left union [all] right`, with its own ordering and pagination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnionExpression {
    pub left: Expr,
    pub right: Expr,
    pub union_all: bool,
    pub order_by: Vec<Expr>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub table_alias: Option<String>,
    pub extra: ExtraProperties,
}

impl UnionExpression {
    pub fn new(left: Expr, right: Expr, union_all: bool) -> Self {
        Self {
            left,
            right,
            union_all,
            order_by: Vec::new(),
            offset: None,
            limit: None,
            table_alias: None,
            extra: ExtraProperties::new(),
        }
    }
}
