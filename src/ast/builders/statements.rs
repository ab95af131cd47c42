//! Query and data-modification statement builders.

use super::{all_of, and, declare};
use crate::ast::{
    ColumnAssignmentExpression, DeleteExpression, Expr, ExtraProperties, InsertExpression,
    InsertFromQueryExpression, JoinExpression, JoinType, SelectExpression, SqlExpression,
    UnionExpression, UpdateExpression,
};
use std::sync::Arc;

/// Fluent builder for [`SelectExpression`].
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    select: SelectExpression,
}

impl SelectBuilder {
    pub fn from(source: Expr) -> Self {
        Self {
            select: SelectExpression::new(source),
        }
    }

    /// Add a select-list entry; declared columns keep their alias.
    pub fn column(mut self, expr: Expr) -> Self {
        self.select.columns.push(select_item(expr));
        self
    }

    /// Add a select-list entry with an output alias.
    pub fn column_as(mut self, expr: Expr, alias: &str) -> Self {
        self.select.columns.push(declare(expr, Some(alias)));
        self
    }

    pub fn columns(mut self, exprs: impl IntoIterator<Item = Expr>) -> Self {
        self.select
            .columns
            .extend(exprs.into_iter().map(select_item));
        self
    }

    /// Add a filter; repeated calls are combined with `and`.
    pub fn filter(mut self, condition: Expr) -> Self {
        self.select.filter = Some(match self.select.filter.take() {
            Some(existing) => and(existing, condition),
            None => condition,
        });
        self
    }

    pub fn filter_all(self, conditions: impl IntoIterator<Item = Expr>) -> Self {
        match all_of(conditions) {
            Some(condition) => self.filter(condition),
            None => self,
        }
    }

    pub fn group_by(mut self, expr: Expr) -> Self {
        self.select.group_by.push(expr);
        self
    }

    pub fn having(mut self, condition: Expr) -> Self {
        self.select.having = Some(match self.select.having.take() {
            Some(existing) => and(existing, condition),
            None => condition,
        });
        self
    }

    pub fn distinct(mut self) -> Self {
        self.select.distinct = true;
        self
    }

    /// Add an ordering; bare expressions are ordered ascending.
    pub fn order_by(mut self, expr: Expr) -> Self {
        let expr = match expr.as_ref() {
            SqlExpression::OrderBy(_) => expr,
            _ => super::asc(expr),
        };
        self.select.order_by.push(expr);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.select.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.select.limit = Some(limit);
        self
    }

    /// Alias used when the query is nested as a source.
    pub fn alias(mut self, alias: &str) -> Self {
        self.select.table_alias = Some(alias.to_string());
        self
    }

    pub fn build(self) -> Expr {
        Arc::new(SqlExpression::Select(self.select))
    }
}

fn select_item(expr: Expr) -> Expr {
    match expr.as_ref() {
        SqlExpression::ColumnDeclaring(_) => expr,
        _ => declare(expr, None),
    }
}

/// Copy of a query with new pagination; other nodes are returned unchanged.
pub fn paginate(query: &Expr, offset: Option<usize>, limit: Option<usize>) -> Expr {
    match query.as_ref() {
        SqlExpression::Select(select) => Arc::new(SqlExpression::Select(SelectExpression {
            offset,
            limit,
            ..select.clone()
        })),
        SqlExpression::Union(union) => Arc::new(SqlExpression::Union(UnionExpression {
            offset,
            limit,
            ..union.clone()
        })),
        _ => query.clone(),
    }
}

/// Copy of a query with new ordering; other nodes are returned unchanged.
pub fn order_query(query: &Expr, order_by: Vec<Expr>) -> Expr {
    match query.as_ref() {
        SqlExpression::Select(select) => Arc::new(SqlExpression::Select(SelectExpression {
            order_by,
            ..select.clone()
        })),
        SqlExpression::Union(union) => Arc::new(SqlExpression::Union(UnionExpression {
            order_by,
            ..union.clone()
        })),
        _ => query.clone(),
    }
}

pub fn join(join_type: JoinType, left: Expr, right: Expr, condition: Option<Expr>) -> Expr {
    Arc::new(SqlExpression::Join(JoinExpression {
        join_type,
        left,
        right,
        condition,
        extra: ExtraProperties::new(),
    }))
}

pub fn inner_join(left: Expr, right: Expr, on: Expr) -> Expr {
    join(JoinType::Inner, left, right, Some(on))
}

pub fn left_join(left: Expr, right: Expr, on: Expr) -> Expr {
    join(JoinType::Left, left, right, Some(on))
}

pub fn right_join(left: Expr, right: Expr, on: Expr) -> Expr {
    join(JoinType::Right, left, right, Some(on))
}

pub fn full_join(left: Expr, right: Expr, on: Expr) -> Expr {
    join(JoinType::Full, left, right, Some(on))
}

pub fn cross_join(left: Expr, right: Expr) -> Expr {
    join(JoinType::Cross, left, right, None)
}

pub fn union(left: Expr, right: Expr) -> Expr {
    Arc::new(SqlExpression::Union(UnionExpression::new(left, right, false)))
}

pub fn union_all(left: Expr, right: Expr) -> Expr {
    Arc::new(SqlExpression::Union(UnionExpression::new(left, right, true)))
}

/// `column = expression`.
pub fn assign(column: Expr, expression: Expr) -> Expr {
    Arc::new(SqlExpression::ColumnAssignment(ColumnAssignmentExpression {
        column,
        expression,
        extra: ExtraProperties::new(),
    }))
}

pub fn insert(table: Expr, assignments: Vec<Expr>) -> Expr {
    Arc::new(SqlExpression::Insert(InsertExpression {
        table,
        assignments,
        extra: ExtraProperties::new(),
    }))
}

pub fn insert_from_query(table: Expr, columns: Vec<Expr>, query: Expr) -> Expr {
    Arc::new(SqlExpression::InsertFromQuery(InsertFromQueryExpression {
        table,
        columns,
        query,
        extra: ExtraProperties::new(),
    }))
}

pub fn update(table: Expr, assignments: Vec<Expr>, filter: Option<Expr>) -> Expr {
    Arc::new(SqlExpression::Update(UpdateExpression {
        table,
        assignments,
        filter,
        extra: ExtraProperties::new(),
    }))
}

pub fn delete(table: Expr, filter: Option<Expr>) -> Expr {
    Arc::new(SqlExpression::Delete(DeleteExpression {
        table,
        filter,
        extra: ExtraProperties::new(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SqlType;
    use crate::ast::builders::{ExprExt, column, table};

    #[test]
    fn test_select_builder_combines_filters() {
        let t = table("t_employee");
        let id = column(Some(&t), "id", SqlType::Int);
        let name = column(Some(&t), "name", SqlType::Varchar);
        let query = SelectBuilder::from(t.clone())
            .column(id.clone())
            .filter(id.greater_than(1))
            .filter(name.is_not_null())
            .order_by(id.clone())
            .limit(5)
            .build();

        let SqlExpression::Select(select) = query.as_ref() else {
            panic!("expected select");
        };
        assert_eq!(select.columns.len(), 1);
        assert_eq!(
            select.filter,
            Some(super::and(id.greater_than(1), name.is_not_null()))
        );
        assert!(matches!(select.order_by[0].as_ref(), SqlExpression::OrderBy(_)));
        assert_eq!(query.query_pagination(), (None, Some(5)));
    }

    #[test]
    fn test_paginate_union() {
        let a = SelectBuilder::from(table("a")).build();
        let b = SelectBuilder::from(table("b")).build();
        let u = paginate(&union_all(a, b), Some(10), Some(5));
        assert_eq!(u.query_pagination(), (Some(10), Some(5)));
        assert!(u.is_query());
    }
}
