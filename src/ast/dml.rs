//! Data-modification statements.

use crate::ast::{Expr, ExtraProperties};

/// `insert into <table> (<columns>) values (<expressions>)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InsertExpression {
    pub table: Expr,
    /// [`crate::ast::ColumnAssignmentExpression`] nodes.
    pub assignments: Vec<Expr>,
    pub extra: ExtraProperties,
}

/// `insert into <table> (<columns>) <query>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InsertFromQueryExpression {
    pub table: Expr,
    pub columns: Vec<Expr>,
    pub query: Expr,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpdateExpression {
    pub table: Expr,
    pub assignments: Vec<Expr>,
    pub filter: Option<Expr>,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeleteExpression {
    pub table: Expr,
    pub filter: Option<Expr>,
    pub extra: ExtraProperties,
}
