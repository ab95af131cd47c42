//! Ergonomic constructors for expression trees.
//!
//! ```ignore
//! use sqlweave::ast::builders::*;
//!
//! let emp = table("t_employee");
//! let salary = column(Some(&emp), "salary", SqlType::BigInt);
//! let query = SelectBuilder::from(emp.clone())
//!     .column(salary.clone())
//!     .filter(salary.greater_than(1000i64))
//!     .order_by(desc(salary))
//!     .build();
//! ```

mod conditions;
mod statements;

pub use conditions::*;
pub use statements::*;

use crate::ast::{
    AggregateExpression, AggregateFunc, ArgumentExpression, CaseWhenExpression, CastExpression,
    ColumnDeclaringExpression, ColumnExpression, Expr, ExtraProperties, FunctionExpression,
    OrderByExpression, OrderType, SqlExpression, SqlType, TableExpression, Value,
    WindowExpression, WindowFunc,
};
use std::sync::Arc;

/// A table reference.
pub fn table(name: &str) -> Expr {
    Arc::new(SqlExpression::Table(TableExpression::new(name)))
}

/// A table reference with an alias.
pub fn table_as(name: &str, alias: &str) -> Expr {
    Arc::new(SqlExpression::Table(TableExpression::new(name).aliased(alias)))
}

/// A column, optionally qualified by a table node.
pub fn column(table: Option<&Expr>, name: &str, sql_type: SqlType) -> Expr {
    Arc::new(SqlExpression::Column(ColumnExpression {
        table: table.cloned(),
        name: name.to_string(),
        sql_type,
        extra: ExtraProperties::new(),
    }))
}

/// A bound argument typed by its own value; NULL is typed as varchar.
pub fn arg(value: impl Into<Value>) -> Expr {
    let value = value.into();
    let sql_type = value.sql_type().unwrap_or(SqlType::Varchar);
    typed_arg(value, sql_type)
}

pub fn typed_arg(value: impl Into<Value>, sql_type: SqlType) -> Expr {
    Arc::new(SqlExpression::Argument(ArgumentExpression {
        value: value.into(),
        sql_type,
        extra: ExtraProperties::new(),
    }))
}

/// A function call.
pub fn func(name: &str, arguments: Vec<Expr>, sql_type: SqlType) -> Expr {
    Arc::new(SqlExpression::Function(FunctionExpression {
        name: name.to_string(),
        arguments,
        sql_type,
        extra: ExtraProperties::new(),
    }))
}

fn aggregate(func: AggregateFunc, argument: Option<Expr>, distinct: bool, sql_type: SqlType) -> Expr {
    Arc::new(SqlExpression::Aggregate(AggregateExpression {
        func,
        argument,
        distinct,
        sql_type,
        extra: ExtraProperties::new(),
    }))
}

/// `count(*)`
pub fn count_all() -> Expr {
    aggregate(AggregateFunc::Count, None, false, SqlType::Int)
}

pub fn count(expr: Expr) -> Expr {
    aggregate(AggregateFunc::Count, Some(expr), false, SqlType::Int)
}

pub fn count_distinct(expr: Expr) -> Expr {
    aggregate(AggregateFunc::Count, Some(expr), true, SqlType::Int)
}

pub fn sum(expr: Expr) -> Expr {
    let ty = expr.sql_type().unwrap_or(SqlType::BigInt);
    aggregate(AggregateFunc::Sum, Some(expr), false, ty)
}

pub fn avg(expr: Expr) -> Expr {
    aggregate(AggregateFunc::Avg, Some(expr), false, SqlType::Double)
}

pub fn min(expr: Expr) -> Expr {
    let ty = expr.sql_type().unwrap_or(SqlType::BigInt);
    aggregate(AggregateFunc::Min, Some(expr), false, ty)
}

pub fn max(expr: Expr) -> Expr {
    let ty = expr.sql_type().unwrap_or(SqlType::BigInt);
    aggregate(AggregateFunc::Max, Some(expr), false, ty)
}

/// A window function call: `func(args) over (partition by ... order by ...)`.
pub fn window(
    func: WindowFunc,
    arguments: Vec<Expr>,
    partition_by: Vec<Expr>,
    order_by: Vec<Expr>,
    sql_type: SqlType,
) -> Expr {
    Arc::new(SqlExpression::Window(WindowExpression {
        func,
        arguments,
        partition_by,
        order_by,
        sql_type,
        extra: ExtraProperties::new(),
    }))
}

/// `row_number() over (order by ...)`
pub fn row_number(order_by: Vec<Expr>) -> Expr {
    window(WindowFunc::RowNumber, Vec::new(), Vec::new(), order_by, SqlType::BigInt)
}

pub fn cast(expr: Expr, sql_type: SqlType) -> Expr {
    Arc::new(SqlExpression::Cast(CastExpression {
        expression: expr,
        sql_type,
        extra: ExtraProperties::new(),
    }))
}

/// A searched `case when ... then ... else ... end`.
pub fn case_when(when_clauses: Vec<(Expr, Expr)>, else_clause: Option<Expr>) -> Expr {
    case_expression(None, when_clauses, else_clause)
}

/// A simple `case <operand> when ... then ... end`.
pub fn case_of(operand: Expr, when_clauses: Vec<(Expr, Expr)>, else_clause: Option<Expr>) -> Expr {
    case_expression(Some(operand), when_clauses, else_clause)
}

fn case_expression(
    operand: Option<Expr>,
    when_clauses: Vec<(Expr, Expr)>,
    else_clause: Option<Expr>,
) -> Expr {
    let sql_type = when_clauses
        .first()
        .and_then(|(_, then)| then.sql_type())
        .unwrap_or(SqlType::Varchar);
    Arc::new(SqlExpression::CaseWhen(CaseWhenExpression {
        operand,
        when_clauses,
        else_clause,
        sql_type,
        extra: ExtraProperties::new(),
    }))
}

/// A select-list entry with an optional output alias.
pub fn declare(expr: Expr, declared_name: Option<&str>) -> Expr {
    if let SqlExpression::ColumnDeclaring(existing) = expr.as_ref() {
        if existing.declared_name.as_deref() == declared_name {
            return expr;
        }
        return Arc::new(SqlExpression::ColumnDeclaring(ColumnDeclaringExpression {
            declared_name: declared_name.map(str::to_string),
            ..existing.clone()
        }));
    }
    Arc::new(SqlExpression::ColumnDeclaring(ColumnDeclaringExpression {
        expression: expr,
        declared_name: declared_name.map(str::to_string),
        extra: ExtraProperties::new(),
    }))
}

pub fn asc(expr: Expr) -> Expr {
    order(expr, OrderType::Ascending)
}

pub fn desc(expr: Expr) -> Expr {
    order(expr, OrderType::Descending)
}

fn order(expr: Expr, order_type: OrderType) -> Expr {
    Arc::new(SqlExpression::OrderBy(OrderByExpression {
        expression: expr,
        order_type,
        extra: ExtraProperties::new(),
    }))
}

/// Copy of `expr` with one extra property set.
pub fn with_extra(expr: &Expr, key: &str, value: impl Into<Value>) -> Expr {
    let mut node = expr.as_ref().clone();
    let extra = match &mut node {
        SqlExpression::Column(e) => &mut e.extra,
        SqlExpression::Argument(e) => &mut e.extra,
        SqlExpression::Unary(e) => &mut e.extra,
        SqlExpression::Binary(e) => &mut e.extra,
        SqlExpression::Function(e) => &mut e.extra,
        SqlExpression::Aggregate(e) => &mut e.extra,
        SqlExpression::Window(e) => &mut e.extra,
        SqlExpression::Cast(e) => &mut e.extra,
        SqlExpression::Between(e) => &mut e.extra,
        SqlExpression::InList(e) => &mut e.extra,
        SqlExpression::Exists(e) => &mut e.extra,
        SqlExpression::CaseWhen(e) => &mut e.extra,
        SqlExpression::ColumnDeclaring(e) => &mut e.extra,
        SqlExpression::OrderBy(e) => &mut e.extra,
        SqlExpression::ColumnAssignment(e) => &mut e.extra,
        SqlExpression::Table(e) => &mut e.extra,
        SqlExpression::Join(e) => &mut e.extra,
        SqlExpression::Select(e) => &mut e.extra,
        SqlExpression::Union(e) => &mut e.extra,
        SqlExpression::Insert(e) => &mut e.extra,
        SqlExpression::InsertFromQuery(e) => &mut e.extra,
        SqlExpression::Update(e) => &mut e.extra,
        SqlExpression::Delete(e) => &mut e.extra,
        SqlExpression::Extension(e) => &mut e.extra,
    };
    extra.insert(key.to_string(), value.into());
    Arc::new(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let t = table("t_employee");
        let a = column(Some(&t), "name", SqlType::Varchar);
        let b = column(Some(&table("t_employee")), "name", SqlType::Varchar);
        assert_eq!(a, b);
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(a.is_leaf());
    }

    #[test]
    fn test_declare_reuses_node_with_same_name() {
        let c = declare(column(None, "id", SqlType::Int), Some("emp_id"));
        let again = declare(c.clone(), Some("emp_id"));
        assert!(Arc::ptr_eq(&c, &again));
        let renamed = declare(c.clone(), Some("other"));
        assert!(!Arc::ptr_eq(&c, &renamed));
    }

    #[test]
    fn test_with_extra_yields_new_node() {
        let c = column(None, "id", SqlType::Int);
        let tagged = with_extra(&c, "hint", "index(id)");
        assert_ne!(c, tagged);
        assert_eq!(tagged.extra().get("hint"), Some(&Value::from("index(id)")));
        assert!(c.extra().is_empty());
    }

    #[test]
    fn test_aggregate_types() {
        let c = column(None, "salary", SqlType::BigInt);
        assert_eq!(sum(c.clone()).sql_type(), Some(SqlType::BigInt));
        assert_eq!(avg(c).sql_type(), Some(SqlType::Double));
        assert_eq!(count_all().sql_type(), Some(SqlType::Int));
    }
}
