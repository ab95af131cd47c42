//! Operator and predicate builders.

use super::typed_arg;
use crate::ast::{
    BetweenExpression, BinaryExpression, BinaryOp, ExistsExpression, Expr, ExtraProperties,
    InListExpression, SqlExpression, SqlType, UnaryExpression, UnaryOp, Value,
};
use std::sync::Arc;

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let sql_type = if op.is_predicate() {
        SqlType::Boolean
    } else {
        left.sql_type().unwrap_or(SqlType::BigInt)
    };
    Arc::new(SqlExpression::Binary(BinaryExpression {
        op,
        left,
        right,
        sql_type,
        extra: ExtraProperties::new(),
    }))
}

fn unary(op: UnaryOp, operand: Expr) -> Expr {
    let sql_type = match op {
        UnaryOp::Minus | UnaryOp::Plus => operand.sql_type().unwrap_or(SqlType::BigInt),
        _ => SqlType::Boolean,
    };
    Arc::new(SqlExpression::Unary(UnaryExpression {
        op,
        operand,
        sql_type,
        extra: ExtraProperties::new(),
    }))
}

pub fn eq(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Equal, left, right)
}

pub fn ne(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::NotEqual, left, right)
}

pub fn lt(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::LessThan, left, right)
}

pub fn lte(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::LessThanOrEqual, left, right)
}

pub fn gt(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::GreaterThan, left, right)
}

pub fn gte(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::GreaterThanOrEqual, left, right)
}

pub fn and(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::And, left, right)
}

pub fn or(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Or, left, right)
}

pub fn xor(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Xor, left, right)
}

pub fn plus(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Plus, left, right)
}

pub fn minus(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Minus, left, right)
}

pub fn times(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Times, left, right)
}

pub fn div(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Div, left, right)
}

pub fn rem(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Rem, left, right)
}

pub fn like(left: Expr, pattern: Expr) -> Expr {
    binary(BinaryOp::Like, left, pattern)
}

pub fn not_like(left: Expr, pattern: Expr) -> Expr {
    binary(BinaryOp::NotLike, left, pattern)
}

pub fn not(expr: Expr) -> Expr {
    unary(UnaryOp::Not, expr)
}

pub fn neg(expr: Expr) -> Expr {
    unary(UnaryOp::Minus, expr)
}

pub fn is_null(expr: Expr) -> Expr {
    unary(UnaryOp::IsNull, expr)
}

pub fn is_not_null(expr: Expr) -> Expr {
    unary(UnaryOp::IsNotNull, expr)
}

pub fn between(expr: Expr, lower: Expr, upper: Expr) -> Expr {
    between_expression(expr, lower, upper, false)
}

pub fn not_between(expr: Expr, lower: Expr, upper: Expr) -> Expr {
    between_expression(expr, lower, upper, true)
}

fn between_expression(expr: Expr, lower: Expr, upper: Expr, not_between: bool) -> Expr {
    Arc::new(SqlExpression::Between(BetweenExpression {
        expression: expr,
        lower,
        upper,
        not_between,
        extra: ExtraProperties::new(),
    }))
}

pub fn in_list(left: Expr, values: Vec<Expr>) -> Expr {
    in_expression(left, None, values, false)
}

pub fn not_in_list(left: Expr, values: Vec<Expr>) -> Expr {
    in_expression(left, None, values, true)
}

pub fn in_query(left: Expr, query: Expr) -> Expr {
    in_expression(left, Some(query), Vec::new(), false)
}

pub fn not_in_query(left: Expr, query: Expr) -> Expr {
    in_expression(left, Some(query), Vec::new(), true)
}

fn in_expression(left: Expr, query: Option<Expr>, values: Vec<Expr>, not_in: bool) -> Expr {
    Arc::new(SqlExpression::InList(InListExpression {
        left,
        query,
        values,
        not_in,
        extra: ExtraProperties::new(),
    }))
}

pub fn exists(query: Expr) -> Expr {
    exists_expression(query, false)
}

pub fn not_exists(query: Expr) -> Expr {
    exists_expression(query, true)
}

fn exists_expression(query: Expr, not_exists: bool) -> Expr {
    Arc::new(SqlExpression::Exists(ExistsExpression {
        query,
        not_exists,
        extra: ExtraProperties::new(),
    }))
}

/// Fold predicates with `and`; `None` when there are none.
pub fn all_of(predicates: impl IntoIterator<Item = Expr>) -> Option<Expr> {
    predicates.into_iter().reduce(and)
}

/// Fold predicates with `or`; `None` when there are none.
pub fn any_of(predicates: impl IntoIterator<Item = Expr>) -> Option<Expr> {
    predicates.into_iter().reduce(or)
}

/// Fluent comparisons against plain values.
///
/// Values are bound as arguments typed like the receiving expression, so a
/// `bigint` column compared with `1i32` still binds a `bigint` parameter.
pub trait ExprExt {
    fn typed(&self, value: impl Into<Value>) -> Expr;
    fn equal(&self, value: impl Into<Value>) -> Expr;
    fn not_equal(&self, value: impl Into<Value>) -> Expr;
    fn less_than(&self, value: impl Into<Value>) -> Expr;
    fn less_or_equal(&self, value: impl Into<Value>) -> Expr;
    fn greater_than(&self, value: impl Into<Value>) -> Expr;
    fn greater_or_equal(&self, value: impl Into<Value>) -> Expr;
    fn like(&self, pattern: &str) -> Expr;
    fn between(&self, lower: impl Into<Value>, upper: impl Into<Value>) -> Expr;
    fn in_values<V: Into<Value>>(&self, values: impl IntoIterator<Item = V>) -> Expr;
    fn is_null(&self) -> Expr;
    fn is_not_null(&self) -> Expr;
}

impl ExprExt for Expr {
    fn typed(&self, value: impl Into<Value>) -> Expr {
        let value = value.into();
        let sql_type = self
            .sql_type()
            .or_else(|| value.sql_type())
            .unwrap_or(SqlType::Varchar);
        typed_arg(value, sql_type)
    }

    fn equal(&self, value: impl Into<Value>) -> Expr {
        eq(self.clone(), self.typed(value))
    }

    fn not_equal(&self, value: impl Into<Value>) -> Expr {
        ne(self.clone(), self.typed(value))
    }

    fn less_than(&self, value: impl Into<Value>) -> Expr {
        lt(self.clone(), self.typed(value))
    }

    fn less_or_equal(&self, value: impl Into<Value>) -> Expr {
        lte(self.clone(), self.typed(value))
    }

    fn greater_than(&self, value: impl Into<Value>) -> Expr {
        gt(self.clone(), self.typed(value))
    }

    fn greater_or_equal(&self, value: impl Into<Value>) -> Expr {
        gte(self.clone(), self.typed(value))
    }

    fn like(&self, pattern: &str) -> Expr {
        like(self.clone(), typed_arg(pattern, SqlType::Varchar))
    }

    fn between(&self, lower: impl Into<Value>, upper: impl Into<Value>) -> Expr {
        between(self.clone(), self.typed(lower), self.typed(upper))
    }

    fn in_values<V: Into<Value>>(&self, values: impl IntoIterator<Item = V>) -> Expr {
        let values = values.into_iter().map(|v| self.typed(v)).collect();
        in_list(self.clone(), values)
    }

    fn is_null(&self) -> Expr {
        is_null(self.clone())
    }

    fn is_not_null(&self) -> Expr {
        is_not_null(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::column;

    #[test]
    fn test_value_arguments_follow_column_type() {
        let id = column(None, "id", SqlType::BigInt);
        let cond = id.equal(1i32);
        let SqlExpression::Binary(bin) = cond.as_ref() else {
            panic!("expected binary expression");
        };
        let SqlExpression::Argument(arg) = bin.right.as_ref() else {
            panic!("expected argument");
        };
        assert_eq!(arg.sql_type, SqlType::BigInt);
        assert_eq!(bin.sql_type, SqlType::Boolean);
    }

    #[test]
    fn test_all_of_folds_left() {
        let a = column(None, "a", SqlType::Boolean);
        let b = column(None, "b", SqlType::Boolean);
        let c = column(None, "c", SqlType::Boolean);
        let folded = all_of([a.clone(), b.clone(), c.clone()]).unwrap();
        assert_eq!(folded, and(and(a, b), c));
        assert!(all_of(Vec::new()).is_none());
    }
}
