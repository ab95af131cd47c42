//! Structural tree walking with copy-on-write reconstruction.
//!
//! [`ExpressionVisitor::visit`] dispatches a node to its `visit_*` method. The
//! default `visit_*` methods delegate to the matching `walk_*` function, which
//! visits every child and rebuilds the node only when at least one child came
//! back as a different [`Expr`] handle. A visitor that changes nothing
//! therefore returns the input tree itself, at every level.
//!
//! Override a `visit_*` method to replace nodes of one kind; call the matching
//! `walk_*` function from the override to keep descending.

mod schema;

pub use schema::*;

use crate::ast::{
    AggregateExpression, ArgumentExpression, BetweenExpression, BinaryExpression,
    CaseWhenExpression, CastExpression, ColumnAssignmentExpression, ColumnDeclaringExpression,
    ColumnExpression, DeleteExpression, ExistsExpression, Expr, ExtensionExpression,
    FunctionExpression, InListExpression, InsertExpression, InsertFromQueryExpression,
    JoinExpression, OrderByExpression, SelectExpression, SqlExpression, TableExpression,
    UnaryExpression, UnionExpression, UpdateExpression, WindowExpression,
};
use crate::error::WeaveResult;
use std::sync::Arc;

/// Route a node to the `visit_*` method for its variant.
pub fn dispatch<V: ExpressionVisitor + ?Sized>(v: &mut V, expr: &Expr) -> WeaveResult<Expr> {
    match expr.as_ref() {
        SqlExpression::Column(node) => v.visit_column(expr, node),
        SqlExpression::Argument(node) => v.visit_argument(expr, node),
        SqlExpression::Unary(node) => v.visit_unary(expr, node),
        SqlExpression::Binary(node) => v.visit_binary(expr, node),
        SqlExpression::Function(node) => v.visit_function(expr, node),
        SqlExpression::Aggregate(node) => v.visit_aggregate(expr, node),
        SqlExpression::Window(node) => v.visit_window(expr, node),
        SqlExpression::Cast(node) => v.visit_cast(expr, node),
        SqlExpression::Between(node) => v.visit_between(expr, node),
        SqlExpression::InList(node) => v.visit_in_list(expr, node),
        SqlExpression::Exists(node) => v.visit_exists(expr, node),
        SqlExpression::CaseWhen(node) => v.visit_case_when(expr, node),
        SqlExpression::ColumnDeclaring(node) => v.visit_column_declaring(expr, node),
        SqlExpression::OrderBy(node) => v.visit_order_by(expr, node),
        SqlExpression::ColumnAssignment(node) => v.visit_column_assignment(expr, node),
        SqlExpression::Table(node) => v.visit_table(expr, node),
        SqlExpression::Join(node) => v.visit_join(expr, node),
        SqlExpression::Select(node) => v.visit_select(expr, node),
        SqlExpression::Union(node) => v.visit_union(expr, node),
        SqlExpression::Insert(node) => v.visit_insert(expr, node),
        SqlExpression::InsertFromQuery(node) => v.visit_insert_from_query(expr, node),
        SqlExpression::Update(node) => v.visit_update(expr, node),
        SqlExpression::Delete(node) => v.visit_delete(expr, node),
        SqlExpression::Extension(node) => v.visit_unknown(expr, node),
    }
}

/// Visitor over [`SqlExpression`] trees.
///
/// Every method receives the node handle together with the already-matched
/// variant payload and returns the (possibly unchanged) handle.
pub trait ExpressionVisitor {
    fn visit(&mut self, expr: &Expr) -> WeaveResult<Expr> {
        dispatch(self, expr)
    }

    fn visit_column(&mut self, expr: &Expr, node: &ColumnExpression) -> WeaveResult<Expr> {
        walk_column(self, expr, node)
    }

    fn visit_argument(&mut self, expr: &Expr, _node: &ArgumentExpression) -> WeaveResult<Expr> {
        Ok(expr.clone())
    }

    fn visit_unary(&mut self, expr: &Expr, node: &UnaryExpression) -> WeaveResult<Expr> {
        walk_unary(self, expr, node)
    }

    fn visit_binary(&mut self, expr: &Expr, node: &BinaryExpression) -> WeaveResult<Expr> {
        walk_binary(self, expr, node)
    }

    fn visit_function(&mut self, expr: &Expr, node: &FunctionExpression) -> WeaveResult<Expr> {
        walk_function(self, expr, node)
    }

    fn visit_aggregate(&mut self, expr: &Expr, node: &AggregateExpression) -> WeaveResult<Expr> {
        walk_aggregate(self, expr, node)
    }

    fn visit_window(&mut self, expr: &Expr, node: &WindowExpression) -> WeaveResult<Expr> {
        walk_window(self, expr, node)
    }

    fn visit_cast(&mut self, expr: &Expr, node: &CastExpression) -> WeaveResult<Expr> {
        walk_cast(self, expr, node)
    }

    fn visit_between(&mut self, expr: &Expr, node: &BetweenExpression) -> WeaveResult<Expr> {
        walk_between(self, expr, node)
    }

    fn visit_in_list(&mut self, expr: &Expr, node: &InListExpression) -> WeaveResult<Expr> {
        walk_in_list(self, expr, node)
    }

    fn visit_exists(&mut self, expr: &Expr, node: &ExistsExpression) -> WeaveResult<Expr> {
        walk_exists(self, expr, node)
    }

    fn visit_case_when(&mut self, expr: &Expr, node: &CaseWhenExpression) -> WeaveResult<Expr> {
        walk_case_when(self, expr, node)
    }

    fn visit_column_declaring(
        &mut self,
        expr: &Expr,
        node: &ColumnDeclaringExpression,
    ) -> WeaveResult<Expr> {
        walk_column_declaring(self, expr, node)
    }

    fn visit_order_by(&mut self, expr: &Expr, node: &OrderByExpression) -> WeaveResult<Expr> {
        walk_order_by(self, expr, node)
    }

    fn visit_column_assignment(
        &mut self,
        expr: &Expr,
        node: &ColumnAssignmentExpression,
    ) -> WeaveResult<Expr> {
        walk_column_assignment(self, expr, node)
    }

    fn visit_table(&mut self, expr: &Expr, _node: &TableExpression) -> WeaveResult<Expr> {
        Ok(expr.clone())
    }

    fn visit_join(&mut self, expr: &Expr, node: &JoinExpression) -> WeaveResult<Expr> {
        walk_join(self, expr, node)
    }

    fn visit_select(&mut self, expr: &Expr, node: &SelectExpression) -> WeaveResult<Expr> {
        walk_select(self, expr, node)
    }

    fn visit_union(&mut self, expr: &Expr, node: &UnionExpression) -> WeaveResult<Expr> {
        walk_union(self, expr, node)
    }

    fn visit_insert(&mut self, expr: &Expr, node: &InsertExpression) -> WeaveResult<Expr> {
        walk_insert(self, expr, node)
    }

    fn visit_insert_from_query(
        &mut self,
        expr: &Expr,
        node: &InsertFromQueryExpression,
    ) -> WeaveResult<Expr> {
        walk_insert_from_query(self, expr, node)
    }

    fn visit_update(&mut self, expr: &Expr, node: &UpdateExpression) -> WeaveResult<Expr> {
        walk_update(self, expr, node)
    }

    fn visit_delete(&mut self, expr: &Expr, node: &DeleteExpression) -> WeaveResult<Expr> {
        walk_delete(self, expr, node)
    }

    /// Hook for extension nodes. Returns the node unchanged by default;
    /// visitors that understand an extension override this and use
    /// [`walk_extension`] to descend into its children.
    fn visit_unknown(&mut self, expr: &Expr, _node: &ExtensionExpression) -> WeaveResult<Expr> {
        Ok(expr.clone())
    }
}

/// Tracks whether any visited child came back as a new handle.
pub(crate) struct ChildVisits {
    changed: bool,
}

impl ChildVisits {
    pub(crate) fn new() -> Self {
        Self { changed: false }
    }

    pub(crate) fn one<V: ExpressionVisitor + ?Sized>(
        &mut self,
        v: &mut V,
        child: &Expr,
    ) -> WeaveResult<Expr> {
        let result = v.visit(child)?;
        if !Arc::ptr_eq(&result, child) {
            self.changed = true;
        }
        Ok(result)
    }

    pub(crate) fn optional<V: ExpressionVisitor + ?Sized>(
        &mut self,
        v: &mut V,
        child: &Option<Expr>,
    ) -> WeaveResult<Option<Expr>> {
        child.as_ref().map(|c| self.one(v, c)).transpose()
    }

    pub(crate) fn list<V: ExpressionVisitor + ?Sized>(
        &mut self,
        v: &mut V,
        children: &[Expr],
    ) -> WeaveResult<Vec<Expr>> {
        children.iter().map(|c| self.one(v, c)).collect()
    }

    pub(crate) fn changed(&self) -> bool {
        self.changed
    }

    pub(crate) fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// The original handle, or a new node built from the visited children.
    fn rebuild(&self, expr: &Expr, build: impl FnOnce() -> SqlExpression) -> Expr {
        if self.changed {
            Arc::new(build())
        } else {
            expr.clone()
        }
    }
}

pub fn walk_column<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &ColumnExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let table = visits.optional(v, &node.table)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Column(ColumnExpression {
            table,
            ..node.clone()
        })
    }))
}

pub fn walk_unary<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &UnaryExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let operand = visits.one(v, &node.operand)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Unary(UnaryExpression {
            operand,
            ..node.clone()
        })
    }))
}

pub fn walk_binary<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &BinaryExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let left = visits.one(v, &node.left)?;
    let right = visits.one(v, &node.right)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Binary(BinaryExpression {
            left,
            right,
            ..node.clone()
        })
    }))
}

pub fn walk_function<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &FunctionExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let arguments = visits.list(v, &node.arguments)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Function(FunctionExpression {
            arguments,
            ..node.clone()
        })
    }))
}

pub fn walk_aggregate<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &AggregateExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let argument = visits.optional(v, &node.argument)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Aggregate(AggregateExpression {
            argument,
            ..node.clone()
        })
    }))
}

pub fn walk_window<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &WindowExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let arguments = visits.list(v, &node.arguments)?;
    let partition_by = visits.list(v, &node.partition_by)?;
    let order_by = visits.list(v, &node.order_by)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Window(WindowExpression {
            arguments,
            partition_by,
            order_by,
            ..node.clone()
        })
    }))
}

pub fn walk_cast<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &CastExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let expression = visits.one(v, &node.expression)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Cast(CastExpression {
            expression,
            ..node.clone()
        })
    }))
}

pub fn walk_between<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &BetweenExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let expression = visits.one(v, &node.expression)?;
    let lower = visits.one(v, &node.lower)?;
    let upper = visits.one(v, &node.upper)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Between(BetweenExpression {
            expression,
            lower,
            upper,
            ..node.clone()
        })
    }))
}

pub fn walk_in_list<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &InListExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let left = visits.one(v, &node.left)?;
    let query = visits.optional(v, &node.query)?;
    let values = visits.list(v, &node.values)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::InList(InListExpression {
            left,
            query,
            values,
            ..node.clone()
        })
    }))
}

pub fn walk_exists<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &ExistsExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let query = visits.one(v, &node.query)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Exists(ExistsExpression {
            query,
            ..node.clone()
        })
    }))
}

pub fn walk_case_when<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &CaseWhenExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let operand = visits.optional(v, &node.operand)?;
    let when_clauses = node
        .when_clauses
        .iter()
        .map(|(condition, result)| -> WeaveResult<(Expr, Expr)> {
            Ok((visits.one(v, condition)?, visits.one(v, result)?))
        })
        .collect::<WeaveResult<Vec<_>>>()?;
    let else_clause = visits.optional(v, &node.else_clause)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::CaseWhen(CaseWhenExpression {
            operand,
            when_clauses,
            else_clause,
            ..node.clone()
        })
    }))
}

pub fn walk_column_declaring<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &ColumnDeclaringExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let expression = visits.one(v, &node.expression)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::ColumnDeclaring(ColumnDeclaringExpression {
            expression,
            ..node.clone()
        })
    }))
}

pub fn walk_order_by<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &OrderByExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let expression = visits.one(v, &node.expression)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::OrderBy(OrderByExpression {
            expression,
            ..node.clone()
        })
    }))
}

pub fn walk_column_assignment<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &ColumnAssignmentExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let column = visits.one(v, &node.column)?;
    let expression = visits.one(v, &node.expression)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::ColumnAssignment(ColumnAssignmentExpression {
            column,
            expression,
            ..node.clone()
        })
    }))
}

pub fn walk_join<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &JoinExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let left = visits.one(v, &node.left)?;
    let right = visits.one(v, &node.right)?;
    let condition = visits.optional(v, &node.condition)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Join(JoinExpression {
            left,
            right,
            condition,
            ..node.clone()
        })
    }))
}

pub fn walk_select<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &SelectExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let columns = visits.list(v, &node.columns)?;
    let from = visits.one(v, &node.from)?;
    let filter = visits.optional(v, &node.filter)?;
    let group_by = visits.list(v, &node.group_by)?;
    let having = visits.optional(v, &node.having)?;
    let order_by = visits.list(v, &node.order_by)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Select(SelectExpression {
            columns,
            from,
            filter,
            group_by,
            having,
            order_by,
            ..node.clone()
        })
    }))
}

pub fn walk_union<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &UnionExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let left = visits.one(v, &node.left)?;
    let right = visits.one(v, &node.right)?;
    let order_by = visits.list(v, &node.order_by)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Union(UnionExpression {
            left,
            right,
            order_by,
            ..node.clone()
        })
    }))
}

pub fn walk_insert<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &InsertExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let table = visits.one(v, &node.table)?;
    let assignments = visits.list(v, &node.assignments)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Insert(InsertExpression {
            table,
            assignments,
            ..node.clone()
        })
    }))
}

pub fn walk_insert_from_query<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &InsertFromQueryExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let table = visits.one(v, &node.table)?;
    let columns = visits.list(v, &node.columns)?;
    let query = visits.one(v, &node.query)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::InsertFromQuery(InsertFromQueryExpression {
            table,
            columns,
            query,
            ..node.clone()
        })
    }))
}

pub fn walk_update<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &UpdateExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let table = visits.one(v, &node.table)?;
    let assignments = visits.list(v, &node.assignments)?;
    let filter = visits.optional(v, &node.filter)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Update(UpdateExpression {
            table,
            assignments,
            filter,
            ..node.clone()
        })
    }))
}

pub fn walk_delete<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &DeleteExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let table = visits.one(v, &node.table)?;
    let filter = visits.optional(v, &node.filter)?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Delete(DeleteExpression {
            table,
            filter,
            ..node.clone()
        })
    }))
}

/// Visit the children an extension node exposes, rebuilding it through
/// [`crate::ast::ExtensionNode::with_children`] when one of them changed.
pub fn walk_extension<V: ExpressionVisitor + ?Sized>(
    v: &mut V,
    expr: &Expr,
    node: &ExtensionExpression,
) -> WeaveResult<Expr> {
    let mut visits = ChildVisits::new();
    let children = visits.list(v, &node.node.children())?;
    Ok(visits.rebuild(expr, || {
        SqlExpression::Extension(ExtensionExpression {
            node: node.node.with_children(children),
            extra: node.extra.clone(),
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SqlType;
    use crate::ast::builders::{ExprExt, SelectBuilder, and, column, table};

    struct Noop;

    impl ExpressionVisitor for Noop {}

    /// Renames one column, leaving every other node alone.
    struct RenameColumn {
        from: &'static str,
        to: &'static str,
    }

    impl ExpressionVisitor for RenameColumn {
        fn visit_column(&mut self, expr: &Expr, node: &ColumnExpression) -> WeaveResult<Expr> {
            if node.name == self.from {
                return Ok(Arc::new(SqlExpression::Column(ColumnExpression {
                    name: self.to.to_string(),
                    ..node.clone()
                })));
            }
            walk_column(self, expr, node)
        }
    }

    fn sample() -> Expr {
        let t = table("t_employee");
        let id = column(Some(&t), "id", SqlType::Int);
        let name = column(Some(&t), "name", SqlType::Varchar);
        SelectBuilder::from(t.clone())
            .column(id.clone())
            .column(name.clone())
            .filter(and(id.greater_than(1), name.like("m%")))
            .order_by(id)
            .build()
    }

    #[test]
    fn test_noop_visit_returns_same_tree() {
        let query = sample();
        let visited = Noop.visit(&query).unwrap();
        assert!(Arc::ptr_eq(&query, &visited));
    }

    #[test]
    fn test_rewrite_rebuilds_only_ancestors() {
        let query = sample();
        let rewritten = RenameColumn { from: "name", to: "full_name" }
            .visit(&query)
            .unwrap();
        assert!(!Arc::ptr_eq(&query, &rewritten));

        let (SqlExpression::Select(before), SqlExpression::Select(after)) =
            (query.as_ref(), rewritten.as_ref())
        else {
            panic!("expected selects");
        };
        // The id column and the source table are shared with the original.
        assert!(Arc::ptr_eq(&before.columns[0], &after.columns[0]));
        assert!(Arc::ptr_eq(&before.from, &after.from));
        assert!(Arc::ptr_eq(&before.order_by[0], &after.order_by[0]));
        assert!(!Arc::ptr_eq(&before.columns[1], &after.columns[1]));
        assert!(!Arc::ptr_eq(
            before.filter.as_ref().unwrap(),
            after.filter.as_ref().unwrap()
        ));
    }
}
