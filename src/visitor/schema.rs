//! Visitor family for schema-definition statements.
//!
//! Schema nodes follow the same copy-on-write discipline as expressions:
//! a statement is rebuilt only when one of its children, schema node or
//! embedded [`Expr`], comes back as a different handle.

use super::{ChildVisits, ExpressionVisitor};
use crate::ast::{
    AddConstraintExpression, AlterTableAddColumnExpression, AlterTableDropColumnExpression,
    CheckConstraint, ColumnDefinitionExpression, CreateIndexExpression, CreateTableExpression,
    CreateViewExpression, DropConstraintExpression, DropIndexExpression, DropTableExpression,
    DropViewExpression, ExtensionExpression, ForeignKeyConstraint, PrimaryKeyConstraint,
    SchemaExpr, SchemaExpression, TruncateTableExpression, UniqueConstraint,
};
use crate::error::WeaveResult;
use std::sync::Arc;

/// Route a schema node to the `visit_*` method for its variant.
pub fn dispatch_schema<V: SchemaVisitor + ?Sized>(
    v: &mut V,
    expr: &SchemaExpr,
) -> WeaveResult<SchemaExpr> {
    match expr.as_ref() {
        SchemaExpression::CreateTable(node) => v.visit_create_table(expr, node),
        SchemaExpression::DropTable(node) => v.visit_drop_table(expr, node),
        SchemaExpression::TruncateTable(node) => v.visit_truncate_table(expr, node),
        SchemaExpression::AlterTableAddColumn(node) => v.visit_add_column(expr, node),
        SchemaExpression::AlterTableDropColumn(node) => v.visit_drop_column(expr, node),
        SchemaExpression::AddConstraint(node) => v.visit_add_constraint(expr, node),
        SchemaExpression::DropConstraint(node) => v.visit_drop_constraint(expr, node),
        SchemaExpression::CreateIndex(node) => v.visit_create_index(expr, node),
        SchemaExpression::DropIndex(node) => v.visit_drop_index(expr, node),
        SchemaExpression::CreateView(node) => v.visit_create_view(expr, node),
        SchemaExpression::DropView(node) => v.visit_drop_view(expr, node),
        SchemaExpression::ColumnDefinition(node) => v.visit_column_definition(expr, node),
        SchemaExpression::PrimaryKey(node) => v.visit_primary_key(expr, node),
        SchemaExpression::Unique(node) => v.visit_unique(expr, node),
        SchemaExpression::ForeignKey(node) => v.visit_foreign_key(expr, node),
        SchemaExpression::Check(node) => v.visit_check(expr, node),
        SchemaExpression::Extension(node) => v.visit_unknown_schema(expr, node),
    }
}

/// Visitor over [`SchemaExpression`] trees. Embedded expressions are handed
/// to the [`ExpressionVisitor`] half of the implementor.
pub trait SchemaVisitor: ExpressionVisitor {
    fn visit_schema(&mut self, expr: &SchemaExpr) -> WeaveResult<SchemaExpr> {
        dispatch_schema(self, expr)
    }

    fn visit_create_table(
        &mut self,
        expr: &SchemaExpr,
        node: &CreateTableExpression,
    ) -> WeaveResult<SchemaExpr> {
        walk_create_table(self, expr, node)
    }

    fn visit_drop_table(
        &mut self,
        expr: &SchemaExpr,
        node: &DropTableExpression,
    ) -> WeaveResult<SchemaExpr> {
        let mut visits = ChildVisits::new();
        let table = visits.one(self, &node.table)?;
        Ok(rebuild(expr, &visits, || {
            SchemaExpression::DropTable(DropTableExpression {
                table,
                ..node.clone()
            })
        }))
    }

    fn visit_truncate_table(
        &mut self,
        expr: &SchemaExpr,
        node: &TruncateTableExpression,
    ) -> WeaveResult<SchemaExpr> {
        let mut visits = ChildVisits::new();
        let table = visits.one(self, &node.table)?;
        Ok(rebuild(expr, &visits, || {
            SchemaExpression::TruncateTable(TruncateTableExpression {
                table,
                ..node.clone()
            })
        }))
    }

    fn visit_add_column(
        &mut self,
        expr: &SchemaExpr,
        node: &AlterTableAddColumnExpression,
    ) -> WeaveResult<SchemaExpr> {
        let mut visits = ChildVisits::new();
        let table = visits.one(self, &node.table)?;
        let column = visit_schema_child(self, &node.column, &mut visits)?;
        Ok(rebuild(expr, &visits, || {
            SchemaExpression::AlterTableAddColumn(AlterTableAddColumnExpression {
                table,
                column,
                ..node.clone()
            })
        }))
    }

    fn visit_drop_column(
        &mut self,
        expr: &SchemaExpr,
        node: &AlterTableDropColumnExpression,
    ) -> WeaveResult<SchemaExpr> {
        let mut visits = ChildVisits::new();
        let table = visits.one(self, &node.table)?;
        Ok(rebuild(expr, &visits, || {
            SchemaExpression::AlterTableDropColumn(AlterTableDropColumnExpression {
                table,
                ..node.clone()
            })
        }))
    }

    fn visit_add_constraint(
        &mut self,
        expr: &SchemaExpr,
        node: &AddConstraintExpression,
    ) -> WeaveResult<SchemaExpr> {
        let mut visits = ChildVisits::new();
        let table = visits.one(self, &node.table)?;
        let constraint = visit_schema_child(self, &node.constraint, &mut visits)?;
        Ok(rebuild(expr, &visits, || {
            SchemaExpression::AddConstraint(AddConstraintExpression {
                table,
                constraint,
                ..node.clone()
            })
        }))
    }

    fn visit_drop_constraint(
        &mut self,
        expr: &SchemaExpr,
        node: &DropConstraintExpression,
    ) -> WeaveResult<SchemaExpr> {
        let mut visits = ChildVisits::new();
        let table = visits.one(self, &node.table)?;
        Ok(rebuild(expr, &visits, || {
            SchemaExpression::DropConstraint(DropConstraintExpression {
                table,
                ..node.clone()
            })
        }))
    }

    fn visit_create_index(
        &mut self,
        expr: &SchemaExpr,
        node: &CreateIndexExpression,
    ) -> WeaveResult<SchemaExpr> {
        let mut visits = ChildVisits::new();
        let table = visits.one(self, &node.table)?;
        let columns = visits.list(self, &node.columns)?;
        Ok(rebuild(expr, &visits, || {
            SchemaExpression::CreateIndex(CreateIndexExpression {
                table,
                columns,
                ..node.clone()
            })
        }))
    }

    fn visit_drop_index(
        &mut self,
        expr: &SchemaExpr,
        node: &DropIndexExpression,
    ) -> WeaveResult<SchemaExpr> {
        let mut visits = ChildVisits::new();
        let table = visits.optional(self, &node.table)?;
        Ok(rebuild(expr, &visits, || {
            SchemaExpression::DropIndex(DropIndexExpression {
                table,
                ..node.clone()
            })
        }))
    }

    fn visit_create_view(
        &mut self,
        expr: &SchemaExpr,
        node: &CreateViewExpression,
    ) -> WeaveResult<SchemaExpr> {
        let mut visits = ChildVisits::new();
        let name = visits.one(self, &node.name)?;
        let query = visits.one(self, &node.query)?;
        Ok(rebuild(expr, &visits, || {
            SchemaExpression::CreateView(CreateViewExpression {
                name,
                query,
                ..node.clone()
            })
        }))
    }

    fn visit_drop_view(
        &mut self,
        expr: &SchemaExpr,
        node: &DropViewExpression,
    ) -> WeaveResult<SchemaExpr> {
        let mut visits = ChildVisits::new();
        let name = visits.one(self, &node.name)?;
        Ok(rebuild(expr, &visits, || {
            SchemaExpression::DropView(DropViewExpression {
                name,
                ..node.clone()
            })
        }))
    }

    fn visit_column_definition(
        &mut self,
        expr: &SchemaExpr,
        node: &ColumnDefinitionExpression,
    ) -> WeaveResult<SchemaExpr> {
        let mut visits = ChildVisits::new();
        let default = visits.optional(self, &node.default)?;
        Ok(rebuild(expr, &visits, || {
            SchemaExpression::ColumnDefinition(ColumnDefinitionExpression {
                default,
                ..node.clone()
            })
        }))
    }

    fn visit_primary_key(
        &mut self,
        expr: &SchemaExpr,
        _node: &PrimaryKeyConstraint,
    ) -> WeaveResult<SchemaExpr> {
        Ok(expr.clone())
    }

    fn visit_unique(
        &mut self,
        expr: &SchemaExpr,
        _node: &UniqueConstraint,
    ) -> WeaveResult<SchemaExpr> {
        Ok(expr.clone())
    }

    fn visit_foreign_key(
        &mut self,
        expr: &SchemaExpr,
        node: &ForeignKeyConstraint,
    ) -> WeaveResult<SchemaExpr> {
        let mut visits = ChildVisits::new();
        let referenced_table = visits.one(self, &node.referenced_table)?;
        Ok(rebuild(expr, &visits, || {
            SchemaExpression::ForeignKey(ForeignKeyConstraint {
                referenced_table,
                ..node.clone()
            })
        }))
    }

    fn visit_check(&mut self, expr: &SchemaExpr, node: &CheckConstraint) -> WeaveResult<SchemaExpr> {
        let mut visits = ChildVisits::new();
        let condition = visits.one(self, &node.condition)?;
        Ok(rebuild(expr, &visits, || {
            SchemaExpression::Check(CheckConstraint {
                condition,
                ..node.clone()
            })
        }))
    }

    /// Hook for schema extension nodes, unchanged by default.
    fn visit_unknown_schema(
        &mut self,
        expr: &SchemaExpr,
        _node: &ExtensionExpression,
    ) -> WeaveResult<SchemaExpr> {
        Ok(expr.clone())
    }
}

pub fn walk_create_table<V: SchemaVisitor + ?Sized>(
    v: &mut V,
    expr: &SchemaExpr,
    node: &CreateTableExpression,
) -> WeaveResult<SchemaExpr> {
    let mut visits = ChildVisits::new();
    let table = visits.one(v, &node.table)?;
    let columns = node
        .columns
        .iter()
        .map(|c| visit_schema_child(v, c, &mut visits))
        .collect::<WeaveResult<Vec<_>>>()?;
    let constraints = node
        .constraints
        .iter()
        .map(|c| visit_schema_child(v, c, &mut visits))
        .collect::<WeaveResult<Vec<_>>>()?;
    Ok(rebuild(expr, &visits, || {
        SchemaExpression::CreateTable(CreateTableExpression {
            table,
            columns,
            constraints,
            ..node.clone()
        })
    }))
}

fn visit_schema_child<V: SchemaVisitor + ?Sized>(
    v: &mut V,
    child: &SchemaExpr,
    visits: &mut ChildVisits,
) -> WeaveResult<SchemaExpr> {
    let result = v.visit_schema(child)?;
    if !Arc::ptr_eq(&result, child) {
        visits.mark_changed();
    }
    Ok(result)
}

fn rebuild(
    expr: &SchemaExpr,
    visits: &ChildVisits,
    build: impl FnOnce() -> SchemaExpression,
) -> SchemaExpr {
    if visits.changed() {
        Arc::new(build())
    } else {
        expr.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::{arg, table};
    use crate::ast::{Expr, SqlExpression, SqlType, TableExpression};

    struct Noop;

    impl ExpressionVisitor for Noop {}
    impl SchemaVisitor for Noop {}

    /// Moves every table reference into a fixed schema.
    struct QualifyTables;

    impl ExpressionVisitor for QualifyTables {
        fn visit_table(&mut self, _expr: &Expr, node: &TableExpression) -> WeaveResult<Expr> {
            Ok(Arc::new(SqlExpression::Table(TableExpression {
                schema: Some("hr".to_string()),
                ..node.clone()
            })))
        }
    }

    impl SchemaVisitor for QualifyTables {}

    fn create_table() -> SchemaExpr {
        let mut id = ColumnDefinitionExpression::new("id", SqlType::Int);
        id.not_null = true;
        let mut name = ColumnDefinitionExpression::new("name", SqlType::Varchar);
        name.default = Some(arg("unknown"));
        Arc::new(SchemaExpression::CreateTable(CreateTableExpression {
            table: table("t_employee"),
            columns: vec![
                Arc::new(SchemaExpression::ColumnDefinition(id)),
                Arc::new(SchemaExpression::ColumnDefinition(name)),
            ],
            constraints: vec![Arc::new(SchemaExpression::PrimaryKey(PrimaryKeyConstraint {
                name: None,
                columns: vec!["id".to_string()],
                extra: Default::default(),
            }))],
            if_not_exists: false,
            extra: Default::default(),
        }))
    }

    #[test]
    fn test_noop_schema_visit_is_identity() {
        let ddl = create_table();
        let visited = Noop.visit_schema(&ddl).unwrap();
        assert!(Arc::ptr_eq(&ddl, &visited));
    }

    #[test]
    fn test_table_rewrite_keeps_column_definitions() {
        let ddl = create_table();
        let visited = QualifyTables.visit_schema(&ddl).unwrap();
        let (SchemaExpression::CreateTable(before), SchemaExpression::CreateTable(after)) =
            (ddl.as_ref(), visited.as_ref())
        else {
            panic!("expected create table");
        };
        assert!(!Arc::ptr_eq(&before.table, &after.table));
        assert!(Arc::ptr_eq(&before.columns[0], &after.columns[0]));
        assert!(Arc::ptr_eq(&before.constraints[0], &after.constraints[0]));
    }
}
