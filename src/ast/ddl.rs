//! Schema definition statements: tables, columns, constraints, indexes, views.
//!
//! These nodes form their own tree family, walked by
//! [`crate::visitor::SchemaVisitor`]. Embedded scalar pieces (table
//! references, default values, check conditions, view queries) are ordinary
//! [`Expr`] nodes.

use crate::ast::{Expr, ExtensionExpression, ExtraProperties, SqlType};
use std::sync::Arc;

/// Shared handle to an immutable schema node.
pub type SchemaExpr = Arc<SchemaExpression>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaExpression {
    CreateTable(CreateTableExpression),
    DropTable(DropTableExpression),
    TruncateTable(TruncateTableExpression),
    AlterTableAddColumn(AlterTableAddColumnExpression),
    AlterTableDropColumn(AlterTableDropColumnExpression),
    AddConstraint(AddConstraintExpression),
    DropConstraint(DropConstraintExpression),
    CreateIndex(CreateIndexExpression),
    DropIndex(DropIndexExpression),
    CreateView(CreateViewExpression),
    DropView(DropViewExpression),
    ColumnDefinition(ColumnDefinitionExpression),
    PrimaryKey(PrimaryKeyConstraint),
    Unique(UniqueConstraint),
    ForeignKey(ForeignKeyConstraint),
    Check(CheckConstraint),
    Extension(ExtensionExpression),
}

impl SchemaExpression {
    pub fn kind(&self) -> &str {
        match self {
            SchemaExpression::CreateTable(_) => "CreateTable",
            SchemaExpression::DropTable(_) => "DropTable",
            SchemaExpression::TruncateTable(_) => "TruncateTable",
            SchemaExpression::AlterTableAddColumn(_) => "AlterTableAddColumn",
            SchemaExpression::AlterTableDropColumn(_) => "AlterTableDropColumn",
            SchemaExpression::AddConstraint(_) => "AddConstraint",
            SchemaExpression::DropConstraint(_) => "DropConstraint",
            SchemaExpression::CreateIndex(_) => "CreateIndex",
            SchemaExpression::DropIndex(_) => "DropIndex",
            SchemaExpression::CreateView(_) => "CreateView",
            SchemaExpression::DropView(_) => "DropView",
            SchemaExpression::ColumnDefinition(_) => "ColumnDefinition",
            SchemaExpression::PrimaryKey(_) => "PrimaryKey",
            SchemaExpression::Unique(_) => "Unique",
            SchemaExpression::ForeignKey(_) => "ForeignKey",
            SchemaExpression::Check(_) => "Check",
            SchemaExpression::Extension(e) => e.node.name(),
        }
    }

    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            SchemaExpression::PrimaryKey(_)
                | SchemaExpression::Unique(_)
                | SchemaExpression::ForeignKey(_)
                | SchemaExpression::Check(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CreateTableExpression {
    /// A [`crate::ast::TableExpression`] node.
    pub table: Expr,
    /// [`ColumnDefinitionExpression`] nodes.
    pub columns: Vec<SchemaExpr>,
    /// Constraint nodes.
    pub constraints: Vec<SchemaExpr>,
    pub if_not_exists: bool,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DropTableExpression {
    pub table: Expr,
    pub if_exists: bool,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TruncateTableExpression {
    pub table: Expr,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlterTableAddColumnExpression {
    pub table: Expr,
    pub column: SchemaExpr,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlterTableDropColumnExpression {
    pub table: Expr,
    pub column: String,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddConstraintExpression {
    pub table: Expr,
    pub constraint: SchemaExpr,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DropConstraintExpression {
    pub table: Expr,
    pub name: String,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CreateIndexExpression {
    pub name: String,
    pub table: Expr,
    pub columns: Vec<Expr>,
    pub unique: bool,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DropIndexExpression {
    pub name: String,
    pub table: Option<Expr>,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CreateViewExpression {
    pub name: Expr,
    pub query: Expr,
    pub or_replace: bool,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DropViewExpression {
    pub name: Expr,
    pub if_exists: bool,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnDefinitionExpression {
    pub name: String,
    pub sql_type: SqlType,
    pub not_null: bool,
    pub default: Option<Expr>,
    pub auto_increment: bool,
    pub extra: ExtraProperties,
}

impl ColumnDefinitionExpression {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            not_null: false,
            default: None,
            auto_increment: false,
            extra: ExtraProperties::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimaryKeyConstraint {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueConstraint {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForeignKeyConstraint {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub referenced_table: Expr,
    pub referenced_columns: Vec<String>,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckConstraint {
    pub name: Option<String>,
    pub condition: Expr,
    pub extra: ExtraProperties,
}
