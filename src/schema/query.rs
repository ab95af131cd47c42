//! Expression views of tables and columns.

use super::{Column, ColumnBinding, Table};
use crate::ast::builders::{SelectBuilder, column, declare, eq, left_join, table, table_as};
use crate::ast::Expr;
use crate::error::{WeaveError, WeaveResult};

impl Column {
    /// The stored column, qualified by its table.
    pub fn expression(&self) -> Expr {
        let source = match &self.0.table_alias {
            Some(alias) => table_as(&self.0.table_name, alias),
            None => table(&self.0.table_name),
        };
        column(Some(&source), &self.0.name, self.0.sql_type.clone())
    }

    /// The select-list entry `<column> AS <label>`.
    pub fn declaring(&self) -> Expr {
        let label = self.label();
        declare(self.expression(), Some(label.as_str()))
    }
}

impl Table {
    /// This table as a query source.
    pub fn as_expression(&self) -> Expr {
        match &self.0.alias {
            Some(alias) => table_as(&self.0.name, alias),
            None => table(&self.0.name),
        }
    }

    pub fn column_expr(&self, name: &str) -> WeaveResult<Expr> {
        self.column(name)
            .map(Column::expression)
            .ok_or_else(|| WeaveError::ColumnNotFound(format!("{}.{}", self.0.name, name)))
    }

    /// Every column, declared under its unique label.
    pub fn select_all(&self) -> Vec<Expr> {
        self.0.columns.iter().map(Column::declaring).collect()
    }

    /// `select` of this table left-joined with every referenced table,
    /// recursively, on `foreign key = primary key`.
    ///
    /// The select list holds the columns of every joined table, so rows can
    /// be materialized with references.
    pub fn join_references_and_select(&self) -> WeaveResult<SelectBuilder> {
        let mut source = self.as_expression();
        let mut columns = Vec::new();
        self.join_references(&mut source, &mut columns)?;
        Ok(SelectBuilder::from(source).columns(columns))
    }

    fn join_references(&self, source: &mut Expr, columns: &mut Vec<Expr>) -> WeaveResult<()> {
        columns.extend(self.select_all());
        for column in self.columns() {
            let Some(ColumnBinding::Reference { table: referenced, .. }) = column.binding() else {
                continue;
            };
            let primary_key = referenced
                .primary_key()
                .ok_or_else(|| WeaveError::MissingPrimaryKey {
                    table: referenced.name().to_string(),
                })?;
            *source = left_join(
                source.clone(),
                referenced.as_expression(),
                eq(column.expression(), primary_key.expression()),
            );
            referenced.join_references(source, columns)?;
        }
        Ok(())
    }
}
