//! Rendering expression trees as SQL text.
//!
//! [`SqlFormatter`] is a visitor that writes every node it visits into a text
//! buffer and collects bound arguments into an ordered [`Parameter`] list.
//! Dialect differences are delegated to a [`SqlDialect`].

mod dialect;
mod identifier;
pub mod sql;

pub use dialect::{Dialect, SqlDialect, standard_type_name};
pub use identifier::{IdentifierRules, SQL92_RESERVED_WORDS};

use crate::ast::{
    AddConstraintExpression, AggregateExpression, AlterTableAddColumnExpression,
    AlterTableDropColumnExpression, ArgumentExpression, BetweenExpression, BinaryExpression,
    CaseWhenExpression, CastExpression, CheckConstraint, ColumnAssignmentExpression,
    ColumnDeclaringExpression, ColumnDefinitionExpression, ColumnExpression,
    CreateIndexExpression, CreateTableExpression, CreateViewExpression, DeleteExpression,
    DropConstraintExpression, DropIndexExpression, DropTableExpression, DropViewExpression,
    ExistsExpression, Expr, ExtensionExpression, ForeignKeyConstraint, FunctionExpression,
    InListExpression, InsertExpression, InsertFromQueryExpression, JoinExpression,
    OrderByExpression, PrimaryKeyConstraint, SchemaExpr, SelectExpression, SqlExpression, SqlType,
    TableExpression, TruncateTableExpression, UnaryExpression, UnionExpression,
    UniqueConstraint, UpdateExpression, WindowExpression,
};
use crate::codec::Parameter;
use crate::config::{FormatterConfig, KeywordCase};
use crate::error::{WeaveError, WeaveResult};
use crate::visitor::{ExpressionVisitor, SchemaVisitor, dispatch, dispatch_schema};
use serde::Serialize;
use std::sync::Arc;

/// A rendered statement: SQL text plus its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub parameters: Vec<Parameter>,
}

/// Format `expr` for `dialect` with the default configuration.
pub fn format(dialect: &dyn SqlDialect, expr: &Expr) -> WeaveResult<Statement> {
    SqlFormatter::new(dialect).format(expr)
}

/// Format a schema statement for `dialect` with the default configuration.
pub fn format_schema(dialect: &dyn SqlDialect, expr: &SchemaExpr) -> WeaveResult<Statement> {
    SqlFormatter::new(dialect).format_schema(expr)
}

/// Whether `expr` must be parenthesized when it appears as an operand.
///
/// Leaves and nodes whose own syntax is self-delimiting are written bare.
pub fn needs_brackets(expr: &SqlExpression) -> bool {
    !(expr.is_leaf()
        || matches!(
            expr,
            SqlExpression::Column(_)
                | SqlExpression::Function(_)
                | SqlExpression::Aggregate(_)
                | SqlExpression::Exists(_)
                | SqlExpression::CaseWhen(_)
                | SqlExpression::ColumnDeclaring(_)
        ))
}

/// Single-use SQL writer.
///
/// A formatter owns its buffer, parameter list and nesting depth; format
/// the same tree concurrently by using one formatter per thread.
pub struct SqlFormatter<'d> {
    dialect: &'d dyn SqlDialect,
    rules: IdentifierRules,
    config: FormatterConfig,
    uppercase: bool,
    // Schema statements cannot carry parameters; arguments become literals.
    inline_arguments: bool,
    buffer: String,
    parameters: Vec<Parameter>,
    depth: usize,
}

impl<'d> SqlFormatter<'d> {
    pub fn new(dialect: &'d dyn SqlDialect) -> Self {
        Self::with_config(dialect, FormatterConfig::default())
    }

    pub fn with_config(dialect: &'d dyn SqlDialect, config: FormatterConfig) -> Self {
        let uppercase = match config.keyword_case {
            KeywordCase::Upper => true,
            KeywordCase::Lower => false,
            KeywordCase::Dialect => dialect.uppercase_keywords(),
        };
        Self {
            dialect,
            rules: dialect.identifier_rules(),
            config,
            uppercase,
            inline_arguments: false,
            buffer: String::new(),
            parameters: Vec::new(),
            depth: 0,
        }
    }

    /// Render a query or data-modification statement.
    pub fn format(mut self, expr: &Expr) -> WeaveResult<Statement> {
        self.visit(expr)?;
        Ok(self.finish())
    }

    /// Render a schema statement.
    pub fn format_schema(mut self, expr: &SchemaExpr) -> WeaveResult<Statement> {
        self.inline_arguments = true;
        self.visit_schema(expr)?;
        Ok(self.finish())
    }

    fn finish(self) -> Statement {
        tracing::debug!(
            dialect = self.dialect.name(),
            sql = %self.buffer,
            parameters = self.parameters.len(),
            "formatted statement"
        );
        Statement {
            sql: self.buffer,
            parameters: self.parameters,
        }
    }

    pub fn dialect(&self) -> &'d dyn SqlDialect {
        self.dialect
    }

    /// Nesting depth of the node being visited, 1 for the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Identifier length limit, from the configuration or the dialect.
    pub fn max_identifier_length(&self) -> Option<usize> {
        self.config
            .max_identifier_length
            .or(self.rules.max_identifier_length)
    }

    /// The SQL written so far.
    pub fn sql(&self) -> &str {
        &self.buffer
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Write a keyword (given in lower case) with the configured casing.
    pub fn write_keyword(&mut self, keyword: &str) {
        if self.uppercase {
            self.buffer.push_str(&keyword.to_uppercase());
        } else {
            self.buffer.push_str(&keyword.to_lowercase());
        }
    }

    /// Write an identifier, quoted when the dialect requires it.
    pub fn write_identifier(&mut self, name: &str) {
        if self.config.always_quote_identifiers || self.rules.should_quote(name) {
            let quoted = self.rules.quote(name);
            self.buffer.push_str(&quoted);
        } else {
            self.buffer.push_str(name);
        }
    }

    fn write_identifier_list(&mut self, names: &[String]) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write_identifier(name);
        }
    }

    /// Write expressions separated by commas.
    pub fn write_list(&mut self, exprs: &[Expr]) -> WeaveResult<()> {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.visit(expr)?;
        }
        Ok(())
    }

    /// Write an operand, parenthesized unless it is self-delimiting.
    pub fn write_operand(&mut self, expr: &Expr) -> WeaveResult<()> {
        if needs_brackets(expr) {
            self.write("(");
            self.visit(expr)?;
            self.write(")");
        } else {
            self.visit(expr)?;
        }
        Ok(())
    }

    /// Write a query source: a table, a join, or a nested query with its alias.
    pub fn write_source(&mut self, expr: &Expr) -> WeaveResult<()> {
        if expr.is_query() {
            self.write("(");
            self.visit(expr)?;
            self.write(")");
            if let Some(alias) = expr.query_alias() {
                self.write(" ");
                self.write_identifier(alias);
            }
            return Ok(());
        }
        self.visit(expr)?;
        Ok(())
    }

    /// Write a select statement without its ordering and pagination.
    ///
    /// `extra_columns` are appended to the select list; dialects use them
    /// for synthetic columns.
    pub fn write_select(
        &mut self,
        select: &SelectExpression,
        extra_columns: &[Expr],
    ) -> WeaveResult<()> {
        self.write_keyword("select ");
        if select.distinct {
            self.write_keyword("distinct ");
        }
        if select.columns.is_empty() {
            self.write("*");
        } else {
            self.write_list(&select.columns)?;
        }
        if !extra_columns.is_empty() {
            self.write(", ");
            self.write_list(extra_columns)?;
        }
        self.write(" ");
        self.write_keyword("from ");
        self.write_source(&select.from)?;
        if let Some(filter) = &select.filter {
            self.write(" ");
            self.write_keyword("where ");
            self.visit(filter)?;
        }
        if !select.group_by.is_empty() {
            self.write(" ");
            self.write_keyword("group by ");
            self.write_list(&select.group_by)?;
        }
        if let Some(having) = &select.having {
            self.write(" ");
            self.write_keyword("having ");
            self.visit(having)?;
        }
        Ok(())
    }

    /// Write a union without its own ordering and pagination.
    pub fn write_union(&mut self, union: &UnionExpression) -> WeaveResult<()> {
        self.write_union_side(&union.left)?;
        self.write(" ");
        self.write_keyword(if union.union_all { "union all " } else { "union " });
        self.write_union_side(&union.right)
    }

    // A side is wrapped when it is itself a union or carries its own
    // ordering or pagination.
    fn write_union_side(&mut self, side: &Expr) -> WeaveResult<()> {
        let (offset, limit) = side.query_pagination();
        let wrap = matches!(side.as_ref(), SqlExpression::Union(_))
            || !side.query_order_by().is_empty()
            || offset.is_some()
            || limit.is_some();
        if wrap {
            self.write("(");
            self.visit(side)?;
            self.write(")");
        } else {
            self.visit(side)?;
        }
        Ok(())
    }

    pub fn write_ordering(&mut self, order_by: &[Expr]) -> WeaveResult<()> {
        if order_by.is_empty() {
            return Ok(());
        }
        self.write(" ");
        self.write_keyword("order by ");
        self.write_list(order_by)
    }

    /// Write a query in standard form, delegating pagination to the dialect.
    pub fn write_query_default(&mut self, expr: &Expr) -> WeaveResult<()> {
        let (offset, limit) = match expr.as_ref() {
            SqlExpression::Select(select) => {
                self.write_select(select, &[])?;
                self.write_ordering(&select.order_by)?;
                (select.offset, select.limit)
            }
            SqlExpression::Union(union) => {
                self.write_union(union)?;
                self.write_ordering(&union.order_by)?;
                (union.offset, union.limit)
            }
            other => {
                return Err(WeaveError::Internal(format!(
                    "{} is not a query expression",
                    other.kind()
                )));
            }
        };
        if offset.is_some() || limit.is_some() {
            let dialect = self.dialect;
            dialect.write_pagination(self, offset, limit)?;
        }
        Ok(())
    }

    fn write_table_name(&mut self, table: &TableExpression) {
        for part in [&table.catalog, &table.schema].into_iter().flatten() {
            if !part.is_empty() {
                self.write_identifier(part);
                self.write(".");
            }
        }
        self.write_identifier(&table.name);
    }

    // Tables targeted by DML and DDL are written without alias.
    fn write_target(&mut self, expr: &Expr) -> WeaveResult<()> {
        match expr.as_ref() {
            SqlExpression::Table(table) => {
                self.write_table_name(table);
                Ok(())
            }
            _ => self.write_source(expr),
        }
    }

    // Assignment targets and index columns are written unqualified.
    fn write_column_name(&mut self, expr: &Expr) -> WeaveResult<()> {
        match expr.as_ref() {
            SqlExpression::Column(column) => {
                self.write_identifier(&column.name);
                Ok(())
            }
            _ => {
                self.visit(expr)?;
                Ok(())
            }
        }
    }

    // Built-in type names follow the keyword case; custom names are written
    // as declared.
    fn write_type(&mut self, sql_type: &SqlType) {
        let type_name = self.dialect.type_name(sql_type);
        match sql_type {
            SqlType::Custom { .. } => self.write(&type_name),
            _ => self.write_keyword(&type_name),
        }
    }

    fn write_constraint_name(&mut self, name: &Option<String>) {
        if let Some(name) = name {
            self.write_keyword("constraint ");
            self.write_identifier(name);
            self.write(" ");
        }
    }
}

// Formatting only reads the tree; a visit must hand back the node it was given.
fn ensure_unchanged<T>(original: &Arc<T>, visited: Arc<T>, kind: &str) -> WeaveResult<Arc<T>> {
    if !Arc::ptr_eq(original, &visited) {
        return Err(WeaveError::Internal(format!(
            "formatting replaced a {kind} node"
        )));
    }
    Ok(visited)
}

impl ExpressionVisitor for SqlFormatter<'_> {
    fn visit(&mut self, expr: &Expr) -> WeaveResult<Expr> {
        self.depth += 1;
        let result = dispatch(self, expr);
        self.depth -= 1;
        ensure_unchanged(expr, result?, expr.kind())
    }

    fn visit_column(&mut self, expr: &Expr, node: &ColumnExpression) -> WeaveResult<Expr> {
        let qualifier = node.table.as_ref().and_then(|table| match table.as_ref() {
            SqlExpression::Table(t) => Some(t.qualifier()),
            other => other.query_alias(),
        });
        if let Some(qualifier) = qualifier {
            self.write_identifier(qualifier);
            self.write(".");
        }
        self.write_identifier(&node.name);
        Ok(expr.clone())
    }

    fn visit_argument(&mut self, expr: &Expr, node: &ArgumentExpression) -> WeaveResult<Expr> {
        if self.inline_arguments {
            let literal = node.value.to_string();
            self.write(&literal);
        } else {
            self.parameters
                .push(Parameter::new(node.value.clone(), node.sql_type.clone()));
            let placeholder = self.dialect.placeholder(self.parameters.len());
            self.write(&placeholder);
        }
        Ok(expr.clone())
    }

    fn visit_unary(&mut self, expr: &Expr, node: &UnaryExpression) -> WeaveResult<Expr> {
        if node.op.is_postfix() {
            self.write_operand(&node.operand)?;
            self.write(" ");
            self.write_keyword(node.op.keyword());
        } else {
            self.write_keyword(node.op.keyword());
            if node.op.keyword().chars().all(char::is_alphabetic) {
                self.write(" ");
            }
            self.write_operand(&node.operand)?;
        }
        Ok(expr.clone())
    }

    fn visit_binary(&mut self, expr: &Expr, node: &BinaryExpression) -> WeaveResult<Expr> {
        self.write_operand(&node.left)?;
        self.write(" ");
        self.write_keyword(node.op.keyword());
        self.write(" ");
        self.write_operand(&node.right)?;
        Ok(expr.clone())
    }

    fn visit_function(&mut self, expr: &Expr, node: &FunctionExpression) -> WeaveResult<Expr> {
        self.write(&node.name);
        self.write("(");
        self.write_list(&node.arguments)?;
        self.write(")");
        Ok(expr.clone())
    }

    fn visit_aggregate(&mut self, expr: &Expr, node: &AggregateExpression) -> WeaveResult<Expr> {
        self.write_keyword(node.func.keyword());
        self.write("(");
        if node.distinct {
            self.write_keyword("distinct ");
        }
        match &node.argument {
            Some(argument) => {
                self.visit(argument)?;
            }
            None => self.write("*"),
        }
        self.write(")");
        Ok(expr.clone())
    }

    fn visit_window(&mut self, expr: &Expr, node: &WindowExpression) -> WeaveResult<Expr> {
        self.write_keyword(node.func.keyword());
        self.write("(");
        self.write_list(&node.arguments)?;
        self.write(") ");
        self.write_keyword("over (");
        if !node.partition_by.is_empty() {
            self.write_keyword("partition by ");
            self.write_list(&node.partition_by)?;
            if !node.order_by.is_empty() {
                self.write(" ");
            }
        }
        if !node.order_by.is_empty() {
            self.write_keyword("order by ");
            self.write_list(&node.order_by)?;
        }
        self.write(")");
        Ok(expr.clone())
    }

    fn visit_cast(&mut self, expr: &Expr, node: &CastExpression) -> WeaveResult<Expr> {
        self.write_keyword("cast(");
        self.visit(&node.expression)?;
        self.write(" ");
        self.write_keyword("as ");
        self.write_type(&node.sql_type);
        self.write(")");
        Ok(expr.clone())
    }

    fn visit_between(&mut self, expr: &Expr, node: &BetweenExpression) -> WeaveResult<Expr> {
        self.write_operand(&node.expression)?;
        self.write(" ");
        if node.not_between {
            self.write_keyword("not ");
        }
        self.write_keyword("between ");
        self.write_operand(&node.lower)?;
        self.write(" ");
        self.write_keyword("and ");
        self.write_operand(&node.upper)?;
        Ok(expr.clone())
    }

    fn visit_in_list(&mut self, expr: &Expr, node: &InListExpression) -> WeaveResult<Expr> {
        self.write_operand(&node.left)?;
        self.write(" ");
        if node.not_in {
            self.write_keyword("not ");
        }
        self.write_keyword("in (");
        match &node.query {
            Some(query) => {
                self.visit(query)?;
            }
            None => self.write_list(&node.values)?,
        }
        self.write(")");
        Ok(expr.clone())
    }

    fn visit_exists(&mut self, expr: &Expr, node: &ExistsExpression) -> WeaveResult<Expr> {
        if node.not_exists {
            self.write_keyword("not ");
        }
        self.write_keyword("exists (");
        self.visit(&node.query)?;
        self.write(")");
        Ok(expr.clone())
    }

    fn visit_case_when(&mut self, expr: &Expr, node: &CaseWhenExpression) -> WeaveResult<Expr> {
        self.write_keyword("case");
        if let Some(operand) = &node.operand {
            self.write(" ");
            self.write_operand(operand)?;
        }
        for (condition, result) in &node.when_clauses {
            self.write(" ");
            self.write_keyword("when ");
            self.write_operand(condition)?;
            self.write(" ");
            self.write_keyword("then ");
            self.write_operand(result)?;
        }
        if let Some(else_clause) = &node.else_clause {
            self.write(" ");
            self.write_keyword("else ");
            self.write_operand(else_clause)?;
        }
        self.write(" ");
        self.write_keyword("end");
        Ok(expr.clone())
    }

    fn visit_column_declaring(
        &mut self,
        expr: &Expr,
        node: &ColumnDeclaringExpression,
    ) -> WeaveResult<Expr> {
        self.visit(&node.expression)?;
        if let Some(declared) = &node.declared_name {
            let redundant = matches!(
                node.expression.as_ref(),
                SqlExpression::Column(column) if &column.name == declared
            );
            if !declared.is_empty() && !redundant {
                self.write(" ");
                self.write_keyword("as ");
                self.write_identifier(declared);
            }
        }
        Ok(expr.clone())
    }

    fn visit_order_by(&mut self, expr: &Expr, node: &OrderByExpression) -> WeaveResult<Expr> {
        self.visit(&node.expression)?;
        self.write(" ");
        self.write_keyword(node.order_type.keyword());
        Ok(expr.clone())
    }

    fn visit_column_assignment(
        &mut self,
        expr: &Expr,
        node: &ColumnAssignmentExpression,
    ) -> WeaveResult<Expr> {
        self.write_column_name(&node.column)?;
        self.write(" = ");
        self.visit(&node.expression)?;
        Ok(expr.clone())
    }

    fn visit_table(&mut self, expr: &Expr, node: &TableExpression) -> WeaveResult<Expr> {
        self.write_table_name(node);
        if let Some(alias) = node.table_alias.as_deref().filter(|a| !a.is_empty()) {
            self.write(" ");
            self.write_identifier(alias);
        }
        Ok(expr.clone())
    }

    fn visit_join(&mut self, expr: &Expr, node: &JoinExpression) -> WeaveResult<Expr> {
        self.write_source(&node.left)?;
        self.write(" ");
        self.write_keyword(node.join_type.keyword());
        self.write(" ");
        if matches!(node.right.as_ref(), SqlExpression::Join(_)) {
            self.write("(");
            self.visit(&node.right)?;
            self.write(")");
        } else {
            self.write_source(&node.right)?;
        }
        if let Some(condition) = &node.condition {
            self.write(" ");
            self.write_keyword("on ");
            self.visit(condition)?;
        }
        Ok(expr.clone())
    }

    fn visit_select(&mut self, expr: &Expr, _node: &SelectExpression) -> WeaveResult<Expr> {
        let dialect = self.dialect;
        dialect.write_query(self, expr)?;
        Ok(expr.clone())
    }

    fn visit_union(&mut self, expr: &Expr, _node: &UnionExpression) -> WeaveResult<Expr> {
        let dialect = self.dialect;
        dialect.write_query(self, expr)?;
        Ok(expr.clone())
    }

    fn visit_insert(&mut self, expr: &Expr, node: &InsertExpression) -> WeaveResult<Expr> {
        self.write_keyword("insert into ");
        self.write_target(&node.table)?;
        self.write(" (");
        for (i, assignment) in node.assignments.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            match assignment.as_ref() {
                SqlExpression::ColumnAssignment(a) => self.write_column_name(&a.column)?,
                _ => return Err(WeaveError::unsupported(self.dialect.name(), assignment.kind())),
            }
        }
        self.write(") ");
        self.write_keyword("values (");
        for (i, assignment) in node.assignments.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if let SqlExpression::ColumnAssignment(a) = assignment.as_ref() {
                self.visit(&a.expression)?;
            }
        }
        self.write(")");
        Ok(expr.clone())
    }

    fn visit_insert_from_query(
        &mut self,
        expr: &Expr,
        node: &InsertFromQueryExpression,
    ) -> WeaveResult<Expr> {
        self.write_keyword("insert into ");
        self.write_target(&node.table)?;
        self.write(" (");
        for (i, column) in node.columns.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write_column_name(column)?;
        }
        self.write(") ");
        self.visit(&node.query)?;
        Ok(expr.clone())
    }

    fn visit_update(&mut self, expr: &Expr, node: &UpdateExpression) -> WeaveResult<Expr> {
        self.write_keyword("update ");
        self.write_target(&node.table)?;
        self.write(" ");
        self.write_keyword("set ");
        self.write_list(&node.assignments)?;
        if let Some(filter) = &node.filter {
            self.write(" ");
            self.write_keyword("where ");
            self.visit(filter)?;
        }
        Ok(expr.clone())
    }

    fn visit_delete(&mut self, expr: &Expr, node: &DeleteExpression) -> WeaveResult<Expr> {
        self.write_keyword("delete from ");
        self.write_target(&node.table)?;
        if let Some(filter) = &node.filter {
            self.write(" ");
            self.write_keyword("where ");
            self.visit(filter)?;
        }
        Ok(expr.clone())
    }

    fn visit_unknown(&mut self, expr: &Expr, node: &ExtensionExpression) -> WeaveResult<Expr> {
        let dialect = self.dialect;
        dialect.format_extension(self, expr, node)?;
        Ok(expr.clone())
    }
}

impl SchemaVisitor for SqlFormatter<'_> {
    fn visit_schema(&mut self, expr: &SchemaExpr) -> WeaveResult<SchemaExpr> {
        self.depth += 1;
        let result = dispatch_schema(self, expr);
        self.depth -= 1;
        ensure_unchanged(expr, result?, expr.kind())
    }

    fn visit_create_table(
        &mut self,
        expr: &SchemaExpr,
        node: &CreateTableExpression,
    ) -> WeaveResult<SchemaExpr> {
        self.write_keyword("create table ");
        if node.if_not_exists {
            self.write_keyword("if not exists ");
        }
        self.write_target(&node.table)?;
        self.write(" (");
        for (i, element) in node.columns.iter().chain(&node.constraints).enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.visit_schema(element)?;
        }
        self.write(")");
        Ok(expr.clone())
    }

    fn visit_drop_table(
        &mut self,
        expr: &SchemaExpr,
        node: &DropTableExpression,
    ) -> WeaveResult<SchemaExpr> {
        self.write_keyword("drop table ");
        if node.if_exists {
            self.write_keyword("if exists ");
        }
        self.write_target(&node.table)?;
        Ok(expr.clone())
    }

    fn visit_truncate_table(
        &mut self,
        expr: &SchemaExpr,
        node: &TruncateTableExpression,
    ) -> WeaveResult<SchemaExpr> {
        self.write_keyword("truncate table ");
        self.write_target(&node.table)?;
        Ok(expr.clone())
    }

    fn visit_add_column(
        &mut self,
        expr: &SchemaExpr,
        node: &AlterTableAddColumnExpression,
    ) -> WeaveResult<SchemaExpr> {
        self.write_keyword("alter table ");
        self.write_target(&node.table)?;
        self.write(" ");
        self.write_keyword("add column ");
        self.visit_schema(&node.column)?;
        Ok(expr.clone())
    }

    fn visit_drop_column(
        &mut self,
        expr: &SchemaExpr,
        node: &AlterTableDropColumnExpression,
    ) -> WeaveResult<SchemaExpr> {
        self.write_keyword("alter table ");
        self.write_target(&node.table)?;
        self.write(" ");
        self.write_keyword("drop column ");
        self.write_identifier(&node.column);
        Ok(expr.clone())
    }

    fn visit_add_constraint(
        &mut self,
        expr: &SchemaExpr,
        node: &AddConstraintExpression,
    ) -> WeaveResult<SchemaExpr> {
        self.write_keyword("alter table ");
        self.write_target(&node.table)?;
        self.write(" ");
        self.write_keyword("add ");
        self.visit_schema(&node.constraint)?;
        Ok(expr.clone())
    }

    fn visit_drop_constraint(
        &mut self,
        expr: &SchemaExpr,
        node: &DropConstraintExpression,
    ) -> WeaveResult<SchemaExpr> {
        self.write_keyword("alter table ");
        self.write_target(&node.table)?;
        self.write(" ");
        self.write_keyword("drop constraint ");
        self.write_identifier(&node.name);
        Ok(expr.clone())
    }

    fn visit_create_index(
        &mut self,
        expr: &SchemaExpr,
        node: &CreateIndexExpression,
    ) -> WeaveResult<SchemaExpr> {
        self.write_keyword("create ");
        if node.unique {
            self.write_keyword("unique ");
        }
        self.write_keyword("index ");
        self.write_identifier(&node.name);
        self.write(" ");
        self.write_keyword("on ");
        self.write_target(&node.table)?;
        self.write(" (");
        for (i, column) in node.columns.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write_column_name(column)?;
        }
        self.write(")");
        Ok(expr.clone())
    }

    fn visit_drop_index(
        &mut self,
        expr: &SchemaExpr,
        node: &DropIndexExpression,
    ) -> WeaveResult<SchemaExpr> {
        self.write_keyword("drop index ");
        self.write_identifier(&node.name);
        if let Some(table) = &node.table {
            self.write(" ");
            self.write_keyword("on ");
            self.write_target(table)?;
        }
        Ok(expr.clone())
    }

    fn visit_create_view(
        &mut self,
        expr: &SchemaExpr,
        node: &CreateViewExpression,
    ) -> WeaveResult<SchemaExpr> {
        self.write_keyword("create ");
        if node.or_replace {
            self.write_keyword("or replace ");
        }
        self.write_keyword("view ");
        self.write_target(&node.name)?;
        self.write(" ");
        self.write_keyword("as ");
        self.visit(&node.query)?;
        Ok(expr.clone())
    }

    fn visit_drop_view(
        &mut self,
        expr: &SchemaExpr,
        node: &DropViewExpression,
    ) -> WeaveResult<SchemaExpr> {
        self.write_keyword("drop view ");
        if node.if_exists {
            self.write_keyword("if exists ");
        }
        self.write_target(&node.name)?;
        Ok(expr.clone())
    }

    fn visit_column_definition(
        &mut self,
        expr: &SchemaExpr,
        node: &ColumnDefinitionExpression,
    ) -> WeaveResult<SchemaExpr> {
        self.write_identifier(&node.name);
        self.write(" ");
        self.write_type(&node.sql_type);
        if node.not_null {
            self.write(" ");
            self.write_keyword("not null");
        }
        if let Some(default) = &node.default {
            self.write(" ");
            self.write_keyword("default ");
            self.write_operand(default)?;
        }
        if node.auto_increment {
            self.write(" ");
            let keywords = self.dialect.auto_increment().to_string();
            self.write_keyword(&keywords);
        }
        Ok(expr.clone())
    }

    fn visit_primary_key(
        &mut self,
        expr: &SchemaExpr,
        node: &PrimaryKeyConstraint,
    ) -> WeaveResult<SchemaExpr> {
        self.write_constraint_name(&node.name);
        self.write_keyword("primary key (");
        self.write_identifier_list(&node.columns);
        self.write(")");
        Ok(expr.clone())
    }

    fn visit_unique(
        &mut self,
        expr: &SchemaExpr,
        node: &UniqueConstraint,
    ) -> WeaveResult<SchemaExpr> {
        self.write_constraint_name(&node.name);
        self.write_keyword("unique (");
        self.write_identifier_list(&node.columns);
        self.write(")");
        Ok(expr.clone())
    }

    fn visit_foreign_key(
        &mut self,
        expr: &SchemaExpr,
        node: &ForeignKeyConstraint,
    ) -> WeaveResult<SchemaExpr> {
        self.write_constraint_name(&node.name);
        self.write_keyword("foreign key (");
        self.write_identifier_list(&node.columns);
        self.write(") ");
        self.write_keyword("references ");
        self.write_target(&node.referenced_table)?;
        self.write(" (");
        self.write_identifier_list(&node.referenced_columns);
        self.write(")");
        Ok(expr.clone())
    }

    fn visit_check(&mut self, expr: &SchemaExpr, node: &CheckConstraint) -> WeaveResult<SchemaExpr> {
        self.write_constraint_name(&node.name);
        self.write_keyword("check (");
        self.visit(&node.condition)?;
        self.write(")");
        Ok(expr.clone())
    }

    fn visit_unknown_schema(
        &mut self,
        expr: &SchemaExpr,
        node: &ExtensionExpression,
    ) -> WeaveResult<SchemaExpr> {
        let dialect = self.dialect;
        dialect.format_schema_extension(self, node)?;
        Ok(expr.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SqlType;
    use crate::ast::builders::*;
    use crate::formatter::sql::StandardDialect;
    use pretty_assertions::assert_eq;

    fn employee() -> (Expr, Expr, Expr, Expr) {
        let t = table("t_employee");
        let id = column(Some(&t), "id", SqlType::Int);
        let name = column(Some(&t), "name", SqlType::Varchar);
        let salary = column(Some(&t), "salary", SqlType::BigInt);
        (t, id, name, salary)
    }

    #[test]
    fn test_operands_are_bracketed_unless_self_delimiting() {
        let (t, id, name, salary) = employee();
        let query = SelectBuilder::from(t)
            .column(name.clone())
            .filter(or(id.equal(1), plus(salary, arg(10i64)).greater_than(100)))
            .build();
        let statement = format(&StandardDialect, &query).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT t_employee.name FROM t_employee \
             WHERE (t_employee.id = ?) OR ((t_employee.salary + ?) > ?)"
        );
        assert_eq!(statement.parameters.len(), 3);
        assert_eq!(statement.parameters[0].sql_type, SqlType::Int);
    }

    #[test]
    fn test_redundant_alias_is_omitted() {
        let (t, id, name, _) = employee();
        let query = SelectBuilder::from(t)
            .column_as(id, "id")
            .column_as(name, "emp_name")
            .build();
        let statement = format(&StandardDialect, &query).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT t_employee.id, t_employee.name AS emp_name FROM t_employee"
        );
    }

    #[test]
    fn test_functions_and_case_are_not_bracketed() {
        let (t, _, name, salary) = employee();
        let query = SelectBuilder::from(t)
            .column(func("upper", vec![name], SqlType::Varchar))
            .column(case_when(
                vec![(salary.greater_than(1000), arg("high"))],
                Some(arg("low")),
            ))
            .column(count_all())
            .build();
        let statement = format(&StandardDialect, &query).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT upper(t_employee.name), \
             CASE WHEN (t_employee.salary > ?) THEN ? ELSE ? END, COUNT(*) FROM t_employee"
        );
    }

    #[test]
    fn test_keyword_case_lower() {
        let (t, id, _, _) = employee();
        let query = SelectBuilder::from(t).column(id.clone()).filter(id.is_null()).build();
        let config = FormatterConfig::builder()
            .keyword_case(KeywordCase::Lower)
            .build();
        let statement = SqlFormatter::with_config(&StandardDialect, config)
            .format(&query)
            .unwrap();
        assert_eq!(
            statement.sql,
            "select t_employee.id from t_employee where t_employee.id is null"
        );
    }

    #[test]
    fn test_standard_rejects_pagination() {
        let (t, ..) = employee();
        let query = SelectBuilder::from(t).limit(10).build();
        let err = format(&StandardDialect, &query).unwrap_err();
        assert!(matches!(err, WeaveError::UnsupportedPagination { .. }));
    }

    #[test]
    fn test_union_sides_with_pagination_are_wrapped() {
        let (t, id, ..) = employee();
        let a = SelectBuilder::from(t.clone()).column(id.clone()).build();
        let b = SelectBuilder::from(t.clone()).column(id.clone()).build();
        let c = SelectBuilder::from(t).column(id.clone()).order_by(id).build();
        let query = union_all(union(a, b), c);
        let statement = format(&StandardDialect, &query).unwrap();
        assert_eq!(
            statement.sql,
            "(SELECT t_employee.id FROM t_employee UNION SELECT t_employee.id FROM t_employee) \
             UNION ALL (SELECT t_employee.id FROM t_employee ORDER BY t_employee.id ASC)"
        );
    }

    #[test]
    fn test_dml() {
        let (t, id, name, salary) = employee();
        let statement = format(
            &StandardDialect,
            &update(
                t.clone(),
                vec![assign(name.clone(), arg("vince")), assign(salary.clone(), arg(50i64))],
                Some(id.equal(5)),
            ),
        )
        .unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE t_employee SET name = ?, salary = ? WHERE t_employee.id = ?"
        );

        let statement = format(
            &StandardDialect,
            &insert(t.clone(), vec![assign(id.clone(), arg(5)), assign(name, arg("vince"))]),
        )
        .unwrap();
        assert_eq!(statement.sql, "INSERT INTO t_employee (id, name) VALUES (?, ?)");

        let statement = format(&StandardDialect, &delete(t, Some(id.less_than(3)))).unwrap();
        assert_eq!(statement.sql, "DELETE FROM t_employee WHERE t_employee.id < ?");
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        use crate::ast::{ExtensionExpression, ExtensionNode, extension_eq};
        use std::any::Any;
        use std::hash::Hasher;

        #[derive(Debug, PartialEq)]
        struct Marker;

        impl ExtensionNode for Marker {
            fn name(&self) -> &str {
                "Marker"
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn is_leaf(&self) -> bool {
                true
            }
            fn with_children(&self, _children: Vec<Expr>) -> Arc<dyn ExtensionNode> {
                Arc::new(Marker)
            }
            fn dyn_eq(&self, other: &dyn ExtensionNode) -> bool {
                extension_eq(self, other)
            }
            fn dyn_hash(&self, _state: &mut dyn Hasher) {}
        }

        let node: Expr = Arc::new(SqlExpression::Extension(ExtensionExpression::new(Arc::new(
            Marker,
        ))));
        let err = format(&StandardDialect, &node).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expression 'Marker' is not supported by the standard dialect"
        );
    }

    #[test]
    fn test_replaced_node_is_an_internal_error() {
        let (_, id, ..) = employee();
        let copy: Expr = Arc::new(id.as_ref().clone());
        let err = ensure_unchanged(&id, copy, id.kind()).unwrap_err();
        assert!(matches!(err, WeaveError::Internal(_)));
        assert_eq!(err.to_string(), "Internal error: formatting replaced a Column node");

        let kept = ensure_unchanged(&id, id.clone(), id.kind()).unwrap();
        assert!(Arc::ptr_eq(&kept, &id));

        let mut f = SqlFormatter::new(&StandardDialect);
        let visited = f.visit(&id).unwrap();
        assert!(Arc::ptr_eq(&visited, &id));
    }

    #[test]
    fn test_custom_type_names_keep_their_case() {
        use crate::ast::SchemaExpression;

        let tags = ColumnDefinitionExpression::new(
            "tags",
            SqlType::Custom {
                code: 2000,
                name: "hstore".to_string(),
            },
        );
        let ddl = Arc::new(SchemaExpression::ColumnDefinition(tags));
        let statement = format_schema(&StandardDialect, &ddl).unwrap();
        assert_eq!(statement.sql, "tags hstore");

        let (_, id, ..) = employee();
        let query = cast(
            id,
            SqlType::Custom {
                code: 2001,
                name: "citext".to_string(),
            },
        );
        let statement = format(&StandardDialect, &query).unwrap();
        assert_eq!(statement.sql, "CAST(t_employee.id AS citext)");

        let ddl = Arc::new(SchemaExpression::ColumnDefinition(
            ColumnDefinitionExpression::new("id", SqlType::Int),
        ));
        assert_eq!(format_schema(&StandardDialect, &ddl).unwrap().sql, "id INTEGER");
    }
}
