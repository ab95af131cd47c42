//! Table and column declarations and their bindings to entity fields.
//!
//! Tables are declared once with a [`TableBuilder`]; the resulting [`Table`]
//! and its [`Column`]s are shared handles that compare by identity, so two
//! independently declared tables with the same name stay distinguishable.

mod builder;
mod query;

pub use builder::{ColumnRegistration, TableBuilder};

use crate::ast::SqlType;
use crate::entity::EntityType;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// How a column's value reaches an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnBinding {
    /// Written through a chain of fields; a single segment is a plain field.
    Nested { path: Vec<String> },
    /// The column points at a row of `table`, stored as a record in `property`.
    Reference { table: Table, property: String },
}

impl ColumnBinding {
    pub fn nested(path: &str) -> Self {
        ColumnBinding::Nested {
            path: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn referenced_table(&self) -> Option<&Table> {
        match self {
            ColumnBinding::Reference { table, .. } => Some(table),
            ColumnBinding::Nested { .. } => None,
        }
    }
}

pub(crate) struct ColumnData {
    pub(crate) table_name: String,
    pub(crate) table_alias: Option<String>,
    pub(crate) name: String,
    /// Label suffix of a column declared with [`ColumnRegistration::aliased`].
    pub(crate) alias: Option<String>,
    pub(crate) sql_type: SqlType,
    pub(crate) binding: Option<ColumnBinding>,
}

/// A stored column of a [`Table`].
#[derive(Clone)]
pub struct Column(pub(crate) Arc<ColumnData>);

impl Column {
    /// Name of the stored column.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn sql_type(&self) -> &SqlType {
        &self.0.sql_type
    }

    pub fn binding(&self) -> Option<&ColumnBinding> {
        self.0.binding.as_ref()
    }

    /// Whether this column reads the same storage as another column under
    /// its own label.
    pub fn is_aliased(&self) -> bool {
        self.0.alias.is_some()
    }

    /// The table alias, else the table name.
    pub fn qualifier(&self) -> &str {
        self.0.table_alias.as_deref().unwrap_or(&self.0.table_name)
    }

    /// Unique label of this column in a select list:
    /// `<table alias or name>_<column alias or name>`.
    pub fn label(&self) -> String {
        let suffix = self.0.alias.as_deref().unwrap_or(&self.0.name);
        format!("{}_{}", self.qualifier(), suffix)
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("label", &self.label())
            .field("sql_type", &self.0.sql_type)
            .field("binding", &self.0.binding)
            .finish()
    }
}

pub(crate) struct TableData {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) entity_type: Option<Arc<EntityType>>,
    pub(crate) columns: Vec<Column>,
    pub(crate) primary_key: Option<usize>,
}

/// A declared table: name, optional alias, ordered columns and at most one
/// primary key.
#[derive(Clone)]
pub struct Table(pub(crate) Arc<TableData>);

impl Table {
    pub fn builder(name: &str) -> TableBuilder {
        TableBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.0.alias.as_deref()
    }

    /// The name columns are qualified with: the alias, else the name.
    pub fn qualifier(&self) -> &str {
        self.0.alias.as_deref().unwrap_or(&self.0.name)
    }

    pub fn entity_type(&self) -> Option<&Arc<EntityType>> {
        self.0.entity_type.as_ref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.0.columns
    }

    /// The stored column named `name`; aliased columns are found by alias.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.0
            .columns
            .iter()
            .find(|c| c.0.alias.as_deref().unwrap_or(&c.0.name) == name)
    }

    pub fn primary_key(&self) -> Option<&Column> {
        self.0.primary_key.and_then(|i| self.0.columns.get(i))
    }

    /// Tables this table's columns reference directly.
    pub fn referenced_tables(&self) -> impl Iterator<Item = &Table> {
        self.0
            .columns
            .iter()
            .filter_map(|c| c.binding().and_then(ColumnBinding::referenced_table))
    }

    /// A copy carrying `alias`, with fresh copies of every referenced table.
    pub fn aliased(&self, alias: &str) -> Table {
        let mut counter = 0;
        builder::copy_table(self, Some(alias.to_string()), &mut counter)
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Table {}

impl Hash for Table {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.0.name)
            .field("alias", &self.0.alias)
            .field("columns", &self.0.columns.len())
            .finish()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.alias {
            Some(alias) => write!(f, "{} {}", self.0.name, alias),
            None => write!(f, "{}", self.0.name),
        }
    }
}
