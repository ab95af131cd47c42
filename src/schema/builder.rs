use super::{Column, ColumnBinding, ColumnData, Table, TableData};
use crate::ast::SqlType;
use crate::entity::EntityType;
use crate::error::{WeaveError, WeaveResult};
use std::sync::Arc;

struct ColumnSpec {
    name: String,
    alias: Option<String>,
    sql_type: SqlType,
    binding: Option<ColumnBinding>,
}

impl ColumnSpec {
    fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Declares the columns of a [`Table`].
///
/// ```ignore
/// let mut employees = Table::builder("t_employee").entity_type(&employee);
/// employees.register_column("id", SqlType::Int)?.primary_key()?.bind_to("id")?;
/// employees.register_column("manager_id", SqlType::Int)?.bind_to("manager.id")?;
/// employees
///     .register_column("department_id", SqlType::Int)?
///     .references(&departments, "department")?;
/// let employees = employees.build();
/// ```
pub struct TableBuilder {
    name: String,
    alias: Option<String>,
    entity_type: Option<Arc<EntityType>>,
    columns: Vec<ColumnSpec>,
    primary_key: Option<usize>,
    // Next `_refN` suffix for tables cloned by `references`.
    ref_counter: usize,
}

impl TableBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
            entity_type: None,
            columns: Vec::new(),
            primary_key: None,
            ref_counter: 0,
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// The entity type rows of this table materialize into.
    pub fn entity_type(mut self, entity_type: &Arc<EntityType>) -> Self {
        self.entity_type = Some(entity_type.clone());
        self
    }

    /// Declare a stored column and return a handle to configure it.
    pub fn register_column(
        &mut self,
        name: &str,
        sql_type: SqlType,
    ) -> WeaveResult<ColumnRegistration<'_>> {
        self.push_column(ColumnSpec {
            name: name.to_string(),
            alias: None,
            sql_type,
            binding: None,
        })
    }

    fn push_column(&mut self, spec: ColumnSpec) -> WeaveResult<ColumnRegistration<'_>> {
        if self.columns.iter().any(|c| c.key() == spec.key()) {
            return Err(WeaveError::DuplicateColumn {
                table: self.name.clone(),
                column: spec.key().to_string(),
            });
        }
        self.columns.push(spec);
        Ok(ColumnRegistration {
            index: self.columns.len() - 1,
            builder: self,
        })
    }

    pub fn build(self) -> Table {
        let columns = self
            .columns
            .into_iter()
            .map(|spec| {
                Column(Arc::new(ColumnData {
                    table_name: self.name.clone(),
                    table_alias: self.alias.clone(),
                    name: spec.name,
                    alias: spec.alias,
                    sql_type: spec.sql_type,
                    binding: spec.binding,
                }))
            })
            .collect();
        Table(Arc::new(TableData {
            name: self.name,
            alias: self.alias,
            entity_type: self.entity_type,
            columns,
            primary_key: self.primary_key,
        }))
    }
}

/// Chaining handle returned by [`TableBuilder::register_column`].
pub struct ColumnRegistration<'b> {
    builder: &'b mut TableBuilder,
    index: usize,
}

impl<'b> ColumnRegistration<'b> {
    fn spec(&self) -> &ColumnSpec {
        &self.builder.columns[self.index]
    }

    fn entity_type(&self) -> WeaveResult<Arc<EntityType>> {
        self.builder
            .entity_type
            .clone()
            .ok_or_else(|| WeaveError::NoEntityType {
                table: self.builder.name.clone(),
            })
    }

    /// Mark this column as the table's primary key.
    pub fn primary_key(self) -> WeaveResult<Self> {
        if let Some(existing) = self.builder.primary_key {
            if existing != self.index {
                return Err(WeaveError::DuplicatePrimaryKey {
                    table: self.builder.name.clone(),
                    column: self.spec().key().to_string(),
                    existing: self.builder.columns[existing].key().to_string(),
                });
            }
        }
        self.builder.primary_key = Some(self.index);
        Ok(self)
    }

    /// Bind this column to a field, or through nested records with a dotted
    /// path such as `manager.id`.
    pub fn bind_to(self, path: &str) -> WeaveResult<Self> {
        let path: Vec<String> = path.split('.').map(str::to_string).collect();
        self.entity_type()?
            .check_binding(&self.builder.name, self.spec().key(), &path)?;
        self.builder.columns[self.index].binding = Some(ColumnBinding::Nested { path });
        Ok(self)
    }

    /// Bind this column as a reference to a row of `table`, materialized into
    /// `property`.
    ///
    /// Fails when `table` already reaches the table being declared. Otherwise
    /// `table` and everything it references are copied under fresh `_refN`
    /// aliases, so the same table can be referenced more than once.
    pub fn references(self, table: &Table, property: &str) -> WeaveResult<Self> {
        let mut route = Vec::new();
        check_circular(&self.builder.name, table, &mut route)?;
        if table.primary_key().is_none() {
            return Err(WeaveError::MissingPrimaryKey {
                table: table.name().to_string(),
            });
        }
        self.entity_type()?.check_binding(
            &self.builder.name,
            self.spec().key(),
            &[property.to_string()],
        )?;

        let referenced = clone_reference(table, &mut self.builder.ref_counter);
        self.builder.columns[self.index].binding = Some(ColumnBinding::Reference {
            table: referenced,
            property: property.to_string(),
        });
        Ok(self)
    }

    /// Register a second column reading the same storage under the label
    /// suffix `alias`; bind it separately. This column's own binding is kept.
    pub fn aliased(self, alias: &str) -> WeaveResult<ColumnRegistration<'b>> {
        let spec = ColumnSpec {
            name: self.spec().name.clone(),
            alias: Some(alias.to_string()),
            sql_type: self.spec().sql_type.clone(),
            binding: None,
        };
        let ColumnRegistration { builder, .. } = self;
        builder.push_column(spec)
    }
}

fn check_circular(root: &str, table: &Table, route: &mut Vec<String>) -> WeaveResult<()> {
    route.push(table.name().to_string());
    if table.name() == root {
        return Err(WeaveError::CircularReference {
            table: root.to_string(),
            route: route.clone(),
        });
    }
    for referenced in table.referenced_tables() {
        check_circular(root, referenced, route)?;
    }
    route.pop();
    Ok(())
}

/// Copy a referenced table under the next `_refN` alias.
pub(crate) fn clone_reference(table: &Table, counter: &mut usize) -> Table {
    let alias = format!("_ref{}", *counter);
    *counter += 1;
    tracing::debug!(table = table.name(), alias = %alias, "cloning referenced table");
    copy_table(table, Some(alias), counter)
}

/// Copy `table` under `alias`, cloning every referenced table with `counter`.
pub(crate) fn copy_table(table: &Table, alias: Option<String>, counter: &mut usize) -> Table {
    let columns = table
        .columns()
        .iter()
        .map(|column| {
            let binding = match column.binding() {
                Some(ColumnBinding::Reference {
                    table: referenced,
                    property,
                }) => Some(ColumnBinding::Reference {
                    table: clone_reference(referenced, counter),
                    property: property.clone(),
                }),
                other => other.cloned(),
            };
            Column(Arc::new(ColumnData {
                table_name: table.name().to_string(),
                table_alias: alias.clone(),
                name: column.0.name.clone(),
                alias: column.0.alias.clone(),
                sql_type: column.0.sql_type.clone(),
                binding,
            }))
        })
        .collect();
    Table(Arc::new(TableData {
        name: table.name().to_string(),
        alias,
        entity_type: table.0.entity_type.clone(),
        columns,
        primary_key: table.0.primary_key,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldType;
    use std::collections::HashSet;

    fn department_type() -> Arc<EntityType> {
        EntityType::builder("Department")
            .field("id", FieldType::Int)
            .field("name", FieldType::Text)
            .build()
    }

    fn departments() -> Table {
        let mut b = Table::builder("t_department").entity_type(&department_type());
        b.register_column("id", SqlType::Int)
            .unwrap()
            .primary_key()
            .unwrap()
            .bind_to("id")
            .unwrap();
        b.register_column("name", SqlType::Varchar)
            .unwrap()
            .bind_to("name")
            .unwrap();
        b.build()
    }

    #[test]
    fn test_duplicate_column() {
        let mut b = Table::builder("t_department");
        b.register_column("id", SqlType::Int).unwrap();
        let err = b.register_column("id", SqlType::BigInt).err().unwrap();
        assert!(matches!(err, WeaveError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_second_primary_key_is_rejected() {
        let mut b = Table::builder("t_department");
        b.register_column("id", SqlType::Int).unwrap().primary_key().unwrap();
        let err = b
            .register_column("code", SqlType::Varchar)
            .unwrap()
            .primary_key()
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "Table 't_department' already has a primary key 'id', cannot mark 'code' as primary key"
        );
    }

    #[test]
    fn test_binding_requires_entity_type() {
        let mut b = Table::builder("t_department");
        let err = b
            .register_column("id", SqlType::Int)
            .unwrap()
            .bind_to("id")
            .err()
            .unwrap();
        assert!(matches!(err, WeaveError::NoEntityType { .. }));
    }

    #[test]
    fn test_references_clone_with_increasing_aliases() {
        let employee = EntityType::builder("Employee")
            .field("id", FieldType::Int)
            .entity("department", "Department")
            .entity("previous_department", "Department")
            .build();
        let departments = departments();
        let mut b = Table::builder("t_employee").entity_type(&employee);
        b.register_column("id", SqlType::Int).unwrap().primary_key().unwrap();
        b.register_column("department_id", SqlType::Int)
            .unwrap()
            .references(&departments, "department")
            .unwrap();
        b.register_column("previous_department_id", SqlType::Int)
            .unwrap()
            .references(&departments, "previous_department")
            .unwrap();
        let employees = b.build();

        let aliases: Vec<_> = employees
            .referenced_tables()
            .map(|t| t.alias().unwrap_or_default().to_string())
            .collect();
        assert_eq!(aliases, vec!["_ref0", "_ref1"]);
        let distinct: HashSet<_> = employees.referenced_tables().collect();
        assert_eq!(distinct.len(), 2);
        assert!(employees.referenced_tables().all(|t| *t != departments));
        assert_eq!(departments.alias(), None);
    }

    #[test]
    fn test_aliased_column_shares_storage() {
        let department = EntityType::builder("Department")
            .field("id", FieldType::Int)
            .field("code", FieldType::Int)
            .build();
        let mut b = Table::builder("t_department").entity_type(&department);
        b.register_column("id", SqlType::Int)
            .unwrap()
            .bind_to("id")
            .unwrap()
            .aliased("code")
            .unwrap()
            .bind_to("code")
            .unwrap();
        let table = b.build();
        let id = table.column("id").unwrap();
        let code = table.column("code").unwrap();
        assert_eq!(code.name(), "id");
        assert_eq!(code.label(), "t_department_code");
        assert_eq!(id.binding(), Some(&ColumnBinding::nested("id")));
        assert_eq!(code.binding(), Some(&ColumnBinding::nested("code")));
    }
}
