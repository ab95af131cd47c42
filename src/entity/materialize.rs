use super::{Entity, FieldValue};
use crate::codec::QueryRow;
use crate::error::{WeaveError, WeaveResult};
use crate::schema::{Column, ColumnBinding, Table};

impl Table {
    /// Build a record of this table's entity type from `row`.
    ///
    /// Null columns are skipped and their fields keep the type default.
    /// A reference column produces a nested record: the whole referenced row
    /// when `with_references` is set (the row must come from
    /// [`Table::join_references_and_select`]), otherwise a stub holding only
    /// the referenced primary key. The returned record has no pending changes.
    pub fn create_entity(&self, row: &QueryRow<'_>, with_references: bool) -> WeaveResult<Entity> {
        let entity_type = self.entity_type().ok_or_else(|| WeaveError::NoEntityType {
            table: self.name().to_string(),
        })?;
        let mut entity = entity_type.instantiate();

        for column in self.columns() {
            let value = row.get(&column.label(), column.sql_type())?;
            if value.is_null() {
                continue;
            }
            let value = FieldValue::from_value(value, column.sql_type());
            match column.binding() {
                None => {}
                Some(ColumnBinding::Nested { path }) => {
                    entity.set_path(path, value)?;
                }
                Some(ColumnBinding::Reference { table, property }) => {
                    let mut child = if with_references {
                        table.create_entity(row, true)?
                    } else {
                        table.stub_entity()?
                    };
                    if let Some(path) = table.primary_key().and_then(nested_path) {
                        child.set_path(path, value)?;
                    }
                    entity.set(property, FieldValue::Entity(child));
                }
            }
        }

        entity.discard_changes();
        tracing::trace!(table = %self, entity = entity.type_name(), "materialized entity");
        Ok(entity)
    }

    fn stub_entity(&self) -> WeaveResult<Entity> {
        self.entity_type()
            .map(|entity_type| entity_type.instantiate())
            .ok_or_else(|| WeaveError::NoEntityType {
                table: self.name().to_string(),
            })
    }
}

fn nested_path(column: &Column) -> Option<&[String]> {
    match column.binding()? {
        ColumnBinding::Nested { path } => Some(path),
        ColumnBinding::Reference { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SqlType;
    use crate::entity::{EntityType, FieldType};
    use crate::codec::{CodecRegistry, MemoryRow};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn departments() -> Table {
        let department = EntityType::builder("Department")
            .field("id", FieldType::Int)
            .field("name", FieldType::Text)
            .build();
        let mut b = Table::builder("t_department").entity_type(&department);
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

    fn employees() -> Table {
        let employee = EntityType::builder("Employee")
            .field("id", FieldType::Int)
            .field("name", FieldType::Text)
            .field("salary", FieldType::Long)
            .entity("manager", "Employee")
            .entity("department", "Department")
            .build();
        let mut b = Table::builder("t_employee").entity_type(&employee);
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
        b.register_column("salary", SqlType::BigInt)
            .unwrap()
            .bind_to("salary")
            .unwrap();
        b.register_column("manager_id", SqlType::Int)
            .unwrap()
            .bind_to("manager.id")
            .unwrap();
        b.register_column("department_id", SqlType::Int)
            .unwrap()
            .references(&departments(), "department")
            .unwrap();
        b.register_column("note", SqlType::Varchar).unwrap();
        b.build()
    }

    #[test]
    fn test_stub_reference_holds_only_the_key() {
        let row = MemoryRow::new()
            .with("t_employee_id", 2)
            .with("t_employee_name", "marry")
            .with("t_employee_manager_id", 1)
            .with("t_employee_department_id", 1)
            .with("t_employee_note", "query only")
            .with("_ref0_name", "tech");
        let row = QueryRow::new(&row, CodecRegistry::shared(), None).unwrap();
        let entity = employees().create_entity(&row, false).unwrap();
        assert_eq!(
            entity.to_json(),
            json!({"id": 2, "name": "marry", "manager": {"id": 1}, "department": {"id": 1}})
        );
        assert!(entity.changed_properties().is_empty());
        let manager = entity.get_entity("manager").unwrap();
        assert_eq!(manager.type_name(), "Employee");
        assert_eq!(manager.get_str("name"), Some(""));
        let department = entity.get_entity("department").unwrap();
        assert_eq!(department.get_str("name"), Some(""));
        assert_eq!(department.type_name(), "Department");
    }

    #[test]
    fn test_null_columns_keep_defaults() {
        let row = MemoryRow::new()
            .with("t_employee_id", 3)
            .with("t_employee_salary", crate::ast::Value::Null);
        let row = QueryRow::new(&row, CodecRegistry::shared(), None).unwrap();
        let table = employees();
        let entity = table.create_entity(&row, true).unwrap();
        assert!(!entity.contains("salary"));
        assert!(!entity.contains("department"));
        assert_eq!(entity.get_i64("salary"), Some(0));
        assert_eq!(entity.get_str("name"), Some(""));
        assert_eq!(entity.to_json(), json!({"id": 3}));
    }

    #[test]
    fn test_table_without_entity_type() {
        let mut b = Table::builder("t_log");
        b.register_column("id", SqlType::Int).unwrap();
        let table = b.build();
        let row = MemoryRow::new().with("t_log_id", 1);
        let row = QueryRow::new(&row, CodecRegistry::shared(), None).unwrap();
        assert!(matches!(
            table.create_entity(&row, false),
            Err(WeaveError::NoEntityType { .. })
        ));
    }
}
