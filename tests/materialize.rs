mod common;

use common::{departments, employees, marry_row};
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlweave::entity::default_value;
use sqlweave::prelude::*;
use std::collections::HashSet;

fn postgres_row(row: &MemoryRow) -> anyhow::Result<QueryRow<'_>> {
    Ok(QueryRow::new(row, CodecRegistry::shared(), Some(63))?)
}

#[test]
fn test_employee_with_references() -> anyhow::Result<()> {
    let employees = employees(&departments()?)?;
    let row = marry_row();
    let entity = employees.create_entity(&postgres_row(&row)?, true)?;

    assert_eq!(
        entity.to_json(),
        json!({
            "id": 2,
            "name": "marry",
            "manager": {"id": 1},
            "department": {"id": 1, "name": "tech"},
        })
    );
    assert!(entity.changed_properties().is_empty());
    assert!(
        entity
            .get_entity("department")
            .map(|d| d.changed_properties().is_empty())
            .unwrap_or(false)
    );
    Ok(())
}

#[test]
fn test_employee_without_references() -> anyhow::Result<()> {
    let employees = employees(&departments()?)?;
    let row = marry_row();
    let entity = employees.create_entity(&postgres_row(&row)?, false)?;

    assert_eq!(
        entity.to_json(),
        json!({
            "id": 2,
            "name": "marry",
            "manager": {"id": 1},
            "department": {"id": 1},
        })
    );
    Ok(())
}

#[test]
fn test_absent_columns_read_as_defaults() -> anyhow::Result<()> {
    let employees = employees(&departments()?)?;
    let row = MemoryRow::new().with("t_employee_id", 7);
    let entity = employees.create_entity(&postgres_row(&row)?, true)?;

    assert_eq!(entity.get_i32("id"), Some(7));
    assert_eq!(entity.get_i64("salary"), Some(0));
    assert_eq!(entity.get_str("name"), Some(""));
    assert_eq!(entity.get("salary"), Some(&FieldValue::Long(0)));
    assert!(std::ptr::eq(
        default_value(&FieldType::Long),
        entity.get("salary").unwrap_or(&FieldValue::Null)
    ));
    assert_eq!(
        entity.get_entity("department").map(|d| d.type_name()),
        Some("Department")
    );
    assert_eq!(entity.to_json(), json!({"id": 7}));
    Ok(())
}

#[test]
fn test_long_label_is_rejected() {
    let row = MemoryRow::new()
        .with("t_employee_id", 2)
        .with(format!("t_employee_{}", "x".repeat(60)), 1);
    let err = QueryRow::new(&row, CodecRegistry::shared(), Some(63))
        .err()
        .map(|e| e.to_string())
        .unwrap_or_default();
    assert!(err.contains("63"), "unexpected error: {err}");
}

#[test]
fn test_circular_reference_is_rejected() -> anyhow::Result<()> {
    let a_type = EntityType::builder("A")
        .field("id", FieldType::Int)
        .entity("b", "B")
        .build();
    let b_type = EntityType::builder("B")
        .field("id", FieldType::Int)
        .entity("a", "A")
        .build();

    let mut a = Table::builder("t_a").entity_type(&a_type);
    a.register_column("id", SqlType::Int)?.primary_key()?.bind_to("id")?;
    let a = a.build();

    let mut b = Table::builder("t_b").entity_type(&b_type);
    b.register_column("id", SqlType::Int)?.primary_key()?.bind_to("id")?;
    b.register_column("a_id", SqlType::Int)?.references(&a, "a")?;
    let b = b.build();

    let mut a2 = Table::builder("t_a").entity_type(&a_type);
    a2.register_column("id", SqlType::Int)?.primary_key()?.bind_to("id")?;
    let err = a2
        .register_column("b_id", SqlType::Int)?
        .references(&b, "b")
        .err();

    match err {
        Some(WeaveError::CircularReference { table, route }) => {
            assert_eq!(table, "t_a");
            assert_eq!(route, vec!["t_b".to_string(), "t_a".to_string()]);
        }
        other => panic!("expected a circular reference, got {other:?}"),
    }

    let a2 = a2.build();
    assert_eq!(a2.referenced_tables().count(), 0);
    assert_eq!(a2.column("b_id").and_then(|c| c.binding()), None);
    Ok(())
}

#[test]
fn test_reference_aliases_are_unique() -> anyhow::Result<()> {
    let departments = departments()?;
    let employees = employees(&departments)?;

    let project_type = EntityType::builder("Project")
        .field("id", FieldType::Int)
        .entity("lead", "Employee")
        .entity("owner", "Department")
        .build();
    let mut b = Table::builder("t_project").entity_type(&project_type);
    b.register_column("id", SqlType::Int)?.primary_key()?.bind_to("id")?;
    b.register_column("lead_id", SqlType::Int)?.references(&employees, "lead")?;
    b.register_column("owner_id", SqlType::Int)?.references(&departments, "owner")?;
    let projects = b.build();

    fn collect(table: &Table, aliases: &mut Vec<String>) {
        for referenced in table.referenced_tables() {
            aliases.push(referenced.alias().unwrap_or_default().to_string());
            collect(referenced, aliases);
        }
    }
    let mut aliases = Vec::new();
    collect(&projects, &mut aliases);

    assert_eq!(aliases, vec!["_ref0", "_ref1", "_ref2"]);
    assert_eq!(aliases.iter().collect::<HashSet<_>>().len(), 3);
    Ok(())
}

#[test]
fn test_joined_select_feeds_materialization() -> anyhow::Result<()> {
    let employees = employees(&departments()?)?;
    let query = employees.join_references_and_select()?.build();
    let statement = format(&PostgresDialect, &query)?;

    let SqlExpression::Select(select) = query.as_ref() else {
        panic!("expected a select");
    };
    let labels: Vec<String> = select
        .columns
        .iter()
        .filter_map(|e| match e.as_ref() {
            SqlExpression::ColumnDeclaring(c) => c.declared_name.clone(),
            _ => None,
        })
        .collect();
    for label in &labels {
        assert!(statement.sql.contains(label.as_str()), "{label} missing");
    }
    assert_eq!(labels, marry_row().labels().to_vec());
    Ok(())
}
