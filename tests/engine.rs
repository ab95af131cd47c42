#![cfg(feature = "sqlx")]

mod common;

use common::{departments, employees};
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlweave::ast::{
    ColumnDefinitionExpression, CreateTableExpression, ExtraProperties, SchemaExpression,
};
use sqlweave::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Pooled connections each open the file, so they all see the same tables.
fn database_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sqlweave-{}-{name}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

fn create_table(name: &str, columns: &[(&str, SqlType)]) -> Arc<SchemaExpression> {
    Arc::new(SchemaExpression::CreateTable(CreateTableExpression {
        table: table(name),
        columns: columns
            .iter()
            .map(|(column, sql_type)| {
                Arc::new(SchemaExpression::ColumnDefinition(ColumnDefinitionExpression::new(
                    *column,
                    sql_type.clone(),
                )))
            })
            .collect(),
        constraints: Vec::new(),
        if_not_exists: false,
        extra: ExtraProperties::new(),
    }))
}

async fn seed(db: &WeaveDB) -> anyhow::Result<()> {
    let ddl = [
        create_table("t_department", &[("id", SqlType::Int), ("name", SqlType::Varchar)]),
        create_table(
            "t_employee",
            &[
                ("id", SqlType::Int),
                ("name", SqlType::Varchar),
                ("manager_id", SqlType::Int),
                ("department_id", SqlType::Int),
            ],
        ),
    ];
    for statement in &ddl {
        let statement = format_schema(&SqliteDialect, statement)?;
        sqlx::query(&statement.sql).execute(db.pool()).await?;
    }

    let d = table("t_department");
    let inserted = db
        .execute(&insert(
            d.clone(),
            vec![
                assign(column(Some(&d), "id", SqlType::Int), arg(1)),
                assign(column(Some(&d), "name", SqlType::Varchar), arg("tech")),
            ],
        ))
        .await?;
    assert_eq!(inserted, 1);

    let e = table("t_employee");
    let id = column(Some(&e), "id", SqlType::Int);
    let name = column(Some(&e), "name", SqlType::Varchar);
    let manager = column(Some(&e), "manager_id", SqlType::Int);
    let department = column(Some(&e), "department_id", SqlType::Int);
    db.execute(&insert(
        e.clone(),
        vec![
            assign(id.clone(), arg(1)),
            assign(name.clone(), arg("vince")),
            assign(department.clone(), arg(1)),
        ],
    ))
    .await?;
    db.execute(&insert(
        e,
        vec![
            assign(id, arg(2)),
            assign(name, arg("marry")),
            assign(manager, arg(1)),
            assign(department, arg(1)),
        ],
    ))
    .await?;
    Ok(())
}

fn sorted_json(mut entities: Vec<Entity>) -> Vec<serde_json::Value> {
    entities.sort_by_key(|e| e.get_i64("id"));
    entities.iter().map(Entity::to_json).collect()
}

#[tokio::test]
async fn test_query_entities_with_references() -> anyhow::Result<()> {
    init_tracing();
    let path = database_file("references");
    let db = WeaveDB::connect(&format!("sqlite://{}?mode=rwc", path.display())).await?;
    assert_eq!(db.dialect(), Dialect::Sqlite);
    seed(&db).await?;

    let employees = employees(&departments()?)?;
    let entities = db.query_entities(&employees, true).await?;
    assert_eq!(
        sorted_json(entities.clone()),
        vec![
            json!({"id": 1, "name": "vince", "department": {"id": 1, "name": "tech"}}),
            json!({
                "id": 2,
                "name": "marry",
                "manager": {"id": 1},
                "department": {"id": 1, "name": "tech"},
            }),
        ]
    );
    assert!(entities.iter().all(|e| e.changed_properties().is_empty()));

    let stubs = db.query_entities(&employees, false).await?;
    assert_eq!(
        sorted_json(stubs)[1],
        json!({"id": 2, "name": "marry", "manager": {"id": 1}, "department": {"id": 1}})
    );

    db.pool().close().await;
    let _ = std::fs::remove_file(&path);
    Ok(())
}

#[tokio::test]
async fn test_fetch_entities_binds_filter_arguments() -> anyhow::Result<()> {
    init_tracing();
    let path = database_file("filter");
    let db = WeaveDB::connect(&format!("sqlite://{}?mode=rwc", path.display())).await?;
    seed(&db).await?;

    let employees = employees(&departments()?)?;
    let query = SelectBuilder::from(employees.as_expression())
        .columns(employees.select_all())
        .filter(employees.column_expr("name")?.equal("vince"))
        .build();
    let entities = db.fetch_entities(&employees, &query, false).await?;

    assert_eq!(entities.len(), 1);
    let vince = &entities[0];
    assert_eq!(vince.get_i32("id"), Some(1));
    assert!(!vince.contains("manager"));
    assert_eq!(vince.get_entity("manager").map(|m| m.type_name()), Some("Employee"));

    let rows = db.fetch_all(&query).await?;
    assert_eq!(rows.len(), 1);

    db.pool().close().await;
    let _ = std::fs::remove_file(&path);
    Ok(())
}
