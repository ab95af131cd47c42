#![allow(dead_code)]

use sqlweave::prelude::*;
use std::sync::Arc;

pub fn department_type() -> Arc<EntityType> {
    EntityType::builder("Department")
        .field("id", FieldType::Int)
        .field("name", FieldType::Text)
        .build()
}

pub fn employee_type() -> Arc<EntityType> {
    EntityType::builder("Employee")
        .field("id", FieldType::Int)
        .field("name", FieldType::Text)
        .field("salary", FieldType::Long)
        .entity("manager", "Employee")
        .entity("department", "Department")
        .nested_type(&department_type())
        .build()
}

/// `t_department(id, name)`
pub fn departments() -> WeaveResult<Table> {
    let mut b = Table::builder("t_department").entity_type(&department_type());
    b.register_column("id", SqlType::Int)?.primary_key()?.bind_to("id")?;
    b.register_column("name", SqlType::Varchar)?.bind_to("name")?;
    Ok(b.build())
}

/// `t_employee(id, name, manager_id, department_id)`, with `department_id`
/// referencing `departments`.
pub fn employees(departments: &Table) -> WeaveResult<Table> {
    let mut b = Table::builder("t_employee").entity_type(&employee_type());
    b.register_column("id", SqlType::Int)?.primary_key()?.bind_to("id")?;
    b.register_column("name", SqlType::Varchar)?.bind_to("name")?;
    b.register_column("manager_id", SqlType::Int)?.bind_to("manager.id")?;
    b.register_column("department_id", SqlType::Int)?
        .references(departments, "department")?;
    Ok(b.build())
}

/// The joined row for employee 2 ("marry") in department 1 ("tech").
pub fn marry_row() -> MemoryRow {
    MemoryRow::new()
        .with("t_employee_id", 2)
        .with("t_employee_name", "marry")
        .with("t_employee_manager_id", 1)
        .with("t_employee_department_id", 1)
        .with("_ref0_id", 1)
        .with("_ref0_name", "tech")
}
