//! Map-backed entity records.
//!
//! An [`EntityType`] declares the fields a record may hold; an [`Entity`] is
//! one record, storing only the fields that were actually set and tracking
//! which of them changed since the last [`Entity::discard_changes`]. A record
//! created from its type reads unset fields as the type defaults.

mod defaults;
mod materialize;
mod value;

pub use defaults::default_value;
pub use value::FieldValue;

use crate::error::{WeaveError, WeaveResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Declared type of an entity field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Bool,
    Short,
    Int,
    Long,
    Double,
    Text,
    Bytes,
    Date,
    Time,
    Timestamp,
    /// An enumeration with its members in declaration order.
    Enum(Vec<String>),
    List(Box<FieldType>),
    Set(Box<FieldType>),
    Map(Box<FieldType>),
    /// A nested record, by entity type name.
    Entity(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    /// Whether column bindings may write this field.
    pub overridable: bool,
}

/// The declared shape of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    name: String,
    fields: Vec<FieldDef>,
    /// Types of nested record fields, resolved by name.
    #[serde(skip)]
    nested: Vec<Arc<EntityType>>,
}

impl EntityType {
    pub fn builder(name: &str) -> EntityTypeBuilder {
        EntityTypeBuilder {
            entity_type: EntityType {
                name: name.to_string(),
                fields: Vec::new(),
                nested: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check that a binding may write through `path`.
    ///
    /// Only the first segment is declared on this type; deeper segments
    /// belong to the nested record and are created on demand.
    pub fn check_binding(&self, table: &str, column: &str, path: &[String]) -> WeaveResult<&FieldDef> {
        let first = path.first().map(String::as_str).unwrap_or_default();
        let field = self.field(first).ok_or_else(|| WeaveError::UnknownField {
            entity: self.name.clone(),
            field: first.to_string(),
        })?;
        if !field.overridable {
            return Err(WeaveError::NonOverridableField {
                table: table.to_string(),
                column: column.to_string(),
                field: first.to_string(),
            });
        }
        if path.len() > 1 && !matches!(field.field_type, FieldType::Entity(_)) {
            return Err(WeaveError::UnknownField {
                entity: self.name.clone(),
                field: path.join("."),
            });
        }
        Ok(field)
    }

    /// A new, empty record of this type.
    pub fn instantiate(self: &Arc<Self>) -> Entity {
        Entity {
            type_name: self.name.clone(),
            entity_type: Some(self.clone()),
            ..Entity::default()
        }
    }

    /// The type called `name`: this type itself or one of its nested types.
    pub fn resolve(self: &Arc<Self>, name: &str) -> Option<Arc<EntityType>> {
        if self.name == name {
            return Some(self.clone());
        }
        self.nested.iter().find_map(|nested| nested.resolve(name))
    }

    /// A new record for the nested field `field`.
    ///
    /// The record carries its type when the type can be resolved, otherwise
    /// only the declared type name. `None` when `field` is not a nested record.
    pub fn new_record(self: &Arc<Self>, field: &str) -> Option<Entity> {
        match &self.field(field)?.field_type {
            FieldType::Entity(name) => Some(
                self.resolve(name)
                    .map(|nested| nested.instantiate())
                    .unwrap_or_else(|| Entity::new(name)),
            ),
            _ => None,
        }
    }
}

pub struct EntityTypeBuilder {
    entity_type: EntityType,
}

impl EntityTypeBuilder {
    pub fn field(mut self, name: &str, field_type: FieldType) -> Self {
        self.push(name, field_type, true);
        self
    }

    /// A field no column binding may write.
    pub fn readonly_field(mut self, name: &str, field_type: FieldType) -> Self {
        self.push(name, field_type, false);
        self
    }

    /// A nested record field of the named entity type.
    pub fn entity(mut self, name: &str, type_name: &str) -> Self {
        self.push(name, FieldType::Entity(type_name.to_string()), true);
        self
    }

    /// Make `entity_type` resolvable for nested record fields naming it.
    pub fn nested_type(mut self, entity_type: &Arc<EntityType>) -> Self {
        self.entity_type.nested.retain(|t| t.name != entity_type.name);
        self.entity_type.nested.push(entity_type.clone());
        self
    }

    fn push(&mut self, name: &str, field_type: FieldType, overridable: bool) {
        self.entity_type.fields.retain(|f| f.name != name);
        self.entity_type.fields.push(FieldDef {
            name: name.to_string(),
            field_type,
            overridable,
        });
    }

    pub fn build(self) -> Arc<EntityType> {
        Arc::new(self.entity_type)
    }
}

/// One record: a map from field name to value plus the set of changed fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    type_name: String,
    entity_type: Option<Arc<EntityType>>,
    values: BTreeMap<String, FieldValue>,
    changed: BTreeSet<String>,
}

impl Entity {
    /// An untyped record: unset fields read as `None`.
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            ..Self::default()
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn entity_type(&self) -> Option<&Arc<EntityType>> {
        self.entity_type.as_ref()
    }

    /// The value of `field`, or the default of its declared type when unset.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field).or_else(|| {
            let def = self.entity_type.as_ref()?.field(field)?;
            Some(default_value(&def.field_type))
        })
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.values.insert(field.to_string(), value.into());
        self.changed.insert(field.to_string());
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        let removed = self.values.remove(field);
        if removed.is_some() {
            self.changed.insert(field.to_string());
        }
        removed
    }

    /// Fields set since the record was created or last cleaned.
    pub fn changed_properties(&self) -> &BTreeSet<String> {
        &self.changed
    }

    /// Mark the record clean, recursively.
    pub fn discard_changes(&mut self) {
        self.changed.clear();
        for value in self.values.values_mut() {
            if let FieldValue::Entity(child) = value {
                child.discard_changes();
            }
        }
    }

    /// Value at a dotted path such as `["department", "id"]`.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&FieldValue> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for segment in parents {
            match current.get(segment.as_ref())? {
                FieldValue::Entity(child) => current = child,
                _ => return None,
            }
        }
        current.get(last.as_ref())
    }

    /// Write through a path, creating missing intermediate records.
    ///
    /// Intermediate records of a typed record take the declared type of their
    /// field; below an untyped record they are named after the field.
    pub fn set_path(&mut self, path: &[String], value: FieldValue) -> WeaveResult<()> {
        let Some((last, parents)) = path.split_last() else {
            return Err(WeaveError::UnknownField {
                entity: self.type_name.clone(),
                field: String::new(),
            });
        };
        let mut current = self;
        for segment in parents {
            if !current.values.contains_key(segment) {
                let child = match &current.entity_type {
                    Some(entity_type) => {
                        entity_type.new_record(segment).ok_or_else(|| WeaveError::UnknownField {
                            entity: current.type_name.clone(),
                            field: path.join("."),
                        })?
                    }
                    None => Entity::new(segment),
                };
                current.set(segment, FieldValue::Entity(child));
            }
            current.changed.insert(segment.clone());
            let type_name = current.type_name.clone();
            current = match current.values.get_mut(segment) {
                Some(FieldValue::Entity(child)) => child,
                _ => {
                    return Err(WeaveError::UnknownField {
                        entity: type_name,
                        field: path.join("."),
                    });
                }
            };
        }
        current.set(last, value);
        Ok(())
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        match self.get(field)? {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer field, widened.
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field)?.as_i64()
    }

    pub fn get_i32(&self, field: &str) -> Option<i32> {
        self.get_i64(field).and_then(|n| i32::try_from(n).ok())
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        match self.get(field)? {
            FieldValue::Double(n) => Some(*n),
            other => other.as_i64().map(|n| n as f64),
        }
    }

    /// Text and enumeration fields.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        match self.get(field)? {
            FieldValue::Text(s) | FieldValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_date(&self, field: &str) -> Option<NaiveDate> {
        match self.get(field)? {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn get_time(&self, field: &str) -> Option<NaiveTime> {
        match self.get(field)? {
            FieldValue::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn get_timestamp(&self, field: &str) -> Option<NaiveDateTime> {
        match self.get(field)? {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn get_entity(&self, field: &str) -> Option<&Entity> {
        match self.get(field)? {
            FieldValue::Entity(child) => Some(child),
            _ => None,
        }
    }

    /// The set fields as a JSON object; nested records become nested objects.
    /// Unset fields are left out rather than written as defaults.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl Serialize for Entity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn department_type() -> Arc<EntityType> {
        EntityType::builder("Department")
            .field("id", FieldType::Int)
            .field("name", FieldType::Text)
            .build()
    }

    fn employee_type() -> Arc<EntityType> {
        EntityType::builder("Employee")
            .field("id", FieldType::Int)
            .field("name", FieldType::Text)
            .readonly_field("version", FieldType::Long)
            .field("active", FieldType::Bool)
            .field("hired", FieldType::Date)
            .entity("manager", "Employee")
            .entity("department", "Department")
            .nested_type(&department_type())
            .build()
    }

    fn path(p: &str) -> Vec<String> {
        p.split('.').map(str::to_string).collect()
    }

    #[test]
    fn test_set_path_creates_intermediate_records() {
        let mut entity = employee_type().instantiate();
        entity.set_path(&path("manager.id"), FieldValue::Int(1)).unwrap();
        let manager = entity.get_entity("manager").unwrap();
        assert_eq!(manager.type_name(), "Employee");
        assert_eq!(manager.get_i32("id"), Some(1));
        assert_eq!(entity.get_path(&["manager", "id"]), Some(&FieldValue::Int(1)));
        assert!(entity.changed_properties().contains("manager"));
    }

    #[test]
    fn test_deep_paths_take_declared_types() {
        let mut entity = employee_type().instantiate();
        entity
            .set_path(&path("manager.manager.department.id"), FieldValue::Int(4))
            .unwrap();
        let top = entity.get_entity("manager").unwrap().get_entity("manager").unwrap();
        assert_eq!(top.type_name(), "Employee");
        let department = top.get_entity("department").unwrap();
        assert_eq!(department.type_name(), "Department");
        assert_eq!(department.get_str("name"), Some(""));

        assert!(matches!(
            entity.set_path(&path("manager.name.first"), FieldValue::Int(1)),
            Err(WeaveError::UnknownField { .. })
        ));

        let mut untyped = Entity::new("Employee");
        untyped.set_path(&path("manager.id"), FieldValue::Int(1)).unwrap();
        assert_eq!(untyped.get_entity("manager").unwrap().type_name(), "manager");
    }

    #[test]
    fn test_discard_changes_is_recursive() {
        let mut entity = employee_type().instantiate();
        entity.set("name", "vince");
        entity.set_path(&path("department.id"), FieldValue::Int(3)).unwrap();
        entity.discard_changes();
        assert!(entity.changed_properties().is_empty());
        assert!(
            entity
                .get_entity("department")
                .unwrap()
                .changed_properties()
                .is_empty()
        );
        entity.set("name", "marry");
        assert_eq!(
            entity.changed_properties().iter().collect::<Vec<_>>(),
            vec!["name"]
        );
    }

    #[test]
    fn test_check_binding() {
        let ty = employee_type();
        assert!(ty.check_binding("t_employee", "id", &path("id")).is_ok());
        assert!(ty.check_binding("t_employee", "manager_id", &path("manager.id")).is_ok());
        assert!(matches!(
            ty.check_binding("t_employee", "v", &path("version")),
            Err(WeaveError::NonOverridableField { .. })
        ));
        assert!(matches!(
            ty.check_binding("t_employee", "x", &path("salary")),
            Err(WeaveError::UnknownField { .. })
        ));
        assert!(matches!(
            ty.check_binding("t_employee", "x", &path("name.first")),
            Err(WeaveError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_absent_fields_read_as_defaults() {
        let entity = employee_type().instantiate();
        assert_eq!(entity.get_i32("id"), Some(0));
        assert_eq!(entity.get_i64("version"), Some(0));
        assert_eq!(entity.get_str("name"), Some(""));
        assert_eq!(entity.get_bool("active"), Some(false));
        assert_eq!(entity.get_date("hired"), None);
        assert_eq!(entity.get("hired"), Some(&FieldValue::Null));
        assert_eq!(entity.get_entity("department").map(Entity::type_name), Some("Department"));
        assert_eq!(entity.get("salary"), None);
        assert!(!entity.contains("id"));
        assert_eq!(entity.to_json(), json!({}));

        let untyped = Entity::new("Employee");
        assert_eq!(untyped.get_i32("id"), None);
    }

    #[test]
    fn test_set_values_shadow_defaults() {
        let mut entity = employee_type().instantiate();
        entity.set("name", "marry");
        assert_eq!(entity.get_str("name"), Some("marry"));
        entity.remove("name");
        assert_eq!(entity.get_str("name"), Some(""));
    }

    #[test]
    fn test_to_json() {
        let mut entity = Entity::new("Employee");
        entity.set("id", 2);
        entity.set("name", "marry");
        let mut department = Entity::new("Department");
        department.set("id", 1);
        entity.set("department", department);
        assert_eq!(
            entity.to_json(),
            json!({"id": 2, "name": "marry", "department": {"id": 1}})
        );
        assert_eq!(serde_json::to_value(&entity).unwrap(), entity.to_json());
    }
}
