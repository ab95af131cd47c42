use super::Entity;
use crate::ast::{SqlType, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// The value of one entity field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Short(i16),
    Int(i32),
    Long(i64),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    /// Enumeration member name.
    Enum(String),
    List(Vec<FieldValue>),
    Set(Vec<FieldValue>),
    Map(Vec<(String, FieldValue)>),
    Entity(Entity),
}

impl FieldValue {
    /// Convert a decoded column value; enum columns become members.
    pub fn from_value(value: Value, sql_type: &SqlType) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Short(n) => FieldValue::Short(n),
            Value::Int(n) => FieldValue::Int(n),
            Value::Long(n) => FieldValue::Long(n),
            Value::Double(n) => FieldValue::Double(n),
            Value::Text(s) if *sql_type == SqlType::Enum => FieldValue::Enum(s),
            Value::Text(s) => FieldValue::Text(s),
            Value::Bytes(b) => FieldValue::Bytes(b),
            Value::Date(d) => FieldValue::Date(d),
            Value::Time(t) => FieldValue::Time(t),
            Value::Timestamp(ts) => FieldValue::Timestamp(ts),
        }
    }

    /// The scalar as a bindable value; collections and records have none.
    pub fn to_value(&self) -> Option<Value> {
        let value = match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Short(n) => Value::Short(*n),
            FieldValue::Int(n) => Value::Int(*n),
            FieldValue::Long(n) => Value::Long(*n),
            FieldValue::Double(n) => Value::Double(*n),
            FieldValue::Text(s) | FieldValue::Enum(s) => Value::Text(s.clone()),
            FieldValue::Bytes(b) => Value::Bytes(b.clone()),
            FieldValue::Date(d) => Value::Date(*d),
            FieldValue::Time(t) => Value::Time(*t),
            FieldValue::Timestamp(ts) => Value::Timestamp(*ts),
            FieldValue::List(_) | FieldValue::Set(_) | FieldValue::Map(_) | FieldValue::Entity(_) => {
                return None;
            }
        };
        Some(value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Short(n) => Some(*n as i64),
            FieldValue::Int(n) => Some(*n as i64),
            FieldValue::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            FieldValue::Null => Json::Null,
            FieldValue::Bool(b) => Json::from(*b),
            FieldValue::Short(n) => Json::from(*n),
            FieldValue::Int(n) => Json::from(*n),
            FieldValue::Long(n) => Json::from(*n),
            FieldValue::Double(n) => Json::from(*n),
            FieldValue::Text(s) | FieldValue::Enum(s) => Json::from(s.as_str()),
            FieldValue::Bytes(b) => Json::from(b.clone()),
            FieldValue::Date(d) => Json::from(d.to_string()),
            FieldValue::Time(t) => Json::from(t.to_string()),
            FieldValue::Timestamp(ts) => Json::from(ts.to_string()),
            FieldValue::List(items) | FieldValue::Set(items) => {
                Json::Array(items.iter().map(FieldValue::to_json).collect())
            }
            FieldValue::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            FieldValue::Entity(entity) => entity.to_json(),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i16> for FieldValue {
    fn from(n: i16) -> Self {
        FieldValue::Short(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Int(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Long(n)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Double(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Entity> for FieldValue {
    fn from(entity: Entity) -> Self {
        FieldValue::Entity(entity)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}
