use super::{Entity, FieldType, FieldValue};
use dashmap::DashMap;
use std::sync::LazyLock;

// One immutable instance per distinct field type, kept for the life of the
// process so records can lend it out like a stored value.
static DEFAULTS: LazyLock<DashMap<FieldType, &'static FieldValue>> = LazyLock::new(DashMap::new);

/// The default value of a field type.
///
/// Booleans are false, numbers zero, text empty, collections empty, nested
/// records empty and enumerations their first member. Repeated lookups of
/// the same type return the same instance.
pub fn default_value(field_type: &FieldType) -> &'static FieldValue {
    if let Some(cached) = DEFAULTS.get(field_type) {
        return *cached;
    }
    *DEFAULTS
        .entry(field_type.clone())
        .or_insert_with(|| Box::leak(Box::new(build_default(field_type))))
}

fn build_default(field_type: &FieldType) -> FieldValue {
    match field_type {
        FieldType::Bool => FieldValue::Bool(false),
        FieldType::Short => FieldValue::Short(0),
        FieldType::Int => FieldValue::Int(0),
        FieldType::Long => FieldValue::Long(0),
        FieldType::Double => FieldValue::Double(0.0),
        FieldType::Text => FieldValue::Text(String::new()),
        FieldType::Bytes => FieldValue::Bytes(Vec::new()),
        FieldType::Date | FieldType::Time | FieldType::Timestamp => FieldValue::Null,
        FieldType::Enum(members) => match members.first() {
            Some(first) => FieldValue::Enum(first.clone()),
            None => FieldValue::Null,
        },
        FieldType::List(_) => FieldValue::List(Vec::new()),
        FieldType::Set(_) => FieldValue::Set(Vec::new()),
        FieldType::Map(_) => FieldValue::Map(Vec::new()),
        FieldType::Entity(name) => FieldValue::Entity(Entity::new(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_cached() {
        let a = default_value(&FieldType::Long);
        let b = default_value(&FieldType::Long);
        assert!(std::ptr::eq(a, b));
        assert_eq!(*a, FieldValue::Long(0));
    }

    #[test]
    fn test_defaults_per_type() {
        let status = FieldType::Enum(vec!["active".into(), "retired".into()]);
        assert_eq!(*default_value(&status), FieldValue::Enum("active".into()));
        assert_eq!(*default_value(&FieldType::Bool), FieldValue::Bool(false));
        assert_eq!(
            *default_value(&FieldType::List(Box::new(FieldType::Int))),
            FieldValue::List(Vec::new())
        );
        assert_eq!(
            *default_value(&FieldType::Entity("Department".into())),
            FieldValue::Entity(Entity::new("Department"))
        );
    }
}
