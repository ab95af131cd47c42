use super::ValueCodec;
use crate::ast::{SqlType, Value};
use crate::error::{WeaveError, WeaveResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Codec for one built-in [`SqlType`].
///
/// Drivers rarely hand back exactly the variant a column is declared as
/// (integers come back widened, temporal values as text), so decoding
/// coerces between compatible representations and fails on anything else.
#[derive(Debug, Clone)]
pub struct BuiltinCodec {
    sql_type: SqlType,
}

impl BuiltinCodec {
    pub fn new(sql_type: SqlType) -> Self {
        Self { sql_type }
    }

    fn coerce(&self, column: &str, raw: &Value) -> WeaveResult<Value> {
        if raw.is_null() {
            return Ok(Value::Null);
        }
        let mismatch = || {
            WeaveError::decode(
                column,
                format!("cannot convert {:?} to {}", raw, self.sql_type),
            )
        };
        let value = match &self.sql_type {
            SqlType::Boolean => match raw {
                Value::Bool(b) => Value::Bool(*b),
                Value::Text(s) => match s.to_ascii_lowercase().as_str() {
                    "true" | "t" | "1" => Value::Bool(true),
                    "false" | "f" | "0" => Value::Bool(false),
                    _ => return Err(mismatch()),
                },
                other => Value::Bool(other.as_i64().ok_or_else(mismatch)? != 0),
            },
            SqlType::SmallInt => {
                let n = integer(raw).ok_or_else(mismatch)?;
                Value::Short(i16::try_from(n).map_err(|_| mismatch())?)
            }
            SqlType::Int => {
                let n = integer(raw).ok_or_else(mismatch)?;
                Value::Int(i32::try_from(n).map_err(|_| mismatch())?)
            }
            SqlType::BigInt => Value::Long(integer(raw).ok_or_else(mismatch)?),
            SqlType::Double => match raw {
                Value::Double(n) => Value::Double(*n),
                Value::Text(s) => Value::Double(s.trim().parse().map_err(|_| mismatch())?),
                other => Value::Double(other.as_i64().ok_or_else(mismatch)? as f64),
            },
            SqlType::Varchar | SqlType::Text | SqlType::Enum => match raw {
                Value::Text(s) => Value::Text(s.clone()),
                Value::Bytes(b) => Value::Text(String::from_utf8(b.clone()).map_err(|_| mismatch())?),
                Value::Bool(b) => Value::Text(b.to_string()),
                Value::Short(n) => Value::Text(n.to_string()),
                Value::Int(n) => Value::Text(n.to_string()),
                Value::Long(n) => Value::Text(n.to_string()),
                Value::Double(n) => Value::Text(n.to_string()),
                Value::Date(d) => Value::Text(d.to_string()),
                Value::Time(t) => Value::Text(t.to_string()),
                Value::Timestamp(ts) => Value::Text(ts.to_string()),
                Value::Null => Value::Null,
            },
            SqlType::Bytes => match raw {
                Value::Bytes(b) => Value::Bytes(b.clone()),
                Value::Text(s) => Value::Bytes(s.as_bytes().to_vec()),
                _ => return Err(mismatch()),
            },
            SqlType::Date => match raw {
                Value::Date(d) => Value::Date(*d),
                Value::Timestamp(ts) => Value::Date(ts.date()),
                Value::Text(s) => Value::Date(parse_date(s).ok_or_else(mismatch)?),
                _ => return Err(mismatch()),
            },
            SqlType::Time => match raw {
                Value::Time(t) => Value::Time(*t),
                Value::Timestamp(ts) => Value::Time(ts.time()),
                Value::Text(s) => Value::Time(
                    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).map_err(|_| mismatch())?,
                ),
                _ => return Err(mismatch()),
            },
            SqlType::Timestamp => match raw {
                Value::Timestamp(ts) => Value::Timestamp(*ts),
                Value::Date(d) => Value::Timestamp(d.and_hms_opt(0, 0, 0).ok_or_else(mismatch)?),
                Value::Text(s) => Value::Timestamp(parse_timestamp(s).ok_or_else(mismatch)?),
                _ => return Err(mismatch()),
            },
            SqlType::Custom { .. } => raw.clone(),
        };
        Ok(value)
    }
}

impl ValueCodec for BuiltinCodec {
    fn sql_type(&self) -> SqlType {
        self.sql_type.clone()
    }

    fn encode(&self, value: Value) -> WeaveResult<Value> {
        self.coerce("<parameter>", &value)
    }

    fn decode(&self, column: &str, raw: &Value) -> WeaveResult<Value> {
        self.coerce(column, raw)
    }
}

fn integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Text(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(*b as i64),
        Value::Double(n) if n.fract() == 0.0 => Some(*n as i64),
        other => other.as_i64(),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(s).map(|ts| ts.date()))
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(ty: SqlType, raw: Value) -> WeaveResult<Value> {
        BuiltinCodec::new(ty).decode("col", &raw)
    }

    #[test]
    fn test_integers_narrow_and_widen() {
        assert_eq!(decode(SqlType::Int, Value::Long(7)).unwrap(), Value::Int(7));
        assert_eq!(decode(SqlType::BigInt, Value::Short(7)).unwrap(), Value::Long(7));
        assert_eq!(decode(SqlType::Int, Value::from("42")).unwrap(), Value::Int(42));
        assert!(decode(SqlType::SmallInt, Value::Long(1 << 20)).is_err());
    }

    #[test]
    fn test_temporal_text() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            decode(SqlType::Date, Value::from("2024-02-29")).unwrap(),
            Value::Date(date)
        );
        let ts = date.and_hms_opt(13, 5, 0).unwrap();
        assert_eq!(
            decode(SqlType::Timestamp, Value::from("2024-02-29 13:05:00")).unwrap(),
            Value::Timestamp(ts)
        );
        assert_eq!(
            decode(SqlType::Date, Value::Timestamp(ts)).unwrap(),
            Value::Date(date)
        );
    }

    #[test]
    fn test_null_passes_through() {
        assert_eq!(decode(SqlType::Double, Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_mismatch_names_column() {
        let err = decode(SqlType::Date, Value::Bool(true)).unwrap_err();
        assert!(err.to_string().starts_with("Cannot decode column 'col'"));
    }
}
