//! Value codecs: the boundary between [`Value`]s and the driver.
//!
//! A codec is registered under the `(type code, type name)` pair of the
//! [`SqlType`] it handles. The formatter emits [`Parameter`]s; the driver
//! layer hands rows back through [`ResultRow`].

mod builtin;
mod row;

pub use builtin::BuiltinCodec;
pub use row::{MemoryRow, QueryRow, ResultRow};

use crate::ast::{SqlType, Value};
use crate::error::{WeaveError, WeaveResult};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// A bound argument: its value and the SQL type it is bound as.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub value: Value,
    pub sql_type: SqlType,
}

impl Parameter {
    pub fn new(value: Value, sql_type: SqlType) -> Self {
        Self { value, sql_type }
    }
}

/// Converts values of one SQL type on their way to and from the driver.
pub trait ValueCodec: Send + Sync {
    /// The type this codec is registered under.
    fn sql_type(&self) -> SqlType;

    /// Coerce a value before it is bound to a statement.
    fn encode(&self, value: Value) -> WeaveResult<Value>;

    /// Coerce a driver value read from `column` into this codec's type.
    fn decode(&self, column: &str, raw: &Value) -> WeaveResult<Value>;
}

type CodecKey = (i32, String);

fn key_of(sql_type: &SqlType) -> CodecKey {
    (sql_type.type_code(), sql_type.type_name().to_string())
}

/// Codecs keyed by type identity.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<CodecKey, Arc<dyn ValueCodec>>,
}

static SHARED: LazyLock<CodecRegistry> = LazyLock::new(CodecRegistry::with_builtins);

impl CodecRegistry {
    /// A registry without any codec.
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// A registry holding a [`BuiltinCodec`] for every built-in type.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for sql_type in [
            SqlType::Boolean,
            SqlType::SmallInt,
            SqlType::Int,
            SqlType::BigInt,
            SqlType::Double,
            SqlType::Varchar,
            SqlType::Text,
            SqlType::Bytes,
            SqlType::Date,
            SqlType::Time,
            SqlType::Timestamp,
            SqlType::Enum,
        ] {
            registry.register(Arc::new(BuiltinCodec::new(sql_type)));
        }
        registry
    }

    /// The process-wide registry of built-in codecs.
    pub fn shared() -> &'static CodecRegistry {
        &SHARED
    }

    /// Register a codec, replacing any codec with the same type identity.
    pub fn register(&mut self, codec: Arc<dyn ValueCodec>) {
        self.codecs.insert(key_of(&codec.sql_type()), codec);
    }

    pub fn get(&self, sql_type: &SqlType) -> Option<&dyn ValueCodec> {
        self.codecs.get(&key_of(sql_type)).map(|c| c.as_ref())
    }

    fn require(&self, column: &str, sql_type: &SqlType) -> WeaveResult<&dyn ValueCodec> {
        self.get(sql_type).ok_or_else(|| {
            WeaveError::decode(
                column,
                format!(
                    "no codec registered for type {} ({})",
                    sql_type.type_name(),
                    sql_type.type_code()
                ),
            )
        })
    }

    /// Build the parameter for `value` bound as `sql_type`.
    pub fn encode(&self, value: Value, sql_type: &SqlType) -> WeaveResult<Parameter> {
        let codec = self.require("<parameter>", sql_type)?;
        Ok(Parameter::new(codec.encode(value)?, sql_type.clone()))
    }

    /// Decode a driver value read from `column`.
    pub fn decode(&self, column: &str, raw: &Value, sql_type: &SqlType) -> WeaveResult<Value> {
        self.require(column, sql_type)?.decode(column, raw)
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.codecs.keys().collect();
        keys.sort();
        f.debug_struct("CodecRegistry").field("codecs", &keys).finish()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
