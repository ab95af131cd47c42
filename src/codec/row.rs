use super::CodecRegistry;
use crate::ast::{SqlType, Value};
use crate::error::{WeaveError, WeaveResult};

/// One row of a forward-only result cursor, with its metadata.
pub trait ResultRow {
    fn column_count(&self) -> usize;

    /// Label of the column at `index`, zero-based.
    fn column_label(&self, index: usize) -> Option<&str>;

    /// Raw driver value at `index`, zero-based.
    fn get(&self, index: usize) -> Option<&Value>;

    /// Position of the column labelled `label`, compared case-insensitively.
    fn index_of(&self, label: &str) -> Option<usize> {
        (0..self.column_count()).find(|&i| {
            self.column_label(i)
                .is_some_and(|l| l.eq_ignore_ascii_case(label))
        })
    }
}

/// A row held in memory, as labels and values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryRow {
    labels: Vec<String>,
    values: Vec<Value>,
}

impl MemoryRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    pub fn with(mut self, label: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(label, value);
        self
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<Value>) {
        self.labels.push(label.into());
        self.values.push(value.into());
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl<L: Into<String>, V: Into<Value>> FromIterator<(L, V)> for MemoryRow {
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        let mut row = MemoryRow::new();
        for (label, value) in iter {
            row.push(label, value);
        }
        row
    }
}

impl ResultRow for MemoryRow {
    fn column_count(&self) -> usize {
        self.labels.len()
    }

    fn column_label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

/// Typed access to a [`ResultRow`] by column label.
///
/// Labels longer than the dialect's identifier limit are rejected, both in
/// the row metadata and when looked up: a database would have truncated such
/// a label, so a lookup could silently hit the wrong column.
pub struct QueryRow<'r> {
    row: &'r dyn ResultRow,
    codecs: &'r CodecRegistry,
    max_identifier_length: Option<usize>,
}

impl<'r> QueryRow<'r> {
    pub fn new(
        row: &'r dyn ResultRow,
        codecs: &'r CodecRegistry,
        max_identifier_length: Option<usize>,
    ) -> WeaveResult<Self> {
        let query_row = Self {
            row,
            codecs,
            max_identifier_length,
        };
        for index in 0..row.column_count() {
            if let Some(label) = row.column_label(index) {
                query_row.check_length(label)?;
            }
        }
        Ok(query_row)
    }

    fn check_length(&self, label: &str) -> WeaveResult<()> {
        match self.max_identifier_length {
            Some(max) if max > 0 && label.chars().count() > max => {
                Err(WeaveError::ColumnNameTooLong {
                    name: label.to_string(),
                    max,
                })
            }
            _ => Ok(()),
        }
    }

    /// Whether the row has a column labelled `label`.
    pub fn contains(&self, label: &str) -> bool {
        self.row.index_of(label).is_some()
    }

    /// The value labelled `label`, decoded as `sql_type`.
    ///
    /// A label the row does not carry reads as NULL: queries are free to
    /// select only part of a table.
    pub fn get(&self, label: &str, sql_type: &SqlType) -> WeaveResult<Value> {
        self.check_length(label)?;
        let Some(raw) = self.row.index_of(label).and_then(|i| self.row.get(i)) else {
            return Ok(Value::Null);
        };
        self.codecs.decode(label, raw, sql_type)
    }

    /// Like [`QueryRow::get`], but a missing label is an error.
    pub fn require(&self, label: &str, sql_type: &SqlType) -> WeaveResult<Value> {
        if !self.contains(label) {
            return Err(WeaveError::ColumnNotFound(label.to_string()));
        }
        self.get(label, sql_type)
    }
}
