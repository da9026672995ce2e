//! Projection of raw records into fixed-column rows.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{RawRecord, ResultRow, ResultTable};

/// How the projector treats missing or mistyped fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    /// Any missing key or unexpected type fails the whole projection
    #[default]
    Strict,
    /// Missing or mistyped values become an empty cell
    Lenient,
}

/// Errors raised when a record does not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("record {index}: missing field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("record {index}: field `{field}` is not {expected}")]
    WrongType {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },
}

impl SchemaError {
    /// Position of the offending record in the input
    pub fn index(&self) -> usize {
        match self {
            SchemaError::MissingField { index, .. } | SchemaError::WrongType { index, .. } => {
                *index
            }
        }
    }

    /// Key path of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            SchemaError::MissingField { field, .. } | SchemaError::WrongType { field, .. } => field,
        }
    }
}

/// Maps [`RawRecord`]s onto [`ResultRow`]s.
///
/// | column             | key path                  |
/// |--------------------|---------------------------|
/// | `snippet`          | `snippet`                 |
/// | `main_headline`    | `headline.main`           |
/// | `pub_date`         | `pub_date`, first 10 chars|
/// | `source`           | `source`                  |
/// | `print_headline`   | `headline.print_headline` |
/// | `sub_headline`     | `headline.sub`            |
/// | `type_of_material` | `type_of_material`        |
/// | `word_count`       | `word_count`              |
///
/// Text cells render JSON strings as is, `null` as an empty string and any
/// other value as its JSON text. Projection is pure: the same input always
/// yields the same table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Projector {
    mode: ProjectionMode,
}

impl Projector {
    pub fn new(mode: ProjectionMode) -> Self {
        Self { mode }
    }

    pub fn strict() -> Self {
        Self::new(ProjectionMode::Strict)
    }

    pub fn lenient() -> Self {
        Self::new(ProjectionMode::Lenient)
    }

    /// Project every record, in order. In strict mode the first bad record
    /// fails the whole batch.
    pub fn project(&self, records: &[RawRecord]) -> Result<ResultTable, SchemaError> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| self.project_record(index, record))
            .collect()
    }

    /// Project a single record; `index` is only used in errors
    pub fn project_record(&self, index: usize, record: &RawRecord) -> Result<ResultRow, SchemaError> {
        Ok(ResultRow {
            snippet: self.text(index, record, "snippet")?,
            main_headline: self.text(index, record, "headline.main")?,
            pub_date: self.date(index, record, "pub_date")?,
            source: self.text(index, record, "source")?,
            print_headline: self.text(index, record, "headline.print_headline")?,
            sub_headline: self.text(index, record, "headline.sub")?,
            type_of_material: self.text(index, record, "type_of_material")?,
            word_count: self.count(index, record, "word_count")?,
        })
    }

    fn text(&self, index: usize, record: &RawRecord, field: &'static str) -> Result<String, SchemaError> {
        self.or_default(resolve(record, index, field).map(render_text))
    }

    fn date(&self, index: usize, record: &RawRecord, field: &'static str) -> Result<String, SchemaError> {
        let value = resolve(record, index, field).and_then(|value| match value {
            Value::String(s) => Ok(s.chars().take(10).collect()),
            _ => Err(SchemaError::WrongType {
                index,
                field,
                expected: "a string",
            }),
        });
        self.or_default(value)
    }

    fn count(&self, index: usize, record: &RawRecord, field: &'static str) -> Result<Option<i64>, SchemaError> {
        let value = resolve(record, index, field).and_then(|value| match value {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(Some)
                .ok_or(SchemaError::WrongType {
                    index,
                    field,
                    expected: "an integer",
                }),
            _ => Err(SchemaError::WrongType {
                index,
                field,
                expected: "an integer",
            }),
        });
        self.or_default(value)
    }

    fn or_default<T: Default>(&self, value: Result<T, SchemaError>) -> Result<T, SchemaError> {
        match (self.mode, value) {
            (ProjectionMode::Lenient, Err(err)) => {
                tracing::trace!(%err, "using empty cell");
                Ok(T::default())
            }
            (_, value) => value,
        }
    }
}

/// Resolve a dotted key path. A missing key is `MissingField`; a parent that
/// exists but is not an object is `WrongType` on the parent.
fn resolve<'a>(record: &'a RawRecord, index: usize, field: &'static str) -> Result<&'a Value, SchemaError> {
    if let Some(value) = record.lookup(field) {
        return Ok(value);
    }

    if let Some((parent, _)) = field.split_once('.') {
        if record.get(parent).is_some_and(|value| !value.is_object()) {
            return Err(SchemaError::WrongType {
                index,
                field: parent,
                expected: "an object",
            });
        }
    }

    Err(SchemaError::MissingField { index, field })
}

fn render_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
