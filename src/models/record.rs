use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::value::{FieldType, FilterValue};

/// Reads one field off a row; resolved once per filter, then applied row by row
pub type Accessor<R> = Arc<dyn Fn(&R) -> FilterValue + Send + Sync>;

/// Capability every row type exposes to the filter engine.
///
/// Instead of reflecting over a row for each cell, the engine asks the row type once for an
/// accessor to a field and then runs it over the whole collection.
pub trait Record: Send + Sync + 'static {
    /// Accessor for `field_name`, or `None` if this row type has no such field
    fn accessor(field_name: &str, field_type: FieldType) -> Option<Accessor<Self>>
    where
        Self: Sized;
}

/// Resolve a normalized accessor for a field.
///
/// A field the row type does not know reads as blank on every row rather than failing.
pub fn resolve_accessor<R: Record>(field_name: &str, field_type: FieldType) -> Accessor<R> {
    match R::accessor(field_name, field_type) {
        Some(inner) => Arc::new(move |row: &R| inner(row).normalize(field_type)),
        None => {
            debug!(field = field_name, "field not found on row type, reading as blank");
            Arc::new(|_: &R| FilterValue::Blank)
        }
    }
}

/// A row backed by a JSON object, as loaded from a rows file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonRow(pub Map<String, Value>);

impl JsonRow {
    pub fn get(&self, field_name: &str) -> Option<&Value> {
        self.0.get(field_name)
    }
}

impl From<Map<String, Value>> for JsonRow {
    fn from(map: Map<String, Value>) -> Self {
        JsonRow(map)
    }
}

impl Record for JsonRow {
    fn accessor(field_name: &str, field_type: FieldType) -> Option<Accessor<Self>> {
        let key = field_name.to_string();
        Some(Arc::new(move |row: &JsonRow| {
            row.get(&key)
                .map(|value| FilterValue::from_json(value, field_type))
                .unwrap_or(FilterValue::Blank)
        }))
    }
}
