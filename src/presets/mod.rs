//! Filter presets: a serializable snapshot of every active column filter.
//!
//! A preset file is a JSON array of entries in activation order:
//!
//! ```json
//! [
//!   { "field_name": "status", "field_type": "enum", "excluded_values": ["Closed"] },
//!   { "field_name": "due", "field_type": "date_time", "excluded_values": ["2023-01-01T00:00:00", null] }
//! ]
//! ```
//!
//! Excluded values are stored as JSON scalars read back with the entry's column type; enum
//! values travel as their names.

pub mod persistence;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub use persistence::{load_presets, preset_path, save_presets};

use crate::filters::sorted_excluded;
use crate::models::{FieldType, FilterDescriptor, FilterValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetEntry {
    pub field_name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub excluded_values: Vec<Value>,
}

impl PresetEntry {
    pub fn from_descriptor(descriptor: &FilterDescriptor) -> Self {
        Self {
            field_name: descriptor.field_name.clone(),
            field_type: descriptor.field_type,
            excluded_values: sorted_excluded(&descriptor.excluded).iter().map(FilterValue::to_json).collect(),
        }
    }

    /// Read the excluded values back. An entry that does not convert to the column type is
    /// restored as blank; the rest of the list is unaffected.
    pub fn excluded_set(&self) -> HashSet<FilterValue> {
        self.excluded_values
            .iter()
            .map(|raw| {
                let value = FilterValue::from_json(raw, self.field_type);
                if value == FilterValue::Blank && !raw.is_null() {
                    warn!(
                        field = %self.field_name,
                        field_type = %self.field_type,
                        value = %raw,
                        "preset value not convertible, restored as blank"
                    );
                }
                value.normalize(self.field_type)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_entry_from_descriptor_is_sorted() {
        let mut descriptor = FilterDescriptor::new("city", FieldType::Text);
        descriptor.excluded.extend([FilterValue::text("b"), FilterValue::text("A"), FilterValue::Blank]);

        let entry = PresetEntry::from_descriptor(&descriptor);

        assert_eq!(entry.excluded_values, vec![Value::Null, json!("A"), json!("b")]);
    }

    #[test]
    fn test_enum_values_serialize_as_names() {
        let mut descriptor = FilterDescriptor::new("status", FieldType::Enum);
        descriptor.excluded.insert(FilterValue::Enum("Closed".to_string()));

        let json = serde_json::to_value(PresetEntry::from_descriptor(&descriptor)).unwrap();

        assert_eq!(
            json,
            json!({"field_name": "status", "field_type": "enum", "excluded_values": ["Closed"]})
        );
    }

    #[test]
    fn test_malformed_value_falls_back_to_blank() {
        let entry = PresetEntry {
            field_name: "due".to_string(),
            field_type: FieldType::DateTime,
            excluded_values: vec![json!("not a date"), json!("2023-01-01T15:00:00")],
        };

        let expected = HashSet::from([
            FilterValue::Blank,
            FilterValue::DateTime(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()),
        ]);
        assert_eq!(entry.excluded_set(), expected);
    }

    #[test]
    fn test_missing_excluded_values_defaults_to_empty() {
        let entry: PresetEntry =
            serde_json::from_value(json!({"field_name": "n", "field_type": "integer"})).unwrap();
        assert!(entry.excluded_set().is_empty());
    }
}
