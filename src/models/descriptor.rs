use std::collections::HashSet;

use super::value::{FieldType, FilterValue};

/// Filter state of one column.
///
/// Created the first time the column's popup opens and kept for the rest of the grid
/// session, so reopening the popup restores the previous checkbox state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDescriptor {
    pub field_name: String,
    pub field_type: FieldType,
    /// Values hidden while this filter is active
    pub excluded: HashSet<FilterValue>,
    /// Whether the descriptor currently contributes a predicate
    pub is_filtered: bool,
}

impl FilterDescriptor {
    pub fn new(field_name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field_name: field_name.into(),
            field_type,
            excluded: HashSet::new(),
            is_filtered: false,
        }
    }

    pub fn excludes(&self, value: &FilterValue) -> bool {
        self.excluded.contains(value)
    }

    /// Whether any flavor of blank is excluded
    pub fn excludes_blank(&self) -> bool {
        self.field_type.blank_values().iter().any(|v| self.excluded.contains(v))
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}
