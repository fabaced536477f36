use super::value::{FieldType, FilterValue};

/// Role of a row in a filter popup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Synthetic "select all" row, never a value
    SelectAll,
    Value,
    /// Stands in for both null and empty values
    Blank,
}

/// One checkbox row of a filter popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupItem {
    pub kind: ItemKind,
    pub content: FilterValue,
    pub label: String,
    checked: bool,
    initial: bool,
}

impl PopupItem {
    pub fn select_all(label: impl Into<String>) -> Self {
        Self::with_state(ItemKind::SelectAll, FilterValue::Blank, label, true)
    }

    pub fn value(content: FilterValue, label: impl Into<String>, checked: bool) -> Self {
        Self::with_state(ItemKind::Value, content, label, checked)
    }

    pub fn blank(label: impl Into<String>, checked: bool) -> Self {
        Self::with_state(ItemKind::Blank, FilterValue::Blank, label, checked)
    }

    fn with_state(kind: ItemKind, content: FilterValue, label: impl Into<String>, checked: bool) -> Self {
        Self { kind, content, label: label.into(), checked, initial: checked }
    }

    /// 0 for select-all, -1 for blank, 1 for values
    pub fn level(&self) -> i32 {
        match self.kind {
            ItemKind::SelectAll => 0,
            ItemKind::Value => 1,
            ItemKind::Blank => -1,
        }
    }

    pub fn is_select_all(&self) -> bool {
        self.kind == ItemKind::SelectAll
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// State at popup-open time
    pub fn initial_state(&self) -> bool {
        self.initial
    }

    pub fn is_changed(&self) -> bool {
        self.checked != self.initial
    }

    /// Returns whether the state actually changed
    pub fn set_checked(&mut self, checked: bool) -> bool {
        if self.checked == checked {
            return false;
        }
        self.checked = checked;
        true
    }

    /// Raw values this row stands for in the excluded set
    pub fn raw_values(&self, field_type: FieldType) -> Vec<FilterValue> {
        match self.kind {
            ItemKind::SelectAll => Vec::new(),
            ItemKind::Value => vec![self.content.clone()],
            ItemKind::Blank => field_type.blank_values(),
        }
    }
}
