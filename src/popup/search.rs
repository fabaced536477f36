use serde::{Deserialize, Serialize};

use crate::localization::Tag;
use crate::models::PopupItem;

/// How the search box matches popup labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Contains,
    StartsWith,
}

impl SearchMode {
    pub fn toggled(self) -> Self {
        match self {
            SearchMode::Contains => SearchMode::StartsWith,
            SearchMode::StartsWith => SearchMode::Contains,
        }
    }

    /// Localization tag of the mode's caption
    pub fn tag(self) -> Tag {
        match self {
            SearchMode::Contains => Tag::Contains,
            SearchMode::StartsWith => Tag::StartsWith,
        }
    }
}

/// Transient filter over what a popup displays.
///
/// Matching is case-insensitive on the display label. It never touches a column's committed
/// filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupSearch {
    text: String,
    needle: String,
    mode: SearchMode,
}

impl PopupSearch {
    pub fn new(mode: SearchMode) -> Self {
        Self { mode, ..Self::default() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.needle = self.text.to_lowercase();
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
    }

    pub fn is_active(&self) -> bool {
        !self.needle.is_empty()
    }

    /// Select-all rows always match
    pub fn matches(&self, item: &PopupItem) -> bool {
        if item.is_select_all() || !self.is_active() {
            return true;
        }
        self.matches_label(&item.label)
    }

    pub fn matches_label(&self, label: &str) -> bool {
        let haystack = label.to_lowercase();
        match self.mode {
            SearchMode::Contains => haystack.contains(&self.needle),
            SearchMode::StartsWith => haystack.starts_with(&self.needle),
        }
    }
}
