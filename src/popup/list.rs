//! Flat checkbox list for columns without a tree.
//!
//! The select-all row is a one-way control: checking or unchecking it sets every shown row,
//! but toggling a single row never updates select-all. Only the tree popup derives a mixed
//! state for its root.

use super::search::PopupSearch;
use crate::error::FilterError;
use crate::models::PopupItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckList {
    items: Vec<PopupItem>,
    /// Indices of rows passing the popup search
    visible: Vec<usize>,
}

impl CheckList {
    pub fn new(items: Vec<PopupItem>) -> Self {
        let visible = (0..items.len()).collect();
        Self { items, visible }
    }

    pub fn items(&self) -> &[PopupItem] {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut [PopupItem] {
        &mut self.items
    }

    pub fn item(&self, idx: usize) -> Option<&PopupItem> {
        self.items.get(idx)
    }

    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &PopupItem> {
        self.visible.iter().filter_map(|&idx| self.items.get(idx))
    }

    pub fn select_all_index(&self) -> Option<usize> {
        self.items.iter().position(PopupItem::is_select_all)
    }

    /// Set one row. Select-all sets every shown row, skipping those already in that state.
    pub fn set_checked(&mut self, idx: usize, checked: bool) -> Result<(), FilterError> {
        let item = self.items.get_mut(idx).ok_or(FilterError::ItemOutOfRange(idx))?;
        item.set_checked(checked);

        if item.is_select_all() {
            for &other in &self.visible {
                if other != idx && self.items[other].is_checked() != checked {
                    self.items[other].set_checked(checked);
                }
            }
        }
        Ok(())
    }

    /// Whether any value row differs from its state at popup-open time
    pub fn any_changed(&self) -> bool {
        self.items.iter().any(|item| !item.is_select_all() && item.is_changed())
    }

    pub fn checked_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_select_all() && item.is_checked()).count()
    }

    pub fn apply_search(&mut self, search: &PopupSearch) {
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| search.matches(item))
            .map(|(idx, _)| idx)
            .collect();
    }
}
