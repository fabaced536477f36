use std::collections::HashSet;
use std::time::Duration;

use super::labels::ValueLabeler;
use super::list::CheckList;
use super::search::{PopupSearch, SearchMode};
use crate::candidates::{build_candidates, build_items};
use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::filters::commit_popup;
use crate::localization::Tag;
use crate::models::{FieldType, FilterDescriptor, FilterValue, ItemKind, PopupItem, Record};
use crate::tree::{DateTree, NodeId, build_tree};

/// Everything a column's open filter popup shows and edits.
///
/// Date and duration columns carry a tree on top of the flat item list; the items stay the
/// source of truth in both layouts.
#[derive(Clone)]
pub struct Popup {
    field_name: String,
    field_type: FieldType,
    list: CheckList,
    tree: Option<DateTree>,
    search: PopupSearch,
    labeler: ValueLabeler,
    elapsed: Duration,
}

impl Popup {
    /// Scan the visible rows and lay out the popup for `descriptor`'s column.
    ///
    /// This is the expensive part of opening a popup and runs off the UI thread.
    pub fn build<R: Record>(
        rows: &[R],
        visible: &[usize],
        descriptor: &FilterDescriptor,
        merge_excluded: bool,
        config: &FilterConfig,
        labeler: ValueLabeler,
    ) -> Self {
        let candidates = build_candidates(rows, visible, descriptor, merge_excluded, config);
        let items = build_items(&candidates, descriptor, &labeler);
        let tree = descriptor
            .field_type
            .is_hierarchical()
            .then(|| build_tree(&items, &(0..items.len()).collect::<Vec<_>>(), &labeler));

        Self {
            field_name: descriptor.field_name.clone(),
            field_type: descriptor.field_type,
            list: CheckList::new(items),
            tree,
            search: PopupSearch::new(config.default_search_mode),
            labeler,
            elapsed: candidates.elapsed,
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn items(&self) -> &[PopupItem] {
        self.list.items()
    }

    pub fn list(&self) -> &CheckList {
        &self.list
    }

    pub fn tree(&self) -> Option<&DateTree> {
        self.tree.as_ref()
    }

    pub fn search(&self) -> &PopupSearch {
        &self.search
    }

    /// Time spent building the candidate set
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Index of the item holding `value`, if it is a candidate
    pub fn find_item(&self, value: &FilterValue) -> Option<usize> {
        self.items().iter().position(|item| match item.kind {
            ItemKind::Value => &item.content == value,
            ItemKind::Blank => value.is_blank(),
            ItemKind::SelectAll => false,
        })
    }

    /// Toggle an item by index; in tree layout this goes through the item's node
    pub fn set_item_checked(&mut self, idx: usize, checked: bool) -> Result<(), FilterError> {
        let item = self.list.item(idx).ok_or(FilterError::ItemOutOfRange(idx))?;
        let node = match &self.tree {
            Some(_) if item.is_select_all() => Some(NodeId::ROOT),
            Some(tree) => tree.node_for_item(idx),
            None => None,
        };

        match node {
            Some(node) => self.set_node_checked(node, Some(checked)),
            None => self.list.set_checked(idx, checked),
        }
    }

    /// Toggle a tree node; cascades through the tree onto the linked items
    pub fn set_node_checked(&mut self, node: NodeId, value: Option<bool>) -> Result<(), FilterError> {
        let tree = self.tree.as_mut().ok_or(FilterError::NodeOutOfRange(node.0))?;
        tree.set_checked(node, value, self.list.items_mut())?;

        if node == NodeId::ROOT {
            if let (Some(checked), Some(select_all)) = (value, self.list.select_all_index()) {
                self.list.items_mut()[select_all].set_checked(checked);
            }
        }
        Ok(())
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search.set_text(text);
        self.refresh_search();
    }

    pub fn set_search_mode(&mut self, mode: SearchMode) {
        self.search.set_mode(mode);
        self.refresh_search();
    }

    pub fn toggle_search_mode(&mut self) {
        self.set_search_mode(self.search.mode().toggled());
    }

    /// Re-apply the search to the list and, for tree columns, rebuild the tree: from every
    /// candidate when the search is empty, else from the checked items that match it.
    fn refresh_search(&mut self) {
        self.list.apply_search(&self.search);

        if self.tree.is_none() {
            return;
        }
        let items = self.list.items();
        let indices: Vec<usize> = if self.search.is_active() {
            items
                .iter()
                .enumerate()
                .filter(|(_, item)| {
                    !item.is_select_all() && item.is_checked() && self.search.matches(item)
                })
                .map(|(idx, _)| idx)
                .collect()
        } else {
            (0..items.len()).collect()
        };
        self.tree = Some(build_tree(items, &indices, &self.labeler));
    }

    /// Items currently on screen, select-all included
    pub fn shown_items(&self) -> Vec<usize> {
        match &self.tree {
            Some(tree) => {
                let mut shown: Vec<usize> = self.list.select_all_index().into_iter().collect();
                shown.extend(tree.linked_items());
                shown
            }
            None => self.list.visible().to_vec(),
        }
    }

    /// Apply is offered once something changed or a search narrows the popup
    pub fn apply_enabled(&self) -> bool {
        self.list.any_changed() || self.search.is_active()
    }

    /// Fold this popup's state into a column's excluded values
    pub fn commit(&self, excluded: &mut HashSet<FilterValue>) -> usize {
        commit_popup(
            self.list.items(),
            &self.shown_items(),
            self.search.is_active(),
            self.field_type,
            excluded,
        )
    }

    /// Footer text such as `Status: 40 | Elapsed time: 3 ms`, counting candidate values
    pub fn status_line(&self, show_elapsed: bool) -> String {
        let total = self.items().iter().filter(|item| !item.is_select_all()).count();
        let mut line = format!("{}: {}", self.labeler.translate(Tag::Status), total);
        if show_elapsed {
            line.push_str(&format!(
                " | {}: {} ms",
                self.labeler.translate(Tag::ElapsedTime),
                self.elapsed.as_millis()
            ));
        }
        line
    }
}

impl std::fmt::Debug for Popup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Popup")
            .field("field_name", &self.field_name)
            .field("field_type", &self.field_type)
            .field("items", &self.list.items().len())
            .field("tree", &self.tree.as_ref().map(DateTree::len))
            .field("search", &self.search)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::models::JsonRow;

    fn rows(values: serde_json::Value) -> Vec<JsonRow> {
        serde_json::from_value(values).unwrap()
    }

    fn open(rows: &[JsonRow], descriptor: &FilterDescriptor) -> Popup {
        let visible: Vec<usize> = (0..rows.len()).collect();
        Popup::build(
            rows,
            &visible,
            descriptor,
            false,
            &FilterConfig::default(),
            ValueLabeler::default(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> FilterValue {
        FilterValue::DateTime(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    fn date_rows() -> Vec<JsonRow> {
        rows(json!([
            {"when": "2023-01-01T09:00:00"},
            {"when": "2023-01-02T10:30:00"},
            {"when": "2023-02-01T00:00:00"},
            {"when": "2023-01-01T18:00:00"}
        ]))
    }

    #[test]
    fn test_flat_popup_lists_distinct_values() {
        let rows = rows(json!([{"name": "A"}, {"name": "B"}, {"name": "A"}]));
        let popup = open(&rows, &FilterDescriptor::new("name", FieldType::Text));

        let labels: Vec<&str> = popup.items().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["(Select all)", "A", "B"]);
        assert!(popup.tree().is_none());
        assert!(!popup.apply_enabled());
    }

    #[test]
    fn test_date_popup_builds_tree() {
        let popup = open(&date_rows(), &FilterDescriptor::new("when", FieldType::DateTime));

        assert_eq!(popup.items().len(), 4);
        let tree = popup.tree().unwrap();
        let years = tree.children(NodeId::ROOT);
        assert_eq!(years.len(), 1);
        assert_eq!(tree.children(years[0]).len(), 2);
    }

    #[test]
    fn test_item_toggle_routes_through_tree() {
        let mut popup = open(&date_rows(), &FilterDescriptor::new("when", FieldType::DateTime));
        let idx = popup.find_item(&date(2023, 1, 1)).unwrap();

        popup.set_item_checked(idx, false).unwrap();

        let tree = popup.tree().unwrap();
        let year = tree.children(NodeId::ROOT)[0];
        let january = tree.children(year)[0];
        let february = tree.children(year)[1];
        assert_eq!(tree.node(january).unwrap().is_checked(), None);
        assert_eq!(tree.node(year).unwrap().is_checked(), None);
        assert_eq!(tree.node(february).unwrap().is_checked(), Some(true));
        assert!(popup.apply_enabled());
    }

    #[test]
    fn test_select_all_in_tree_layout_syncs_item() {
        let mut popup = open(&date_rows(), &FilterDescriptor::new("when", FieldType::DateTime));

        popup.set_item_checked(0, false).unwrap();

        assert!(popup.items().iter().all(|i| !i.is_checked()));
        assert_eq!(popup.tree().unwrap().root().is_checked(), Some(false));
    }

    #[test]
    fn test_tree_search_restricts_to_checked_matches() {
        let mut popup = open(&date_rows(), &FilterDescriptor::new("when", FieldType::DateTime));
        let jan_2 = popup.find_item(&date(2023, 1, 2)).unwrap();
        popup.set_item_checked(jan_2, false).unwrap();

        popup.set_search_text("2023-01");
        let tree = popup.tree().unwrap();
        assert_eq!(tree.linked_items(), vec![popup.find_item(&date(2023, 1, 1)).unwrap()]);

        popup.set_search_text("1999");
        assert!(popup.tree().unwrap().is_empty());

        popup.set_search_text("");
        assert_eq!(popup.tree().unwrap().linked_items().len(), 3);
    }

    #[test]
    fn test_commit_after_search_excludes_hidden_values() {
        let rows = rows(json!([{"city": "Boston"}, {"city": "Atlanta"}, {"city": "Lancaster"}]));
        let mut popup = open(&rows, &FilterDescriptor::new("city", FieldType::Text));
        popup.set_search_text("lan");

        let mut excluded = HashSet::new();
        popup.commit(&mut excluded);

        assert_eq!(excluded, HashSet::from([FilterValue::text("Boston")]));
    }

    #[test]
    fn test_status_line() {
        let rows = rows(json!([{"name": "A"}, {"name": "B"}]));
        let mut popup = open(&rows, &FilterDescriptor::new("name", FieldType::Text));
        popup.set_item_checked(2, false).unwrap();

        assert_eq!(popup.status_line(false), "Status: 2");
        assert!(popup.status_line(true).contains("Elapsed time"));
    }

    #[test]
    fn test_find_item_blank() {
        let rows = rows(json!([{"name": null}, {"name": "x"}]));
        let popup = open(&rows, &FilterDescriptor::new("name", FieldType::Text));
        assert_eq!(popup.find_item(&FilterValue::text("")), Some(2));
    }
}
