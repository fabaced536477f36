//! Grouping of date and duration candidates into checkbox trees.
//!
//! - Dates and date-times: year -> month -> day
//! - Durations: hours -> minutes -> seconds, with a leading days level when any value spans
//!   at least one day. Negative durations get their own `-`-prefixed top nodes.

use chrono::Datelike;

use super::arena::{BLANK_LEVEL, DateTree, NodeId, TreeNode};
use crate::localization::Tag;
use crate::models::{FilterValue, ItemKind, PopupItem};
use crate::popup::labels::ValueLabeler;

/// One grouping key with its label
type PathPart = (i64, String);

/// Build a tree over the popup items at `item_indices`.
///
/// Value items become leaves under their grouping path, a blank item becomes a trailing
/// level -1 node under the root, and everything else is ignored. With no usable item the
/// result is a root-only tree.
pub fn build_tree(items: &[PopupItem], item_indices: &[usize], labeler: &ValueLabeler) -> DateTree {
    let mut tree = DateTree::with_root(labeler.translate(Tag::All));

    let values: Vec<(usize, &FilterValue)> = item_indices
        .iter()
        .filter_map(|&idx| items.get(idx).map(|item| (idx, item)))
        .filter(|(_, item)| item.kind == ItemKind::Value)
        .map(|(idx, item)| (idx, &item.content))
        .collect();

    let with_days = values.iter().any(|(_, value)| match value {
        FilterValue::Duration(d) => d.num_days() != 0,
        _ => false,
    });

    for (idx, value) in values {
        let Some(path) = grouping_path(value, with_days, labeler) else {
            continue;
        };
        insert_path(&mut tree, &path, idx, items[idx].is_checked());
    }

    let blank = item_indices
        .iter()
        .copied()
        .find(|&idx| items.get(idx).is_some_and(|item| item.kind == ItemKind::Blank));
    if let Some(idx) = blank {
        let id = tree.push(TreeNode::new(BLANK_LEVEL, 0, items[idx].label.clone(), Some(NodeId::ROOT)));
        tree.link_leaf(id, idx, items[idx].is_checked());
    }

    tree.verify_checked_state();
    tree
}

fn grouping_path(value: &FilterValue, with_days: bool, labeler: &ValueLabeler) -> Option<Vec<PathPart>> {
    if let Some(date) = value.as_date() {
        return Some(vec![
            (i64::from(date.year()), date.year().to_string()),
            (i64::from(date.month()), labeler.month_name(date.month())),
            (i64::from(date.day()), format!("{:02}", date.day())),
        ]);
    }

    let FilterValue::Duration(d) = value else {
        return None;
    };
    let negative = d.num_seconds() < 0;
    let total = d.num_seconds().abs();
    let (days, rem) = (total / 86_400, total % 86_400);
    let hours = if with_days { rem / 3_600 } else { total / 3_600 };
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut path = Vec::with_capacity(4);
    if with_days {
        path.push((days, format!("{}d", days)));
    }
    path.push((hours, format!("{:02}h", hours)));
    path.push((minutes, format!("{:02}m", minutes)));
    path.push((seconds, format!("{:02}s", seconds)));

    // Negative durations group under their own signed top nodes; keys below -1 never clash
    // with the non-negative ones
    if negative {
        let (key, label) = &mut path[0];
        *key = -*key - 1;
        label.insert(0, '-');
    }
    Some(path)
}

/// Walk the grouping path from the root, creating missing inner nodes; the last part always
/// gets a fresh leaf linked to the item.
fn insert_path(tree: &mut DateTree, path: &[PathPart], item: usize, checked: bool) {
    let Some(((leaf_key, leaf_label), inner)) = path.split_last() else {
        return;
    };

    let mut parent = NodeId::ROOT;
    for (depth, (key, label)) in inner.iter().enumerate() {
        parent = match tree.child_by_content(parent, *key) {
            Some(existing) => existing,
            None => tree.push(TreeNode::new(depth as i32 + 1, *key, label.clone(), Some(parent))),
        };
    }

    let leaf = tree.push(TreeNode::new(path.len() as i32, *leaf_key, leaf_label.clone(), Some(parent)));
    tree.link_leaf(leaf, item, checked);
}
