use std::collections::HashSet;

use rayon::prelude::*;

use super::registry::Predicate;
use crate::models::{FieldType, FilterValue, PopupItem};

/// Fold a popup's checkbox state into a column's excluded values.
///
/// Only rows whose state changed since the popup opened move values in or out of
/// `excluded`. Values hidden by other filters never appear in the popup and keep whatever
/// state they had.
///
/// When a search narrowed the popup, every candidate that was not shown is excluded along
/// with the shown rows the user unchecked: applying a search means "keep only what I see
/// checked".
///
/// Returns the number of values added plus removed.
pub fn commit_popup(
    items: &[PopupItem],
    shown: &[usize],
    search_active: bool,
    field_type: FieldType,
    excluded: &mut HashSet<FilterValue>,
) -> usize {
    let shown: HashSet<usize> = shown.iter().copied().collect();
    let mut touched = 0;

    for (idx, item) in items.iter().enumerate() {
        if item.is_select_all() {
            continue;
        }

        let hidden_by_search = search_active && !shown.contains(&idx);
        if hidden_by_search || (item.is_changed() && !item.is_checked()) {
            touched += insert_all(excluded, item.raw_values(field_type));
        } else if item.is_changed() {
            for value in item.raw_values(field_type) {
                touched += usize::from(excluded.remove(&value));
            }
        }
    }

    touched
}

fn insert_all(excluded: &mut HashSet<FilterValue>, values: Vec<FilterValue>) -> usize {
    values.into_iter().map(|value| usize::from(excluded.insert(value))).sum()
}

/// Indices of rows passing the predicate, in row order
pub fn filter_rows<R: Sync>(rows: &[R], predicate: &Predicate<R>, parallel_threshold: usize) -> Vec<usize> {
    if rows.len() >= parallel_threshold {
        rows.par_iter().enumerate().filter(|(_, row)| predicate(*row)).map(|(i, _)| i).collect()
    } else {
        rows.iter().enumerate().filter(|(_, row)| predicate(*row)).map(|(i, _)| i).collect()
    }
}

/// Values of `excluded` in display order, for previews and presets
pub fn sorted_excluded(excluded: &HashSet<FilterValue>) -> Vec<FilterValue> {
    let mut values: Vec<FilterValue> = excluded.iter().cloned().collect();
    values.sort_by(|a, b| a.sort_cmp(b));
    values
}
