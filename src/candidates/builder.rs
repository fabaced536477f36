//! Distinct-value builder for filter popups.
//!
//! Opening a popup scans the rows currently visible in the grid, collects the distinct
//! values of one field, and derives each value's default checkbox state from the column's
//! excluded set. At 100k+ rows the scan and the sort dominate the cost of opening a popup,
//! so both switch to rayon above [`FilterConfig::parallel_sort_threshold`].

use std::collections::HashSet;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::debug;

use crate::config::FilterConfig;
use crate::localization::Tag;
use crate::models::{FilterDescriptor, FilterValue, PopupItem, Record, resolve_accessor};
use crate::popup::labels::ValueLabeler;

/// Distinct values of a field, sorted, with blanks folded into one flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    pub values: Vec<FilterValue>,
    /// Whether any null or empty value was seen
    pub has_blank: bool,
    pub elapsed: Duration,
}

impl Candidates {
    pub fn len(&self) -> usize {
        self.values.len() + usize::from(self.has_blank)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collect the candidate set of `descriptor`'s field over the visible rows.
///
/// With `merge_excluded` set (the column is the last filter committed), the column's
/// excluded values are added back, since that same filter is what removed them from the
/// visible rows. They show up unchecked instead of vanishing from the popup.
pub fn build_candidates<R: Record>(
    rows: &[R],
    visible: &[usize],
    descriptor: &FilterDescriptor,
    merge_excluded: bool,
    config: &FilterConfig,
) -> Candidates {
    let started = Instant::now();
    let accessor = resolve_accessor::<R>(&descriptor.field_name, descriptor.field_type);
    let parallel = visible.len() >= config.parallel_sort_threshold;

    let mut distinct: HashSet<FilterValue> = if parallel {
        visible
            .par_iter()
            .filter_map(|&idx| rows.get(idx))
            .fold(HashSet::new, |mut set, row| {
                set.insert(accessor(row));
                set
            })
            .reduce(HashSet::new, |mut left, right| {
                left.extend(right);
                left
            })
    } else {
        visible.iter().filter_map(|&idx| rows.get(idx)).map(|row| accessor(row)).collect()
    };

    if merge_excluded {
        distinct.extend(descriptor.excluded.iter().cloned());
    }

    let before = distinct.len();
    distinct.retain(|value| !value.is_blank());
    let has_blank = distinct.len() != before;

    let mut values: Vec<FilterValue> = distinct.into_iter().collect();
    if values.len() >= config.parallel_sort_threshold {
        values.par_sort_unstable_by(|a, b| a.sort_cmp(b));
    } else {
        values.sort_unstable_by(|a, b| a.sort_cmp(b));
    }

    let elapsed = started.elapsed();
    debug!(
        field = %descriptor.field_name,
        rows = visible.len(),
        distinct = values.len(),
        has_blank,
        parallel,
        elapsed_ms = elapsed.as_millis() as u64,
        "built filter candidates"
    );

    Candidates { values, has_blank, elapsed }
}

/// Popup rows for a candidate set: optional select-all, one row per value, blank last.
///
/// A value starts checked unless the column excludes it.
pub fn build_items(
    candidates: &Candidates,
    descriptor: &FilterDescriptor,
    labeler: &ValueLabeler,
) -> Vec<PopupItem> {
    let mut items = Vec::with_capacity(candidates.len() + 1);

    if descriptor.field_type.has_select_all() {
        items.push(PopupItem::select_all(labeler.translate(Tag::All)));
    }

    items.extend(candidates.values.iter().map(|value| {
        PopupItem::value(value.clone(), labeler.label(value), !descriptor.excludes(value))
    }));

    if candidates.has_blank {
        items.push(PopupItem::blank(labeler.translate(Tag::Empty), !descriptor.excludes_blank()));
    }

    items
}
