use std::sync::Arc;

use super::{GridColumn, GridHost};
use crate::filters::{Predicate, filter_rows};

/// In-memory grid: a row collection, its columns and one filter slot
pub struct GridView<R> {
    rows: Arc<Vec<R>>,
    columns: Vec<GridColumn>,
    filter: Option<Predicate<R>>,
    visible: Vec<usize>,
    parallel_threshold: usize,
}

impl<R: Send + Sync> GridView<R> {
    pub fn new(rows: Vec<R>, columns: Vec<GridColumn>) -> Self {
        let visible = (0..rows.len()).collect();
        Self { rows: Arc::new(rows), columns, filter: None, visible, parallel_threshold: 10_000 }
    }

    /// Row count from which refresh evaluates the filter on the rayon pool
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Swap the source collection. The current filter slot is kept and re-evaluated.
    pub fn replace_rows(&mut self, rows: Vec<R>) {
        self.rows = Arc::new(rows);
        self.refresh();
    }

    pub fn set_columns(&mut self, columns: Vec<GridColumn>) {
        self.columns = columns;
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &R> {
        self.visible.iter().filter_map(|&idx| self.rows.get(idx))
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R: Send + Sync> GridHost<R> for GridView<R> {
    fn rows(&self) -> &Arc<Vec<R>> {
        &self.rows
    }

    fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    fn set_filter(&mut self, predicate: Predicate<R>) {
        self.filter = Some(predicate);
    }

    fn refresh(&mut self) {
        self.visible = match &self.filter {
            Some(predicate) => filter_rows(&self.rows, predicate, self.parallel_threshold),
            None => (0..self.rows.len()).collect(),
        };
    }

    fn columns(&self) -> &[GridColumn] {
        &self.columns
    }

    fn columns_mut(&mut self) -> &mut [GridColumn] {
        &mut self.columns
    }
}
