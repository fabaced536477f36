//! Host grid collaborator.
//!
//! The filter engine never owns the grid. It reads rows and columns through [`GridHost`],
//! installs one combined predicate into the grid's filter slot and asks it to refresh.
//! [`GridView`] is an in-memory host used by the binary, the tests and the benches.

pub mod controller;
pub mod view;

use std::sync::Arc;

pub use controller::FilterGrid;
pub use view::GridView;

use crate::filters::Predicate;
use crate::models::FieldType;

/// A grid column as the filter engine sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridColumn {
    pub field_name: String,
    pub field_type: FieldType,
    pub header: String,
    /// Drives the column header's filter indicator
    pub is_filtered: bool,
}

impl GridColumn {
    pub fn new(field_name: impl Into<String>, field_type: FieldType) -> Self {
        let field_name = field_name.into();
        Self { header: field_name.clone(), field_name, field_type, is_filtered: false }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }
}

pub trait GridHost<R> {
    /// The full source collection, filtered or not
    fn rows(&self) -> &Arc<Vec<R>>;

    /// Indices into [`GridHost::rows`] currently passing the grid filter
    fn visible_indices(&self) -> &[usize];

    /// Replace the grid's single filter slot
    fn set_filter(&mut self, predicate: Predicate<R>);

    /// Re-evaluate the filter slot against the rows
    fn refresh(&mut self);

    fn columns(&self) -> &[GridColumn];

    fn columns_mut(&mut self) -> &mut [GridColumn];

    fn column(&self, field_name: &str) -> Option<&GridColumn> {
        self.columns().iter().find(|c| c.field_name == field_name)
    }

    fn column_mut(&mut self, field_name: &str) -> Option<&mut GridColumn> {
        self.columns_mut().iter_mut().find(|c| c.field_name == field_name)
    }
}
