pub mod apply;
pub mod registry;

pub use apply::{commit_popup, filter_rows, sorted_excluded};
pub use registry::{FilterRegistry, Predicate};
