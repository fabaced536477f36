//! Grid Filter - Excel-style per-column filters for tabular grids
//!
//! This library provides the engine behind a grid column's filter popup:
//!
//! - Building the distinct candidate values of a column, with null and empty folded into one
//!   blank entry
//! - Flat checkbox lists, and year/month/day (or duration) trees with tri-state checkboxes
//! - Searching within the popup
//! - Committing popup state into per-column excluded values and AND-combining every active
//!   column filter into the grid's single filter predicate
//! - Presets and localization of the popup's fixed strings
//!
//! # Example
//!
//! ```
//! use grid_filter::{FieldType, FilterConfig, FilterGrid, FilterValue, GridColumn, GridView, JsonRow};
//! use grid_filter::grid::GridHost;
//!
//! let rows: Vec<JsonRow> = serde_json::from_str(r#"[{"name":"A"},{"name":"B"},{"name":"A"}]"#)?;
//! let view = GridView::new(rows, vec![GridColumn::new("name", FieldType::Text)]);
//! let mut grid = FilterGrid::new(view, FilterConfig::default());
//!
//! grid.open_popup("name")?;
//! let b = grid.popup().and_then(|p| p.find_item(&FilterValue::text("B"))).unwrap();
//! grid.set_item_checked(b, false)?;
//! grid.apply()?;
//!
//! assert_eq!(grid.grid().visible_indices(), &[0, 2]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod candidates;
pub mod cli;
pub mod config;
pub mod error;
pub mod filters;
pub mod grid;
pub mod localization;
pub mod logging;
pub mod models;
pub mod popup;
pub mod presets;
pub mod tree;
pub mod utils;

// Re-export commonly used types
pub use config::FilterConfig;
pub use error::FilterError;
pub use filters::{FilterRegistry, Predicate};
pub use grid::{FilterGrid, GridColumn, GridHost, GridView};
pub use localization::{Tag, Translator};
pub use models::{FieldType, FilterDescriptor, FilterValue, JsonRow, PopupItem, Record};
pub use popup::{Popup, SearchMode};
pub use presets::PresetEntry;
pub use tree::{DateTree, NodeId};
