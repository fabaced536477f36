//! Data model of the column filter engine.
//!
//! - [`FilterValue`] / [`FieldType`] - raw cell values and the column types they come from
//! - [`Record`] - how the engine reads a field off a row
//! - [`FilterDescriptor`] - per-column excluded values
//! - [`PopupItem`] - one checkbox row of a filter popup

pub mod descriptor;
pub mod popup;
pub mod record;
pub mod value;

pub use descriptor::FilterDescriptor;
pub use popup::{ItemKind, PopupItem};
pub use record::{Accessor, JsonRow, Record, resolve_accessor};
pub use value::{FieldType, FilterValue};
