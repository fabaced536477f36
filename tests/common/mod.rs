//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDateTime, TimeDelta};
use grid_filter::models::Accessor;
use grid_filter::{FieldType, FilterConfig, FilterGrid, FilterValue, GridColumn, GridView, Record};
use serde_json::Value;
use tempfile::TempDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Open,
    Shipped,
    Closed,
}

impl Status {
    fn name(self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::Shipped => "Shipped",
            Status::Closed => "Closed",
        }
    }
}

/// Typed row used by most integration tests
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub customer: Option<String>,
    pub status: Status,
    pub placed: Option<NaiveDateTime>,
    pub amount: f64,
    pub paid: bool,
    pub handling: TimeDelta,
}

impl Record for Order {
    fn accessor(field_name: &str, _field_type: FieldType) -> Option<Accessor<Self>> {
        let accessor: Accessor<Self> = match field_name {
            "id" => Arc::new(|o: &Order| FilterValue::Integer(o.id)),
            "customer" => Arc::new(|o: &Order| {
                o.customer.clone().map(FilterValue::Text).unwrap_or(FilterValue::Blank)
            }),
            "status" => Arc::new(|o: &Order| FilterValue::Enum(o.status.name().to_string())),
            "placed" => {
                Arc::new(|o: &Order| o.placed.map(FilterValue::DateTime).unwrap_or(FilterValue::Blank))
            }
            "amount" => Arc::new(|o: &Order| FilterValue::real(o.amount)),
            "paid" => Arc::new(|o: &Order| FilterValue::Bool(o.paid)),
            "handling" => Arc::new(|o: &Order| FilterValue::Duration(o.handling)),
            _ => return None,
        };
        Some(accessor)
    }
}

/// Builder for test orders with sensible defaults
pub struct OrderBuilder {
    order: Order,
}

impl OrderBuilder {
    pub fn new(id: i64) -> Self {
        Self {
            order: Order {
                id,
                customer: Some(format!("Customer {}", id)),
                status: Status::Open,
                placed: Some(date_time("2023-01-01T09:00:00")),
                amount: 10.0,
                paid: false,
                handling: TimeDelta::minutes(30),
            },
        }
    }

    pub fn customer(mut self, customer: Option<&str>) -> Self {
        self.order.customer = customer.map(str::to_string);
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.order.status = status;
        self
    }

    pub fn placed(mut self, placed: &str) -> Self {
        self.order.placed = Some(date_time(placed));
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.order.amount = amount;
        self
    }

    pub fn paid(mut self, paid: bool) -> Self {
        self.order.paid = paid;
        self
    }

    pub fn handling(mut self, handling: TimeDelta) -> Self {
        self.order.handling = handling;
        self
    }

    pub fn build(self) -> Order {
        self.order
    }
}

pub fn date_time(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").expect("Invalid test date")
}

/// Midnight of the given day, the granularity date filters work at
pub fn day(text: &str) -> FilterValue {
    FilterValue::DateTime(date_time(&format!("{}T00:00:00", text)))
}

pub fn order_columns() -> Vec<GridColumn> {
    vec![
        GridColumn::new("id", FieldType::Integer),
        GridColumn::new("customer", FieldType::Text),
        GridColumn::new("status", FieldType::Enum),
        GridColumn::new("placed", FieldType::DateTime),
        GridColumn::new("amount", FieldType::Real),
        GridColumn::new("paid", FieldType::Boolean),
        GridColumn::new("handling", FieldType::Duration),
    ]
}

pub fn order_grid(orders: Vec<Order>) -> FilterGrid<Order> {
    FilterGrid::new(GridView::new(orders, order_columns()), FilterConfig::default())
}

/// Ids of the rows the grid currently shows
pub fn visible_ids(grid: &FilterGrid<Order>) -> Vec<i64> {
    grid.grid().visible_rows().map(|o| o.id).collect()
}

/// Open a column, uncheck the given values and apply
pub fn exclude(grid: &mut FilterGrid<Order>, field: &str, values: &[FilterValue]) {
    assert!(grid.open_popup(field).expect("Failed to open popup"));
    for value in values {
        let idx = grid
            .popup()
            .and_then(|p| p.find_item(value))
            .unwrap_or_else(|| panic!("{:?} is not a candidate of {}", value, field));
        grid.set_item_checked(idx, false).expect("Failed to uncheck item");
    }
    grid.apply().expect("Failed to apply");
}

/// Temp directory holding JSON rows and preset files for CLI tests
pub struct FixtureDir {
    temp_dir: TempDir,
}

impl FixtureDir {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a JSON value to a file in the fixture directory
    pub fn write_json(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let content = serde_json::to_string_pretty(value).expect("Failed to serialize fixture");
        fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    pub fn write_raw(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content).expect("Failed to write fixture");
        path
    }
}
