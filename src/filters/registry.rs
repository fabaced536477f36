//! Active filter registry.
//!
//! Holds every descriptor opened during the grid session, the ordered list of those that are
//! currently filtering, and one compiled predicate per active column. The grid's single filter
//! slot receives [`FilterRegistry::combine`], the short-circuiting AND of all of them.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::FilterError;
use crate::models::{FieldType, FilterDescriptor, Record, resolve_accessor};

/// Row predicate installed in the grid's filter slot
pub type Predicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

pub struct FilterRegistry<R> {
    /// Every descriptor created this session, in creation order
    descriptors: Vec<FilterDescriptor>,
    /// Field names of active filters, in activation order
    active: Vec<String>,
    predicates: HashMap<String, Predicate<R>>,
    last_touched: Option<String>,
}

impl<R: Record> FilterRegistry<R> {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            active: Vec::new(),
            predicates: HashMap::new(),
            last_touched: None,
        }
    }

    /// Existing descriptor for the field, active or not, or a new empty one
    pub fn get_or_create(&mut self, field_name: &str, field_type: FieldType) -> &mut FilterDescriptor {
        let position = match self.descriptors.iter().position(|d| d.field_name == field_name) {
            Some(position) => position,
            None => {
                debug!(field = field_name, %field_type, "creating filter descriptor");
                self.descriptors.push(FilterDescriptor::new(field_name, field_type));
                self.descriptors.len() - 1
            }
        };
        &mut self.descriptors[position]
    }

    pub fn descriptor(&self, field_name: &str) -> Option<&FilterDescriptor> {
        self.descriptors.iter().find(|d| d.field_name == field_name)
    }

    pub fn descriptor_mut(&mut self, field_name: &str) -> Option<&mut FilterDescriptor> {
        self.descriptors.iter_mut().find(|d| d.field_name == field_name)
    }

    /// Activate a descriptor's filter.
    ///
    /// Returns `Ok(false)` without touching anything if it is already active.
    pub fn add_filter(&mut self, field_name: &str) -> Result<bool, FilterError> {
        if self.predicates.contains_key(field_name) {
            return Ok(false);
        }
        let predicate = self.compile(field_name)?;
        self.install(field_name, predicate);
        Ok(true)
    }

    /// Recompile an active filter after its excluded values changed, or activate it
    pub fn replace_filter(&mut self, field_name: &str) -> Result<(), FilterError> {
        let predicate = self.compile(field_name)?;
        self.install(field_name, predicate);
        Ok(())
    }

    /// Deactivate a filter. The descriptor and its excluded values are retained.
    pub fn remove_filter(&mut self, field_name: &str) -> bool {
        let removed = self.predicates.remove(field_name).is_some();
        self.active.retain(|name| name != field_name);
        if let Some(descriptor) = self.descriptor_mut(field_name) {
            descriptor.is_filtered = false;
        }
        // The most recent remaining filter becomes the last one touched
        if self.last_touched.as_deref() == Some(field_name) {
            self.last_touched = self.active.last().cloned();
        }
        if removed {
            info!(field = field_name, "filter removed");
        }
        removed
    }

    /// Drop every filter and every retained descriptor
    pub fn remove_all(&mut self) {
        self.predicates.clear();
        self.active.clear();
        self.descriptors.clear();
        self.last_touched = None;
        info!("all filters removed");
    }

    /// Logical AND over all active predicates; always true when nothing is active
    pub fn combine(&self) -> Predicate<R> {
        let predicates: Vec<Predicate<R>> =
            self.active.iter().filter_map(|name| self.predicates.get(name).cloned()).collect();

        if predicates.is_empty() {
            return Arc::new(|_: &R| true);
        }
        Arc::new(move |row: &R| predicates.iter().all(|predicate| predicate(row)))
    }

    pub fn is_active(&self, field_name: &str) -> bool {
        self.predicates.contains_key(field_name)
    }

    /// Active descriptors in activation order
    pub fn active_filters(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.active.iter().filter_map(|name| self.descriptor(name))
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Most recently committed column filter
    pub fn last_touched(&self) -> Option<&str> {
        self.last_touched.as_deref()
    }

    fn compile(&self, field_name: &str) -> Result<Predicate<R>, FilterError> {
        let descriptor = self
            .descriptor(field_name)
            .ok_or_else(|| FilterError::UnknownColumn(field_name.to_string()))?;

        let accessor = resolve_accessor::<R>(&descriptor.field_name, descriptor.field_type);
        let excluded = Arc::new(descriptor.excluded.clone());
        Ok(Arc::new(move |row: &R| !excluded.contains(&accessor(row))))
    }

    fn install(&mut self, field_name: &str, predicate: Predicate<R>) {
        self.predicates.insert(field_name.to_string(), predicate);
        if !self.active.iter().any(|name| name == field_name) {
            self.active.push(field_name.to_string());
        }
        if let Some(descriptor) = self.descriptor_mut(field_name) {
            descriptor.is_filtered = true;
            info!(field = field_name, excluded = descriptor.excluded.len(), "filter applied");
        }
        self.last_touched = Some(field_name.to_string());
    }
}

impl<R: Record> Default for FilterRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}
