//! Column filter controller.
//!
//! [`FilterGrid`] ties a host grid to the filter registry and the popup session. Each
//! operation here is one user gesture on a column header popup: open it, toggle rows or
//! tree nodes, type a search, apply or cancel. Registry state and the grid's filter slot are
//! only written from the calling thread, after any background candidate build completed.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::{GridHost, GridView};
use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::filters::FilterRegistry;
use crate::localization::{EnglishTranslator, Translator};
use crate::models::Record;
use crate::popup::{FilterSession, Popup, PopupJob, ValueLabeler};
use crate::presets::PresetEntry;
use crate::tree::NodeId;

pub struct FilterGrid<R, G = GridView<R>> {
    grid: G,
    registry: FilterRegistry<R>,
    session: FilterSession,
    config: FilterConfig,
    labeler: ValueLabeler,
}

impl<R: Record, G: GridHost<R>> FilterGrid<R, G> {
    pub fn new(grid: G, config: FilterConfig) -> Self {
        Self::with_translator(grid, config, Arc::new(EnglishTranslator))
    }

    pub fn with_translator(grid: G, config: FilterConfig, translator: Arc<dyn Translator>) -> Self {
        let labeler = ValueLabeler::new(&config, translator);
        Self {
            grid,
            registry: FilterRegistry::new(),
            session: FilterSession::new(),
            config,
            labeler,
        }
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    pub fn registry(&self) -> &FilterRegistry<R> {
        &self.registry
    }

    pub fn session(&self) -> &FilterSession {
        &self.session
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.session.popup()
    }

    /// Open a column's popup, building it on the calling thread.
    ///
    /// Returns `Ok(false)` when the grid has no such column.
    pub fn open_popup(&mut self, field_name: &str) -> Result<bool, FilterError> {
        let Some(job) = self.prepare_job(field_name)? else {
            return Ok(false);
        };
        self.session.open_built(job.run())?;
        Ok(true)
    }

    /// Start opening a column's popup on the rayon pool; follow with
    /// [`FilterGrid::poll_open`] or [`FilterGrid::wait_open`].
    pub fn begin_open(&mut self, field_name: &str) -> Result<bool, FilterError> {
        let Some(job) = self.prepare_job(field_name)? else {
            return Ok(false);
        };
        self.session.start_loading(job)?;
        Ok(true)
    }

    pub fn poll_open(&mut self) -> Result<bool, FilterError> {
        self.session.poll()
    }

    pub fn wait_open(&mut self) -> Result<(), FilterError> {
        self.session.wait()
    }

    fn prepare_job(&mut self, field_name: &str) -> Result<Option<PopupJob<R>>, FilterError> {
        self.ensure_idle()?;

        let Some(column) = self.grid.column(field_name) else {
            warn!(field = field_name, "show filter aborted: grid has no such column");
            return Ok(None);
        };
        let field_type = column.field_type;

        let merge_excluded = self.registry.last_touched() == Some(field_name);
        let descriptor = self.registry.get_or_create(field_name, field_type).clone();

        Ok(Some(PopupJob {
            rows: Arc::clone(self.grid.rows()),
            visible: self.grid.visible_indices().to_vec(),
            descriptor,
            merge_excluded,
            config: self.config.clone(),
            labeler: self.labeler.clone(),
        }))
    }

    fn ensure_idle(&self) -> Result<(), FilterError> {
        if self.session.is_idle() {
            return Ok(());
        }
        Err(FilterError::Busy(self.session.field_name().unwrap_or_default().to_string()))
    }

    pub fn set_item_checked(&mut self, idx: usize, checked: bool) -> Result<(), FilterError> {
        self.session.popup_mut()?.set_item_checked(idx, checked)
    }

    pub fn set_node_checked(&mut self, node: NodeId, value: Option<bool>) -> Result<(), FilterError> {
        self.session.popup_mut()?.set_node_checked(node, value)
    }

    pub fn set_search_text(&mut self, text: &str) -> Result<(), FilterError> {
        self.session.popup_mut()?.set_search_text(text);
        Ok(())
    }

    pub fn toggle_search_mode(&mut self) -> Result<(), FilterError> {
        self.session.popup_mut()?.toggle_search_mode();
        Ok(())
    }

    /// Commit the open popup into its column's filter and re-filter the grid.
    ///
    /// Returns how many excluded values were added or removed. A column left with nothing
    /// excluded stops filtering.
    pub fn apply(&mut self) -> Result<usize, FilterError> {
        let popup = self.session.begin_apply()?;
        let result = self.commit(&popup);
        self.session.finish();

        result.inspect_err(|err| error!(field = popup.field_name(), %err, "apply failed"))
    }

    fn commit(&mut self, popup: &Popup) -> Result<usize, FilterError> {
        let field_name = popup.field_name();
        let descriptor = self.registry.get_or_create(field_name, popup.field_type());
        let touched = popup.commit(&mut descriptor.excluded);

        if descriptor.excluded.is_empty() {
            self.registry.remove_filter(field_name);
        } else {
            self.registry.replace_filter(field_name)?;
        }
        self.install_filter();
        Ok(touched)
    }

    /// Close the popup, or abandon a background open, without touching any filter
    pub fn cancel(&mut self) -> Result<bool, FilterError> {
        self.session.cancel()
    }

    /// Clear one column's filter: its excluded values are forgotten too
    pub fn remove_filter(&mut self, field_name: &str) -> Result<bool, FilterError> {
        self.ensure_idle()?;

        if let Some(descriptor) = self.registry.descriptor_mut(field_name) {
            descriptor.excluded.clear();
        }
        let removed = self.registry.remove_filter(field_name);
        self.install_filter();
        Ok(removed)
    }

    pub fn remove_all(&mut self) -> Result<(), FilterError> {
        self.ensure_idle()?;
        self.registry.remove_all();
        self.install_filter();
        Ok(())
    }

    /// Active filters in activation order, ready to save as a preset
    pub fn snapshot(&self) -> Vec<PresetEntry> {
        self.registry.active_filters().map(PresetEntry::from_descriptor).collect()
    }

    /// Replace every filter with a saved preset. Entries naming a column the grid does not
    /// have are skipped. Returns the number of filters restored.
    pub fn restore(&mut self, entries: &[PresetEntry]) -> Result<usize, FilterError> {
        self.ensure_idle()?;
        self.registry.remove_all();

        let mut restored = 0;
        for entry in entries {
            if self.grid.column(&entry.field_name).is_none() {
                warn!(field = %entry.field_name, "preset names an unknown column, skipped");
                continue;
            }
            let excluded = entry.excluded_set();
            if excluded.is_empty() {
                continue;
            }
            let descriptor = self.registry.get_or_create(&entry.field_name, entry.field_type);
            descriptor.excluded = excluded;
            if self.registry.add_filter(&entry.field_name)? {
                restored += 1;
            }
        }

        self.install_filter();
        info!(restored, skipped = entries.len() - restored, "preset restored");
        Ok(restored)
    }

    /// Host hook: the grid's source collection was swapped. Filters do not survive it.
    pub fn on_source_replaced(&mut self) {
        if let Ok(true) = self.session.cancel() {
            warn!("source replaced while a filter popup was open");
        }
        self.registry = FilterRegistry::new();
        self.install_filter();
    }

    /// Host hook: columns were (re)generated; carry filter flags over to them
    pub fn on_columns_generated(&mut self) {
        self.sync_column_flags();
    }

    /// Footer of the open popup
    pub fn status_line(&self) -> Option<String> {
        self.popup().map(|popup| popup.status_line(self.config.show_elapsed_time))
    }

    fn install_filter(&mut self) {
        self.grid.set_filter(self.registry.combine());
        self.grid.refresh();
        self.sync_column_flags();
    }

    fn sync_column_flags(&mut self) {
        for column in self.grid.columns_mut() {
            column.is_filtered = self.registry.is_active(&column.field_name);
        }
    }
}

impl<R: Record> FilterGrid<R, GridView<R>> {
    /// Swap the rows of an in-memory grid and reset its filters
    pub fn replace_rows(&mut self, rows: Vec<R>) {
        self.grid.replace_rows(rows);
        self.on_source_replaced();
    }
}
