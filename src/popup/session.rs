//! Lifecycle of the one popup a grid can have open.
//!
//! ```text
//! Idle -> Loading -> PopupOpen -> Applying   -> Idle
//!                              -> Cancelling -> Idle
//! ```
//!
//! Candidate building runs on the rayon pool and reports back over a channel; the owner
//! polls for it from its own thread. Any new open, apply or cancel request while another is
//! in flight is rejected with [`FilterError::Busy`].

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use tracing::{debug, warn};

use super::labels::ValueLabeler;
use super::view::Popup;
use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::models::{FilterDescriptor, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    PopupOpen,
    Applying,
    Cancelling,
}

/// Inputs for building a popup off the calling thread
pub struct PopupJob<R> {
    pub rows: Arc<Vec<R>>,
    pub visible: Vec<usize>,
    pub descriptor: FilterDescriptor,
    pub merge_excluded: bool,
    pub config: FilterConfig,
    pub labeler: ValueLabeler,
}

impl<R: Record> PopupJob<R> {
    pub fn run(self) -> Popup {
        Popup::build(
            &self.rows,
            &self.visible,
            &self.descriptor,
            self.merge_excluded,
            &self.config,
            self.labeler,
        )
    }
}

#[derive(Debug)]
pub struct FilterSession {
    state: SessionState,
    field_name: Option<String>,
    popup: Option<Popup>,
    pending: Option<Receiver<Popup>>,
}

impl FilterSession {
    pub fn new() -> Self {
        Self { state: SessionState::Idle, field_name: None, popup: None, pending: None }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    /// Column the current popup belongs to, while one is loading or open
    pub fn field_name(&self) -> Option<&str> {
        self.field_name.as_deref()
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn popup_mut(&mut self) -> Result<&mut Popup, FilterError> {
        match self.state {
            SessionState::PopupOpen => self.popup.as_mut().ok_or(FilterError::NoPopup),
            _ => Err(FilterError::NoPopup),
        }
    }

    fn busy(&self) -> FilterError {
        FilterError::Busy(self.field_name.clone().unwrap_or_default())
    }

    /// Build the popup on the rayon pool
    pub fn start_loading<R: Record>(&mut self, job: PopupJob<R>) -> Result<(), FilterError> {
        if !self.is_idle() {
            return Err(self.busy());
        }

        let (tx, rx) = mpsc::channel();
        let field_name = job.descriptor.field_name.clone();
        debug!(field = %field_name, rows = job.visible.len(), "loading filter popup");
        rayon::spawn(move || {
            // The receiver is gone when the open was cancelled
            let _ = tx.send(job.run());
        });

        self.state = SessionState::Loading;
        self.field_name = Some(field_name);
        self.pending = Some(rx);
        Ok(())
    }

    /// Check whether the background build finished; true once the popup is open
    pub fn poll(&mut self) -> Result<bool, FilterError> {
        if self.state != SessionState::Loading {
            return Ok(self.state == SessionState::PopupOpen);
        }
        let Some(rx) = &self.pending else {
            return Err(self.fail_loading());
        };

        match rx.try_recv() {
            Ok(popup) => {
                self.open(popup);
                Ok(true)
            }
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => Err(self.fail_loading()),
        }
    }

    /// Block until the background build finished
    pub fn wait(&mut self) -> Result<(), FilterError> {
        if self.state != SessionState::Loading {
            return match self.state {
                SessionState::PopupOpen => Ok(()),
                _ => Err(FilterError::NoPopup),
            };
        }
        let received = self.pending.as_ref().map(Receiver::recv);

        match received {
            Some(Ok(popup)) => {
                self.open(popup);
                Ok(())
            }
            _ => Err(self.fail_loading()),
        }
    }

    fn open(&mut self, popup: Popup) {
        debug!(field = popup.field_name(), items = popup.items().len(), "filter popup open");
        self.pending = None;
        self.popup = Some(popup);
        self.state = SessionState::PopupOpen;
    }

    fn fail_loading(&mut self) -> FilterError {
        warn!(field = ?self.field_name, "popup worker exited without a result");
        self.reset();
        FilterError::WorkerDisconnected
    }

    /// Open a popup that was built synchronously
    pub fn open_built(&mut self, popup: Popup) -> Result<(), FilterError> {
        if !self.is_idle() {
            return Err(self.busy());
        }
        self.field_name = Some(popup.field_name().to_string());
        self.open(popup);
        Ok(())
    }

    /// Hand the open popup over for committing. [`FilterSession::finish`] returns to idle.
    pub fn begin_apply(&mut self) -> Result<Popup, FilterError> {
        match self.state {
            SessionState::PopupOpen => {}
            SessionState::Idle => return Err(FilterError::NoPopup),
            _ => return Err(self.busy()),
        }
        let popup = self.popup.take().ok_or(FilterError::NoPopup)?;
        self.state = SessionState::Applying;
        Ok(popup)
    }

    pub fn finish(&mut self) {
        self.reset();
    }

    /// Close without committing. Returns whether anything was loading or open.
    pub fn cancel(&mut self) -> Result<bool, FilterError> {
        match self.state {
            SessionState::Idle => Ok(false),
            SessionState::Loading | SessionState::PopupOpen => {
                self.state = SessionState::Cancelling;
                debug!(field = ?self.field_name, "filter popup cancelled");
                self.reset();
                Ok(true)
            }
            SessionState::Applying | SessionState::Cancelling => Err(self.busy()),
        }
    }

    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.field_name = None;
        self.popup = None;
        self.pending = None;
    }
}

impl Default for FilterSession {
    fn default() -> Self {
        Self::new()
    }
}
