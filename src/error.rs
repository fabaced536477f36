use thiserror::Error;

/// Errors surfaced by the filter engine and popup session
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// A popup is open or a background extraction is still running
    #[error("a filter popup is already pending for column '{0}'")]
    Busy(String),

    #[error("no filter popup is open")]
    NoPopup,

    #[error("popup item {0} does not exist")]
    ItemOutOfRange(usize),

    #[error("tree node {0} does not exist")]
    NodeOutOfRange(usize),

    #[error("no filter descriptor for column '{0}'")]
    UnknownColumn(String),

    #[error("background candidate extraction stopped before producing a popup")]
    WorkerDisconnected,
}
