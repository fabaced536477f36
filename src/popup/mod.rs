pub mod labels;
pub mod list;
pub mod search;
pub mod session;
pub mod view;

pub use labels::ValueLabeler;
pub use list::CheckList;
pub use search::{PopupSearch, SearchMode};
pub use session::{FilterSession, PopupJob, SessionState};
pub use view::Popup;
