pub mod environment;
pub mod files;
pub mod terminal;

pub use environment::{get_config_dir, get_presets_dir};
pub use files::{read_json_file, validate_file_size, write_json_atomic};
pub use terminal::sanitize_label;
