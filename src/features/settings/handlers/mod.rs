pub mod settings_handler;

pub use settings_handler::{get_settings, list_settings, update_settings};
