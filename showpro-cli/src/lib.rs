pub mod app;
pub mod logging;
pub mod prefs;
pub mod utils;
