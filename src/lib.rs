pub mod app;
pub mod logging;
pub mod pets;
pub mod settings;
pub mod settings_store;
