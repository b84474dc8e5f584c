pub mod app_storage;
pub mod collection;
pub mod settings;
