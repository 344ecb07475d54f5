pub mod commands;
pub mod core;
pub mod data;
pub mod downloader;
pub mod notify;

// Re-export commonly used items for integration tests and external consumers
pub use crate::core::model::*;
pub use crate::data::*;
pub use crate::downloader::*;
