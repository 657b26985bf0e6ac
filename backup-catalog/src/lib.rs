//! Backup Catalog Library
//!
//! Tracks installed applications together with what their last backup
//! covered (APK, data or both), and moves that catalog between processes
//! through a versioned binary encoding.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod history;
pub mod model;
pub mod prefs;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use model::{AppRecord, BackupMode};
pub use utils::errors::{CatalogError, CodecError, Result};
