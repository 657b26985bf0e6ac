//! Application records and their backup state.

pub mod mode;
pub mod record;
pub mod sizes;

pub use mode::BackupMode;
pub use record::{AppIdentity, AppRecord, RecordKind};
pub use sizes::{RawSizeReport, StorageStats};
