//! User preferences behind an injectable key-value store.

pub mod file;
pub mod memory;
pub mod sort_filter;

pub use file::TomlFileStore;
pub use memory::MemoryStore;
pub use sort_filter::{
    BackupFilter, FilterContext, InstallFilter, SortBy, SortFilterModel, SpecialFilter,
};

use crate::Result;

/// Key-value capability the catalog reads its preferences from.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&mut self, key: &str, value: &str) -> Result<()>;
}
