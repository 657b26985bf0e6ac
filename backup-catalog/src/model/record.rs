//! Per-application record: identity, install locations and backup state.

use std::fmt;
use tracing::{debug, warn};

use super::mode::BackupMode;
use super::sizes::StorageStats;
use crate::history::BackupLog;

/// Distinguishes regular package backups from special ones.
///
/// Special backups cover a fixed list of single files rather than an
/// installed package.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordKind {
    #[default]
    Standard,
    Special { files: Vec<String> },
}

/// One application as seen by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRecord {
    package_name: String,
    label: String,
    version_name: String,
    version_code: i64,

    source_dir: String,
    split_source_dirs: Option<Vec<String>>,
    data_dir: String,
    device_protected_data_dir: String,

    system: bool,
    installed: bool,

    backup_mode: BackupMode,

    app_size: u64,
    data_size: u64,
    cache_size: u64,

    // Owned by the presenting UI
    checked: bool,
    disabled: bool,

    log: Option<BackupLog>,
    kind: RecordKind,
}

/// Identity and location fields supplied by the enumeration pass.
#[derive(Debug, Clone, Default)]
pub struct AppIdentity {
    pub package_name: String,
    pub label: String,
    pub version_name: String,
    pub version_code: i64,
    pub source_dir: String,
    pub split_source_dirs: Option<Vec<String>>,
    pub data_dir: String,
    pub device_protected_data_dir: String,
    pub system: bool,
    pub installed: bool,
}

impl AppRecord {
    /// Create a record with no backup state yet
    pub fn new(identity: AppIdentity) -> Self {
        Self {
            package_name: identity.package_name,
            label: identity.label,
            version_name: identity.version_name,
            version_code: identity.version_code,
            source_dir: identity.source_dir,
            split_source_dirs: identity.split_source_dirs,
            data_dir: identity.data_dir,
            device_protected_data_dir: identity.device_protected_data_dir,
            system: identity.system,
            installed: identity.installed,
            backup_mode: BackupMode::UNSET,
            app_size: 0,
            data_size: 0,
            cache_size: 0,
            checked: false,
            disabled: false,
            log: None,
            kind: RecordKind::Standard,
        }
    }

    /// Create a record for an application only known from its backup.
    pub fn from_log(log: BackupLog) -> Self {
        let split_source_dirs = if log.split_source_dirs.is_empty() {
            None
        } else {
            Some(log.split_source_dirs.clone())
        };
        let mut record = Self::new(AppIdentity {
            package_name: log.package_name.clone(),
            label: log.label.clone(),
            version_name: log.version_name.clone(),
            version_code: log.version_code,
            source_dir: log.source_dir.clone(),
            split_source_dirs,
            data_dir: log.data_dir.clone(),
            device_protected_data_dir: log.device_protected_data_dir.clone(),
            system: log.system,
            installed: false,
        });
        record.attach_log(log);
        record
    }

    pub fn with_kind(mut self, kind: RecordKind) -> Self {
        self.kind = kind;
        self
    }

    /// Merge `candidate` into the stored mode.
    pub fn set_backup_mode(&mut self, candidate: BackupMode) {
        let merged = self.backup_mode | candidate;
        if merged != self.backup_mode {
            debug!(
                "{}: backup mode {} -> {}",
                self.package_name, self.backup_mode, merged
            );
        }
        self.backup_mode = merged;
    }

    /// Record sizes from a storage report. Data size excludes the cache.
    pub fn add_sizes(&mut self, report: &impl StorageStats) {
        self.app_size = report.app_bytes();
        self.cache_size = report.cache_bytes();

        let total_data = report.data_bytes();
        if self.cache_size > total_data {
            warn!(
                "{}: cache size {} exceeds data size {}, clamping data size to 0",
                self.package_name, self.cache_size, total_data
            );
        }
        self.data_size = total_data.saturating_sub(self.cache_size);
    }

    /// Attach a prior backup's log. Its mode replaces the stored one.
    pub fn attach_log(&mut self, log: BackupLog) {
        debug!(
            "{}: attaching log from {} (mode {})",
            self.package_name, log.backup_time, log.backup_mode
        );
        self.backup_mode = log.backup_mode;
        self.log = Some(log);
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn version_name(&self) -> &str {
        &self.version_name
    }

    pub fn version_code(&self) -> i64 {
        self.version_code
    }

    pub fn source_dir(&self) -> &str {
        &self.source_dir
    }

    pub fn split_source_dirs(&self) -> Option<&[String]> {
        self.split_source_dirs.as_deref()
    }

    pub fn data_dir(&self) -> &str {
        &self.data_dir
    }

    pub fn device_protected_data_dir(&self) -> &str {
        &self.device_protected_data_dir
    }

    pub fn backup_mode(&self) -> BackupMode {
        self.backup_mode
    }

    pub fn app_size(&self) -> u64 {
        self.app_size
    }

    pub fn data_size(&self) -> u64 {
        self.data_size
    }

    pub fn cache_size(&self) -> u64 {
        self.cache_size
    }

    pub fn log(&self) -> Option<&BackupLog> {
        self.log.as_ref()
    }

    pub fn kind(&self) -> &RecordKind {
        &self.kind
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_system(&self) -> bool {
        self.system
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn is_split(&self) -> bool {
        self.split_source_dirs
            .as_ref()
            .map(|dirs| !dirs.is_empty())
            .unwrap_or(false)
    }

    pub fn is_special(&self) -> bool {
        matches!(self.kind, RecordKind::Special { .. })
    }

    /// Single files covered by a special backup; empty for regular packages.
    pub fn files_list(&self) -> &[String] {
        match &self.kind {
            RecordKind::Standard => &[],
            RecordKind::Special { files } => files,
        }
    }

    /// The installed version is newer than the one last backed up, or there
    /// is no backup at all.
    pub fn is_new_or_updated(&self) -> bool {
        match &self.log {
            None => true,
            Some(log) => self.installed && self.version_code > log.version_code,
        }
    }

    /// Restore every field at once. Used by the wire decoder.
    pub(crate) fn from_parts(
        identity: AppIdentity,
        backup_mode: BackupMode,
        sizes: (u64, u64, u64),
        checked: bool,
        disabled: bool,
        log: Option<BackupLog>,
        kind: RecordKind,
    ) -> Self {
        let (app_size, data_size, cache_size) = sizes;
        let mut record = Self::new(identity);
        record.backup_mode = backup_mode;
        record.app_size = app_size;
        record.data_size = data_size;
        record.cache_size = cache_size;
        record.checked = checked;
        record.disabled = disabled;
        record.log = log;
        record.kind = kind;
        record
    }
}

impl fmt::Display for AppRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.package_name, self.label)
    }
}
