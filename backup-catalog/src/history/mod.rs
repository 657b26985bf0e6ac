//! Backup history: log records written by previous backups.
//!
//! Every backup leaves a `<package>.log` JSON file next to its archives. The
//! log is authoritative for what the backup covered.

pub mod scan;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::BackupMode;
use crate::Result;

/// File extension of backup log files.
pub const LOG_EXTENSION: &str = "log";

/// Outcome of one backup operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupLog {
    pub package_name: String,
    pub label: String,
    pub version_name: String,
    pub version_code: i64,
    pub backup_mode: BackupMode,

    /// When the backup finished (millisecond precision)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub backup_time: DateTime<Utc>,

    pub source_dir: String,
    #[serde(default)]
    pub split_source_dirs: Vec<String>,
    pub data_dir: String,
    pub device_protected_data_dir: String,
    #[serde(default)]
    pub system: bool,

    /// Cipher used for the archives, if encrypted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cipher_type: Option<String>,
}

impl BackupLog {
    /// Load a log from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let log = serde_json::from_str(&content)?;
        Ok(log)
    }

    /// Write this log as pretty JSON
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// File name this log is stored under.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.package_name, LOG_EXTENSION)
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher_type.is_some()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    pub(crate) fn sample_log(package: &str, mode: BackupMode, millis: i64) -> BackupLog {
        BackupLog {
            package_name: package.to_string(),
            label: "Sample".to_string(),
            version_name: "1.2.0".to_string(),
            version_code: 120,
            backup_mode: mode,
            backup_time: Utc.timestamp_millis_opt(millis).unwrap(),
            source_dir: format!("/data/app/{}/base.apk", package),
            split_source_dirs: vec![],
            data_dir: format!("/data/user/0/{}", package),
            device_protected_data_dir: format!("/data/user_de/0/{}", package),
            system: false,
            cipher_type: None,
        }
    }

    #[test]
    fn test_log_file_roundtrip() -> Result<()> {
        let dir = TempDir::new()?;
        let mut log = sample_log("org.example.notes", BackupMode::BOTH, 1_700_000_000_123);
        log.cipher_type = Some("AES/GCM/NoPadding".to_string());

        let path = dir.path().join(log.file_name());
        log.write_to(&path)?;

        let loaded = BackupLog::from_file(&path)?;
        assert_eq!(loaded, log);
        assert!(loaded.is_encrypted());
        Ok(())
    }

    #[test]
    fn test_log_json_field_names() {
        let log = sample_log("org.example.notes", BackupMode::DATA, 0);
        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains("\"packageName\":\"org.example.notes\""));
        assert!(json.contains("\"backupMode\":2"));
        assert!(json.contains("\"backupTime\":0"));
        assert!(!json.contains("cipherType"));
    }

    #[test]
    fn test_log_rejects_invalid_mode() {
        let json = r#"{
            "packageName": "a", "label": "A", "versionName": "1", "versionCode": 1,
            "backupMode": 9, "backupTime": 0, "sourceDir": "", "dataDir": "",
            "deviceProtectedDataDir": ""
        }"#;
        assert!(serde_json::from_str::<BackupLog>(json).is_err());
    }
}
