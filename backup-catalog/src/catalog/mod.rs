//! Catalog assembly from an inventory of installed apps and backup logs.

pub mod bundle;
pub mod format;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::history::BackupLog;
use crate::model::{AppIdentity, AppRecord, RawSizeReport};
use crate::Result;

/// One entry of an installed-apps inventory file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    pub package_name: String,
    pub label: String,
    pub version_name: String,
    pub version_code: i64,
    pub source_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_source_dirs: Option<Vec<String>>,
    pub data_dir: String,
    pub device_protected_data_dir: String,
    #[serde(default)]
    pub system: bool,

    /// Storage report, if the platform produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<RawSizeReport>,
}

impl InstalledApp {
    fn into_record(self) -> AppRecord {
        let sizes = self.sizes;
        let mut record = AppRecord::new(AppIdentity {
            package_name: self.package_name,
            label: self.label,
            version_name: self.version_name,
            version_code: self.version_code,
            source_dir: self.source_dir,
            split_source_dirs: self.split_source_dirs,
            data_dir: self.data_dir,
            device_protected_data_dir: self.device_protected_data_dir,
            system: self.system,
            installed: true,
        });
        if let Some(sizes) = sizes {
            record.add_sizes(&sizes);
        }
        record
    }
}

/// Read an inventory file (JSON array of [`InstalledApp`])
pub fn load_inventory(path: &Path) -> Result<Vec<InstalledApp>> {
    let content = std::fs::read_to_string(path)?;
    let apps: Vec<InstalledApp> = serde_json::from_str(&content)?;
    info!("Loaded {} installed app(s) from {}", apps.len(), path.display());
    Ok(apps)
}

/// Build the catalog: one record per installed app with its log attached,
/// plus a not-installed record for every log without an installed app.
/// The result is ordered by package name.
pub fn build_catalog(
    inventory: Vec<InstalledApp>,
    mut logs: HashMap<String, BackupLog>,
) -> Vec<AppRecord> {
    let mut records: Vec<AppRecord> = inventory
        .into_iter()
        .map(|app| {
            let mut record = app.into_record();
            if let Some(log) = logs.remove(record.package_name()) {
                record.attach_log(log);
            }
            record
        })
        .collect();

    let orphaned = logs.len();
    records.extend(logs.into_values().map(AppRecord::from_log));
    records.sort_by(|a, b| a.package_name().cmp(b.package_name()));

    info!(
        "Catalog has {} record(s), {} only known from backups",
        records.len(),
        orphaned
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::sample_log;
    use crate::model::BackupMode;
    use tempfile::TempDir;

    fn installed(package: &str) -> InstalledApp {
        InstalledApp {
            package_name: package.to_string(),
            label: package.to_uppercase(),
            version_name: "1.0".to_string(),
            version_code: 10,
            source_dir: format!("/data/app/{}/base.apk", package),
            split_source_dirs: None,
            data_dir: format!("/data/user/0/{}", package),
            device_protected_data_dir: format!("/data/user_de/0/{}", package),
            system: false,
            sizes: Some(RawSizeReport {
                app_bytes: 100,
                cache_bytes: 30,
                data_bytes: 80,
            }),
        }
    }

    #[test]
    fn test_build_catalog_attaches_logs() {
        let mut logs = HashMap::new();
        logs.insert(
            "org.b".to_string(),
            sample_log("org.b", BackupMode::DATA, 1_000),
        );
        logs.insert(
            "org.gone".to_string(),
            sample_log("org.gone", BackupMode::BOTH, 2_000),
        );

        let records = build_catalog(vec![installed("org.b"), installed("org.a")], logs);
        let packages: Vec<&str> = records.iter().map(|r| r.package_name()).collect();
        assert_eq!(packages, vec!["org.a", "org.b", "org.gone"]);

        assert_eq!(records[0].backup_mode(), BackupMode::UNSET);
        assert_eq!(records[0].data_size(), 50);
        assert_eq!(records[1].backup_mode(), BackupMode::DATA);
        assert!(records[1].is_installed());
        assert!(!records[2].is_installed());
        assert_eq!(records[2].backup_mode(), BackupMode::BOTH);
    }

    #[test]
    fn test_load_inventory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("apps.json");
        std::fs::write(
            &path,
            r#"[
                {
                    "packageName": "org.example.maps",
                    "label": "Maps",
                    "versionName": "11.2",
                    "versionCode": 1102,
                    "sourceDir": "/data/app/maps/base.apk",
                    "splitSourceDirs": ["split_config.en.apk"],
                    "dataDir": "/data/user/0/org.example.maps",
                    "deviceProtectedDataDir": "/data/user_de/0/org.example.maps",
                    "sizes": { "appBytes": 5, "cacheBytes": 1, "dataBytes": 4 }
                }
            ]"#,
        )?;

        let apps = load_inventory(&path)?;
        assert_eq!(apps.len(), 1);
        assert!(!apps[0].system);

        let records = build_catalog(apps, HashMap::new());
        assert!(records[0].is_split());
        assert_eq!(records[0].data_size(), 3);
        Ok(())
    }
}
