//! Discovery of backup logs in a backup directory tree.

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use super::{BackupLog, LOG_EXTENSION};
use crate::Result;

fn is_log_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry
            .path()
            .extension()
            .map(|ext| ext == LOG_EXTENSION)
            .unwrap_or(false)
}

/// Walk `root` and collect the newest log per package.
///
/// Files that fail to parse and directories that cannot be read are skipped.
/// A missing root yields an empty map.
pub fn scan_logs(root: &Path) -> Result<HashMap<String, BackupLog>> {
    let mut logs: HashMap<String, BackupLog> = HashMap::new();

    if !root.exists() {
        warn!("Backup directory {} does not exist", root.display());
        return Ok(logs);
    }

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable path under {}: {}", root.display(), e);
                continue;
            }
        };
        if !is_log_file(&entry) {
            continue;
        }

        let log = match BackupLog::from_file(entry.path()) {
            Ok(log) => log,
            Err(e) => {
                warn!("Skipping unreadable log {}: {}", entry.path().display(), e);
                continue;
            }
        };

        match logs.get(&log.package_name) {
            Some(existing) if existing.backup_time >= log.backup_time => {
                debug!(
                    "Ignoring older log for {} at {}",
                    log.package_name,
                    entry.path().display()
                );
            }
            _ => {
                logs.insert(log.package_name.clone(), log);
            }
        }
    }

    info!("Found backup logs for {} package(s) under {}", logs.len(), root.display());
    Ok(logs)
}
