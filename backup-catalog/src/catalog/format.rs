//! Human-readable rendering of catalog entries.

use crate::model::AppRecord;

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// One line per record: name, version, backup mode, sizes and markers.
pub fn format_record_line(record: &AppRecord) -> String {
    let mut markers = Vec::new();
    if record.is_system() {
        markers.push("system");
    }
    if !record.is_installed() {
        markers.push("not-installed");
    }
    if record.is_split() {
        markers.push("split");
    }
    if record.is_special() {
        markers.push("special");
    }

    let mut line = format!(
        "{:<48} {:>12} {:<6} app {:>10}  data {:>10}  cache {:>10}",
        record.to_string(),
        record.version_name(),
        record.backup_mode().to_string(),
        format_bytes(record.app_size()),
        format_bytes(record.data_size()),
        format_bytes(record.cache_size()),
    );
    if let Some(log) = record.log() {
        line.push_str(&format!("  last {}", log.backup_time.format("%Y-%m-%d %H:%M")));
    }
    if !markers.is_empty() {
        line.push_str(&format!("  [{}]", markers.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::sample_log;
    use crate::model::BackupMode;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536 * 1024), "1.50 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn test_record_line_markers() {
        let mut log = sample_log("org.example.old", BackupMode::BOTH, 0);
        log.system = true;
        let record = crate::model::AppRecord::from_log(log);

        let line = format_record_line(&record);
        assert!(line.starts_with("org.example.old [Sample]"));
        assert!(line.contains("both"));
        assert!(line.contains("last 1970-01-01 00:00"));
        assert!(line.ends_with("[system, not-installed]"));
    }
}
