//! Binary encoding of application records for cross-process transfer.
//!
//! Layout (schema version 1):
//!
//! | Field                      | Encoding                                  |
//! |----------------------------|-------------------------------------------|
//! | magic                      | `ABRC`                                    |
//! | schema version             | `u16`                                     |
//! | log                        | presence `u8`, then the log fields        |
//! | label, package, version    | strings                                   |
//! | source dir                 | string                                    |
//! | split source dirs          | presence `u8`, then string list           |
//! | data dir, protected dir    | strings                                   |
//! | version code               | `i64`                                     |
//! | backup mode                | `u8` (0..=3)                              |
//! | flags                      | `u8`: system, installed, checked, disabled|
//! | kind                       | `u8` tag, special kinds add a string list |
//! | app, data, cache size      | `u64` each                                |

pub(crate) mod wire;

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, TimeZone, Utc};

use crate::history::BackupLog;
use crate::model::{AppIdentity, AppRecord, BackupMode, RecordKind};
use crate::utils::CodecError;
use wire::{put_bool, put_str, put_str_list, Reader};

/// Record magic bytes.
pub const RECORD_MAGIC: [u8; 4] = *b"ABRC";

/// Current record schema version.
pub const SCHEMA_VERSION: u16 = 1;

const FLAG_SYSTEM: u8 = 1 << 0;
const FLAG_INSTALLED: u8 = 1 << 1;
const FLAG_CHECKED: u8 = 1 << 2;
const FLAG_DISABLED: u8 = 1 << 3;

const KIND_STANDARD: u8 = 0;
const KIND_SPECIAL: u8 = 1;

/// Encode a record into its versioned binary form
pub fn encode_record(record: &AppRecord) -> Bytes {
    let mut buf = BytesMut::with_capacity(256);
    buf.put_slice(&RECORD_MAGIC);
    buf.put_u16(SCHEMA_VERSION);

    match record.log() {
        Some(log) => {
            put_bool(&mut buf, true);
            encode_log(&mut buf, log);
        }
        None => put_bool(&mut buf, false),
    }

    put_str(&mut buf, record.label());
    put_str(&mut buf, record.package_name());
    put_str(&mut buf, record.version_name());
    put_str(&mut buf, record.source_dir());
    match record.split_source_dirs() {
        Some(dirs) => {
            put_bool(&mut buf, true);
            put_str_list(&mut buf, dirs);
        }
        None => put_bool(&mut buf, false),
    }
    put_str(&mut buf, record.data_dir());
    put_str(&mut buf, record.device_protected_data_dir());
    buf.put_i64(record.version_code());
    buf.put_u8(record.backup_mode().bits());

    let mut flags = 0u8;
    if record.is_system() {
        flags |= FLAG_SYSTEM;
    }
    if record.is_installed() {
        flags |= FLAG_INSTALLED;
    }
    if record.is_checked() {
        flags |= FLAG_CHECKED;
    }
    if record.is_disabled() {
        flags |= FLAG_DISABLED;
    }
    buf.put_u8(flags);

    match record.kind() {
        RecordKind::Standard => buf.put_u8(KIND_STANDARD),
        RecordKind::Special { files } => {
            buf.put_u8(KIND_SPECIAL);
            put_str_list(&mut buf, files);
        }
    }

    buf.put_u64(record.app_size());
    buf.put_u64(record.data_size());
    buf.put_u64(record.cache_size());

    buf.freeze()
}

/// Decode a record, rejecting anything that is not exactly one valid record
pub fn decode_record(data: &[u8]) -> Result<AppRecord, CodecError> {
    let mut reader = Reader::new(data);
    reader.magic(RECORD_MAGIC)?;

    let version = reader.u16("schema version")?;
    if version != SCHEMA_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }

    let log = if reader.bool("log presence")? {
        Some(decode_log(&mut reader)?)
    } else {
        None
    };

    let label = reader.string("label")?;
    let package_name = reader.string("package name")?;
    let version_name = reader.string("version name")?;
    let source_dir = reader.string("source dir")?;
    let split_source_dirs = if reader.bool("split presence")? {
        Some(reader.string_list("split source dirs")?)
    } else {
        None
    };
    let data_dir = reader.string("data dir")?;
    let device_protected_data_dir = reader.string("device protected data dir")?;
    let version_code = reader.i64("version code")?;
    let backup_mode = decode_mode(&mut reader)?;

    let flags = reader.u8("flags")?;
    if flags & !(FLAG_SYSTEM | FLAG_INSTALLED | FLAG_CHECKED | FLAG_DISABLED) != 0 {
        return Err(CodecError::UnknownTag { field: "flags", tag: flags });
    }

    let kind = match reader.u8("kind")? {
        KIND_STANDARD => RecordKind::Standard,
        KIND_SPECIAL => RecordKind::Special {
            files: reader.string_list("special files")?,
        },
        tag => return Err(CodecError::UnknownTag { field: "kind", tag }),
    };

    let app_size = reader.u64("app size")?;
    let data_size = reader.u64("data size")?;
    let cache_size = reader.u64("cache size")?;
    reader.finish()?;

    let identity = AppIdentity {
        package_name,
        label,
        version_name,
        version_code,
        source_dir,
        split_source_dirs,
        data_dir,
        device_protected_data_dir,
        system: flags & FLAG_SYSTEM != 0,
        installed: flags & FLAG_INSTALLED != 0,
    };

    Ok(AppRecord::from_parts(
        identity,
        backup_mode,
        (app_size, data_size, cache_size),
        flags & FLAG_CHECKED != 0,
        flags & FLAG_DISABLED != 0,
        log,
        kind,
    ))
}

fn decode_mode(reader: &mut Reader<'_>) -> Result<BackupMode, CodecError> {
    let bits = reader.u8("backup mode")?;
    BackupMode::from_bits(bits).map_err(|_| CodecError::InvalidMode(bits))
}

fn encode_log(buf: &mut BytesMut, log: &BackupLog) {
    put_str(buf, &log.package_name);
    put_str(buf, &log.label);
    put_str(buf, &log.version_name);
    buf.put_i64(log.version_code);
    buf.put_u8(log.backup_mode.bits());
    buf.put_i64(log.backup_time.timestamp_millis());
    put_str(buf, &log.source_dir);
    put_str_list(buf, &log.split_source_dirs);
    put_str(buf, &log.data_dir);
    put_str(buf, &log.device_protected_data_dir);
    put_bool(buf, log.system);
    match &log.cipher_type {
        Some(cipher) => {
            put_bool(buf, true);
            put_str(buf, cipher);
        }
        None => put_bool(buf, false),
    }
}

fn decode_log(reader: &mut Reader<'_>) -> Result<BackupLog, CodecError> {
    let package_name = reader.string("log package name")?;
    let label = reader.string("log label")?;
    let version_name = reader.string("log version name")?;
    let version_code = reader.i64("log version code")?;
    let backup_mode = decode_mode(reader)?;
    let millis = reader.i64("log backup time")?;
    let backup_time: DateTime<Utc> = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or(CodecError::InvalidTimestamp(millis))?;
    let source_dir = reader.string("log source dir")?;
    let split_source_dirs = reader.string_list("log split source dirs")?;
    let data_dir = reader.string("log data dir")?;
    let device_protected_data_dir = reader.string("log device protected data dir")?;
    let system = reader.bool("log system")?;
    let cipher_type = if reader.bool("log cipher presence")? {
        Some(reader.string("log cipher type")?)
    } else {
        None
    };

    Ok(BackupLog {
        package_name,
        label,
        version_name,
        version_code,
        backup_mode,
        backup_time,
        source_dir,
        split_source_dirs,
        data_dir,
        device_protected_data_dir,
        system,
        cipher_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::sample_log;
    use crate::model::record::tests::sample_identity;
    use crate::model::RawSizeReport;

    fn full_record() -> AppRecord {
        let mut identity = sample_identity("org.example.camera");
        identity.system = true;
        identity.split_source_dirs = Some(vec![
            "split_config.xxhdpi.apk".to_string(),
            "split_config.arm64_v8a.apk".to_string(),
            "split_config.de.apk".to_string(),
        ]);

        let mut log = sample_log("org.example.camera", BackupMode::DATA, 1_712_345_678_901);
        log.split_source_dirs = vec!["split_config.de.apk".to_string()];
        log.cipher_type = Some("AES/GCM/NoPadding".to_string());

        let mut record = AppRecord::new(identity);
        record.add_sizes(&RawSizeReport {
            app_bytes: 52_428_800,
            cache_bytes: 1_024,
            data_bytes: 9_999_999,
        });
        record.attach_log(log);
        record.set_backup_mode(BackupMode::APK);
        record.set_checked(true);
        record
    }

    #[test]
    fn test_roundtrip_full_record() {
        let record = full_record();
        let decoded = decode_record(&encode_record(&record)).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(
            decoded.split_source_dirs().unwrap()[0],
            "split_config.xxhdpi.apk"
        );
    }

    #[test]
    fn test_roundtrip_keeps_absent_and_empty_splits_apart() {
        let absent = AppRecord::new(sample_identity("org.example.a"));
        let mut identity = sample_identity("org.example.b");
        identity.split_source_dirs = Some(vec![]);
        let empty = AppRecord::new(identity);

        let absent_back = decode_record(&encode_record(&absent)).unwrap();
        let empty_back = decode_record(&encode_record(&empty)).unwrap();
        assert_eq!(absent_back.split_source_dirs(), None);
        assert_eq!(empty_back.split_source_dirs(), Some(&[][..]));
        assert!(!empty_back.is_split());
    }

    #[test]
    fn test_roundtrip_special_disabled_record() {
        let mut record = AppRecord::new(sample_identity("special.wifi")).with_kind(
            RecordKind::Special {
                files: vec![
                    "/data/misc/wifi/WifiConfigStore.xml".to_string(),
                    "/data/misc/wifi/softap.conf".to_string(),
                ],
            },
        );
        record.set_disabled(true);

        let decoded = decode_record(&encode_record(&record)).unwrap();
        assert_eq!(decoded, record);
        assert!(decoded.is_special());
        assert!(decoded.is_disabled());
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut data = encode_record(&full_record()).to_vec();
        data[0] = b'X';
        assert!(matches!(decode_record(&data), Err(CodecError::BadMagic { .. })));
    }

    #[test]
    fn test_rejects_future_version() {
        let mut data = encode_record(&full_record()).to_vec();
        data[4..6].copy_from_slice(&2u16.to_be_bytes());
        assert_eq!(decode_record(&data), Err(CodecError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_rejects_invalid_mode() {
        let record = AppRecord::new(sample_identity("org.example.a"));
        let mut data = encode_record(&record).to_vec();
        // Mode byte sits before flags, kind and the three sizes
        let mode_index = data.len() - 8 * 3 - 1 - 1 - 1;
        assert_eq!(data[mode_index], 0);
        data[mode_index] = 7;
        assert_eq!(decode_record(&data), Err(CodecError::InvalidMode(7)));
    }

    #[test]
    fn test_rejects_invalid_utf8_label() {
        let record = AppRecord::new(sample_identity("org.example.a"));
        let mut data = encode_record(&record).to_vec();
        // Header (7 bytes) then the label's length prefix
        assert_eq!(&data[11..16], b"Notes");
        data[11] = 0xff;
        assert_eq!(decode_record(&data), Err(CodecError::InvalidUtf8("label")));
    }

    #[test]
    fn test_rejects_unknown_kind_and_flags() {
        let record = AppRecord::new(sample_identity("org.example.a"));
        let data = encode_record(&record).to_vec();
        let kind_index = data.len() - 8 * 3 - 1;
        let flags_index = kind_index - 1;

        let mut bad_kind = data.clone();
        assert_eq!(bad_kind[kind_index], KIND_STANDARD);
        bad_kind[kind_index] = 9;
        assert_eq!(
            decode_record(&bad_kind),
            Err(CodecError::UnknownTag { field: "kind", tag: 9 })
        );

        let mut bad_flags = data;
        assert_eq!(bad_flags[flags_index], FLAG_INSTALLED);
        bad_flags[flags_index] |= 0xf0;
        assert_eq!(
            decode_record(&bad_flags),
            Err(CodecError::UnknownTag { field: "flags", tag: 0xf0 | FLAG_INSTALLED })
        );
    }

    #[test]
    fn test_rejects_out_of_range_log_timestamp() {
        let package = "org.example.a";
        let mut record = AppRecord::new(sample_identity(package));
        record.attach_log(sample_log(package, BackupMode::APK, 1_000));
        let mut data = encode_record(&record).to_vec();

        // Log package, label and version name, then version code and mode
        let at = 7 + (4 + package.len()) + (4 + "Sample".len()) + (4 + "1.2.0".len()) + 8 + 1;
        assert_eq!(data[at..at + 8], 1_000i64.to_be_bytes());
        data[at..at + 8].copy_from_slice(&i64::MAX.to_be_bytes());
        assert_eq!(decode_record(&data), Err(CodecError::InvalidTimestamp(i64::MAX)));
    }

    #[test]
    fn test_rejects_truncated_and_trailing_input() {
        let data = encode_record(&full_record());
        assert!(matches!(
            decode_record(&data[..data.len() - 3]),
            Err(CodecError::Truncated(_))
        ));

        let mut longer = data.to_vec();
        longer.push(0);
        assert_eq!(decode_record(&longer), Err(CodecError::TrailingBytes(1)));
    }
}
