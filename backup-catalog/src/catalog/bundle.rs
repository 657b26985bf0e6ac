//! Catalog bundle files: every record of a catalog in one compressed file.
//!
//! The uncompressed container is magic `ABCT`, a `u16` version, a `u32`
//! record count and then each encoded record behind a `u32` length. The
//! container is zstd-compressed as a whole.

use bytes::{BufMut, BytesMut};
use std::path::Path;
use tracing::info;

use crate::codec::wire::Reader;
use crate::codec::{decode_record, encode_record};
use crate::model::AppRecord;
use crate::utils::CodecError;
use crate::Result;

pub const BUNDLE_MAGIC: [u8; 4] = *b"ABCT";
pub const BUNDLE_VERSION: u16 = 1;

/// zstd level used for bundles
const COMPRESSION_LEVEL: i32 = 3;

/// Serialize and compress a whole catalog
pub fn encode_bundle(records: &[AppRecord]) -> Result<Vec<u8>> {
    let mut buf = BytesMut::new();
    buf.put_slice(&BUNDLE_MAGIC);
    buf.put_u16(BUNDLE_VERSION);
    buf.put_u32(records.len() as u32);

    for record in records {
        let encoded = encode_record(record);
        buf.put_u32(encoded.len() as u32);
        buf.put_slice(&encoded);
    }

    let compressed = zstd::encode_all(&buf[..], COMPRESSION_LEVEL)?;
    Ok(compressed)
}

/// Decompress and decode a bundle produced by [`encode_bundle`]
pub fn decode_bundle(data: &[u8]) -> Result<Vec<AppRecord>> {
    let raw = zstd::decode_all(data).map_err(|e| CodecError::Compression(e.to_string()))?;

    let mut reader = Reader::new(&raw);
    reader.magic(BUNDLE_MAGIC)?;
    let version = reader.u16("bundle version")?;
    if version != BUNDLE_VERSION {
        return Err(CodecError::UnsupportedVersion(version).into());
    }

    let count = reader.u32("record count")? as usize;
    // Cap the preallocation by what the input could possibly hold
    let mut records = Vec::with_capacity(count.min(reader.remaining() / 4));
    for _ in 0..count {
        let len = reader.u32("record length")? as usize;
        let record = decode_record(reader.bytes(len, "record")?)?;
        records.push(record);
    }
    reader.finish()?;

    Ok(records)
}

/// Write a bundle file
pub async fn write_bundle(path: &Path, records: &[AppRecord]) -> Result<()> {
    let data = encode_bundle(records)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, &data).await?;

    info!(
        "Wrote {} record(s) to {} ({} bytes)",
        records.len(),
        path.display(),
        data.len()
    );
    Ok(())
}

/// Read a bundle file
pub async fn read_bundle(path: &Path) -> Result<Vec<AppRecord>> {
    let data = tokio::fs::read(path).await?;
    let records = decode_bundle(&data)?;
    info!("Read {} record(s) from {}", records.len(), path.display());
    Ok(records)
}
