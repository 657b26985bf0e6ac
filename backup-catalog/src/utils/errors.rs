//! Custom error types for the backup catalog.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(String),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Preference error: {0}")]
    Preference(String),
}

/// Failures while decoding a binary record or bundle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("bad magic: expected {expected:?}, found {found:?}")]
    BadMagic { expected: [u8; 4], found: [u8; 4] },

    #[error("unsupported schema version {0}")]
    UnsupportedVersion(u16),

    #[error("truncated input while reading {0}")]
    Truncated(&'static str),

    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    #[error("invalid backup mode {0}")]
    InvalidMode(u8),

    #[error("unknown {field} tag {tag}")]
    UnknownTag { field: &'static str, tag: u8 },

    #[error("timestamp out of range: {0}")]
    InvalidTimestamp(i64),

    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),

    #[error("decompression failed: {0}")]
    Compression(String),
}

impl From<toml::de::Error> for CatalogError {
    fn from(e: toml::de::Error) -> Self {
        CatalogError::Toml(e.to_string())
    }
}

impl From<toml::ser::Error> for CatalogError {
    fn from(e: toml::ser::Error) -> Self {
        CatalogError::Toml(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
