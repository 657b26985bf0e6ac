//! Backup mode flag set.
//!
//! A mode is a 2-bit set: bit 0 means the APK was backed up, bit 1 means the
//! data directory was. Composition is always a union, so repeated or
//! reordered updates converge on the same value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::utils::CatalogError;

/// What a backup of an application covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BackupMode(u8);

impl BackupMode {
    pub const UNSET: BackupMode = BackupMode(0);
    pub const APK: BackupMode = BackupMode(1);
    pub const DATA: BackupMode = BackupMode(2);
    pub const BOTH: BackupMode = BackupMode(3);

    const MASK: u8 = 0b11;

    /// Validate a raw flag value. Anything outside `0..=3` is rejected.
    pub fn from_bits(bits: u8) -> Result<Self, CatalogError> {
        if bits & !Self::MASK != 0 {
            return Err(CatalogError::InvalidArgument(format!(
                "backup mode {} is not one of 0 (unset), 1 (apk), 2 (data), 3 (both)",
                bits
            )));
        }
        Ok(BackupMode(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn union(self, other: BackupMode) -> BackupMode {
        BackupMode(self.0 | other.0)
    }

    /// True when every flag of `other` is also set in `self`.
    pub fn contains(self, other: BackupMode) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn has_apk(self) -> bool {
        self.contains(Self::APK)
    }

    pub fn has_data(self) -> bool {
        self.contains(Self::DATA)
    }

    pub fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for BackupMode {
    type Output = BackupMode;

    fn bitor(self, rhs: BackupMode) -> BackupMode {
        self.union(rhs)
    }
}

impl BitOrAssign for BackupMode {
    fn bitor_assign(&mut self, rhs: BackupMode) {
        *self = self.union(rhs);
    }
}

impl TryFrom<u8> for BackupMode {
    type Error = CatalogError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        BackupMode::from_bits(bits)
    }
}

impl From<BackupMode> for u8 {
    fn from(mode: BackupMode) -> u8 {
        mode.0
    }
}

impl fmt::Display for BackupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            0 => "unset",
            1 => "apk",
            2 => "data",
            _ => "both",
        };
        f.write_str(name)
    }
}
