//! Sort and filter preferences for the catalog list.
//!
//! The model is persisted as a four digit code, one digit per choice in the
//! order sort, install filter, backup filter, special filter. `"0000"` is the
//! default and is what a reset stores.

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use std::cmp::Reverse;
use std::fmt;
use tracing::warn;

use super::PreferenceStore;
use crate::model::{AppRecord, BackupMode};
use crate::{CatalogError, Result};

/// Preference key the model is stored under.
pub const SORT_FILTER_KEY: &str = "sortFilter";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortBy {
    #[default]
    Label,
    PackageName,
    DataSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InstallFilter {
    #[default]
    All,
    System,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BackupFilter {
    #[default]
    All,
    Both,
    Apk,
    Data,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SpecialFilter {
    #[default]
    None,
    NewUpdated,
    NotInstalled,
    Old,
    Split,
}

/// Inputs to filters that depend on more than the record itself.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext {
    pub now: DateTime<Utc>,
    /// Backups older than this count as old
    pub old_backup_age: Duration,
}

impl FilterContext {
    /// Context anchored at the current time. Fails when the age does not fit
    /// a `Duration`.
    pub fn new(old_backup_days: i64) -> Result<Self> {
        let old_backup_age = Duration::try_days(old_backup_days).ok_or_else(|| {
            CatalogError::Config(format!(
                "old backup age of {} days is out of range",
                old_backup_days
            ))
        })?;

        Ok(Self {
            now: Utc::now(),
            old_backup_age,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortFilterModel {
    pub sort_by: SortBy,
    pub filter: InstallFilter,
    pub backup_filter: BackupFilter,
    pub special_filter: SpecialFilter,
}

fn digit_at(code: &[u8], index: usize) -> Option<usize> {
    code.get(index)
        .filter(|b| b.is_ascii_digit())
        .map(|b| (b - b'0') as usize)
}

fn pick<T: ValueEnum + Copy>(digit: Option<usize>, what: &str, code: &str) -> Result<T> {
    digit
        .and_then(|d| T::value_variants().get(d).copied())
        .ok_or_else(|| {
            CatalogError::InvalidArgument(format!("invalid {} in sort/filter code {:?}", what, code))
        })
}

fn index_of<T: ValueEnum + PartialEq>(value: &T) -> usize {
    T::value_variants()
        .iter()
        .position(|v| v == value)
        .unwrap_or(0)
}

impl SortFilterModel {
    /// Parse a four digit code such as `"1203"`.
    pub fn from_code(code: &str) -> Result<Self> {
        let raw = code.as_bytes();
        if raw.len() != 4 {
            return Err(CatalogError::InvalidArgument(format!(
                "sort/filter code {:?} must have exactly 4 digits",
                code
            )));
        }

        Ok(Self {
            sort_by: pick(digit_at(raw, 0), "sort order", code)?,
            filter: pick(digit_at(raw, 1), "install filter", code)?,
            backup_filter: pick(digit_at(raw, 2), "backup filter", code)?,
            special_filter: pick(digit_at(raw, 3), "special filter", code)?,
        })
    }

    pub fn code(&self) -> String {
        format!(
            "{}{}{}{}",
            index_of(&self.sort_by),
            index_of(&self.filter),
            index_of(&self.backup_filter),
            index_of(&self.special_filter)
        )
    }

    /// Read the stored model, falling back to the default when the stored
    /// value is missing or malformed.
    pub fn load(store: &impl PreferenceStore) -> Result<Self> {
        let Some(code) = store.get(SORT_FILTER_KEY)? else {
            return Ok(Self::default());
        };

        match Self::from_code(&code) {
            Ok(model) => Ok(model),
            Err(e) => {
                warn!("Ignoring stored sort/filter preference: {}", e);
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, store: &mut impl PreferenceStore) -> Result<()> {
        store.put(SORT_FILTER_KEY, &self.code())
    }

    /// Persist and return the default model.
    pub fn reset(store: &mut impl PreferenceStore) -> Result<Self> {
        let model = Self::default();
        model.save(store)?;
        Ok(model)
    }

    /// Whether `record` passes all three filters.
    pub fn matches(&self, record: &AppRecord, ctx: &FilterContext) -> bool {
        let install_ok = match self.filter {
            InstallFilter::All => true,
            InstallFilter::System => record.is_system(),
            InstallFilter::User => !record.is_system(),
        };

        let mode = record.backup_mode();
        let backup_ok = match self.backup_filter {
            BackupFilter::All => true,
            BackupFilter::Both => mode == BackupMode::BOTH,
            BackupFilter::Apk => mode == BackupMode::APK,
            BackupFilter::Data => mode == BackupMode::DATA,
            BackupFilter::None => mode.is_unset(),
        };

        let special_ok = match self.special_filter {
            SpecialFilter::None => true,
            SpecialFilter::NewUpdated => record.is_installed() && record.is_new_or_updated(),
            SpecialFilter::NotInstalled => !record.is_installed(),
            SpecialFilter::Old => record
                .log()
                .map(|log| ctx.now - log.backup_time > ctx.old_backup_age)
                .unwrap_or(false),
            SpecialFilter::Split => record.is_split(),
        };

        install_ok && backup_ok && special_ok
    }

    /// Filter then sort. Sorting is stable, ties keep their input order.
    pub fn apply(&self, records: Vec<AppRecord>, ctx: &FilterContext) -> Vec<AppRecord> {
        let mut kept: Vec<AppRecord> = records
            .into_iter()
            .filter(|r| self.matches(r, ctx))
            .collect();

        match self.sort_by {
            SortBy::Label => kept.sort_by_cached_key(|r| r.label().to_lowercase()),
            SortBy::PackageName => {
                kept.sort_by(|a, b| a.package_name().cmp(b.package_name()))
            }
            SortBy::DataSize => kept.sort_by_key(|r| Reverse(r.data_size())),
        }
        kept
    }
}

impl fmt::Display for SortFilterModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sort={:?} filter={:?} backup={:?} special={:?} (code {})",
            self.sort_by,
            self.filter,
            self.backup_filter,
            self.special_filter,
            self.code()
        )
    }
}
