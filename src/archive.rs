//! In-memory nested archive accumulation and ZIP serialization.
//!
//! A batch writes every variant into one [`ArchiveBuilder`]: one folder per
//! group key, files keyed by name inside it. Nothing touches the disk until
//! the caller asks for [`ArchiveBuilder::serialize`], which produces the
//! complete ZIP as a single byte buffer.
//!
//! ```text
//! compress_16-Oktober-2026-14:03:27.zip
//! ├── 001/
//! │   ├── 001.jpg             # 640x480 medium
//! │   └── 001_thumbnail.jpg   # 480x320 thumbnail
//! └── badge/
//!     ├── badge.jpg
//!     └── badge_thumbnail.jpg
//! ```
//!
//! Adding a file at an existing path replaces it (last write wins).

use crate::naming::GroupKey;
use chrono::{DateTime, Locale, TimeZone};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::CompressionMethod;
use zip::result::ZipError;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Month names in generated archive filenames are Indonesian.
const FILENAME_LOCALE: Locale = Locale::id_ID;

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("Archive payload of {size} bytes exceeds the {limit} byte limit")]
    LimitExceeded { size: u64, limit: u64 },
    #[error("ZIP error: {0}")]
    Zip(#[from] ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to one top-level folder of the archive.
///
/// Obtained from [`ArchiveBuilder::ensure_group`]; handles for the same key
/// refer to the same folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupHandle {
    name: String,
}

impl GroupHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Accumulates folders and files for one batch.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    groups: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    /// Upper bound on the uncompressed payload accepted by `serialize`.
    max_bytes: Option<u64>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_bytes: Option<u64>) -> Self {
        Self {
            groups: BTreeMap::new(),
            max_bytes,
        }
    }

    /// Get the folder for `key`, creating it on first use.
    pub fn ensure_group(&mut self, key: &GroupKey) -> GroupHandle {
        self.groups.entry(key.to_string()).or_default();
        GroupHandle {
            name: key.to_string(),
        }
    }

    /// Insert a file into a folder, returning the bytes it replaced, if any.
    pub fn add_file(&mut self, group: &GroupHandle, name: &str, bytes: Vec<u8>) -> Option<Vec<u8>> {
        self.groups
            .entry(group.name.clone())
            .or_default()
            .insert(name.to_string(), bytes)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn entry_count(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Uncompressed size of all file contents.
    pub fn total_bytes(&self) -> u64 {
        self.groups
            .values()
            .flat_map(BTreeMap::values)
            .map(|bytes| bytes.len() as u64)
            .sum()
    }

    /// Every file path in the archive, as `<group>/<name>`, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|(group, files)| files.keys().map(move |name| format!("{group}/{name}")))
            .collect()
    }

    /// Write the whole tree as one ZIP.
    ///
    /// Call once every addition for the batch is done. Each folder gets an
    /// explicit directory entry, followed by its Deflate-compressed files.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializationError> {
        let size = self.total_bytes();
        if let Some(limit) = self.max_bytes.filter(|&limit| size > limit) {
            return Err(SerializationError::LimitExceeded { size, limit });
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let dir_options = SimpleFileOptions::default();
        let file_options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(size > u32::MAX as u64);

        for (group, files) in &self.groups {
            writer.add_directory(format!("{group}/"), dir_options)?;
            for (name, bytes) in files {
                writer.start_file(format!("{group}/{name}"), file_options)?;
                writer.write_all(bytes)?;
            }
        }

        let cursor = writer.finish()?;
        log::info!(
            "Serialized {} files in {} folders ({} bytes compressed)",
            self.entry_count(),
            self.group_count(),
            cursor.get_ref().len()
        );
        Ok(cursor.into_inner())
    }
}

/// Download filename for an archive finished at `at`.
///
/// Format: `compress_<DD>-<MonthName>-<YYYY>-<HH:mm:ss>.zip`, with the month
/// spelled out in Indonesian.
pub fn archive_filename<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "compress_{}.zip",
        at.format_localized("%d-%B-%Y-%H:%M:%S", FILENAME_LOCALE)
    )
}
