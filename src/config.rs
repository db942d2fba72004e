//! Configuration module.
//!
//! Handles loading, validating, and merging `coverpack.toml`. The file is
//! sparse: stock defaults are the base layer and user values override them
//! key by key.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [thumbnail]
//! width = 480
//! height = 320
//!
//! [medium]
//! width = 640
//! height = 480
//!
//! [encoding]
//! quality = 0.8             # JPEG quality, 0.0-1.0
//!
//! [batch]
//! advisory_limit = 2000     # Warn above this many files
//! # max_files = 5000        # Refuse batches larger than this
//!
//! [archive]
//! # max_bytes = 2147483648  # Refuse to serialize more than this (uncompressed)
//!
//! [processing]
//! # max_processes = 4       # Max rayon workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, VariantKind, VariantPlan, VariantSpec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file name looked up in the config directory.
pub const CONFIG_FILE_NAME: &str = "coverpack.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `coverpack.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Thumbnail variant box.
    pub thumbnail: SizeConfig,
    /// Medium variant box.
    pub medium: SizeConfig,
    /// JPEG encoding settings shared by both variants.
    pub encoding: EncodingConfig,
    /// Batch size policy.
    pub batch: BatchConfig,
    /// Archive serialization limits.
    pub archive: ArchiveConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thumbnail: SizeConfig {
                width: 480,
                height: 320,
            },
            medium: SizeConfig {
                width: 640,
                height: 480,
            },
            encoding: EncodingConfig::default(),
            batch: BatchConfig::default(),
            archive: ArchiveConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, size) in [("thumbnail", &self.thumbnail), ("medium", &self.medium)] {
            if size.width == 0 || size.height == 0 {
                return Err(ConfigError::Validation(format!(
                    "{name}.width and {name}.height must be non-zero"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.encoding.quality) {
            return Err(ConfigError::Validation(
                "encoding.quality must be 0.0-1.0".into(),
            ));
        }
        if self.batch.max_files == Some(0) {
            return Err(ConfigError::Validation(
                "batch.max_files must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The two variant specs every source image is rendered to.
    pub fn variant_plan(&self) -> VariantPlan {
        let quality = Quality::from_fraction(self.encoding.quality);
        VariantPlan {
            thumbnail: VariantSpec {
                kind: VariantKind::Thumbnail,
                width: self.thumbnail.width,
                height: self.thumbnail.height,
                quality,
            },
            medium: VariantSpec {
                kind: VariantKind::Medium,
                width: self.medium.width,
                height: self.medium.height,
                quality,
            },
        }
    }
}

/// Target box of one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeConfig {
    pub width: u32,
    pub height: u32,
}

/// JPEG encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// Quality as a fraction (0.0 = worst, 1.0 = best).
    pub quality: f32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self { quality: 0.8 }
    }
}

/// Batch size policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Batches larger than this are processed, but a warning is logged.
    pub advisory_limit: usize,
    /// Batches larger than this are refused outright. `None` = no limit.
    pub max_files: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            advisory_limit: 2000,
            max_files: None,
        }
    }
}

/// Archive serialization limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Largest uncompressed payload `serialize` accepts. `None` = no limit.
    pub max_bytes: Option<u64>,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of rayon workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Parsed from [`stock_config_toml`], so the commented file handed out by
/// `gen-config` and the base layer can never disagree.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::from_str(stock_config_toml())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `coverpack.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `coverpack.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    let config = resolve_config(base, overlay)?;
    log::debug!("Loaded config from {}: {config:?}", dir.display());
    Ok(config)
}

/// Returns a fully-commented stock `coverpack.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# coverpack configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Variant sizes
# ---------------------------------------------------------------------------
# Every source image is cover-fitted (scaled to fill, then center-cropped)
# into both boxes.

# Stored as <key>/<key>_thumbnail.jpg
[thumbnail]
width = 480
height = 320

# Stored as <key>/<key>.jpg
[medium]
width = 640
height = 480

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[encoding]
# JPEG quality as a fraction (0.0 = worst, 1.0 = best).
quality = 0.8

# ---------------------------------------------------------------------------
# Batch policy
# ---------------------------------------------------------------------------
[batch]
# Larger batches still run, but a warning is logged: every variant is held
# in memory until the archive is written.
advisory_limit = 2000

# Refuse batches with more files than this.
# max_files = 5000

# ---------------------------------------------------------------------------
# Archive
# ---------------------------------------------------------------------------
[archive]
# Refuse to serialize archives whose uncompressed payload exceeds this.
# max_bytes = 2147483648

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
