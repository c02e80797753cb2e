//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `config.toml` files. Every knob
//! the engine exposes — variant widths, encoding quality and format, grid
//! column counts, layout presentation parameters — is explicit configuration
//! rather than a process-wide constant, so several galleries with different
//! presentation settings can coexist in one process.
//!
//! Configuration is hierarchical: stock defaults are overridden by a root
//! `config.toml`, which a per-gallery `config.toml` may override in turn.
//! Override files are sparse — they only need the keys they change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [images]
//! widths = [480, 800, 1200, 1920]  # Variant widths to generate
//! quality = 80                     # Lossy encoding quality (1-100)
//! format = "webp"                  # Output encoding: "webp" or "jpeg"
//!
//! [thumbnails]
//! width = 300                      # Thumbnail width
//!
//! [grid]
//! width = 12                       # Desktop placement grid columns
//! mobile_width = 6                 # Mobile placement grid columns
//!
//! [layout]
//! container_width = 1200           # Pixel width packed layouts fill
//! gap = 8                          # Pixel gap between layout items
//! row_height = 320                 # Target row height for justified layout
//! columns = 3                      # Column count for grid layout
//!
//! [processing]
//! max_processes = 4                # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Variant generation settings (widths, quality, format).
    pub images: ImagesConfig,
    /// Thumbnail generation settings.
    pub thumbnails: ThumbnailsConfig,
    /// Placement grid column counts.
    pub grid: GridConfig,
    /// Packed layout presentation settings.
    pub layout: LayoutConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.widths.is_empty() {
            return Err(ConfigError::Validation(
                "images.widths must not be empty".into(),
            ));
        }
        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.thumbnails.width == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.width must be positive".into(),
            ));
        }
        if self.grid.width == 0 || self.grid.mobile_width == 0 {
            return Err(ConfigError::Validation(
                "grid.width and grid.mobile_width must be positive".into(),
            ));
        }
        if self.layout.container_width == 0 {
            return Err(ConfigError::Validation(
                "layout.container_width must be positive".into(),
            ));
        }
        if self.layout.columns == 0 {
            return Err(ConfigError::Validation(
                "layout.columns must be positive".into(),
            ));
        }
        if self.layout.row_height == 0 {
            return Err(ConfigError::Validation(
                "layout.row_height must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Variant generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Pixel widths to generate for responsive `<picture>` elements.
    pub widths: Vec<u32>,
    /// Lossy encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Output encoding for variants and thumbnails.
    pub format: OutputFormat,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            widths: vec![480, 800, 1200, 1920],
            quality: 80,
            format: OutputFormat::Webp,
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Thumbnail width; height follows the source aspect ratio.
    pub width: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self { width: 300 }
    }
}

/// Placement grid column counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Desktop grid columns.
    pub width: u32,
    /// Mobile grid columns.
    pub mobile_width: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 12,
            mobile_width: 6,
        }
    }
}

/// Packed layout presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Pixel width packed layouts fill.
    pub container_width: u32,
    /// Pixel gap between layout items.
    pub gap: u32,
    /// Target row height for the justified layout.
    pub row_height: u32,
    /// Column count for the fixed-column grid layout.
    pub columns: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            container_width: 1200,
            gap: 8,
            row_height: 320,
            columns: 3,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
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
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Deep-merge two TOML values.
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

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
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
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

fn stock_defaults_value() -> toml::Value {
    // Defaults are code; serializing them never fails.
    toml::Value::try_from(GalleryConfig::default()).unwrap()
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photogrid configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# A root config.toml can be overridden by a per-gallery config.toml;
# each file only needs the keys it wants to change.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Variant generation
# ---------------------------------------------------------------------------
[images]
# Pixel widths to generate for each source photo. Heights follow the
# source aspect ratio. Every width is always generated, so the expected
# output set is known before decoding.
widths = [480, 800, 1200, 1920]

# Lossy encoding quality, 1 (worst) to 100 (best).
quality = 80

# Output encoding for variants and thumbnails: "webp" or "jpeg".
format = "webp"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Thumbnail width; height follows the source aspect ratio.
# Thumbnails land in a .thumbs directory next to the variant directories.
width = 300

# ---------------------------------------------------------------------------
# Placement grids
# ---------------------------------------------------------------------------
[grid]
# Column count of the desktop placement grid.
width = 12

# Column count of the independent mobile placement grid.
mobile_width = 6

# ---------------------------------------------------------------------------
# Packed layouts (used when no explicit placements exist)
# ---------------------------------------------------------------------------
[layout]
# Pixel width that packed layouts fill.
container_width = 1200

# Pixel gap between layout items.
gap = 8

# Target row height for the justified layout.
row_height = 320

# Column count for the fixed-column grid layout.
columns = 3

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers. Omit for auto (one per CPU core).
# Values above the core count are clamped down.
# max_processes = 4
"##
}
