//! Content-addressed variant generation.
//!
//! For each source photo the processor derives a hash ID from the content,
//! then produces one resized, re-encoded variant per configured width plus a
//! thumbnail, named deterministically from the hash:
//!
//! ```text
//! {hash12}/{hash12}-480w.webp
//! {hash12}/{hash12}-800w.webp
//! ...
//! thumb-{hash12}.webp
//! ```
//!
//! ## Filesystem as cache
//!
//! Because the full output set is derivable from hash + configuration alone,
//! the processor asks the destination whether every expected name already
//! exists *before* decoding anything. A complete set means the work was done
//! on a previous run and the image is skipped outright — hashing is cheap,
//! decoding and encoding are not. That existence check is the entire cache:
//! no manifest, no index, no mtimes.
//!
//! Resize and encode are deterministic given (bytes, width, quality), so a
//! re-run over unchanged sources is a no-op once the skip path triggers.
//!
//! ## Failure containment
//!
//! Any failure — unreadable source, corrupt bytes, encode or write error —
//! aborts that one image with a step-identifying error. Variants already
//! committed for it stay on disk; a forced re-run repairs the set. Batches
//! keep going past failed images unless the caller opts into fail-fast.

use crate::config::GalleryConfig;
use crate::imaging::{self, OutputFormat, Quality};
use crate::io::{ImageDestination, ImageSource};
use crate::naming;
use rayon::prelude::*;
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

/// Variant widths used when the configuration leaves them empty.
pub const DEFAULT_WIDTHS: [u32; 4] = [480, 800, 1200, 1920];

/// Thumbnail width used when the configuration leaves it zero.
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 300;

/// Source file extensions with decoders compiled in.
const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp"];

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {name}: {message}")]
    Decode { name: String, message: String },
    #[error("failed to encode {filename} from {name}: {message}")]
    Encode {
        name: String,
        filename: String,
        message: String,
    },
    #[error("failed to write {filename} from {name}: {source}")]
    Write {
        name: String,
        filename: String,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration for the variant generator.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Variant widths, in output order.
    pub widths: Vec<u32>,
    pub quality: Quality,
    pub format: OutputFormat,
    pub thumbnail_width: u32,
    /// Regenerate outputs even when every expected name already exists.
    pub force: bool,
}

impl ProcessConfig {
    /// Build a ProcessConfig from gallery config values.
    pub fn from_gallery_config(config: &GalleryConfig) -> Self {
        Self {
            widths: config.images.widths.clone(),
            quality: Quality::new(config.images.quality),
            format: config.images.format,
            thumbnail_width: config.thumbnails.width,
            force: false,
        }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self::from_gallery_config(&GalleryConfig::default())
    }
}

/// What happened to one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub hash_id: String,
    /// True when every expected output already existed and nothing was
    /// decoded or written.
    pub skipped: bool,
    /// Destination-relative names written this run, in output order.
    pub written: Vec<String>,
}

/// The content-addressed variant generator.
#[derive(Debug, Clone)]
pub struct Processor {
    config: ProcessConfig,
}

impl Processor {
    /// Create a processor, filling in defaults for unset widths and
    /// thumbnail width.
    pub fn new(mut config: ProcessConfig) -> Self {
        if config.widths.is_empty() {
            config.widths = DEFAULT_WIDTHS.to_vec();
        }
        if config.thumbnail_width == 0 {
            config.thumbnail_width = DEFAULT_THUMBNAIL_WIDTH;
        }
        Self { config }
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// Every destination-relative output name for a hash ID, variants first,
    /// thumbnail last. Fully determined before any decoding.
    pub fn expected_outputs(&self, hash_id: &str) -> Vec<String> {
        let ext = self.config.format.ext();
        let mut names: Vec<String> = self
            .config
            .widths
            .iter()
            .map(|&width| naming::variant_relpath(hash_id, width, ext))
            .collect();
        names.push(naming::thumbnail_filename(hash_id, ext));
        names
    }

    /// Process a single image: hash → skip check → decode once → resize and
    /// encode each width → thumbnail.
    pub fn process(
        &self,
        source: &dyn ImageSource,
        destination: &dyn ImageDestination,
    ) -> Result<ProcessOutcome, ProcessError> {
        let name = source.name().to_string();

        let mut reader = source.open().map_err(|e| ProcessError::Read {
            name: name.clone(),
            source: e,
        })?;
        let hash_id = naming::hash_id(&mut reader).map_err(|e| ProcessError::Read {
            name: name.clone(),
            source: e,
        })?;
        drop(reader);

        let expected = self.expected_outputs(&hash_id);
        if !self.config.force && expected.iter().all(|n| destination.exists(n)) {
            return Ok(ProcessOutcome {
                hash_id,
                skipped: true,
                written: Vec::new(),
            });
        }

        // Decode once; every variant resizes from this image.
        let mut reader = source.open().map_err(|e| ProcessError::Read {
            name: name.clone(),
            source: e,
        })?;
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| ProcessError::Read {
                name: name.clone(),
                source: e,
            })?;
        let img = imaging::decode(&bytes).map_err(|e| ProcessError::Decode {
            name: name.clone(),
            message: e.to_string(),
        })?;
        let original = (img.width(), img.height());

        let ext = self.config.format.ext();
        let mut written = Vec::with_capacity(self.config.widths.len() + 1);

        for &width in &self.config.widths {
            let filename = naming::variant_relpath(&hash_id, width, ext);
            self.render(&img, original, width, &name, &filename, destination)?;
            written.push(filename);
        }

        let filename = naming::thumbnail_filename(&hash_id, ext);
        self.render(
            &img,
            original,
            self.config.thumbnail_width,
            &name,
            &filename,
            destination,
        )?;
        written.push(filename);

        Ok(ProcessOutcome {
            hash_id,
            skipped: false,
            written,
        })
    }

    /// Resize to one width, encode, and commit through the destination.
    fn render(
        &self,
        img: &image::DynamicImage,
        original: (u32, u32),
        width: u32,
        name: &str,
        filename: &str,
        destination: &dyn ImageDestination,
    ) -> Result<(), ProcessError> {
        let height = imaging::variant_height(original, width);
        let resized = imaging::resize(img, width, height);
        let data = imaging::encode(&resized, self.config.format, self.config.quality).map_err(
            |e| ProcessError::Encode {
                name: name.to_string(),
                filename: filename.to_string(),
                message: e.to_string(),
            },
        )?;

        let write_err = |e| ProcessError::Write {
            name: name.to_string(),
            filename: filename.to_string(),
            source: e,
        };
        let mut file = destination.create(filename).map_err(write_err)?;
        file.write_all(&data).map_err(write_err)?;
        file.commit().map_err(write_err)
    }

    /// Process a batch of sources against one destination.
    ///
    /// Images are independent, so the batch runs on the rayon pool — one
    /// worker per core unless the pool was built smaller. With `fail_fast`
    /// the batch runs sequentially instead and stops scheduling work after
    /// the first failure; the abort point stays deterministic that way.
    pub fn process_batch<S>(
        &self,
        sources: &[S],
        destination: &dyn ImageDestination,
        options: &BatchOptions,
    ) -> Vec<BatchEntry>
    where
        S: ImageSource + Sync,
    {
        if options.fail_fast {
            let mut entries = Vec::new();
            for source in sources {
                let result = self.process(source, destination);
                let failed = result.is_err();
                entries.push(BatchEntry {
                    name: source.name().to_string(),
                    result,
                });
                if failed {
                    break;
                }
            }
            entries
        } else {
            sources
                .par_iter()
                .map(|source| BatchEntry {
                    name: source.name().to_string(),
                    result: self.process(source, destination),
                })
                .collect()
        }
    }
}

/// Batch behavior knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Stop scheduling further images after the first failure.
    pub fail_fast: bool,
}

/// Result of one image within a batch.
#[derive(Debug)]
pub struct BatchEntry {
    pub name: String,
    pub result: Result<ProcessOutcome, ProcessError>,
}

/// Aggregate counts for a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStats {
    pub processed: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl ProcessStats {
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            match &entry.result {
                Ok(outcome) if outcome.skipped => stats.skipped += 1,
                Ok(_) => stats.processed += 1,
                Err(_) => stats.failed += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> u32 {
        self.processed + self.skipped + self.failed
    }
}

impl fmt::Display for ProcessStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed > 0 {
            write!(
                f,
                "{} processed, {} skipped, {} failed ({} total)",
                self.processed,
                self.skipped,
                self.failed,
                self.total()
            )
        } else if self.skipped > 0 {
            write!(
                f,
                "{} processed, {} skipped ({} total)",
                self.processed,
                self.skipped,
                self.total()
            )
        } else {
            write!(f, "{} processed", self.processed)
        }
    }
}

/// Discover processable photos under a directory.
///
/// Walks recursively, keeps files with a decodable extension, and skips
/// hidden entries — which also keeps previously generated `.thumbs`
/// directories out of the input set. Results are sorted by path so batch
/// order is stable across runs.
pub fn collect_sources(dir: &Path) -> std::io::Result<Vec<crate::io::FileSource>> {
    let mut sources = Vec::new();
    let walker = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with('.'))
        });

    for entry in walker {
        let entry = entry.map_err(std::io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_photo = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                SOURCE_EXTENSIONS
                    .iter()
                    .any(|candidate| ext.eq_ignore_ascii_case(candidate))
            });
        if is_photo {
            sources.push(crate::io::FileSource::new(entry.path()));
        }
    }

    sources.sort_by(|a, b| a.path().cmp(b.path()));
    Ok(sources)
}
