//! Source and destination abstractions for the processing pipeline.
//!
//! The variant generator never touches concrete files, sockets, or buffers.
//! It reads through [`ImageSource`] ("open a readable stream, report a
//! display name") and writes through [`ImageDestination`] ("create a writable
//! stream for a relative name, report whether that name already has
//! content"). The same generator logic therefore runs unchanged against
//! filesystem batches, uploaded in-memory photos, and future remote targets.
//!
//! # Write atomicity
//!
//! A destination hands out [`DestinationFile`] handles that only become
//! visible on [`commit`](DestinationFile::commit). The filesystem
//! implementation writes to a `.tmp` sibling and renames into place, so an
//! aborted image leaves each target either fully written or absent.
//!
//! # Implementations
//!
//! | Type | Reads/writes |
//! |---|---|
//! | [`FileSource`] | a photo on disk |
//! | [`MemorySource`] | a named in-memory buffer (uploads, tests) |
//! | [`FileDestination`] | an output directory; `thumb-*` names route to `.thumbs/` |
//! | [`MemoryDestination`] | an in-memory map (tests, existence simulation) |

use crate::naming;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A readable origin for one image.
pub trait ImageSource {
    /// Open a fresh reader over the full image content.
    fn open(&self) -> io::Result<Box<dyn Read>>;

    /// Display name used in reports and error messages.
    fn name(&self) -> &str;
}

/// A writable target for processed images, addressed by relative name.
///
/// `Sync` so a batch can share one destination across rayon workers.
pub trait ImageDestination: Sync {
    /// Create a pending file for `name`. Content becomes visible only after
    /// [`DestinationFile::commit`].
    fn create(&self, name: &str) -> io::Result<Box<dyn DestinationFile>>;

    /// Whether `name` already has committed content.
    fn exists(&self, name: &str) -> bool;
}

/// A pending write that must be committed to become visible.
pub trait DestinationFile: Write + Send {
    /// Flush and publish the file under its final name.
    fn commit(self: Box<Self>) -> io::Result<()>;
}

// ============================================================================
// Filesystem source
// ============================================================================

/// An image on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageSource for FileSource {
    fn open(&self) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(&self.path)?))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// In-memory source
// ============================================================================

/// A named in-memory image, e.g. an uploaded photo held in a request body.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    bytes: Arc<[u8]>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into().into(),
        }
    }
}

impl ImageSource for MemorySource {
    fn open(&self) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(Cursor::new(self.bytes.clone())))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Filesystem destination
// ============================================================================

/// Writes processed images under a root directory.
///
/// Relative names may contain `/` separators (variant names carry their hash
/// directory); parent directories are created on demand. Names with a
/// `thumb-` prefix are routed into `.thumbs/` under the root, keeping
/// thumbnails separate from the per-photo variant directories.
#[derive(Debug, Clone)]
pub struct FileDestination {
    root: PathBuf,
}

impl FileDestination {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> PathBuf {
        if naming::is_thumbnail_name(name) {
            self.root.join(naming::THUMBS_DIR).join(name)
        } else {
            self.root.join(name)
        }
    }
}

impl ImageDestination for FileDestination {
    fn create(&self, name: &str) -> io::Result<Box<dyn DestinationFile>> {
        let target = self.resolve(name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        // Unique per pending write, so two workers racing on the same
        // target (byte-identical sources in one batch) never share a temp
        // file; the second rename simply wins with identical bytes.
        static PENDING: AtomicU64 = AtomicU64::new(0);
        let serial = PENDING.fetch_add(1, Ordering::Relaxed);
        let mut temp = target.clone().into_os_string();
        temp.push(format!(".{serial}.tmp"));
        let temp = PathBuf::from(temp);
        let file = File::create(&temp)?;
        Ok(Box::new(PendingFile {
            writer: BufWriter::new(file),
            temp,
            target,
            committed: false,
        }))
    }

    fn exists(&self, name: &str) -> bool {
        self.resolve(name).exists()
    }
}

/// A file being written to a `.tmp` sibling, renamed into place on commit.
struct PendingFile {
    writer: BufWriter<File>,
    temp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl Write for PendingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl DestinationFile for PendingFile {
    fn commit(mut self: Box<Self>) -> io::Result<()> {
        self.writer.flush()?;
        fs::rename(&self.temp, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp);
        }
    }
}

// ============================================================================
// In-memory destination
// ============================================================================

/// Stores committed files in a shared map.
///
/// Tests use it to observe exactly which names were written and to pre-seed
/// existing outputs for cache-hit scenarios. Uses a `Mutex` so it is `Sync`
/// and works under rayon's `par_iter`.
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a committed file, as if a previous run had written it.
    pub fn insert(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.lock().unwrap().insert(name.into(), bytes.into());
    }

    /// Committed content for `name`, if any.
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(name).cloned()
    }

    /// All committed names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().unwrap().is_empty()
    }
}

impl ImageDestination for MemoryDestination {
    fn create(&self, name: &str) -> io::Result<Box<dyn DestinationFile>> {
        Ok(Box::new(MemoryFile {
            name: name.to_string(),
            buf: Vec::new(),
            files: Arc::clone(&self.files),
        }))
    }

    fn exists(&self, name: &str) -> bool {
        self.files.lock().unwrap().contains_key(name)
    }
}

struct MemoryFile {
    name: String,
    buf: Vec<u8>,
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl Write for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl DestinationFile for MemoryFile {
    fn commit(self: Box<Self>) -> io::Result<()> {
        self.files.lock().unwrap().insert(self.name, self.buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // =========================================================================
    // FileSource
    // =========================================================================

    #[test]
    fn file_source_reads_content_and_reports_name() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dawn.jpg");
        fs::write(&path, b"jpeg bytes").unwrap();

        let source = FileSource::new(&path);
        assert_eq!(source.name(), "dawn.jpg");

        let mut content = Vec::new();
        source.open().unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content, b"jpeg bytes");
    }

    #[test]
    fn file_source_open_twice_yields_fresh_readers() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.png");
        fs::write(&path, b"content").unwrap();

        let source = FileSource::new(&path);
        let mut first = String::new();
        source.open().unwrap().read_to_string(&mut first).unwrap();
        let mut second = String::new();
        source.open().unwrap().read_to_string(&mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn file_source_missing_file_errors_on_open() {
        let source = FileSource::new("/nonexistent/photo.jpg");
        assert!(source.open().is_err());
    }

    // =========================================================================
    // MemorySource
    // =========================================================================

    #[test]
    fn memory_source_roundtrip() {
        let source = MemorySource::new("upload.jpg", b"uploaded".to_vec());
        assert_eq!(source.name(), "upload.jpg");

        let mut content = Vec::new();
        source.open().unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content, b"uploaded");
    }

    // =========================================================================
    // FileDestination
    // =========================================================================

    #[test]
    fn file_destination_commit_makes_file_visible() {
        let tmp = TempDir::new().unwrap();
        let dest = FileDestination::new(tmp.path());

        let mut file = dest.create("abc123/abc123-800w.webp").unwrap();
        file.write_all(b"variant data").unwrap();
        assert!(!dest.exists("abc123/abc123-800w.webp"));
        file.commit().unwrap();

        assert!(dest.exists("abc123/abc123-800w.webp"));
        let on_disk = fs::read(tmp.path().join("abc123/abc123-800w.webp")).unwrap();
        assert_eq!(on_disk, b"variant data");
    }

    #[test]
    fn file_destination_uncommitted_write_leaves_nothing() {
        let tmp = TempDir::new().unwrap();
        let dest = FileDestination::new(tmp.path());

        {
            let mut file = dest.create("abc123/abc123-480w.webp").unwrap();
            file.write_all(b"partial").unwrap();
            // dropped without commit
        }

        assert!(!dest.exists("abc123/abc123-480w.webp"));
        // The temp file is cleaned up too — the directory is empty.
        let leftovers: Vec<_> = fs::read_dir(tmp.path().join("abc123"))
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn file_destination_routes_thumbnails() {
        let tmp = TempDir::new().unwrap();
        let dest = FileDestination::new(tmp.path());

        let mut file = dest.create("thumb-abc123def456.webp").unwrap();
        file.write_all(b"thumb data").unwrap();
        file.commit().unwrap();

        assert!(dest.exists("thumb-abc123def456.webp"));
        assert!(
            tmp.path()
                .join(".thumbs/thumb-abc123def456.webp")
                .exists()
        );
    }

    #[test]
    fn file_destination_exists_false_for_unwritten() {
        let tmp = TempDir::new().unwrap();
        let dest = FileDestination::new(tmp.path());
        assert!(!dest.exists("abc123/abc123-800w.webp"));
        assert!(!dest.exists("thumb-abc123.webp"));
    }

    // =========================================================================
    // MemoryDestination
    // =========================================================================

    #[test]
    fn memory_destination_commit_and_get() {
        let dest = MemoryDestination::new();
        let mut file = dest.create("x/y.webp").unwrap();
        file.write_all(b"data").unwrap();
        assert!(!dest.exists("x/y.webp"));
        file.commit().unwrap();

        assert!(dest.exists("x/y.webp"));
        assert_eq!(dest.get("x/y.webp"), Some(b"data".to_vec()));
        assert_eq!(dest.len(), 1);
    }

    #[test]
    fn memory_destination_preseed_counts_as_existing() {
        let dest = MemoryDestination::new();
        dest.insert("thumb-abc.webp", b"old".to_vec());
        assert!(dest.exists("thumb-abc.webp"));
        assert_eq!(dest.names(), vec!["thumb-abc.webp".to_string()]);
    }
}
