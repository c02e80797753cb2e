//! Content-derived identity and filename conventions for processed images.
//!
//! Every photograph is identified by its **hash ID**: the first 12 hex
//! characters of the SHA-256 digest of its exact byte content. Byte-identical
//! files collapse to one identity regardless of their on-disk names, and the
//! hash ID is a pure function of content — no mtimes, no paths.
//!
//! All output names derive from the hash ID and the configured widths, so the
//! full set of expected outputs is known *before* any decoding happens:
//!
//! ```text
//! a1b2c3d4e5f6/a1b2c3d4e5f6-800w.webp    # variant, grouped under a hash dir
//! thumb-a1b2c3d4e5f6.webp                # thumbnail, routed to .thumbs/
//! ```
//!
//! This module is the single authority for these conventions; the processor,
//! destinations, and CLI all go through it.

use sha2::{Digest, Sha256};
use std::io::{self, Read};

/// Number of hex characters of the SHA-256 digest used as the identity key.
pub const HASH_ID_LEN: usize = 12;

/// Directory that filesystem destinations route thumbnails into.
pub const THUMBS_DIR: &str = ".thumbs";

/// Prefix that marks a relative name as a thumbnail.
const THUMB_PREFIX: &str = "thumb-";

/// Compute the hash ID for a stream of image bytes.
///
/// Streams the content through SHA-256 without buffering the whole file,
/// then truncates the hex digest to [`HASH_ID_LEN`] characters.
pub fn hash_id<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    io::copy(reader, &mut hasher)?;
    let digest = hasher.finalize();
    let mut hex = format!("{digest:x}");
    hex.truncate(HASH_ID_LEN);
    Ok(hex)
}

/// Filename of one resized variant: `{hash12}-{width}w.<ext>`.
pub fn variant_filename(hash_id: &str, width: u32, ext: &str) -> String {
    format!("{hash_id}-{width}w.{ext}")
}

/// Destination-relative path of a variant: variants are grouped under a
/// directory named by their hash ID.
pub fn variant_relpath(hash_id: &str, width: u32, ext: &str) -> String {
    format!("{hash_id}/{}", variant_filename(hash_id, width, ext))
}

/// Filename of a thumbnail: `thumb-{hash12}.<ext>`.
///
/// Thumbnails are passed to destinations under this bare name; filesystem
/// destinations recognize the `thumb-` prefix and place the file in
/// [`THUMBS_DIR`].
pub fn thumbnail_filename(hash_id: &str, ext: &str) -> String {
    format!("{THUMB_PREFIX}{hash_id}.{ext}")
}

/// Whether a destination-relative name denotes a thumbnail.
pub fn is_thumbnail_name(name: &str) -> bool {
    name.starts_with(THUMB_PREFIX)
}
