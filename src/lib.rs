//! # photogrid
//!
//! The image engine behind a static photography-portfolio builder: given
//! source photographs and a declarative placement of those photographs on a
//! coordinate grid, it derives a stable identity for every photo from its
//! content, produces a fixed set of resized variants exactly once regardless
//! of re-runs, and validates the placement grids before anything renders.
//!
//! # Architecture: Hash → Validate → Generate
//!
//! ```text
//! 1. Identity   photo bytes  →  hash ID          (SHA-256, first 12 hex chars)
//! 2. Validate   placements   →  accept / reject  (bounds + occupancy, per grid)
//! 3. Generate   photo        →  variants         (skip when all outputs exist)
//! ```
//!
//! The stages are deliberately independent:
//!
//! - **Content addressing**: outputs are named purely from hash +
//!   configuration, so identity survives renames and re-uploads, and the
//!   existence of the constructed filenames doubles as the processing cache.
//! - **All-or-nothing grids**: a layout either validates completely or the
//!   render is refused — there is no partially valid gallery.
//! - **Pure layout math**: the packing algorithms are plain functions from
//!   image dimensions to pixel rectangles; rendering consumes the result and
//!   nothing is persisted.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | Hash-ID derivation and the variant/thumbnail filename conventions |
//! | [`io`] | Source/Destination capability traits + filesystem and in-memory impls |
//! | [`imaging`] | Decode, Lanczos3 resize, WebP/JPEG encode, dimension math |
//! | [`processor`] | Content-addressed variant generator and rayon batch driver |
//! | [`grid`] | Placement model and the occupancy-map validator (desktop + mobile) |
//! | [`layout`] | Justified, fixed-column, and manual packing algorithms |
//! | [`config`] | Hierarchical `config.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting — pure `format_*` functions |
//!
//! # Design Decisions
//!
//! ## Filenames Are the Cache
//!
//! The processor never keeps an index of what it has generated. Expected
//! output names are computed from the hash ID before decoding, and the
//! destination is asked whether each exists; a complete set skips the image.
//! Where existence checks are cheap (local filesystems) this replaces a
//! lookup table outright. A backend with expensive existence checks (object
//! storage) would wrap its own key-value index behind the same
//! [`io::ImageDestination`] trait.
//!
//! ## Two Coordinate Systems on One Gallery
//!
//! Desktop and mobile placements are two named sub-structures, each with its
//! own width, validated by one shared pure function parameterized by width
//! and placements. Identical coordinates on the two grids never conflict and
//! the same photo may appear in both.
//!
//! ## Lossy Re-encoding Is Intentional
//!
//! Variants exist to be served, not archived. One configured encoding (WebP
//! by default, through libwebp) at one quality factor, deterministic for a
//! given source — re-running the generator over an unchanged library is a
//! no-op.
//!
//! ## No I/O in the Core Logic
//!
//! The generator reads through [`io::ImageSource`] and writes through
//! [`io::ImageDestination`]. Uploaded photos, filesystem batches, and test
//! buffers all run the identical pipeline; the filesystem implementation
//! adds temp-file/rename commits so every target is either fully written or
//! absent.

pub mod config;
pub mod grid;
pub mod imaging;
pub mod io;
pub mod layout;
pub mod naming;
pub mod output;
pub mod processor;

#[cfg(test)]
pub(crate) mod test_helpers;
