//! Image operations — everything statically linked, no system dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** (JPEG, PNG, TIFF, WebP) | `image::load_from_memory` |
//! | **Resize** | `image::imageops`, Lanczos3 |
//! | **Encode → WebP** | bundled libwebp via the `webp` crate (lossy, quality-controlled) |
//! | **Encode → JPEG** | `image::codecs::jpeg` |
//!
//! The module is split into:
//! - **Calculations**: pure dimension math (unit testable without pixels)
//! - **Parameters**: [`Quality`] and [`OutputFormat`]
//! - **Codec**: decode / resize / encode over in-memory buffers
//!
//! Everything operates on byte buffers and [`image::DynamicImage`] values,
//! never on paths — sources and destinations are abstracted one level up.

pub mod calculations;
pub mod codec;
mod params;

pub use calculations::variant_height;
pub use codec::{CodecError, decode, encode, resize};
pub use params::{OutputFormat, Quality};
