//! Shared test utilities for the photogrid test suite.
//!
//! Provides synthetic image builders (real, decodable bytes — tests exercise
//! the actual codecs, not mocks of them), a deliberately broken source for
//! error paths, and small constructors for grid fixtures.

use crate::grid::{GalleryLayout, GridPosition, Placement};
use crate::io::ImageSource;
use image::{DynamicImage, RgbImage};
use std::io::{self, Cursor, Read};

// =========================================================================
// Synthetic images
// =========================================================================

/// A gradient test image; content varies with dimensions so differently
/// sized images hash differently.
pub fn test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

/// PNG-encoded bytes of a gradient test image.
pub fn test_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    test_image(width, height)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// JPEG-encoded bytes of a gradient test image.
pub fn test_jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    test_image(width, height)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

// =========================================================================
// Failing source
// =========================================================================

/// A source whose reader always errors, for exercising read-failure paths.
pub struct FailingSource {
    name: String,
}

pub fn failing_source(name: &str) -> FailingSource {
    FailingSource {
        name: name.to_string(),
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("simulated read failure"))
    }
}

impl ImageSource for FailingSource {
    fn open(&self) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(FailingReader))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// =========================================================================
// Grid fixtures
// =========================================================================

/// Shorthand placement constructor.
pub fn placement(photo_ref: &str, tlx: u32, tly: u32, brx: u32, bry: u32) -> Placement {
    Placement {
        photo_ref: photo_ref.to_string(),
        position: GridPosition {
            top_left_x: tlx,
            top_left_y: tly,
            bottom_right_x: brx,
            bottom_right_y: bry,
        },
    }
}

/// A small valid two-grid layout: two side-by-side photos on desktop, the
/// first stacked full-width on mobile.
pub fn sample_layout() -> GalleryLayout {
    GalleryLayout {
        grid_width: 12,
        placements: vec![
            placement("a1b2c3d4e5f6", 1, 1, 6, 2),
            placement("0123456789ab", 7, 1, 12, 2),
        ],
        mobile_grid_width: Some(6),
        mobile_placements: vec![placement("a1b2c3d4e5f6", 1, 1, 6, 4)],
    }
}
