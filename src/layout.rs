//! Layout packing algorithms.
//!
//! Pure functions computing pixel positions for an ordered list of images,
//! used when a gallery has no explicit grid placements. Nothing here touches
//! pixels or the filesystem — inputs are references plus source dimensions,
//! outputs are [`LayoutItem`] rectangles consumed immediately by rendering
//! and never persisted.
//!
//! Three strategies:
//! - [`justified`] — row packing that scales each completed row to fill the
//!   container width exactly while preserving per-image aspect ratio.
//! - [`grid`] — fixed column count, each image at its natural aspect ratio
//!   within the column width.
//! - [`manual`] — pass-through computing pixel rectangles from
//!   caller-supplied row/column/span positions on square cells.
//!
//! Container width, gap, row height, and column count are explicit options —
//! multiple galleries with different presentation parameters coexist in one
//! process.

use serde::Serialize;
use thiserror::Error;

/// An image handed to the packing algorithms: a reference plus its source
/// dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutImage {
    pub reference: String,
    pub width: u32,
    pub height: u32,
}

impl LayoutImage {
    pub fn new(reference: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            reference: reference.into(),
            width,
            height,
        }
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// A positioned image in a computed layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutItem {
    pub reference: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_span: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_span: Option<u32>,
}

/// Options for [`justified`].
#[derive(Debug, Clone, Copy)]
pub struct JustifiedOptions {
    pub container_width: u32,
    /// Target row height; completed rows scale away from it uniformly.
    pub row_height: u32,
    pub gap: u32,
}

/// Options for [`grid`] and [`manual`].
#[derive(Debug, Clone, Copy)]
pub struct GridOptions {
    pub container_width: u32,
    pub columns: u32,
    pub gap: u32,
}

/// A caller-supplied position for [`manual`].
///
/// Spans below 1 are treated as 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualPosition {
    pub reference: String,
    pub row: u32,
    pub col: u32,
    pub col_span: u32,
    pub row_span: u32,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    #[error("column count must be at least 1")]
    NoColumns,
}

/// Justified row packing.
///
/// Images are laid into a running row at the target row height, each with
/// `width = row_height * aspect_ratio`. Once the accumulated width (with
/// gaps) reaches the container width the row is closed: every item scales
/// uniformly by `(container - gaps) / natural_widths` so the row spans the
/// container edge to edge, and the vertical cursor advances by the scaled
/// row height plus the gap. Item edges are computed in floating point and
/// rounded per edge, so rounding never accumulates across a row.
///
/// A trailing partial row is laid out unscaled at the natural row height.
pub fn justified(images: &[LayoutImage], opts: &JustifiedOptions) -> Vec<LayoutItem> {
    let container = opts.container_width as f64;
    let gap = opts.gap as f64;
    let row_height = opts.row_height as f64;

    let mut items = Vec::with_capacity(images.len());
    let mut row: Vec<(&LayoutImage, f64)> = Vec::new();
    let mut accumulated = 0.0;
    let mut y = 0u32;

    for image in images {
        let natural_width = row_height * image.aspect_ratio();
        row.push((image, natural_width));
        accumulated += natural_width + gap;

        if accumulated >= container {
            let gaps_total = gap * (row.len() as f64 - 1.0);
            let natural_total = accumulated - gap * row.len() as f64;
            let scale = (container - gaps_total) / natural_total;
            let scaled_height = (row_height * scale).round() as u32;

            let mut edge: f64 = 0.0;
            for (image, natural_width) in row.drain(..) {
                let left = edge.round() as u32;
                let right = (edge + natural_width * scale).round() as u32;
                items.push(LayoutItem {
                    reference: image.reference.clone(),
                    x: left,
                    y,
                    width: right.saturating_sub(left),
                    height: scaled_height,
                    col_span: None,
                    row_span: None,
                });
                edge += natural_width * scale + gap;
            }

            y += scaled_height + opts.gap;
            accumulated = 0.0;
        }
    }

    // Trailing partial row: natural size, no scaling.
    let mut x = 0u32;
    for (image, natural_width) in row {
        let width = natural_width as u32;
        items.push(LayoutItem {
            reference: image.reference.clone(),
            x,
            y,
            width,
            height: opts.row_height,
            col_span: None,
            row_span: None,
        });
        x += width + opts.gap;
    }

    items
}

/// Fixed-column grid.
///
/// Column width is `(container - gap*(columns-1)) / columns`; each image
/// keeps its own aspect ratio at that width. Item `i` lands at
/// `row = i / columns`, `col = i % columns`.
pub fn grid(images: &[LayoutImage], opts: &GridOptions) -> Result<Vec<LayoutItem>, LayoutError> {
    if opts.columns == 0 {
        return Err(LayoutError::NoColumns);
    }

    let total_gap = opts.gap * (opts.columns - 1);
    let col_width = opts.container_width.saturating_sub(total_gap) / opts.columns;

    let items = images
        .iter()
        .enumerate()
        .map(|(i, image)| {
            let height = (col_width as f64 / image.aspect_ratio()) as u32;
            let row = i as u32 / opts.columns;
            let col = i as u32 % opts.columns;

            LayoutItem {
                reference: image.reference.clone(),
                x: col * (col_width + opts.gap),
                y: row * (height + opts.gap),
                width: col_width,
                height,
                col_span: Some(1),
                row_span: Some(1),
            }
        })
        .collect();

    Ok(items)
}

/// Manual pass-through on square cells.
///
/// No packing decision is made: each position's pixel rectangle follows
/// directly from its row/column/span on a grid of square cells
/// (`row_height = col_width`). Spanning items absorb the gaps they cross.
pub fn manual(
    positions: &[ManualPosition],
    opts: &GridOptions,
) -> Result<Vec<LayoutItem>, LayoutError> {
    if opts.columns == 0 {
        return Err(LayoutError::NoColumns);
    }

    let total_gap = opts.gap * (opts.columns - 1);
    let col_width = opts.container_width.saturating_sub(total_gap) / opts.columns;
    let row_height = col_width;

    let items = positions
        .iter()
        .map(|pos| {
            let col_span = pos.col_span.max(1);
            let row_span = pos.row_span.max(1);

            LayoutItem {
                reference: pos.reference.clone(),
                x: pos.col * (col_width + opts.gap),
                y: pos.row * (row_height + opts.gap),
                width: col_width * col_span + opts.gap * (col_span - 1),
                height: row_height * row_span + opts.gap * (row_span - 1),
                col_span: Some(col_span),
                row_span: Some(row_span),
            }
        })
        .collect();

    Ok(items)
}
