//! CLI output formatting.
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects. The library core never
//! prints; everything user-visible flows through here from `main`.
//!
//! Entities follow a two-level pattern: a header line with a 3-digit
//! positional index, then indented context lines.
//!
//! ```text
//! 001 dawn.jpg
//!     hash: a1b2c3d4e5f6
//!     4 variants + thumbnail
//! 002 dusk.jpg
//!     hash: 0f9e8d7c6b5a
//!     cached
//! ```

use crate::grid::{GalleryLayout, Placement};
use crate::processor::BatchEntry;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Header + context lines for every image in a batch.
pub fn format_batch_report(entries: &[BatchEntry]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.name));
        match &entry.result {
            Ok(outcome) => {
                lines.push(format!("    hash: {}", outcome.hash_id));
                if outcome.skipped {
                    lines.push("    cached".to_string());
                } else {
                    let variants = outcome.written.len().saturating_sub(1);
                    lines.push(format!("    {variants} variants + thumbnail"));
                }
            }
            Err(error) => {
                lines.push(format!("    error: {error}"));
            }
        }
    }
    lines
}

/// Summary of both grids of a validated layout.
pub fn format_layout_report(layout: &GalleryLayout) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!(
        "Desktop grid ({} columns, {} placements)",
        layout.grid_width,
        layout.placements.len()
    ));
    lines.extend(placement_lines(&layout.placements));

    if layout.has_mobile_layout() {
        lines.push(String::new());
        lines.push(format!(
            "Mobile grid ({} columns, {} placements)",
            layout.effective_mobile_grid_width(),
            layout.mobile_placements.len()
        ));
        lines.extend(placement_lines(&layout.mobile_placements));
    }

    lines
}

fn placement_lines(placements: &[Placement]) -> Vec<String> {
    placements
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let pos = &p.position;
            format!(
                "    {} {} ({},{})-({},{})",
                format_index(i + 1),
                p.photo_ref,
                pos.top_left_x,
                pos.top_left_y,
                pos.bottom_right_x,
                pos.bottom_right_y
            )
        })
        .collect()
}

pub fn print_batch_report(entries: &[BatchEntry]) {
    for line in format_batch_report(entries) {
        println!("{line}");
    }
}

pub fn print_layout_report(layout: &GalleryLayout) {
    for line in format_layout_report(layout) {
        println!("{line}");
    }
}
