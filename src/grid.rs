//! Placement grid model and validation.
//!
//! A gallery layout binds photo references to rectangles on an integer grid:
//! four 1-based inclusive coordinates inside a grid of declared column count.
//! A layout owns up to two independent placement sets — desktop and mobile —
//! each with its own width. The two grids are never cross-compatible:
//! identical coordinates in both never conflict, and the same photo may
//! appear in both.
//!
//! Validation guarantees geometric consistency before anything is rendered:
//! every placement in bounds, no two placements sharing a cell. It is pure
//! and side-effect-free, cheap relative to encoding, and re-run on every
//! generation pass rather than cached.
//!
//! Bounds are asymmetric on purpose: `bottom_right_x` is checked against the
//! grid width, but y has no upper bound — galleries grow vertically without
//! limit. The top-left-before-bottom-right check already excludes
//! negative-height rectangles.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Mobile grids fall back to this width when placements exist but no width
/// was declared.
pub const DEFAULT_MOBILE_GRID_WIDTH: u32 = 6;

/// A photo's rectangle on the grid: 1-based, inclusive on both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPosition {
    pub top_left_x: u32,
    pub top_left_y: u32,
    pub bottom_right_x: u32,
    pub bottom_right_y: u32,
}

/// Binds a photo reference to a position on the grid.
///
/// The reference is opaque to validation — persistence hands us hash IDs
/// (or legacy filenames) and rendering resolves them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub photo_ref: String,
    pub position: GridPosition,
}

/// Declarative placement of a gallery's photos on desktop and mobile grids.
///
/// Authored externally (builder UI via the persistence layer) and handed to
/// [`validate`](GalleryLayout::validate) as an immutable batch before every
/// render.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryLayout {
    pub grid_width: u32,
    pub placements: Vec<Placement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_grid_width: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mobile_placements: Vec<Placement>,
}

/// Which of the two independent grids an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Desktop,
    Mobile,
}

impl fmt::Display for GridKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridKind::Desktop => write!(f, "desktop"),
            GridKind::Mobile => write!(f, "mobile"),
        }
    }
}

/// A single grid's validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("grid width must be at least 1")]
    WidthNotPositive,
    #[error("placement {index} ({photo_ref}) has coordinates less than 1")]
    CoordinateBelowOne { index: usize, photo_ref: String },
    #[error("placement {index} ({photo_ref}) has bottom-right before top-left")]
    InvertedRectangle { index: usize, photo_ref: String },
    #[error(
        "placement {index} ({photo_ref}) extends beyond grid width {grid_width}: bottom_right_x={bottom_right_x}"
    )]
    BeyondGridWidth {
        index: usize,
        photo_ref: String,
        grid_width: u32,
        bottom_right_x: u32,
    },
    #[error(
        "placement {second} ({second_ref}) overlaps placement {first} ({first_ref}) at cell ({x},{y})"
    )]
    Overlap {
        first: usize,
        first_ref: String,
        second: usize,
        second_ref: String,
        x: u32,
        y: u32,
    },
}

/// A validation failure tagged with the grid it occurred on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} grid: {error}")]
pub struct GridError {
    pub kind: GridKind,
    pub error: PlacementError,
}

/// Validate one grid: declared width, per-placement bounds, and overlap via
/// an occupancy map.
///
/// The occupancy map is transient — rebuilt here on every call, keyed by
/// cell, mapping to the claiming placement's index. The second claim on an
/// occupied cell fails with both indices and the offending cell.
///
/// Zero placements is valid.
pub fn validate_placements(
    grid_width: u32,
    placements: &[Placement],
) -> Result<(), PlacementError> {
    if grid_width == 0 {
        return Err(PlacementError::WidthNotPositive);
    }

    let mut occupied: HashMap<(u32, u32), usize> = HashMap::new();

    for (index, placement) in placements.iter().enumerate() {
        let pos = &placement.position;
        if pos.top_left_x < 1 || pos.top_left_y < 1 {
            return Err(PlacementError::CoordinateBelowOne {
                index,
                photo_ref: placement.photo_ref.clone(),
            });
        }
        if pos.bottom_right_x < pos.top_left_x || pos.bottom_right_y < pos.top_left_y {
            return Err(PlacementError::InvertedRectangle {
                index,
                photo_ref: placement.photo_ref.clone(),
            });
        }
        if pos.bottom_right_x > grid_width {
            return Err(PlacementError::BeyondGridWidth {
                index,
                photo_ref: placement.photo_ref.clone(),
                grid_width,
                bottom_right_x: pos.bottom_right_x,
            });
        }

        for x in pos.top_left_x..=pos.bottom_right_x {
            for y in pos.top_left_y..=pos.bottom_right_y {
                if let Some(&first) = occupied.get(&(x, y)) {
                    return Err(PlacementError::Overlap {
                        first,
                        first_ref: placements[first].photo_ref.clone(),
                        second: index,
                        second_ref: placement.photo_ref.clone(),
                        x,
                        y,
                    });
                }
                occupied.insert((x, y), index);
            }
        }
    }

    Ok(())
}

impl GalleryLayout {
    /// Validate both grids. Desktop and mobile are validated independently
    /// with disjoint occupancy maps; the first failure is returned, tagged
    /// with its grid.
    pub fn validate(&self) -> Result<(), GridError> {
        validate_placements(self.grid_width, &self.placements).map_err(|error| GridError {
            kind: GridKind::Desktop,
            error,
        })?;

        validate_placements(self.effective_mobile_grid_width(), &self.mobile_placements)
            .map_err(|error| GridError {
                kind: GridKind::Mobile,
                error,
            })?;

        Ok(())
    }

    /// Mobile width with the fallback applied for layouts that declare
    /// mobile placements but no mobile width.
    pub fn effective_mobile_grid_width(&self) -> u32 {
        match self.mobile_grid_width {
            Some(width) if width > 0 => width,
            _ => DEFAULT_MOBILE_GRID_WIDTH,
        }
    }

    /// Whether a separate mobile layout is configured.
    pub fn has_mobile_layout(&self) -> bool {
        self.mobile_grid_width.is_some_and(|w| w > 0) && !self.mobile_placements.is_empty()
    }

    /// Every photo reference used by either grid, in placement order,
    /// de-duplicated. The same photo appearing on both grids is listed once.
    pub fn photo_refs(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        for placement in self.placements.iter().chain(&self.mobile_placements) {
            let photo_ref = placement.photo_ref.as_str();
            if !refs.contains(&photo_ref) {
                refs.push(photo_ref);
            }
        }
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(photo_ref: &str, tlx: u32, tly: u32, brx: u32, bry: u32) -> Placement {
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

    // =========================================================================
    // validate_placements — bounds
    // =========================================================================

    #[test]
    fn empty_grid_is_valid() {
        assert!(validate_placements(12, &[]).is_ok());
    }

    #[test]
    fn zero_width_rejected_even_without_placements() {
        assert_eq!(
            validate_placements(0, &[]),
            Err(PlacementError::WidthNotPositive)
        );
    }

    #[test]
    fn single_cell_placement_valid() {
        assert!(validate_placements(12, &[placement("a", 1, 1, 1, 1)]).is_ok());
    }

    #[test]
    fn full_width_placement_valid() {
        assert!(validate_placements(12, &[placement("a", 1, 1, 12, 3)]).is_ok());
    }

    #[test]
    fn zero_coordinate_rejected() {
        let result = validate_placements(12, &[placement("a", 0, 1, 2, 2)]);
        assert!(matches!(
            result,
            Err(PlacementError::CoordinateBelowOne { index: 0, .. })
        ));
    }

    #[test]
    fn inverted_x_rejected() {
        let result = validate_placements(12, &[placement("a", 5, 1, 3, 2)]);
        assert!(matches!(
            result,
            Err(PlacementError::InvertedRectangle { index: 0, .. })
        ));
    }

    #[test]
    fn inverted_y_rejected() {
        let result = validate_placements(12, &[placement("a", 1, 5, 2, 3)]);
        assert!(matches!(
            result,
            Err(PlacementError::InvertedRectangle { .. })
        ));
    }

    #[test]
    fn beyond_grid_width_rejected() {
        let result = validate_placements(12, &[placement("a", 10, 1, 13, 2)]);
        assert_eq!(
            result,
            Err(PlacementError::BeyondGridWidth {
                index: 0,
                photo_ref: "a".into(),
                grid_width: 12,
                bottom_right_x: 13,
            })
        );
    }

    #[test]
    fn tall_placement_has_no_vertical_bound() {
        // Galleries grow vertically without limit.
        assert!(validate_placements(12, &[placement("a", 1, 1, 3, 100_000)]).is_ok());
    }

    // =========================================================================
    // validate_placements — overlap
    // =========================================================================

    #[test]
    fn side_by_side_halves_valid() {
        // grid_width=12, A:(1,1)-(6,2), B:(7,1)-(12,2)
        let placements = [
            placement("a", 1, 1, 6, 2),
            placement("b", 7, 1, 12, 2),
        ];
        assert!(validate_placements(12, &placements).is_ok());
    }

    #[test]
    fn one_column_overlap_reports_first_shared_cell() {
        // Widening B to (6,1)-(12,2) collides with A at cell (6,1).
        let placements = [
            placement("a", 1, 1, 6, 2),
            placement("b", 6, 1, 12, 2),
        ];
        assert_eq!(
            validate_placements(12, &placements),
            Err(PlacementError::Overlap {
                first: 0,
                first_ref: "a".into(),
                second: 1,
                second_ref: "b".into(),
                x: 6,
                y: 1,
            })
        );
    }

    #[test]
    fn identical_rectangles_overlap() {
        let placements = [
            placement("a", 2, 2, 4, 4),
            placement("b", 2, 2, 4, 4),
        ];
        assert!(matches!(
            validate_placements(12, &placements),
            Err(PlacementError::Overlap {
                first: 0,
                second: 1,
                ..
            })
        ));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let placements = [
            placement("a", 1, 1, 3, 3),
            placement("b", 4, 1, 6, 3),
            placement("c", 1, 4, 6, 5),
        ];
        assert!(validate_placements(12, &placements).is_ok());
    }

    #[test]
    fn single_shared_corner_cell_overlaps() {
        let placements = [
            placement("a", 1, 1, 3, 3),
            placement("b", 3, 3, 5, 5),
        ];
        assert!(matches!(
            validate_placements(12, &placements),
            Err(PlacementError::Overlap { x: 3, y: 3, .. })
        ));
    }

    // =========================================================================
    // GalleryLayout::validate — two independent grids
    // =========================================================================

    #[test]
    fn identical_coordinates_on_both_grids_never_conflict() {
        let layout = GalleryLayout {
            grid_width: 12,
            placements: vec![placement("a", 1, 1, 6, 2)],
            mobile_grid_width: Some(6),
            mobile_placements: vec![placement("b", 1, 1, 6, 2)],
        };
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn same_photo_may_appear_in_both_grids() {
        let layout = GalleryLayout {
            grid_width: 12,
            placements: vec![placement("a", 1, 1, 6, 2)],
            mobile_grid_width: Some(6),
            mobile_placements: vec![placement("a", 1, 1, 6, 4)],
        };
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn mobile_failure_is_tagged_mobile() {
        let layout = GalleryLayout {
            grid_width: 12,
            placements: vec![],
            mobile_grid_width: Some(6),
            mobile_placements: vec![placement("a", 1, 1, 7, 2)],
        };
        let err = layout.validate().unwrap_err();
        assert_eq!(err.kind, GridKind::Mobile);
        assert!(matches!(
            err.error,
            PlacementError::BeyondGridWidth { bottom_right_x: 7, .. }
        ));
        assert!(err.to_string().starts_with("mobile grid:"));
    }

    #[test]
    fn desktop_failure_is_tagged_desktop() {
        let layout = GalleryLayout {
            grid_width: 0,
            ..GalleryLayout::default()
        };
        let err = layout.validate().unwrap_err();
        assert_eq!(err.kind, GridKind::Desktop);
        assert_eq!(err.error, PlacementError::WidthNotPositive);
    }

    #[test]
    fn mobile_width_defaults_to_six() {
        let layout = GalleryLayout {
            grid_width: 12,
            placements: vec![],
            mobile_grid_width: None,
            mobile_placements: vec![placement("a", 1, 1, 6, 2)],
        };
        assert_eq!(layout.effective_mobile_grid_width(), 6);
        assert!(layout.validate().is_ok());

        // One column past the default width fails.
        let layout = GalleryLayout {
            mobile_placements: vec![placement("a", 1, 1, 7, 2)],
            ..layout
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn has_mobile_layout_requires_width_and_placements() {
        let mut layout = GalleryLayout {
            grid_width: 12,
            ..GalleryLayout::default()
        };
        assert!(!layout.has_mobile_layout());

        layout.mobile_grid_width = Some(6);
        assert!(!layout.has_mobile_layout());

        layout.mobile_placements = vec![placement("a", 1, 1, 2, 2)];
        assert!(layout.has_mobile_layout());
    }

    #[test]
    fn photo_refs_deduplicates_across_grids() {
        let layout = GalleryLayout {
            grid_width: 12,
            placements: vec![placement("a", 1, 1, 2, 2), placement("b", 3, 1, 4, 2)],
            mobile_grid_width: Some(6),
            mobile_placements: vec![placement("b", 1, 1, 2, 2), placement("c", 3, 1, 4, 2)],
        };
        assert_eq!(layout.photo_refs(), vec!["a", "b", "c"]);
    }

    // =========================================================================
    // Wire shape
    // =========================================================================

    #[test]
    fn deserializes_wire_shape() {
        let json = r#"{
            "grid_width": 12,
            "placements": [{
                "photo_ref": "a1b2c3d4e5f6",
                "position": {
                    "top_left_x": 1, "top_left_y": 1,
                    "bottom_right_x": 6, "bottom_right_y": 2
                }
            }],
            "mobile_grid_width": 6,
            "mobile_placements": []
        }"#;

        let layout: GalleryLayout = serde_json::from_str(json).unwrap();
        assert_eq!(layout.grid_width, 12);
        assert_eq!(layout.placements.len(), 1);
        assert_eq!(layout.placements[0].photo_ref, "a1b2c3d4e5f6");
        assert_eq!(layout.placements[0].position.bottom_right_x, 6);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn mobile_fields_are_optional_on_the_wire() {
        let json = r#"{"grid_width": 12, "placements": []}"#;
        let layout: GalleryLayout = serde_json::from_str(json).unwrap();
        assert_eq!(layout.mobile_grid_width, None);
        assert!(layout.mobile_placements.is_empty());
        assert!(layout.validate().is_ok());
    }
}
