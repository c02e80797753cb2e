//! Parameter types for image encoding.
//!
//! These are the caller-supplied knobs of the variant set: one output
//! encoding and one quality factor, fixed per configuration.

use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100). Clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Output encoding for all generated variants and thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Webp,
    Jpeg,
}

impl OutputFormat {
    /// File extension used in output names.
    pub fn ext(self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(80).value(), 80);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_80() {
        assert_eq!(Quality::default().value(), 80);
    }

    #[test]
    fn format_extensions() {
        assert_eq!(OutputFormat::Webp.ext(), "webp");
        assert_eq!(OutputFormat::Jpeg.ext(), "jpg");
    }

    #[test]
    fn format_deserializes_lowercase() {
        let format: OutputFormat = serde_json::from_str("\"webp\"").unwrap();
        assert_eq!(format, OutputFormat::Webp);
        let format: OutputFormat = serde_json::from_str("\"jpeg\"").unwrap();
        assert_eq!(format, OutputFormat::Jpeg);
    }
}
