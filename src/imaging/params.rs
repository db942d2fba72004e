//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. They are the
//! interface between [`operations`](super::operations), which decides which
//! variants a source image gets, and the [`backend`](super::backend), which
//! does the pixel work.
//!
//! ## Types
//!
//! - [`Quality`] — JPEG quality (1–100, default 80). Clamped on construction.
//! - [`VariantKind`] — thumbnail or medium; owns the archive file naming.
//! - [`VariantSpec`] — one target box plus quality.
//! - [`VariantPlan`] — the pair of specs every source image is rendered to.

use crate::naming::GroupKey;
use serde::Serialize;
use std::fmt;

/// Quality setting for lossy JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    /// Build from a `0.0..=1.0` fraction, e.g. `0.8` → `80`.
    pub fn from_fraction(fraction: f32) -> Self {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u8;
        Self::new(percent)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Which rendition of a source image a variant is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Thumbnail,
    Medium,
}

impl VariantKind {
    pub fn label(self) -> &'static str {
        match self {
            VariantKind::Thumbnail => "thumbnail",
            VariantKind::Medium => "medium",
        }
    }

    /// Archive filename for this variant: `<key>.jpg` or `<key>_thumbnail.jpg`.
    pub fn file_name(self, key: &GroupKey) -> String {
        match self {
            VariantKind::Thumbnail => format!("{key}_thumbnail.jpg"),
            VariantKind::Medium => format!("{key}.jpg"),
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Target box and quality for one cover-fit variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSpec {
    pub kind: VariantKind,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

impl VariantSpec {
    pub fn thumbnail() -> Self {
        Self {
            kind: VariantKind::Thumbnail,
            width: 480,
            height: 320,
            quality: Quality::default(),
        }
    }

    pub fn medium() -> Self {
        Self {
            kind: VariantKind::Medium,
            width: 640,
            height: 480,
            quality: Quality::default(),
        }
    }

    pub fn target(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// The two variants produced for every source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPlan {
    pub thumbnail: VariantSpec,
    pub medium: VariantSpec,
}

impl Default for VariantPlan {
    fn default() -> Self {
        Self {
            thumbnail: VariantSpec::thumbnail(),
            medium: VariantSpec::medium(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::group_key;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_80() {
        assert_eq!(Quality::default().value(), 80);
    }

    #[test]
    fn quality_from_fraction() {
        assert_eq!(Quality::from_fraction(0.8).value(), 80);
        assert_eq!(Quality::from_fraction(1.0).value(), 100);
        assert_eq!(Quality::from_fraction(0.0).value(), 1);
        assert_eq!(Quality::from_fraction(7.0).value(), 100);
    }

    #[test]
    fn variant_file_names() {
        let key = group_key("001_badge.png");
        assert_eq!(VariantKind::Medium.file_name(&key), "001.jpg");
        assert_eq!(VariantKind::Thumbnail.file_name(&key), "001_thumbnail.jpg");
    }

    #[test]
    fn default_plan_sizes() {
        let plan = VariantPlan::default();
        assert_eq!(plan.thumbnail.target(), (480, 320));
        assert_eq!(plan.medium.target(), (640, 480));
        assert_eq!(plan.thumbnail.quality.value(), 80);
        assert_eq!(plan.medium.kind, VariantKind::Medium);
    }
}
