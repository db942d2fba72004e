//! High-level image operations.
//!
//! These functions combine variant specs with rasterizer execution. Each
//! source image is rendered twice (thumbnail and medium); the two renders run
//! concurrently on the rayon pool and are joined before returning.

use super::backend::{ImageRasterizer, RasterError};
use super::params::{Quality, VariantKind, VariantPlan, VariantSpec};
use thiserror::Error;

/// A variant render that failed, tagged with which variant it was.
#[derive(Error, Debug)]
#[error("{kind} variant failed: {source}")]
pub struct VariantError {
    pub kind: VariantKind,
    pub source: RasterError,
}

/// Get natural image dimensions using the rasterizer.
pub fn get_dimensions(
    rasterizer: &impl ImageRasterizer,
    bytes: &[u8],
) -> Result<(u32, u32), RasterError> {
    let dims = rasterizer.identify(bytes)?;
    Ok((dims.width, dims.height))
}

/// One encoded rendition of a source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizedVariant {
    pub kind: VariantKind,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    /// Encoded JPEG data.
    pub bytes: Vec<u8>,
}

/// Both renditions of one source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPair {
    pub thumbnail: ResizedVariant,
    pub medium: ResizedVariant,
}

/// Render a single cover-fit variant.
pub fn create_variant(
    rasterizer: &impl ImageRasterizer,
    bytes: &[u8],
    spec: &VariantSpec,
) -> Result<ResizedVariant, VariantError> {
    let encoded = rasterizer
        .cover_fit(bytes, spec)
        .map_err(|source| VariantError {
            kind: spec.kind,
            source,
        })?;
    Ok(ResizedVariant {
        kind: spec.kind,
        width: spec.width,
        height: spec.height,
        quality: spec.quality,
        bytes: encoded,
    })
}

/// Render both variants of a source image concurrently.
///
/// Waits for both renders. If either fails the whole pair fails; when both
/// fail, the thumbnail's error is reported.
pub fn create_variants(
    rasterizer: &impl ImageRasterizer,
    bytes: &[u8],
    plan: &VariantPlan,
) -> Result<VariantPair, VariantError> {
    let (thumbnail, medium) = rayon::join(
        || create_variant(rasterizer, bytes, &plan.thumbnail),
        || create_variant(rasterizer, bytes, &plan.medium),
    );
    Ok(VariantPair {
        thumbnail: thumbnail?,
        medium: medium?,
    })
}
