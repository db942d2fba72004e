//! Pure Rust rasterizer built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::ImageReader` with content sniffing |
//! | Crop to the visible region | `DynamicImage::crop_imm` |
//! | Scale | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Draw onto the surface | `image::imageops::overlay` onto an opaque black RGBA surface |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! Cropping happens in source space before scaling (see
//! [`CoverPlacement::source_crop`](super::calculations::CoverPlacement::source_crop)),
//! so an extreme panorama never turns into a multi-gigapixel intermediate.
//! Transparent pixels are composited over black, as a JPEG canvas export would.

use super::backend::{Dimensions, ImageRasterizer, RasterError};
use super::calculations::calculate_cover_fit;
use super::params::{Quality, VariantSpec};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::LazyLock;
use std::time::Instant;

/// Largest drawing surface we agree to allocate (same cap browsers use for canvases).
const MAX_SURFACE_PIXELS: u64 = 16_384 * 16_384;

/// Extensions accepted for ingestion, paired with the decoder they need.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Rasterizer using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-step mapping.
pub struct RustRasterizer;

impl RustRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, RasterError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RasterError::Decode(e.to_string()))
}

/// Decode an in-memory image, rejecting degenerate dimensions.
fn decode(bytes: &[u8]) -> Result<DynamicImage, RasterError> {
    let img = reader(bytes)?
        .decode()
        .map_err(|e| RasterError::Decode(e.to_string()))?;
    if img.width() == 0 || img.height() == 0 {
        return Err(RasterError::Decode(format!(
            "image has no pixels ({}x{})",
            img.width(),
            img.height()
        )));
    }
    Ok(img)
}

/// Allocate an opaque black drawing surface of exactly `width`x`height`.
fn new_surface(width: u32, height: u32) -> Result<RgbaImage, RasterError> {
    let pixels = width as u64 * height as u64;
    if pixels == 0 || pixels > MAX_SURFACE_PIXELS {
        return Err(RasterError::Context { width, height });
    }
    Ok(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])))
}

fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, RasterError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.value())
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| RasterError::Encode(e.to_string()))?;
    if buf.is_empty() {
        return Err(RasterError::Encode("encoder wrote no bytes".into()));
    }
    Ok(buf)
}

impl ImageRasterizer for RustRasterizer {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, RasterError> {
        let (width, height) = reader(bytes)?
            .into_dimensions()
            .map_err(|e| RasterError::Decode(e.to_string()))?;
        Ok(Dimensions { width, height })
    }

    fn cover_fit(&self, bytes: &[u8], spec: &VariantSpec) -> Result<Vec<u8>, RasterError> {
        let started = Instant::now();
        let img = decode(bytes)?;
        let mut surface = new_surface(spec.width, spec.height)?;

        let source = (img.width(), img.height());
        let crop = calculate_cover_fit(source, spec.target()).source_crop(source, spec.target());
        let visible = img
            .crop_imm(crop.x, crop.y, crop.width, crop.height)
            .resize_exact(spec.width, spec.height, FilterType::Lanczos3)
            .to_rgba8();
        imageops::overlay(&mut surface, &visible, 0, 0);

        let encoded = encode_jpeg(&DynamicImage::ImageRgba8(surface), spec.quality)?;
        log::debug!(
            "{} {}x{} from {}x{} in {:?} ({} bytes)",
            spec.kind,
            spec.width,
            spec.height,
            source.0,
            source.1,
            started.elapsed(),
            encoded.len()
        );
        Ok(encoded)
    }
}
