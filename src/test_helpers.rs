//! Shared test utilities for the coverpack test suite.
//!
//! Synthetic image encoders and a ZIP reader, so tests never depend on
//! fixture files on disk.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = jpeg_bytes(800, 600);
//! let zip = archive.serialize().unwrap();
//! let files = read_zip(&zip);
//! let medium = decode_jpeg(&files["001/001.jpg"]);
//! assert_eq!((medium.width(), medium.height()), (640, 480));
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};

// =========================================================================
// Synthetic sources
// =========================================================================

/// A `width`x`height` RGB gradient encoded as JPEG.
///
/// Deterministic: the same size always yields the same bytes.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .encode_image(&img)
        .unwrap();
    out
}

/// A `width`x`height` RGBA image with a transparent left half, encoded as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([255, 0, 0, 0])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

/// Decode JPEG output, panicking with a clear message if it is not one.
pub fn decode_jpeg(bytes: &[u8]) -> DynamicImage {
    image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .unwrap_or_else(|e| panic!("output is not a valid JPEG: {e}"))
}

// =========================================================================
// Archive inspection
// =========================================================================

/// All file entries of a ZIP as `path -> contents`. Directory entries are skipped.
pub fn read_zip(bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let mut files = BTreeMap::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).unwrap();
        if entry.is_dir() {
            continue;
        }
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        files.insert(entry.name().to_string(), contents);
    }
    files
}
