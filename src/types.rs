//! Shared types passed from ingestion into the batch pipeline.

use crate::imaging::supported_input_extensions;
use serde::Serialize;

/// Accepted input formats. Anything else is filtered out at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageKind {
    Jpeg,
    Png,
    WebP,
}

impl ImageKind {
    /// Detect the kind from a filename's extension (case-insensitive).
    ///
    /// Returns `None` for extensions without a compiled-in decoder.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        if !supported_input_extensions().contains(&ext.as_str()) {
            return None;
        }
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "webp" => Some(ImageKind::WebP),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::WebP => "image/webp",
        }
    }
}

/// One raw input file: its original name and undecoded content.
///
/// Lives only until its variants are produced or it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Base filename, extension included (e.g. `001_badge.png`).
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl SourceImage {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn kind(&self) -> Option<ImageKind> {
        ImageKind::from_filename(&self.filename)
    }
}
