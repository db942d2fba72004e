//! Rasterizer trait and shared types.
//!
//! The [`ImageRasterizer`] trait is the whole pixel pipeline behind one seam:
//! decode → cover-fit scale and crop → encode. The rest of the crate only
//! sees encoded bytes going in and encoded bytes coming out.
//!
//! The production implementation is
//! [`RustRasterizer`](super::rust_backend::RustRasterizer), built on the
//! `image` crate.

use super::params::VariantSpec;
use thiserror::Error;

/// Failures of a single rasterization call.
///
/// All three are per-file faults: the batch records the file as failed and
/// moves on.
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to create {width}x{height} drawing surface")]
    Context { width: u32, height: u32 },
    #[error("Encoding produced no data: {0}")]
    Encode(String),
}

/// Natural dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image rasterization backends.
///
/// `Sync` is required because both variants of a source image are rendered
/// concurrently on the rayon pool from a shared reference.
pub trait ImageRasterizer: Sync {
    /// Decode just enough to report natural dimensions.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, RasterError>;

    /// Decode `bytes`, cover-fit them into `spec`'s box, and encode as JPEG.
    fn cover_fit(&self, bytes: &[u8], spec: &VariantSpec) -> Result<Vec<u8>, RasterError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{Quality, VariantKind};
    use std::sync::Mutex;

    /// Mock rasterizer that records calls without touching pixels.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon::join.
    #[derive(Default)]
    pub struct MockRasterizer {
        pub identify_results: Mutex<Vec<Dimensions>>,
        pub operations: Mutex<Vec<RecordedOp>>,
        /// Inputs that fail to decode.
        pub undecodable: Vec<Vec<u8>>,
        /// Variant kind whose encode step always fails.
        pub failing_kind: Option<VariantKind>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        CoverFit {
            input: String,
            kind: VariantKind,
            width: u32,
            height: u32,
            quality: u8,
        },
    }

    impl MockRasterizer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(dims: Vec<Dimensions>) -> Self {
            Self {
                identify_results: Mutex::new(dims),
                ..Self::default()
            }
        }

        pub fn failing_on(inputs: &[&[u8]]) -> Self {
            Self {
                undecodable: inputs.iter().map(|i| i.to_vec()).collect(),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        /// Cover-fit calls only, in recorded order.
        pub fn cover_fit_inputs(&self) -> Vec<String> {
            self.get_operations()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::CoverFit { input, .. } => Some(input),
                    RecordedOp::Identify(_) => None,
                })
                .collect()
        }
    }

    impl ImageRasterizer for MockRasterizer {
        fn identify(&self, bytes: &[u8]) -> Result<Dimensions, RasterError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(String::from_utf8_lossy(bytes).into_owned()));

            if self.undecodable.iter().any(|b| b == bytes) {
                return Err(RasterError::Decode("mock undecodable input".into()));
            }
            self.identify_results
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| RasterError::Decode("No mock dimensions".into()))
        }

        fn cover_fit(&self, bytes: &[u8], spec: &VariantSpec) -> Result<Vec<u8>, RasterError> {
            let input = String::from_utf8_lossy(bytes).into_owned();
            self.operations.lock().unwrap().push(RecordedOp::CoverFit {
                input: input.clone(),
                kind: spec.kind,
                width: spec.width,
                height: spec.height,
                quality: spec.quality.value(),
            });

            if self.undecodable.iter().any(|b| b == bytes) {
                return Err(RasterError::Decode("mock undecodable input".into()));
            }
            if self.failing_kind == Some(spec.kind) {
                return Err(RasterError::Encode("mock encoder failure".into()));
            }
            Ok(format!("{input}@{}x{}", spec.width, spec.height).into_bytes())
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockRasterizer::with_dimensions(vec![Dimensions {
            width: 800,
            height: 600,
        }]);

        let result = backend.identify(b"photo").unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "photo"));
    }

    #[test]
    fn mock_records_cover_fit() {
        let backend = MockRasterizer::new();
        let spec = VariantSpec {
            quality: Quality::new(75),
            ..VariantSpec::medium()
        };

        let out = backend.cover_fit(b"photo", &spec).unwrap();
        assert_eq!(out, b"photo@640x480");

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::CoverFit {
                kind: VariantKind::Medium,
                width: 640,
                height: 480,
                quality: 75,
                ..
            }
        ));
    }

    #[test]
    fn mock_fails_configured_inputs() {
        let backend = MockRasterizer::failing_on(&[b"broken"]);
        let result = backend.cover_fit(b"broken", &VariantSpec::thumbnail());
        assert!(matches!(result, Err(RasterError::Decode(_))));
        assert!(backend.cover_fit(b"fine", &VariantSpec::thumbnail()).is_ok());
    }

    #[test]
    fn raster_error_messages() {
        let err = RasterError::Context {
            width: 0,
            height: 320,
        };
        assert_eq!(err.to_string(), "Failed to create 0x320 drawing surface");
    }
}
