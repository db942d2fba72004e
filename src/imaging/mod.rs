//! Cover-fit imaging on the pure-Rust `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Cover-fit → JPEG** | crop + Lanczos3 + `JpegEncoder` |
//! | **Variant pair** | two cover-fits joined with `rayon::join` |
//!
//! The module is split into:
//! - **Calculations**: Pure cover-fit geometry (unit testable)
//! - **Parameters**: Variant specs, quality, naming
//! - **Backend**: [`ImageRasterizer`] trait + [`RustRasterizer`]
//! - **Operations**: High-level functions combining specs + rasterizer

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{Dimensions, ImageRasterizer, RasterError};
pub use calculations::{CoverPlacement, PixelRect, calculate_cover_fit};
pub use operations::{
    ResizedVariant, VariantError, VariantPair, create_variant, create_variants, get_dimensions,
};
pub use params::{Quality, VariantKind, VariantPlan, VariantSpec};
pub use rust_backend::{RustRasterizer, supported_input_extensions};
