//! # coverpack
//!
//! Batch image resizer that packs every input into a nested ZIP. Each source
//! image is cover-fitted into two fixed boxes (a 640x480 medium and a 480x320
//! thumbnail), re-encoded as JPEG, and filed under a folder named after its
//! filename prefix.
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan      paths        →  Vec<SourceImage>   (files + walked directories)
//! 2. Process   sources      →  ArchiveBuilder     (two cover-fit variants per file)
//! 3. Archive   builder      →  compress_<date>.zip
//! ```
//!
//! Files are processed one at a time, in input order. The two variants of a
//! file are rendered concurrently and joined before the next file starts. A
//! file that fails to decode or encode is reported and skipped; the batch
//! always runs to completion.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Expands CLI paths into ordered source images, filtering by format |
//! | [`naming`] | Group key derivation (`001_front.png` → `001`) and collision detection |
//! | [`imaging`] | Cover-fit geometry, the rasterizer trait, and the `image`-crate backend |
//! | [`process`] | Batch orchestrator: status, progress events, per-file isolation |
//! | [`archive`] | In-memory folder tree and ZIP serialization |
//! | [`config`] | `coverpack.toml` loading, validation, and merging |
//! | [`types`] | Source image and format types shared across stages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Crop In Source Space
//!
//! Cover-fit is defined as "scale until both axes cover the box, then center
//! crop". Scaling a 12000x1000 panorama to cover 640x480 first would allocate
//! a 5760x480 intermediate only to throw most of it away. The rasterizer
//! instead maps the visible window back into source pixels
//! ([`imaging::CoverPlacement::source_crop`]), crops there, and resamples
//! straight to the target size.
//!
//! ## Everything In Memory
//!
//! Variants are held in the [`archive::ArchiveBuilder`] until the batch ends
//! and the ZIP is produced as one buffer. This keeps the archive atomic (no
//! half-written file on failure) at the cost of memory proportional to the
//! batch, which is why large batches log a warning and `batch.max_files` can
//! refuse them outright.

pub mod archive;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
