//! Pure geometry for cover-fit (crop-to-fill) placement.
//!
//! All functions here are pure and testable without any I/O or images.

/// Where a scaled source image sits on a target surface.
///
/// Produced by [`calculate_cover_fit`]. The scaled image always covers the
/// whole target box; on the axis that overflows, the offset is negative and
/// the overflow is cropped equally from both edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverPlacement {
    /// Uniform scale factor applied to the source.
    pub scale: f64,
    pub scaled_width: f64,
    pub scaled_height: f64,
    /// Horizontal draw offset, `<= 0` when the width overflows.
    pub offset_x: f64,
    /// Vertical draw offset, `<= 0` when the height overflows.
    pub offset_y: f64,
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Calculate the cover-fit placement of `source` inside `target`.
///
/// `scale = max(W / nw, H / nh)`, so one scaled side matches the target
/// exactly and the other is at least as large. Source dimensions must be
/// non-zero.
///
/// # Examples
/// ```
/// # use coverpack::imaging::calculate_cover_fit;
/// // 800x600 into a 480x320 box: height overflows by 40px
/// let p = calculate_cover_fit((800, 600), (480, 320));
/// assert_eq!((p.scaled_width, p.scaled_height), (480.0, 360.0));
/// assert_eq!((p.offset_x, p.offset_y), (0.0, -20.0));
/// ```
pub fn calculate_cover_fit(source: (u32, u32), target: (u32, u32)) -> CoverPlacement {
    let (src_w, src_h) = (source.0 as f64, source.1 as f64);
    let (tgt_w, tgt_h) = (target.0 as f64, target.1 as f64);

    let scale = (tgt_w / src_w).max(tgt_h / src_h);
    let scaled_width = src_w * scale;
    let scaled_height = src_h * scale;

    CoverPlacement {
        scale,
        scaled_width,
        scaled_height,
        offset_x: (tgt_w - scaled_width) / 2.0,
        offset_y: (tgt_h - scaled_height) / 2.0,
    }
}

impl CoverPlacement {
    /// Region of the source that stays visible once the overflow is cropped.
    ///
    /// Drawing the scaled source at the placement offset and keeping only the
    /// target box shows exactly this centered source region, so a rasterizer
    /// can crop first and scale second without ever materializing the
    /// oversized intermediate.
    pub fn source_crop(&self, source: (u32, u32), target: (u32, u32)) -> PixelRect {
        let (src_w, src_h) = source;
        let width = ((target.0 as f64 / self.scale).round() as u32).clamp(1, src_w);
        let height = ((target.1 as f64 / self.scale).round() as u32).clamp(1, src_h);
        PixelRect {
            x: (src_w - width) / 2,
            y: (src_h - height) / 2,
            width,
            height,
        }
    }
}
