//! Pure calculation functions for variant dimensions.
//!
//! All functions here are testable without any I/O or pixel data.

/// Height of a variant at `target_width`, preserving the source aspect ratio.
///
/// Matches the generator's output contract: `height = width * (h / w)`,
/// truncated to an integer. Truncation (not rounding) keeps the value stable
/// across re-runs and platforms. Degenerate aspect ratios are clamped so the
/// encoder never sees a zero-height image.
///
/// # Examples
/// ```
/// # use photogrid::imaging::variant_height;
/// // 4000x3000 at 480 wide → 360 tall
/// assert_eq!(variant_height((4000, 3000), 480), 360);
/// ```
pub fn variant_height(original: (u32, u32), target_width: u32) -> u32 {
    let (orig_w, orig_h) = original;
    if orig_w == 0 {
        return 1;
    }
    let ratio = orig_h as f64 / orig_w as f64;
    ((target_width as f64 * ratio) as u32).max(1)
}
