/// UI building blocks for the comparison screen
///
/// - `capture.rs` - global pointer capture held during a drag
/// - `slider.rs` - before/after split slider (gesture logic + canvas)
/// - `overlay.rs` - anomaly heatmap and contour overlay

pub mod capture;
pub mod overlay;
pub mod slider;
