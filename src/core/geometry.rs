//! Geometry data exchanged between the host and the offset engine.
//!
//! Everything here is plain data in abstract pixels.  The host decides what
//! a pixel is (in the terminal renderer: 1 px per column, 2 px per row via
//! half-blocks) and produces a fresh [`GeometrySnapshot`] for every
//! notification; the engine never queries layout itself.

/// Offset applied to the backdrop image, in pixels relative to the top-left
/// corner of its container pane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageOffset {
    pub left: f64,
    /// Vertical offset.  `0` pins the image's top edge to the pane's top
    /// edge; negative values slide the image upward (revealing its lower
    /// part).
    pub top: f64,
}

impl ImageOffset {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Point-in-time measurements taken by the host immediately before an
/// engine call.  Never cached — layout may have changed since the last
/// notification.
#[derive(Debug, Clone, Copy)]
pub struct GeometrySnapshot {
    /// Top edge of the container pane relative to the viewport's top edge.
    /// Negative once the pane has scrolled above the fold.
    pub container_top: f64,
    /// Height of the scrollable viewport.
    pub viewport_height: f64,
    /// Current scroll offset of the nearest scrollable ancestor.
    pub scroll_offset: f64,
    /// Rendered height of the backdrop image, once decoded.  `None` (or a
    /// non-positive value) means the image is still loading and the engine
    /// has nothing valid to compute against.
    pub image_height: Option<f64>,
}

impl GeometrySnapshot {
    /// The image height, if it is known and usable.
    pub fn known_image_height(&self) -> Option<f64> {
        self.image_height.filter(|h| *h > 0.0)
    }
}
