/// Visible region of the `z = 0` plane, in scene units.
///
/// A snapshot: a resize produces a new value rather than mutating this one.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Device pixels per CSS/logical pixel.
    pub pixel_ratio: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self { width, height, pixel_ratio }
    }

    /// Viewport that has not been measured yet.
    #[inline]
    pub const fn unmeasured() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Frustum cross-section of a perspective camera at `distance`, for a window
    /// of `px_width × px_height` logical pixels.
    ///
    /// A zero-height window yields an unmeasured viewport.
    pub fn from_perspective(
        px_width: f32,
        px_height: f32,
        pixel_ratio: f32,
        fov_y_degrees: f32,
        distance: f32,
    ) -> Self {
        if !(px_width > 0.0 && px_height > 0.0) {
            return Self { pixel_ratio, ..Self::unmeasured() };
        }
        let height = 2.0 * (fov_y_degrees.to_radians() / 2.0).tan() * distance;
        let width = height * (px_width / px_height);
        Self::new(width, height, pixel_ratio)
    }

    /// Returns true once both dimensions are positive and finite.
    #[inline]
    pub fn is_measured(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    #[inline]
    pub fn aspect(self) -> f32 {
        if self.height > 0.0 { self.width / self.height } else { 0.0 }
    }
}
