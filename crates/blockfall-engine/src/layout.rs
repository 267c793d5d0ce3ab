//! Responsive node sizing.
//!
//! [`compute_transform`] derives a node's final geometry size, position and
//! scale from its authored values and the current [`Viewport`]. It is a pure
//! function, so recomputing on every resize notification is harmless.

use crate::coords::{Vec2, Vec3, Viewport};

/// Final placement of a node, relative to its parent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    /// Plane geometry dimensions before scaling.
    pub size: Vec2,
    pub position: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform =
        Transform { size: Vec2::zero(), position: Vec3::zero(), scale: Vec3::one() };

    /// Zero-area transform used until the viewport is measured.
    pub const COLLAPSED: Transform =
        Transform { size: Vec2::zero(), position: Vec3::zero(), scale: Vec3::zero() };

    /// On-screen extent in scene units (`size` scaled by `scale.xy`).
    #[inline]
    pub fn footprint(&self) -> Vec2 {
        Vec2::new(self.size.x * self.scale.x, self.size.y * self.scale.y)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        let f = self.footprint();
        (f.x * f.y).abs()
    }

    /// Places `child` (expressed in this transform's space) into the parent space.
    ///
    /// The child's `size` is kept; only position and scale are composed.
    pub fn compose(&self, child: &Transform) -> Transform {
        Transform {
            size: child.size,
            position: self.position + self.scale.mul_elem(child.position),
            scale: self.scale.mul_elem(child.scale),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Authored geometry of a node before viewport adaptation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BaseGeometry {
    pub size: Vec2,
    pub position: Vec3,
    pub scale: Vec3,
}

impl BaseGeometry {
    pub const fn new(size: Vec2, position: Vec3, scale: Vec3) -> Self {
        Self { size, position, scale }
    }

    pub const fn sized(size: Vec2) -> Self {
        Self { size, position: Vec3::zero(), scale: Vec3::one() }
    }
}

/// Horizontal anchoring for [`AnchorPolicy::ViewportProportional`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HorizontalAnchor {
    /// Authored x is kept.
    Center,
    /// Authored x is an offset from the viewport's left edge: `x - width`.
    LeftEdge,
}

/// Which geometry axes [`AnchorPolicy::FillViewport`] replaces.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FillAxes {
    Both,
    Width,
    Height,
}

/// Strategy for deriving a transform from the viewport.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AnchorPolicy {
    /// Uniform scale `baseline + width / 100`: a fixed baseline size that grows
    /// slightly with a wider viewport.
    FixedScale { baseline: f32 },
    /// Scale x/y follow `viewport / reference` (unchanged without a reference),
    /// and x is re-anchored per `anchor`.
    ///
    /// With `reference: None` the footprint stays at its authored absolute
    /// size; only the anchoring follows the viewport.
    ViewportProportional { reference: Option<Vec2>, anchor: HorizontalAnchor },
    /// Geometry dimensions are replaced by the viewport's so the surface covers
    /// the visible frustum at its depth.
    FillViewport(FillAxes),
}

/// Computes the final transform for `base` under `policy`.
///
/// Never panics: an unmeasured viewport (zero, negative or non-finite size)
/// yields [`Transform::COLLAPSED`].
pub fn compute_transform(base: &BaseGeometry, viewport: Viewport, policy: &AnchorPolicy) -> Transform {
    if !viewport.is_measured() {
        return Transform::COLLAPSED;
    }

    match *policy {
        AnchorPolicy::FixedScale { baseline } => Transform {
            size: base.size,
            position: base.position,
            scale: Vec3::splat(baseline + viewport.width / 100.0),
        },

        AnchorPolicy::ViewportProportional { reference, anchor } => {
            let (rx, ry) = match reference {
                Some(r) if r.x > 0.0 && r.y > 0.0 => (viewport.width / r.x, viewport.height / r.y),
                _ => (1.0, 1.0),
            };
            let x = match anchor {
                HorizontalAnchor::Center => base.position.x,
                HorizontalAnchor::LeftEdge => base.position.x - viewport.width,
            };
            Transform {
                size: base.size,
                position: Vec3::new(x, base.position.y, base.position.z),
                scale: Vec3::new(base.scale.x * rx, base.scale.y * ry, base.scale.z),
            }
        }

        AnchorPolicy::FillViewport(axes) => {
            let size = match axes {
                FillAxes::Both => Vec2::new(viewport.width, viewport.height),
                FillAxes::Width => Vec2::new(viewport.width, base.size.y),
                FillAxes::Height => Vec2::new(base.size.x, viewport.height),
            };
            Transform { size, position: base.position, scale: base.scale }
        }
    }
}
