//! Surface appearance of scene nodes.
//!
//! Scope:
//! - color representation (linear premultiplied alpha)
//! - fill sources (solid, texture, gradient)
//! - per-node material flags
//!
//! Geometry types remain in `coords`.

pub mod color;
pub mod gradient;

pub use color::Color;
pub use gradient::{ColorStop, LinearGradient, SpreadMode};

use crate::assets::TextureHandle;

/// Fill source for a node's surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    /// Nothing is drawn; used by placeholders and groups.
    None,
    Solid(Color),
    Texture(TextureHandle),
    LinearGradient(LinearGradient),
}

impl Fill {
    #[inline]
    pub fn is_opaque(&self) -> bool {
        match self {
            Fill::None => false,
            Fill::Solid(c) => c.a >= 1.0,
            // Texture alpha is unknown without sampling.
            Fill::Texture(_) => false,
            Fill::LinearGradient(g) => g.stops.iter().all(|s| s.color.a >= 1.0),
        }
    }
}

/// Material record attached to every node.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub fill: Fill,
    /// Multiplied into the fill's alpha.
    pub opacity: f32,
    /// Drawn in the blended pass when true.
    pub transparent: bool,
    pub double_sided: bool,
    pub depth_test: bool,
}

impl Material {
    /// A material that draws nothing.
    pub fn none() -> Self {
        Self {
            fill: Fill::None,
            opacity: 1.0,
            transparent: false,
            double_sided: false,
            depth_test: true,
        }
    }

    pub fn solid(color: Color) -> Self {
        Self { fill: Fill::Solid(color), ..Self::none() }
    }

    pub fn texture(texture: TextureHandle) -> Self {
        Self { fill: Fill::Texture(texture), transparent: true, ..Self::none() }
    }

    pub fn gradient(gradient: LinearGradient) -> Self {
        Self { fill: Fill::LinearGradient(gradient), ..Self::none() }
    }

    /// Sets `opacity`; anything below 1 also marks the material transparent.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        if self.opacity < 1.0 {
            self.transparent = true;
        }
        self
    }

    #[must_use]
    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        !self.transparent && self.opacity >= 1.0 && self.fill.is_opaque()
    }

    #[inline]
    pub fn draws_anything(&self) -> bool {
        !matches!(self.fill, Fill::None) && self.opacity > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_marks_transparent() {
        let m = Material::solid(Color::white()).with_opacity(0.8);
        assert!(m.transparent);
        assert!(!m.is_opaque());
        assert!(Material::solid(Color::white()).is_opaque());
    }

    #[test]
    fn none_draws_nothing() {
        assert!(!Material::none().draws_anything());
        assert!(!Material::solid(Color::white()).with_opacity(0.0).draws_anything());
    }
}
