//! Coordinate and geometry types shared across the engine.
//!
//! Canonical scene space:
//! - scene units (the plane `z = 0` is what the viewport measures)
//! - origin at the viewport centre
//! - +X right, +Y up, +Z towards the camera

mod vec2;
mod vec3;
mod viewport;

pub use vec2::Vec2;
pub use vec3::Vec3;
pub use viewport::Viewport;
