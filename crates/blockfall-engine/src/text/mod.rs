//! Text geometry.
//!
//! Fonts are typeface documents (per-character outlines). [`build_glyphs`]
//! lays a string out, triangulates the outlines and extrudes them into a
//! [`GlyphMesh`].

mod glyphs;
mod triangulate;
pub(crate) mod typeface;

pub use glyphs::{Aabb, CURVE_SEGMENTS, GlyphMesh, GlyphVertex, build_glyphs};
pub use typeface::{Contour, Glyph, ParsedFont, PathCommand, TypefaceError};
