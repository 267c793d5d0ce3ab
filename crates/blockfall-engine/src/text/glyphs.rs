use crate::assets::{AssetState, FontHandle};
use crate::coords::{Vec2, Vec3};
use crate::error::{AssetError, GlyphError, ValidationError};

use super::triangulate::{Shape, group_contours, triangulate};

/// Curve subdivision used for glyph outlines.
pub const CURVE_SEGMENTS: u32 = 12;

/// Vertex layout of a [`GlyphMesh`]; uploadable as-is.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlyphVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Axis-aligned bounds of a mesh.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// Extruded text geometry. Back cap at `z = 0`, front cap at `z = extrusion`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphMesh {
    pub vertices: Vec<GlyphVertex>,
    pub indices: Vec<u32>,
    /// `None` for text that produced no geometry (e.g. only spaces).
    pub bounds: Option<Aabb>,
}

impl GlyphMesh {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Raw vertex bytes for GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    fn push(&mut self, position: Vec3, normal: [f32; 3]) -> u32 {
        let i = self.vertices.len() as u32;
        self.vertices.push(GlyphVertex { position: position.to_array(), normal });
        i
    }

    fn add_shape(&mut self, shape: &Shape, depth: f32) {
        let (poly, tris) = triangulate(shape);

        let front = self.vertices.len() as u32;
        for p in &poly {
            self.push(Vec3::new(p.x, p.y, depth), [0.0, 0.0, 1.0]);
        }
        for t in &tris {
            self.indices.extend(t.iter().map(|i| front + i));
        }

        if depth <= 0.0 {
            return;
        }

        let back = self.vertices.len() as u32;
        for p in &poly {
            self.push(Vec3::new(p.x, p.y, 0.0), [0.0, 0.0, -1.0]);
        }
        for t in &tris {
            self.indices.extend([back + t[0], back + t[2], back + t[1]]);
        }

        for ring in std::iter::once(&shape.outer).chain(shape.holes.iter()) {
            self.add_walls(ring, depth);
        }
    }

    fn add_walls(&mut self, ring: &[Vec2], depth: f32) {
        let n = ring.len();
        for i in 0..n {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            let d = b - a;
            let len = d.length();
            if len <= f32::EPSILON {
                continue;
            }
            let normal = [d.y / len, -d.x / len, 0.0];

            let a0 = self.push(Vec3::new(a.x, a.y, 0.0), normal);
            let b0 = self.push(Vec3::new(b.x, b.y, 0.0), normal);
            let b1 = self.push(Vec3::new(b.x, b.y, depth), normal);
            let a1 = self.push(Vec3::new(a.x, a.y, depth), normal);
            self.indices.extend([a0, b0, b1, a0, b1, a1]);
        }
    }

    fn finish_bounds(&mut self) {
        let mut it = self.vertices.iter().map(|v| Vec3::from(v.position));
        self.bounds = it.next().map(|first| {
            it.fold(Aabb { min: first, max: first }, |b, p| Aabb {
                min: Vec3::new(b.min.x.min(p.x), b.min.y.min(p.y), b.min.z.min(p.z)),
                max: Vec3::new(b.max.x.max(p.x), b.max.y.max(p.y), b.max.z.max(p.z)),
            })
        });
    }
}

/// Builds extruded geometry for `text` set in `font`.
///
/// Parameters are validated first; then the font must be resolved. Pure: the
/// same inputs always produce the same mesh, so callers may cache results.
pub fn build_glyphs(
    font: &AssetState<FontHandle>,
    text: &str,
    size: f32,
    extrusion: f32,
) -> Result<GlyphMesh, GlyphError> {
    if !(size > 0.0 && size.is_finite()) {
        return Err(ValidationError::NonPositiveSize(size).into());
    }
    if !(extrusion >= 0.0 && extrusion.is_finite()) {
        return Err(ValidationError::InvalidExtrusion(extrusion).into());
    }

    let font = match font {
        AssetState::Ready(font) => font,
        AssetState::Pending => return Err(AssetError::Pending.into()),
        AssetState::Failed(e) => return Err(AssetError::Failed(e.clone()).into()),
    };

    let contours = font.layout(text, size, CURVE_SEGMENTS);
    let mut mesh = GlyphMesh::default();
    for shape in group_contours(contours) {
        mesh.add_shape(&shape, extrusion);
    }
    mesh.finish_bounds();

    log::trace!("built {} glyph triangles for {text:?}", mesh.triangle_count());
    Ok(mesh)
}
