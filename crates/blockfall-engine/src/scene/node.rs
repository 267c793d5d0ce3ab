use std::sync::Arc;

use crate::layers::LayerMask;
use crate::layout::Transform;
use crate::paint::Material;
use crate::text::GlyphMesh;

/// Paint ordering hint. Lower values are submitted first.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DrawOrder(pub i32);

/// What a node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A flat quad of `transform.size`, facing +Z.
    Plane,
    /// Extruded text; the mesh is in node-local units.
    TextGlyph { mesh: Arc<GlyphMesh> },
    /// Draws nothing itself. Also stands in for nodes whose assets are unresolved.
    Group,
}

/// One node of a [`SceneTree`](super::SceneTree).
///
/// `transform` is relative to the parent; layer membership and draw order are
/// not inherited.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub material: Material,
    pub draw_order: DrawOrder,
    pub mask: LayerMask,
    pub children: Vec<VisualNode>,
}

impl VisualNode {
    fn with_kind(name: &str, kind: NodeKind, transform: Transform, material: Material) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            transform,
            material,
            draw_order: DrawOrder::default(),
            mask: LayerMask::default(),
            children: Vec::new(),
        }
    }

    pub fn plane(name: &str, transform: Transform, material: Material) -> Self {
        Self::with_kind(name, NodeKind::Plane, transform, material)
    }

    pub fn text(name: &str, mesh: Arc<GlyphMesh>, transform: Transform, material: Material) -> Self {
        Self::with_kind(name, NodeKind::TextGlyph { mesh }, transform, material)
    }

    pub fn group(name: &str, transform: Transform) -> Self {
        Self::with_kind(name, NodeKind::Group, transform, Material::none())
    }

    #[must_use]
    pub fn on(mut self, mask: LayerMask) -> Self {
        self.mask = mask;
        self
    }

    #[must_use]
    pub fn ordered(mut self, order: DrawOrder) -> Self {
        self.draw_order = order;
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: VisualNode) -> Self {
        self.children.push(child);
        self
    }

    #[inline]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group)
    }
}
