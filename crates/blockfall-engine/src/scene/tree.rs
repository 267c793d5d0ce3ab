use crate::coords::Viewport;
use crate::layers::Camera;

use super::VisualNode;

/// A composed scene: root nodes in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneTree {
    roots: Vec<VisualNode>,
    viewport: Viewport,
}

impl SceneTree {
    pub fn new(roots: Vec<VisualNode>, viewport: Viewport) -> Self {
        Self { roots, viewport }
    }

    #[inline]
    pub fn roots(&self) -> &[VisualNode] {
        &self.roots
    }

    /// Viewport the tree was composed for.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Depth-first, parents before children, siblings in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: self.roots.iter().rev().collect() }
    }

    /// First node named `name` in depth-first order.
    pub fn find(&self, name: &str) -> Option<&VisualNode> {
        self.iter().find(|n| n.name == name)
    }

    /// Nodes whose own mask intersects the camera's.
    pub fn visible_to<'a>(&'a self, camera: &'a Camera) -> impl Iterator<Item = &'a VisualNode> + 'a {
        self.iter().filter(move |n| camera.sees(n.mask))
    }
}

/// Depth-first iterator over a [`SceneTree`].
pub struct Iter<'a> {
    stack: Vec<&'a VisualNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a VisualNode;

    fn next(&mut self) -> Option<&'a VisualNode> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{LayerIndex, LayerMask};
    use crate::layout::Transform;

    fn tree() -> SceneTree {
        let layer = |i| LayerMask::single(LayerIndex::new(i).unwrap());
        let a = VisualNode::group("a", Transform::IDENTITY)
            .on(layer(1))
            .with_child(VisualNode::group("a.1", Transform::IDENTITY).on(layer(2)))
            .with_child(VisualNode::group("a.2", Transform::IDENTITY).on(layer(1)));
        let b = VisualNode::group("b", Transform::IDENTITY).on(layer(3));
        SceneTree::new(vec![a, b], Viewport::new(10.0, 6.0, 1.0))
    }

    #[test]
    fn iterates_depth_first() {
        let names: Vec<_> = tree().iter().map(|n| n.name.clone()).collect();
        assert_eq!(names, ["a", "a.1", "a.2", "b"]);
    }

    #[test]
    fn counts_and_finds_nested_nodes() {
        let t = tree();
        assert_eq!(t.node_count(), 4);
        assert_eq!(t.find("a.2").map(|n| n.name.as_str()), Some("a.2"));
        assert!(t.find("c").is_none());
    }

    #[test]
    fn visibility_is_per_node() {
        let t = tree();
        let mut cam = Camera::default();
        cam.set_mask(LayerMask::single(LayerIndex::new(2).unwrap()));
        let names: Vec<_> = t.visible_to(&cam).map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["a.1"]);
    }
}
