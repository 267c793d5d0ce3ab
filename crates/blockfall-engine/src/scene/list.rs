use crate::layers::Camera;
use crate::layout::Transform;

use super::{DrawOrder, SceneTree, VisualNode};

/// Stable paint-order key.
///
/// Ordering rules:
/// 1) `order`: ascending (back-to-front)
/// 2) `seq`: ascending (depth-first tree position for equal draw order)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SortKey {
    pub order: DrawOrder,
    pub seq: u32,
}

/// A drawable node with its transform resolved into world space.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem<'a> {
    pub key: SortKey,
    pub node: &'a VisualNode,
    pub world: Transform,
}

/// Flattened draw stream for one camera, in paint order.
///
/// Only nodes that draw something and whose own mask the camera sees are
/// listed; hidden parents still pass their transform to visible children.
#[derive(Debug, Default)]
pub struct RenderList<'a> {
    items: Vec<RenderItem<'a>>,
}

impl<'a> RenderList<'a> {
    pub fn collect(tree: &'a SceneTree, camera: &Camera) -> Self {
        let mut list = Self::default();
        let mut seq = 0;
        for root in tree.roots() {
            list.walk(root, &Transform::IDENTITY, camera, &mut seq);
        }
        // Keys are unique, so an unstable sort cannot reorder equals.
        list.items.sort_unstable_by_key(|item| item.key);
        list
    }

    fn walk(&mut self, node: &'a VisualNode, parent: &Transform, camera: &Camera, seq: &mut u32) {
        let world = parent.compose(&node.transform);
        let key = SortKey { order: node.draw_order, seq: *seq };
        *seq += 1;

        if !node.is_group() && node.material.draws_anything() && camera.sees(node.mask) {
            self.items.push(RenderItem { key, node, world });
        }
        for child in &node.children {
            self.walk(child, &world, camera, seq);
        }
    }

    #[inline]
    pub fn items(&self) -> &[RenderItem<'a>] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Node names in paint order.
    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.items.iter().map(|i| {
            let node: &'a VisualNode = i.node;
            node.name.as_str()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Vec2, Vec3, Viewport};
    use crate::layers::LayerMask;
    use crate::paint::{Color, Material};

    fn plane(name: &str, order: i32) -> VisualNode {
        VisualNode::plane(name, Transform::IDENTITY, Material::solid(Color::white()))
            .on(LayerMask::all())
            .ordered(DrawOrder(order))
    }

    fn seeing_all() -> Camera {
        let mut cam = Camera::default();
        cam.set_mask(LayerMask::all());
        cam
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn draw_order_then_tree_position() {
        let tree = SceneTree::new(
            vec![plane("late", 3).with_child(plane("early-child", 1)), plane("mid", 2), plane("late-2", 3)],
            Viewport::new(10.0, 6.0, 1.0),
        );
        let cam = seeing_all();
        let list = RenderList::collect(&tree, &cam);
        let names: Vec<_> = list.names().collect();
        assert_eq!(names, ["early-child", "mid", "late", "late-2"]);
    }

    #[test]
    fn sort_key_compares_order_first() {
        let a = SortKey { order: DrawOrder(1), seq: 9 };
        let b = SortKey { order: DrawOrder(2), seq: 0 };
        let c = SortKey { order: DrawOrder(2), seq: 1 };
        assert!(a < b && b < c);
    }

    // ── filtering ─────────────────────────────────────────────────────────

    #[test]
    fn groups_and_hidden_nodes_are_skipped() {
        let hidden = plane("hidden", 0).on(LayerMask::empty());
        let group = VisualNode::group("group", Transform::IDENTITY)
            .on(LayerMask::all())
            .with_child(plane("inside", 0));
        let tree = SceneTree::new(vec![hidden, group], Viewport::new(10.0, 6.0, 1.0));
        let cam = seeing_all();
        let list = RenderList::collect(&tree, &cam);
        assert_eq!(list.names().collect::<Vec<_>>(), ["inside"]);
    }

    #[test]
    fn world_transform_composes_parents() {
        let parent_t = Transform { size: Vec2::zero(), position: Vec3::new(1.0, 2.0, 0.0), scale: Vec3::splat(2.0) };
        let child_t =
            Transform { size: Vec2::new(1.0, 1.0), position: Vec3::new(0.5, 0.0, 1.0), scale: Vec3::one() };
        let child = VisualNode::plane("child", child_t, Material::solid(Color::white())).on(LayerMask::all());
        let tree = SceneTree::new(
            vec![VisualNode::group("parent", parent_t).with_child(child)],
            Viewport::new(10.0, 6.0, 1.0),
        );
        let cam = seeing_all();
        let list = RenderList::collect(&tree, &cam);
        let world = list.items()[0].world;
        assert_eq!(world.position, Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(world.footprint(), Vec2::new(2.0, 2.0));
    }
}
