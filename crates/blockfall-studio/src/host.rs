use blockfall_engine::layers::{Camera, LayerMask, LayerRegistry};
use blockfall_engine::scene::{NodeKind, RenderList, SceneTree};
use blockfall_engine::stage::HostRenderer;

/// Host renderer that prints each submitted scene in paint order.
pub struct ConsoleHost {
    layers: Vec<(String, LayerMask)>,
    submissions: usize,
}

impl ConsoleHost {
    pub fn new(registry: &LayerRegistry) -> Self {
        let layers = registry.iter().map(|l| (l.name.clone(), LayerMask::single(l.index))).collect();
        Self { layers, submissions: 0 }
    }

    pub fn submissions(&self) -> usize {
        self.submissions
    }

    fn layer_names(&self, mask: LayerMask) -> String {
        let names: Vec<&str> =
            self.layers.iter().filter(|(_, m)| m.intersects(mask)).map(|(n, _)| n.as_str()).collect();
        if names.is_empty() { "-".into() } else { names.join("|") }
    }
}

impl HostRenderer for ConsoleHost {
    fn submit(&mut self, tree: &SceneTree, camera: &Camera) {
        self.submissions += 1;
        let v = tree.viewport();
        let list = RenderList::collect(tree, camera);

        println!();
        println!(
            "  ── submission {} ── viewport {:.2} x {:.2} @{}  ({} nodes, {} drawn)",
            self.submissions,
            v.width,
            v.height,
            v.pixel_ratio,
            tree.node_count(),
            list.len()
        );
        for item in list.items() {
            let node = item.node;
            let kind = match &node.kind {
                NodeKind::Plane => "plane".to_owned(),
                NodeKind::TextGlyph { mesh } => format!("text/{}", mesh.triangle_count()),
                NodeKind::Group => "group".to_owned(),
            };
            let size = item.world.footprint();
            let p = item.world.position;
            println!(
                "  {:>3}  {:<12} {:<10} {:<9} {:>6.2} x {:<6.2} at ({:>6.2}, {:>6.2}, {:>6.2})  opacity {:.2}",
                item.key.order.0,
                node.name,
                self.layer_names(node.mask),
                kind,
                size.x,
                size.y,
                p.x,
                p.y,
                p.z,
                node.material.opacity
            );
        }

        let placeholders: Vec<&str> = tree
            .iter()
            .filter(|n| n.is_group() && n.children.is_empty())
            .map(|n| n.name.as_str())
            .collect();
        if !placeholders.is_empty() {
            println!("       waiting on: {}", placeholders.join(", "));
        }
    }
}
