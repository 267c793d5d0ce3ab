use std::sync::Arc;

use crate::assets::{AssetState, FontHandle, TextureHandle};
use crate::config::{NodeConfig, SceneConfig, TitleTextConfig};
use crate::coords::{Vec2, Vec3, Viewport};
use crate::error::ConfigurationError;
use crate::layers::{LayerMask, LayerRegistry};
use crate::layout::{AnchorPolicy, BaseGeometry, FillAxes, HorizontalAnchor, Transform, compute_transform};
use crate::paint::{Color, LinearGradient, Material};
use crate::text::build_glyphs;

use super::{DrawOrder, SceneTree, VisualNode};

/// Resolution state of every asset the title screen uses.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneAssets {
    pub stars: AssetState<TextureHandle>,
    pub logo: AssetState<TextureHandle>,
    pub game_box: AssetState<TextureHandle>,
    pub status_box: AssetState<TextureHandle>,
    pub font: AssetState<FontHandle>,
}

impl SceneAssets {
    /// Nothing resolved yet.
    pub fn pending() -> Self {
        Self {
            stars: AssetState::Pending,
            logo: AssetState::Pending,
            game_box: AssetState::Pending,
            status_box: AssetState::Pending,
            font: AssetState::Pending,
        }
    }
}

/// Everything a rebuild reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneInputs {
    pub viewport: Viewport,
    pub assets: SceneAssets,
}

/// A configured node with its layer name resolved to a mask.
#[derive(Debug, Clone, PartialEq)]
struct Placement {
    base: BaseGeometry,
    mask: LayerMask,
    order: DrawOrder,
    opacity: f32,
    color: Color,
}

impl Placement {
    fn resolve(node: &NodeConfig, registry: &LayerRegistry) -> Result<Self, ConfigurationError> {
        Ok(Self {
            base: BaseGeometry::new(
                Vec2::new(node.size[0], node.size[1]),
                Vec3::from(node.position),
                Vec3::from(node.scale),
            ),
            mask: registry.mask(&[node.layer.as_str()])?,
            order: DrawOrder(node.draw_order),
            opacity: node.opacity,
            color: parse_color(&node.color)?,
        })
    }

    /// Authored transform, for nodes that do not follow the viewport.
    fn fixed(&self) -> Transform {
        Transform { size: self.base.size, position: self.base.position, scale: self.base.scale }
    }
}

fn parse_color(hex: &str) -> Result<Color, ConfigurationError> {
    Color::from_hex(hex).ok_or_else(|| ConfigurationError::Parse(format!("invalid colour `{hex}`")))
}

/// Builds the title screen's node tree.
///
/// Layer names, colours and geometry are resolved once in [`new`](Self::new);
/// [`build`](Self::build) is then a pure function of [`SceneInputs`].
#[derive(Debug, Clone)]
pub struct SceneComposer {
    stars: Placement,
    top_section: Placement,
    top_bar: Placement,
    logo: Placement,
    logo_baseline: f32,
    title: Placement,
    title_text: TitleTextConfig,
    gameplay: Placement,
    gradient: LinearGradient,
    game_box: Placement,
    status_box: Placement,
    panel_reference: Option<Vec2>,
}

impl SceneComposer {
    pub fn new(config: &SceneConfig, registry: &LayerRegistry) -> Result<Self, ConfigurationError> {
        config.title_text.validate()?;
        let place = |node: &NodeConfig| Placement::resolve(node, registry);
        Ok(Self {
            stars: place(&config.stars)?,
            top_section: place(&config.top_section)?,
            top_bar: place(&config.top_bar)?,
            logo: place(&config.logo)?,
            logo_baseline: config.logo_baseline,
            title: place(&config.title)?,
            title_text: config.title_text.clone(),
            gameplay: place(&config.gameplay)?,
            gradient: LinearGradient::vertical(
                parse_color(&config.gameplay_gradient.top)?,
                parse_color(&config.gameplay_gradient.bottom)?,
            ),
            game_box: place(&config.game_box)?,
            status_box: place(&config.status_box)?,
            panel_reference: config.panel_reference.map(|[w, h]| Vec2::new(w, h)),
        })
    }

    /// Composes the whole tree: `stars`, `top_section` (`top_bar`, `logo`,
    /// `title`) and `gameplay` (`game_box`, `status_box`).
    ///
    /// Nodes whose asset is not ready become empty groups with the same name,
    /// transform, mask and draw order.
    pub fn build(&self, inputs: &SceneInputs) -> SceneTree {
        let viewport = inputs.viewport;
        let assets = &inputs.assets;
        let fit = |p: &Placement, policy: AnchorPolicy| compute_transform(&p.base, viewport, &policy);

        let stars = textured(
            "stars",
            &self.stars,
            fit(&self.stars, AnchorPolicy::FillViewport(FillAxes::Both)),
            &assets.stars,
            |m| m.double_sided(),
        );

        let top_bar = VisualNode::plane(
            "top_bar",
            fit(&self.top_bar, AnchorPolicy::FillViewport(FillAxes::Width)),
            Material::solid(self.top_bar.color).with_opacity(self.top_bar.opacity),
        )
        .on(self.top_bar.mask)
        .ordered(self.top_bar.order);

        let logo = textured(
            "logo",
            &self.logo,
            fit(&self.logo, AnchorPolicy::FixedScale { baseline: self.logo_baseline }),
            &assets.logo,
            |m| m,
        );

        let top_section = VisualNode::group("top_section", self.top_section.fixed())
            .on(self.top_section.mask)
            .ordered(self.top_section.order)
            .with_child(top_bar)
            .with_child(logo)
            .with_child(self.title(&assets.font));

        let panel = |anchor| AnchorPolicy::ViewportProportional { reference: self.panel_reference, anchor };
        let game_box = textured(
            "game_box",
            &self.game_box,
            fit(&self.game_box, panel(HorizontalAnchor::Center)),
            &assets.game_box,
            |m| m,
        );
        let status_box = textured(
            "status_box",
            &self.status_box,
            fit(&self.status_box, panel(HorizontalAnchor::LeftEdge)),
            &assets.status_box,
            |m| m,
        );

        let gameplay = VisualNode::plane(
            "gameplay",
            fit(&self.gameplay, AnchorPolicy::FillViewport(FillAxes::Width)),
            Material::gradient(self.gradient.clone()).with_opacity(self.gameplay.opacity),
        )
        .on(self.gameplay.mask)
        .ordered(self.gameplay.order)
        .with_child(game_box)
        .with_child(status_box);

        SceneTree::new(vec![stars, top_section, gameplay], viewport)
    }

    fn title(&self, font: &AssetState<FontHandle>) -> VisualNode {
        let p = &self.title;
        let text = &self.title_text;
        // Text geometry lives in the mesh; `size` stays as authored.
        let transform = p.fixed();

        let node = match build_glyphs(font, &text.text, text.size, text.extrusion) {
            Ok(mesh) => {
                let material = Material::solid(p.color).with_opacity(p.opacity);
                VisualNode::text("title", Arc::new(mesh), transform, material)
            }
            // Size and extrusion were checked in `new`; only the font can be missing.
            Err(e) => {
                log::trace!("title placeholder: {e}");
                VisualNode::group("title", transform)
            }
        };
        node.on(p.mask).ordered(p.order)
    }
}

/// A textured plane, or its placeholder while the texture is unresolved.
fn textured(
    name: &str,
    p: &Placement,
    transform: Transform,
    texture: &AssetState<TextureHandle>,
    style: impl FnOnce(Material) -> Material,
) -> VisualNode {
    let node = match texture {
        AssetState::Ready(tex) => {
            VisualNode::plane(name, transform, style(Material::texture(tex.clone()).with_opacity(p.opacity)))
        }
        AssetState::Pending => VisualNode::group(name, transform),
        AssetState::Failed(e) => {
            log::debug!("`{name}` falls back to a placeholder: {e}");
            VisualNode::group(name, transform)
        }
    };
    node.on(p.mask).ordered(p.order)
}
