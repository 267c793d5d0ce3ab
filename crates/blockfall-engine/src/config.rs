//! Scene configuration.
//!
//! Every value defaults to the shipped title screen, so an empty TOML document
//! is a valid config. A table present in the file replaces that section; keys
//! omitted inside it take the generic [`NodeConfig`] defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, ValidationError};
use crate::layers::names;

/// One entry of the layer table. `index = None` takes the next free bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerEntry {
    pub name: String,
    #[serde(default)]
    pub index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayersConfig {
    pub layers: Vec<LayerEntry>,
}

impl Default for LayersConfig {
    fn default() -> Self {
        let entry = |name: &str, index| LayerEntry { name: name.to_owned(), index: Some(index) };
        Self {
            layers: vec![
                entry(names::LOGO, 4),
                entry(names::GAME, 3),
                entry(names::STARS, 2),
                entry(names::TOP, 1),
                entry(names::TEST, 1),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_y: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { position: [0.0, 0.0, 5.0], fov_y: 75.0 }
    }
}

/// Device pixel ratio clamp applied to window-reported ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelRatioConfig {
    pub min: f32,
    pub max: f32,
}

impl Default for PixelRatioConfig {
    fn default() -> Self {
        Self { min: 1.0, max: 2.0 }
    }
}

impl PixelRatioConfig {
    pub fn clamp(&self, ratio: f32) -> f32 {
        if ratio.is_finite() { ratio.clamp(self.min, self.max) } else { self.min }
    }
}

/// Asset identifiers passed to the asset provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetIds {
    pub stars: String,
    pub logo: String,
    pub game_box: String,
    pub status_box: String,
    pub font: String,
}

impl Default for AssetIds {
    fn default() -> Self {
        Self {
            stars: "milky_way.jpeg".into(),
            logo: "tlogo-gameplay.png".into(),
            game_box: "tgamearea.png".into(),
            status_box: "tstatus.png".into(),
            font: "fonts/press_start.json".into(),
        }
    }
}

/// Authored placement and look of one scene node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub layer: String,
    pub draw_order: i32,
    pub size: [f32; 2],
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub opacity: f32,
    /// `#rrggbb` or `#rrggbbaa`.
    pub color: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            layer: String::new(),
            draw_order: 0,
            size: [0.0, 0.0],
            position: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
            opacity: 1.0,
            color: "#ffffff".into(),
        }
    }
}

impl NodeConfig {
    fn on(layer: &str, draw_order: i32) -> Self {
        Self { layer: layer.to_owned(), draw_order, ..Self::default() }
    }

    fn size(mut self, w: f32, h: f32) -> Self {
        self.size = [w, h];
        self
    }

    fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = [x, y, z];
        self
    }

    fn scaled(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = [x, y, z];
        self
    }

    fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Extruded title text settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleTextConfig {
    pub text: String,
    pub size: f32,
    pub extrusion: f32,
}

impl Default for TitleTextConfig {
    fn default() -> Self {
        Self { text: "PRESS P TO PLAY".into(), size: 0.1, extrusion: 0.1 }
    }
}

impl TitleTextConfig {
    /// Same bounds [`build_glyphs`](crate::text::build_glyphs) enforces.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.size > 0.0 && self.size.is_finite()) {
            return Err(ValidationError::NonPositiveSize(self.size));
        }
        if !(self.extrusion >= 0.0 && self.extrusion.is_finite()) {
            return Err(ValidationError::InvalidExtrusion(self.extrusion));
        }
        Ok(())
    }
}

/// Two-stop vertical gradient, top colour first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    pub top: String,
    pub bottom: String,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self { top: "#4904a2".into(), bottom: "#000000".into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub layers: LayersConfig,
    pub camera: CameraConfig,
    pub pixel_ratio: PixelRatioConfig,
    pub assets: AssetIds,

    pub stars: NodeConfig,
    pub top_section: NodeConfig,
    pub top_bar: NodeConfig,
    pub logo: NodeConfig,
    /// Scale the logo keeps at a zero-width viewport.
    pub logo_baseline: f32,
    /// Placement of the title, relative to the top section.
    pub title: NodeConfig,
    pub title_text: TitleTextConfig,
    pub gameplay: NodeConfig,
    pub gameplay_gradient: GradientConfig,
    pub game_box: NodeConfig,
    pub status_box: NodeConfig,
    /// Viewport the side panels were authored against. `None` keeps the
    /// authored scale at every size.
    pub panel_reference: Option<[f32; 2]>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            layers: LayersConfig::default(),
            camera: CameraConfig::default(),
            pixel_ratio: PixelRatioConfig::default(),
            assets: AssetIds::default(),

            stars: NodeConfig::on(names::STARS, 1).opacity(0.9),
            top_section: NodeConfig::on(names::TOP, 2).at(1.0, 2.48, 1.03),
            top_bar: NodeConfig::on(names::TOP, 2).size(0.0, 1.13).opacity(0.8),
            logo: NodeConfig::on(names::LOGO, 3).size(7.0, 3.2).at(-1.0, -0.35, 0.0),
            logo_baseline: 0.5,
            title: NodeConfig::on(names::LOGO, 3)
                .at(-1.9, -0.52, -1.125)
                .scaled(0.8, 0.8, 1.0),
            title_text: TitleTextConfig::default(),
            gameplay: NodeConfig::on(names::GAME, 3).size(0.0, 8.0).opacity(0.9),
            gameplay_gradient: GradientConfig::default(),
            game_box: NodeConfig::on(names::GAME, 3)
                .size(4.0, 3.96)
                .at(-1.64, -0.58, 1.0)
                .scaled(0.6, 1.0, 1.0),
            status_box: NodeConfig::on(names::GAME, 3)
                .size(3.2, 4.0)
                .at(0.8, -0.6, 1.0)
                .scaled(0.6, 1.0, 1.0),
            panel_reference: None,
        }
    }
}

impl SceneConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigurationError> {
        let config: SceneConfig =
            toml::from_str(src).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("loading scene config from {}", path.display());
        Self::from_toml_str(&src)
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        let pr = &self.pixel_ratio;
        if !(pr.min > 0.0 && pr.min <= pr.max) {
            return Err(ConfigurationError::Parse(format!(
                "pixel_ratio range [{}, {}] is empty or non-positive",
                pr.min, pr.max
            )));
        }
        self.title_text.validate()?;
        Ok(())
    }
}
