use crate::config::LayersConfig;
use crate::error::ConfigurationError;

use super::{LayerIndex, LayerMask, MAX_LAYERS};

/// A named layer and its bit position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub index: LayerIndex,
}

/// Well-known layer names used by the scene composer.
pub mod names {
    pub const TOP: &str = "TOP";
    pub const STARS: &str = "STARS";
    pub const GAME: &str = "GAME";
    pub const LOGO: &str = "LOGO";
    pub const TEST: &str = "TEST";
}

/// Collects layer definitions before the registry is frozen.
#[derive(Debug, Default)]
pub struct LayerRegistryBuilder {
    layers: Vec<Layer>,
    next_free: u32,
}

impl LayerRegistryBuilder {
    /// Defines `name` at the lowest index not yet used by any layer.
    pub fn define(&mut self, name: impl Into<String>) -> Result<LayerIndex, ConfigurationError> {
        let name = name.into();
        self.ensure_unique(&name)?;

        while self.next_free < MAX_LAYERS && self.is_used(self.next_free) {
            self.next_free += 1;
        }
        let Some(index) = LayerIndex::new(self.next_free) else {
            return Err(ConfigurationError::TooManyLayers(name));
        };

        self.layers.push(Layer { name, index });
        Ok(index)
    }

    /// Defines `name` at an explicit index. Several names may share one index.
    pub fn define_at(
        &mut self,
        name: impl Into<String>,
        index: u32,
    ) -> Result<LayerIndex, ConfigurationError> {
        let name = name.into();
        self.ensure_unique(&name)?;

        let Some(index) = LayerIndex::new(index) else {
            return Err(ConfigurationError::LayerIndexOutOfRange { name, index, max: MAX_LAYERS });
        };

        self.layers.push(Layer { name, index });
        Ok(index)
    }

    pub fn build(self) -> LayerRegistry {
        log::debug!(
            "layer registry frozen: {}",
            self.layers
                .iter()
                .map(|l| format!("{}={}", l.name, l.index.get()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        LayerRegistry { layers: self.layers }
    }

    fn ensure_unique(&self, name: &str) -> Result<(), ConfigurationError> {
        if self.layers.iter().any(|l| l.name == name) {
            return Err(ConfigurationError::DuplicateLayer(name.to_owned()));
        }
        Ok(())
    }

    fn is_used(&self, index: u32) -> bool {
        self.layers.iter().any(|l| l.index.get() == index)
    }
}

/// Immutable table of named render layers.
///
/// Built once at startup and never mutated afterwards, so any number of readers
/// may call [`mask`](Self::mask) concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
}

impl LayerRegistry {
    pub fn builder() -> LayerRegistryBuilder {
        LayerRegistryBuilder::default()
    }

    /// The game's layer table. `TEST` shares its bit with `TOP`.
    pub fn standard() -> Self {
        Self::from_config(&LayersConfig::default())
            .unwrap_or_else(|_| unreachable!("default layer table is valid"))
    }

    /// Builds the registry described by `config`, in declaration order.
    pub fn from_config(config: &LayersConfig) -> Result<Self, ConfigurationError> {
        let mut builder = Self::builder();
        for entry in &config.layers {
            match entry.index {
                Some(index) => builder.define_at(entry.name.clone(), index)?,
                None => builder.define(entry.name.clone())?,
            };
        }
        Ok(builder.build())
    }

    pub fn index(&self, name: &str) -> Result<LayerIndex, ConfigurationError> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.index)
            .ok_or_else(|| ConfigurationError::UnknownLayer(name.to_owned()))
    }

    /// Builds a mask with every named layer enabled.
    pub fn mask(&self, names: &[&str]) -> Result<LayerMask, ConfigurationError> {
        names
            .iter()
            .try_fold(LayerMask::empty(), |mask, name| Ok(mask.with(self.index(name)?)))
    }

    /// Union of every defined layer.
    pub fn all(&self) -> LayerMask {
        self.layers.iter().fold(LayerMask::empty(), |m, l| m.with(l.index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
