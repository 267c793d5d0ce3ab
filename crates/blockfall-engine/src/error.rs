//! Error taxonomy shared across the engine.
//!
//! - [`ConfigurationError`]: fatal at startup (bad layer table, bad config file)
//! - [`AssetLoadError`]: recoverable, isolated to the subtree that needed the asset
//! - [`ValidationError`]: caller supplied invalid parameters
//! - [`AssetError`]: an operation needed an asset that is not resolved yet

use std::fmt;

/// Fatal configuration failures. Returned from constructors; callers abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("layer `{0}` is defined more than once")]
    DuplicateLayer(String),

    #[error("layer `{name}` uses index {index}, masks only hold indices 0..{max}")]
    LayerIndexOutOfRange { name: String, index: u32, max: u32 },

    #[error("cannot define layer `{0}`: all 32 mask bits are in use")]
    TooManyLayers(String),

    #[error("layer `{0}` was never defined")]
    UnknownLayer(String),

    #[error("failed to read config file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid title text: {0}")]
    TitleText(#[from] ValidationError),
}

/// Why an asset could not be loaded.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum AssetLoadReason {
    NotFound,
    Io,
    Decode,
    Unsupported,
}

impl fmt::Display for AssetLoadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetLoadReason::NotFound => "not found",
            AssetLoadReason::Io => "i/o failure",
            AssetLoadReason::Decode => "corrupt or undecodable",
            AssetLoadReason::Unsupported => "unsupported format",
        };
        f.write_str(s)
    }
}

/// A texture or font failed to load.
///
/// Cloneable so the cache can keep the failure while also reporting it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("asset `{id}` failed to load ({reason}): {detail}")]
pub struct AssetLoadError {
    pub id: String,
    pub reason: AssetLoadReason,
    pub detail: String,
}

impl AssetLoadError {
    pub fn new(id: impl Into<String>, reason: AssetLoadReason, detail: impl Into<String>) -> Self {
        Self { id: id.into(), reason, detail: detail.into() }
    }
}

/// Invalid parameters passed to a pure builder.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("glyph size must be positive and finite, got {0}")]
    NonPositiveSize(f32),

    #[error("extrusion height must be non-negative and finite, got {0}")]
    InvalidExtrusion(f32),
}

/// An operation required an asset that is not usable yet.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    #[error("asset is still loading")]
    Pending,

    #[error(transparent)]
    Failed(#[from] AssetLoadError),
}

/// Failure of [`build_glyphs`](crate::text::build_glyphs).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GlyphError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}
