//! Asset handles and loading state.
//!
//! Responsibilities:
//! - opaque, cheaply cloned handles to loaded textures and fonts
//! - an explicit per-asset state machine (`Pending → Ready | Failed`)
//! - the provider seam ([`AssetProvider`]) and a polling cache in front of it
//!
//! Loading never blocks: callers read the current [`AssetState`] each frame and
//! render a placeholder until it is `Ready`.

pub(crate) mod cache;
mod fs;
mod provider;

pub use cache::{AssetCache, PumpReport, ScopeId};
pub use fs::DirectoryProvider;
pub use provider::{AssetCompletion, AssetProvider, AssetRequest, LoadTicket};

use core::fmt;
use core::ops::Deref;
use std::sync::Arc;

use crate::error::{AssetError, AssetLoadError};
use crate::text::ParsedFont;

/// Identifier an asset is requested by (a path relative to the provider root).
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct AssetId(Arc<str>);

impl AssetId {
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AssetKind {
    Texture,
    Font,
}

/// Decoded texture pixels, RGBA8, row-major from the top-left.
#[derive(Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

impl fmt::Debug for TextureData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba8.len())
            .finish()
    }
}

#[derive(Debug)]
struct Loaded<T> {
    id: AssetId,
    data: T,
}

/// Shared handle to a loaded texture. Clones share the same pixels.
#[derive(Clone)]
pub struct TextureHandle(Arc<Loaded<TextureData>>);

/// Shared handle to a parsed font.
#[derive(Clone)]
pub struct FontHandle(Arc<Loaded<ParsedFont>>);

macro_rules! handle_impls {
    ($handle:ident, $data:ty) => {
        impl $handle {
            pub fn new(id: AssetId, data: $data) -> Self {
                Self(Arc::new(Loaded { id, data }))
            }

            pub fn id(&self) -> &AssetId {
                &self.0.id
            }

            /// True when both handles refer to the same loaded asset.
            pub fn same_asset(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0)
            }
        }

        impl Deref for $handle {
            type Target = $data;
            fn deref(&self) -> &$data {
                &self.0.data
            }
        }

        /// Handles compare by identity, falling back to the source identifier.
        impl PartialEq for $handle {
            fn eq(&self, other: &Self) -> bool {
                self.same_asset(other) || self.0.id == other.0.id
            }
        }

        impl fmt::Debug for $handle {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($handle), self.0.id)
            }
        }
    };
}

handle_impls!(TextureHandle, TextureData);
handle_impls!(FontHandle, ParsedFont);

/// A resolved asset of either kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetHandle {
    Texture(TextureHandle),
    Font(FontHandle),
}

impl AssetHandle {
    pub fn kind(&self) -> AssetKind {
        match self {
            AssetHandle::Texture(_) => AssetKind::Texture,
            AssetHandle::Font(_) => AssetKind::Font,
        }
    }
}

/// Loading state of one asset as seen by a consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetState<T> {
    Pending,
    Ready(T),
    Failed(AssetLoadError),
}

impl<T> AssetState<T> {
    #[inline]
    pub fn ready(&self) -> Option<&T> {
        match self {
            AssetState::Ready(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, AssetState::Pending)
    }

    pub fn as_result(&self) -> Result<&T, AssetError> {
        match self {
            AssetState::Ready(v) => Ok(v),
            AssetState::Pending => Err(AssetError::Pending),
            AssetState::Failed(e) => Err(AssetError::Failed(e.clone())),
        }
    }
}
