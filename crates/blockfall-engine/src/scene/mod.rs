//! Scene tree types.
//!
//! Responsibilities:
//! - the node tree ([`SceneTree`], [`VisualNode`]) produced by [`SceneComposer`]
//! - deterministic paint order (draw order + tree position) via [`RenderList`]

mod compose;
mod list;
mod node;
mod tree;

pub use compose::{SceneAssets, SceneComposer, SceneInputs};
pub use list::{RenderItem, RenderList, SortKey};
pub use node::{DrawOrder, NodeKind, VisualNode};
pub use tree::{Iter, SceneTree};
