//! Blockfall engine crate.
//!
//! Layered scene composition for the title screen: named render layers and
//! camera masks, viewport-responsive node sizing, extruded text, and a frame
//! driver that rebuilds the scene as the viewport and assets change. Drawing
//! is left to a [`stage::HostRenderer`].

pub mod assets;
pub mod config;
pub mod coords;
pub mod error;
pub mod layers;
pub mod layout;
pub mod logging;
pub mod paint;
pub mod scene;
pub mod stage;
pub mod text;
pub mod viewport;
