//! Rendering module
//!
//! `view` maps world units to canvas pixels and is platform independent.
//! `canvas` draws a frame with the 2D canvas API (web only).

pub mod view;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use view::{ShooterSprite, TARGET_SIZE, Viewport, hsl_css, placeholder_ship};
