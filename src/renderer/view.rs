//! World ↔ screen mapping and drawing helpers

use glam::Vec2;

use crate::consts::{SHOOTER_Y, VIEW_HALF_HEIGHT, VIEW_HALF_WIDTH};

/// Target card size in world units
pub const TARGET_SIZE: Vec2 = Vec2::new(1.2, 0.7);

/// Maps the fixed world rectangle onto a canvas, preserving aspect ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Pixels per world unit
    pub scale: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        let scale = (width / (2.0 * VIEW_HALF_WIDTH)).min(height / (2.0 * VIEW_HALF_HEIGHT));
        Self {
            width,
            height,
            scale: scale.max(f32::EPSILON),
        }
    }

    /// World position (y up, origin at centre) to canvas pixels (y down)
    #[inline]
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            self.width / 2.0 + world.x * self.scale,
            self.height / 2.0 - world.y * self.scale,
        )
    }

    /// Top-left corner and size in pixels of a target card centred on `pos`
    pub fn target_rect(&self, pos: Vec2) -> (Vec2, Vec2) {
        let size = TARGET_SIZE * self.scale;
        (self.to_screen(pos) - size / 2.0, size)
    }
}

/// Shooter image state. Until (or unless) the image loads, a placeholder
/// triangle is drawn.
#[derive(Debug, Clone)]
pub enum ShooterSprite<I> {
    Loading,
    Ready(I),
    Placeholder,
}

impl<I> Default for ShooterSprite<I> {
    fn default() -> Self {
        ShooterSprite::Loading
    }
}

impl<I> ShooterSprite<I> {
    pub fn loaded(&mut self, image: I) {
        *self = ShooterSprite::Ready(image);
    }

    pub fn failed(&mut self) {
        log::warn!("Shooter image failed to load, using placeholder shape");
        *self = ShooterSprite::Placeholder;
    }

    pub fn image(&self) -> Option<&I> {
        match self {
            ShooterSprite::Ready(image) => Some(image),
            _ => None,
        }
    }
}

/// Placeholder ship: a triangle pointing up, in world units
pub fn placeholder_ship() -> [Vec2; 3] {
    [
        Vec2::new(0.0, SHOOTER_Y + 0.3),
        Vec2::new(-0.3, SHOOTER_Y - 0.3),
        Vec2::new(0.3, SHOOTER_Y - 0.3),
    ]
}

/// CSS colour for a hue in [0, 1) with the given opacity
pub fn hsl_css(hue: f32, alpha: f32) -> String {
    format!(
        "hsla({:.0}, 100%, 50%, {:.2})",
        hue.rem_euclid(1.0) * 360.0,
        alpha.clamp(0.0, 1.0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centre_maps_to_middle() {
        let vp = Viewport::new(1200.0, 840.0);
        assert_eq!(vp.to_screen(Vec2::ZERO), Vec2::new(600.0, 420.0));
    }

    #[test]
    fn test_y_is_flipped() {
        let vp = Viewport::new(1200.0, 840.0);
        let top = vp.to_screen(Vec2::new(0.0, VIEW_HALF_HEIGHT));
        assert!(top.y.abs() < 1e-3);
    }

    #[test]
    fn test_aspect_preserved() {
        // Wide canvas: height limits the scale
        let vp = Viewport::new(4000.0, 840.0);
        assert!((vp.scale - 100.0).abs() < 1e-3);
        let (_, size) = vp.target_rect(Vec2::ZERO);
        assert!((size.x - 120.0).abs() < 1e-3);
        assert!((size.y - 70.0).abs() < 1e-3);
    }

    #[test]
    fn test_sprite_fallback() {
        let mut sprite: ShooterSprite<&str> = ShooterSprite::default();
        assert!(sprite.image().is_none());
        sprite.failed();
        assert!(matches!(sprite, ShooterSprite::Placeholder));
        sprite.loaded("ship");
        assert_eq!(sprite.image(), Some(&"ship"));
    }

    #[test]
    fn test_hsl_css() {
        assert_eq!(hsl_css(0.5, 1.0), "hsla(180, 100%, 50%, 1.00)");
        assert_eq!(hsl_css(0.0, -1.0), "hsla(0, 100%, 50%, 0.00)");
    }
}
