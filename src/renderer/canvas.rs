//! 2D canvas renderer
//!
//! Immediate mode: every frame is redrawn from `RunState` + `Effects`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::view::{ShooterSprite, Viewport, hsl_css, placeholder_ship};
use crate::consts::{SHOOTER_Y, VIEW_HALF_HEIGHT, VIEW_HALF_WIDTH};
use crate::fx::Effects;
use crate::sim::RunState;

const STAR_COUNT: usize = 160;
/// Shooter image size in world units
const SHOOTER_SIZE: f32 = 1.5;

struct Star {
    pos: Vec2,
    size: f32,
    twinkle: f32,
}

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    pub viewport: Viewport,
    pub shooter: ShooterSprite<HtmlImageElement>,
    stars: Vec<Star>,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;

        let mut rng = Pcg32::seed_from_u64(0x5eed);
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                pos: Vec2::new(
                    rng.random_range(-VIEW_HALF_WIDTH..VIEW_HALF_WIDTH),
                    rng.random_range(-VIEW_HALF_HEIGHT..VIEW_HALF_HEIGHT),
                ),
                size: rng.random_range(0.01..0.03),
                twinkle: rng.random_range(0.5..2.0),
            })
            .collect();

        Some(Self {
            ctx,
            viewport: Viewport::new(canvas.width() as f32, canvas.height() as f32),
            shooter: ShooterSprite::default(),
            stars,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width as f32, height as f32);
    }

    /// Draw one frame. `time` is seconds since start (star twinkle only).
    pub fn render(&self, state: &RunState, fx: &Effects, time: f64) {
        let ctx = &self.ctx;
        let vp = &self.viewport;
        ctx.set_global_alpha(1.0);
        ctx.set_fill_style_str("#000");
        ctx.fill_rect(0.0, 0.0, vp.width as f64, vp.height as f64);

        self.draw_stars(time);
        self.draw_shooter();

        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        for target in state.alive_targets() {
            let (corner, size) = vp.target_rect(target.pos);
            let (x, y, w, h) = (corner.x as f64, corner.y as f64, size.x as f64, size.y as f64);

            ctx.set_fill_style_str("rgba(0, 255, 255, 0.85)");
            ctx.fill_rect(x, y, w, h);
            ctx.set_stroke_style_str("#ff00ff");
            ctx.set_line_width(2.0);
            ctx.stroke_rect(x, y, w, h);

            ctx.set_fill_style_str("#fff");
            ctx.set_font(&format!("bold {:.0}px \"Courier New\", monospace", h * 0.45));
            let _ = ctx.fill_text(&target.expression, x + w / 2.0, y + h / 2.0);
        }

        ctx.set_stroke_style_str("#00ffff");
        ctx.set_line_width(3.0);
        for laser in &fx.lasers {
            let from = vp.to_screen(laser.from);
            let to = vp.to_screen(laser.to);
            ctx.begin_path();
            ctx.move_to(from.x as f64, from.y as f64);
            ctx.line_to(to.x as f64, to.y as f64);
            ctx.stroke();
        }

        let radius = (0.05 * vp.scale) as f64;
        for p in &fx.particles {
            let pos = vp.to_screen(p.pos);
            ctx.set_fill_style_str(&hsl_css(p.hue, p.life));
            ctx.begin_path();
            let _ = ctx.arc(pos.x as f64, pos.y as f64, radius, 0.0, std::f64::consts::TAU);
            ctx.fill();
        }
    }

    fn draw_stars(&self, time: f64) {
        let ctx = &self.ctx;
        for star in &self.stars {
            let pos = self.viewport.to_screen(star.pos);
            let twinkle = (time * star.twinkle as f64 + star.pos.x as f64).sin() * 0.2 + 0.8;
            ctx.set_global_alpha(twinkle);
            ctx.set_fill_style_str("#cfe8ff");
            let size = (star.size * self.viewport.scale) as f64;
            ctx.fill_rect(pos.x as f64, pos.y as f64, size, size);
        }
        ctx.set_global_alpha(1.0);
    }

    fn draw_shooter(&self) {
        let ctx = &self.ctx;
        let vp = &self.viewport;
        if let Some(image) = self.shooter.image() {
            let size = SHOOTER_SIZE * vp.scale;
            let centre = vp.to_screen(Vec2::new(0.0, SHOOTER_Y));
            let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                image,
                (centre.x - size / 2.0) as f64,
                (centre.y - size / 2.0) as f64,
                size as f64,
                size as f64,
            );
            return;
        }

        let [a, b, c] = placeholder_ship().map(|p| vp.to_screen(p));
        ctx.set_fill_style_str("#0096ff");
        ctx.begin_path();
        ctx.move_to(a.x as f64, a.y as f64);
        ctx.line_to(b.x as f64, b.y as f64);
        ctx.line_to(c.x as f64, c.y as f64);
        ctx.close_path();
        ctx.fill();
    }
}
