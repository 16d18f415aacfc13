//! Immediate mode drawing of flat, single colored polygons.
//!
//! ```rust,ignore
//! let mut shapes = Shapes::new(&ctx);
//! shapes.color(Color::red());
//! shapes.draw_ngon(6, 100.0, 100.0, 64.0, 64.0, 0.0)?;
//! shapes.draw_line(0.0, 0.0, 320.0, 240.0, 2.0)?;
//! ```
//!
//! Positions and sizes are given in pixels, with the origin at the top-left corner
//! of the viewport and y pointing down. Angles are in radians, clockwise on screen.

pub mod geometry;
pub mod renderer;

pub use self::geometry::{ShapeTransform, MAX_SAMPLES};
pub use self::renderer::PolygonRenderer;

use std::f32::consts::{FRAC_PI_4, SQRT_2};

use crate::errors::*;
use crate::math::Color;
use crate::settings::ShapeSettings;
use crate::video::Context;

/// Draws polygons with the current color and depth. The underlying renderer is
/// created by `init`, or lazily by the first draw call.
#[derive(Debug)]
pub struct Shapes {
    ctx: Context,
    settings: ShapeSettings,
    poly: Option<PolygonRenderer>,
    color: Color,
    zindex: f32,
}

impl Shapes {
    pub fn new(ctx: &Context) -> Self {
        Shapes::with_settings(ctx, ShapeSettings::default())
    }

    pub fn with_settings(ctx: &Context, settings: ShapeSettings) -> Self {
        let color = settings.color.into();
        let zindex = settings.zindex;

        Shapes {
            ctx: ctx.clone(),
            settings,
            poly: None,
            color,
            zindex,
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.poly.is_some()
    }

    /// Compiles the polygon program and uploads the circle geometry. Does nothing
    /// if it has been done already.
    pub fn init(&mut self) -> Result<()> {
        if self.poly.is_none() {
            self.poly = Some(PolygonRenderer::new(&self.ctx, self.settings.samples)?);
        }

        Ok(())
    }

    /// Sets the color of the following draws.
    pub fn color<T: Into<Color>>(&mut self, color: T) {
        self.color = color.into();
    }

    /// Sets the depth, in device units, of the following draws.
    pub fn zvalue(&mut self, zindex: f32) {
        self.zindex = zindex;
    }

    #[inline]
    pub fn current_color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn current_zvalue(&self) -> f32 {
        self.zindex
    }

    /// Draws a regular polygon inscribed in the box `(x, y, w, h)`, rotated by
    /// `theta` around the center of the box. `sides` is clamped into
    /// `[3, samples]`.
    pub fn draw_ngon(&mut self, sides: u32, x: f32, y: f32, w: f32, h: f32, theta: f32) -> Result<()> {
        self.draw(sides, x, y, w, h, theta, 0.0)
    }

    /// Draws the `w` by `h` rectangle with top-left corner `(x, y)`, rotated by
    /// `theta` around its center.
    pub fn draw_quad(&mut self, x: f32, y: f32, w: f32, h: f32, theta: f32) -> Result<()> {
        // The square inscribed in the unit circle is √2 times smaller than its
        // bounding box, once the circle is turned by 45 degrees.
        let grow = SQRT_2 - 1.0;
        self.draw(
            4,
            x - w * grow * 0.5,
            y - h * grow * 0.5,
            w * SQRT_2,
            h * SQRT_2,
            theta,
            FRAC_PI_4,
        )
    }

    /// Draws a segment from `(xa, ya)` to `(xb, yb)` as a quad `thickness` pixels
    /// wide.
    pub fn draw_line(&mut self, xa: f32, ya: f32, xb: f32, yb: f32, thickness: f32) -> Result<()> {
        let (dx, dy) = (xb - xa, yb - ya);
        let len = (dx * dx + dy * dy).sqrt();
        let (cx, cy) = ((xa + xb) * 0.5, (ya + yb) * 0.5);

        self.draw_quad(
            cx - len * 0.5,
            cy - thickness * 0.5,
            len,
            thickness,
            dy.atan2(dx),
        )
    }

    /// The underlying renderer, if it has been initialized.
    pub fn renderer(&self) -> Option<&PolygonRenderer> {
        self.poly.as_ref()
    }

    #[allow(clippy::too_many_arguments)]
    fn draw(&mut self, sides: u32, x: f32, y: f32, w: f32, h: f32, theta: f32, phase: f32) -> Result<()> {
        self.init()?;

        let (color, zindex) = (self.color, self.zindex);
        match self.poly.as_mut() {
            Some(poly) => {
                poly.set_color(color);
                poly.set_zindex(zindex);
                poly.render_with_phase(sides, x, y, w, h, theta, phase)
            }
            None => Ok(()),
        }
    }
}
