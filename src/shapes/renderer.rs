use std::rc::Rc;

use crate::errors::*;
use crate::math::Color;
use crate::video::{
    AttributeFormat, Buffer, BufferHint, BufferTarget, Context, IndexFormat, Primitive, Program,
    VertexArray,
};

use super::geometry::{self, ShapeTransform, MAX_SAMPLES};

const VERTEX_SHADER: &str = r#"
#version 330 core
uniform vec2 center;
uniform vec2 half_size;
uniform vec2 to_ndc;
uniform float theta;
uniform float phase;
uniform float zindex;
in vec2 vert;

mat2 rotation(float a) {
    return mat2(cos(a), sin(a), -sin(a), cos(a));
}

void main(void) {
    vec2 p = rotation(phase) * vec2(vert.x, -vert.y);
    p = rotation(theta) * (p * half_size);
    gl_Position = vec4(center + p * to_ndc, zindex, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"
#version 330 core
uniform vec4 rgba;
out vec4 colour;

void main(void) {
    colour = rgba;
}
"#;

/// Draws regular polygons as fans over a shared circle of `samples` points.
///
/// The index buffer always has room for `samples` triangles. Only the first
/// `3 * sides` indices are regenerated when the number of sides changes.
#[derive(Debug)]
pub struct PolygonRenderer {
    ctx: Context,
    samples: u32,
    sides: u32,
    color: Color,
    zindex: f32,
    program: Program,
    vao: VertexArray,
    indices: Rc<Buffer>,
}

impl PolygonRenderer {
    pub fn new(ctx: &Context, samples: u32) -> Result<Self> {
        let samples = samples.max(3).min(MAX_SAMPLES);

        let mut program = Program::with_sources(ctx, VERTEX_SHADER, FRAGMENT_SHADER)?;
        program.add_attribute("vert")?;
        program.add_uniforms(&["center", "half_size", "to_ndc", "theta", "phase", "zindex", "rgba"])?;

        let mut vao = VertexArray::new(ctx);
        vao.add_attribute(
            "vert",
            &geometry::circle_vertices(samples),
            AttributeFormat::floats(2),
            BufferHint::Immutable,
            0,
        )?;

        let indices = Rc::new(Buffer::with_data(
            ctx,
            BufferTarget::Index,
            &geometry::fan_indices(samples, samples),
            BufferHint::Dynamic,
        ));
        vao.set_index_buffer_shared(Primitive::Triangles, IndexFormat::U16, indices.clone());

        info!(
            "Created polygon renderer with {} samples on the unit circle.",
            samples
        );

        Ok(PolygonRenderer {
            ctx: ctx.clone(),
            samples,
            sides: samples,
            color: Color::black(),
            zindex: 0.0,
            program,
            vao,
            indices,
        })
    }

    #[inline]
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// The number of sides of the last drawn polygon.
    #[inline]
    pub fn sides(&self) -> u32 {
        self.sides
    }

    pub fn index_buffer(&self) -> &Rc<Buffer> {
        &self.indices
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    pub fn zindex(&self) -> f32 {
        self.zindex
    }

    pub fn set_zindex(&mut self, zindex: f32) {
        self.zindex = zindex;
    }

    /// Draws a polygon with `sides` sides inscribed in the `w` by `h` box with
    /// top-left corner `(x, y)`, rotated by `theta` radians around the center of the
    /// box.
    pub fn render(&mut self, sides: u32, x: f32, y: f32, w: f32, h: f32, theta: f32) -> Result<()> {
        self.render_with_phase(sides, x, y, w, h, theta, 0.0)
    }

    /// Like `render`, but the polygon is first rotated by `phase` inside of its
    /// box, before being stretched to it.
    #[allow(clippy::too_many_arguments)]
    pub fn render_with_phase(
        &mut self,
        sides: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        theta: f32,
        phase: f32,
    ) -> Result<()> {
        let sides = geometry::clamp_sides(sides, self.samples);
        if sides != self.sides {
            trace!("Regenerates the fan indices for {} sides.", sides);
            self.indices
                .upload_sub(0, &geometry::fan_indices(self.samples, sides))?;
            self.sides = sides;
        }

        let transform = match ShapeTransform::new(self.ctx.viewport(), x, y, w, h) {
            Some(v) => v,
            None => return Ok(()),
        };

        self.program.use_program();
        self.program.set_uniform("center", transform.center)?;
        self.program.set_uniform("half_size", transform.half_size)?;
        self.program.set_uniform("to_ndc", transform.to_ndc)?;
        self.program.set_uniform("theta", theta)?;
        self.program.set_uniform("phase", phase)?;
        self.program.set_uniform("zindex", self.zindex)?;
        self.program.set_uniform("rgba", self.color)?;
        self.program.enable_uniforms();

        self.vao.bind();
        self.vao.enable_attributes(self.program.attributes());
        let result = self.vao.draw_elements_range(0, 3 * sides as usize);
        self.vao.disable_attributes(self.program.attributes());
        self.vao.unbind();
        self.program.unuse();

        result
    }
}
