use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::errors::*;
use crate::settings::TextSettings;
use crate::video::{
    AttributeFormat, Buffer, BufferHint, BufferTarget, Context, Primitive, Program, Texture,
    VertexArray,
};

use super::font::{GlyphSource, RustTypeFont};
use super::glyphs::{Font, GlyphQuad};

const VERTEX_SHADER: &str = r#"
#version 330 core
in vec2 vert;
in vec4 texT;
in vec4 posT;
out vec2 tex;

void main(void) {
    tex = texT.xy + texT.zw * vert;
    gl_Position = vec4(posT.xy + posT.zw * vert, 0.0, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"
#version 330 core
uniform vec3 rgb;
uniform sampler2D atlas;
in vec2 tex;
out vec4 colour;

void main(void) {
    colour = vec4(rgb, texture(atlas, tex).r);
}
"#;

const QUAD_VERTICES: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
const QUAD_INDICES: [u8; 6] = [0, 1, 2, 0, 2, 3];

/// Draws strings as instanced, textured quads.
///
/// Every glyph is one instance of a unit quad. The per-instance position and
/// texture rectangles are streamed into two fixed size buffers, and each full
/// batch of them is drawn at once.
#[derive(Debug)]
pub struct TextRenderer {
    ctx: Context,
    settings: TextSettings,
    program: Program,
    vao: VertexArray,
    positions: Rc<Buffer>,
    texcoords: Rc<Buffer>,
    fonts: HashMap<String, Font>,
    font: Option<String>,
    size: f32,
    color: [f32; 3],
}

impl TextRenderer {
    pub fn new(ctx: &Context) -> Result<Self> {
        TextRenderer::with_settings(ctx, TextSettings::default())
    }

    pub fn with_settings(ctx: &Context, mut settings: TextSettings) -> Result<Self> {
        settings.batch_capacity = settings.batch_capacity.max(1);

        let mut program = Program::with_sources(ctx, VERTEX_SHADER, FRAGMENT_SHADER)?;
        program.add_attributes(&["vert", "posT", "texT"])?;
        program.add_uniform("rgb")?;
        program.add_sampler("atlas", 0)?;

        let mut vao = VertexArray::new(ctx);
        vao.set_index_buffer(Primitive::Triangles, &QUAD_INDICES, BufferHint::Immutable);
        vao.add_attribute(
            "vert",
            &QUAD_VERTICES,
            AttributeFormat::floats(2),
            BufferHint::Immutable,
            0,
        )?;

        let positions = Rc::new(Buffer::new(ctx, BufferTarget::Vertex));
        positions.reserve::<[f32; 4]>(settings.batch_capacity, BufferHint::Dynamic);
        vao.add_attribute_buffer("posT", positions.clone(), AttributeFormat::floats(4), 1)?;

        let texcoords = Rc::new(Buffer::new(ctx, BufferTarget::Vertex));
        texcoords.reserve::<[f32; 4]>(settings.batch_capacity, BufferHint::Dynamic);
        vao.add_attribute_buffer("texT", texcoords.clone(), AttributeFormat::floats(4), 1)?;

        let size = settings.pixel_size as f32;
        let color = settings.color;

        Ok(TextRenderer {
            ctx: ctx.clone(),
            settings,
            program,
            vao,
            positions,
            texcoords,
            fonts: HashMap::new(),
            font: None,
            size,
            color,
        })
    }

    #[inline]
    pub fn settings(&self) -> &TextSettings {
        &self.settings
    }

    /// Sets the rendered height, in pixels, of the following draws.
    pub fn set_font_size(&mut self, size: f32) {
        self.size = size;
    }

    #[inline]
    pub fn font_size(&self) -> f32 {
        self.size
    }

    pub fn set_font_color(&mut self, rgb: [f32; 3]) {
        self.color = rgb;
    }

    #[inline]
    pub fn font_color(&self) -> [f32; 3] {
        self.color
    }

    /// Makes `name` the font of the following draws.
    pub fn set_font(&mut self, name: &str) -> Result<()> {
        if !self.fonts.contains_key(name) {
            return Err(Error::UnknownFont(name.to_owned()));
        }

        self.font = Some(name.to_owned());
        Ok(())
    }

    pub fn current_font(&self) -> Option<&str> {
        self.font.as_ref().map(|v| v.as_str())
    }

    pub fn has_font(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    pub fn font(&self, name: &str) -> Option<&Font> {
        self.fonts.get(name)
    }

    pub fn fonts(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(|v| v.as_str())
    }

    /// Rasterizes the configured charset of `source` into a new atlas. A font
    /// with the same name is replaced. The first loaded font becomes the current
    /// one. Returns the name of the font.
    pub fn load_font(&mut self, source: &dyn GlyphSource, pixel_size: u32) -> Result<String> {
        let font = Font::load(
            &self.ctx,
            source,
            pixel_size,
            &self.settings.charset,
            self.settings.padding,
        )?;

        let name = font.name().to_owned();
        self.fonts.insert(name.clone(), font);

        if self.font.is_none() {
            self.font = Some(name.clone());
        }

        Ok(name)
    }

    /// Loads the font file at path with `rusttype`.
    pub fn load_font_file<P: AsRef<Path>>(&mut self, path: P, pixel_size: u32) -> Result<String> {
        let source = RustTypeFont::from_file(path)?;
        self.load_font(&source, pixel_size)
    }

    /// Draws `text` with the current font, size and color. The baseline starts at
    /// pixel `(x, y)`.
    pub fn draw(&mut self, text: &str, x: f32, y: f32) -> Result<()> {
        let font = match self.font.clone() {
            Some(v) => v,
            None => return Err(Error::UnknownFont(String::new())),
        };

        let (size, color) = (self.size, self.color);
        self.draw_with(text, x, y, &font, size, color)
    }

    pub fn draw_with(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        font: &str,
        size: f32,
        rgb: [f32; 3],
    ) -> Result<()> {
        let font = self
            .fonts
            .get(font)
            .ok_or_else(|| Error::UnknownFont(font.to_owned()))?;

        let quads = font.layout(
            text,
            x,
            y,
            size,
            self.ctx.viewport(),
            self.settings.fallback,
            self.settings.line_spacing,
        );

        if quads.is_empty() {
            return Ok(());
        }

        self.program.use_program();
        self.program.set_uniform("rgb", rgb)?;
        self.program.enable_uniforms();

        Texture::activate(&self.ctx, 0);
        font.atlas().bind();
        self.program.enable_samplers();

        self.ctx.visitor().set_blend(true);
        self.vao.bind();
        self.vao.enable_attributes(self.program.attributes());

        let result = self.draw_batches(&quads);

        self.vao.disable_attributes(self.program.attributes());
        self.vao.unbind();
        self.ctx.visitor().set_blend(false);
        font.atlas().unbind();
        self.program.unuse();

        result
    }

    fn draw_batches(&self, quads: &[GlyphQuad]) -> Result<()> {
        for batch in quads.chunks(self.settings.batch_capacity) {
            let positions: Vec<[f32; 4]> = batch.iter().map(|v| v.position).collect();
            let texcoords: Vec<[f32; 4]> = batch.iter().map(|v| v.texcoord).collect();

            self.positions.upload_sub(0, &positions)?;
            self.texcoords.upload_sub(0, &texcoords)?;
            self.vao.draw_elements_instanced(batch.len())?;
        }

        Ok(())
    }
}
