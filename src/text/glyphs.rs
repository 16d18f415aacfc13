use std::collections::BTreeMap;

use crate::errors::*;
use crate::video::{
    Context, InternalFormat, PixelFormat, PixelType, Texture, TextureFilter, TextureOptions,
    TextureTarget, TextureWrap, Viewport,
};

use super::atlas::{self, AtlasRect};
use super::font::GlyphSource;

/// The metrics of a character and its place in the atlas, in pixels of the size
/// the font was loaded with.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Character {
    pub width: u32,
    pub height: u32,
    pub bearing_x: i32,
    pub bearing_y: i32,
    pub advance: f32,
    pub tex_x: u32,
    pub tex_y: u32,
}

/// One instance of the glyph quad. Both are `(x, y, width, height)`, the position
/// in device coordinates from the bottom-left corner and the texture coordinates
/// in the atlas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphQuad {
    pub position: [f32; 4],
    pub texcoord: [f32; 4],
}

/// A font rasterized into a single channel atlas.
#[derive(Debug)]
pub struct Font {
    name: String,
    atlas: Texture,
    resolution: u32,
    pixel_size: u32,
    characters: BTreeMap<char, Character>,
}

impl Font {
    /// Rasterizes every character of `charset`, and uploads them into a new atlas
    /// texture. Characters the source can't produce are skipped.
    pub fn load(
        ctx: &Context,
        source: &dyn GlyphSource,
        pixel_size: u32,
        charset: &str,
        padding: u32,
    ) -> Result<Self> {
        let mut glyphs = Vec::new();
        for c in charset.chars() {
            match source.rasterize(c, pixel_size) {
                Some(glyph) => glyphs.push((c, glyph)),
                None => warn!("Font {} has no glyph for {:?}.", source.name(), c),
            }
        }

        if glyphs.is_empty() {
            return Err(Error::FontLoadFailure(format!(
                "{} has none of the requested glyphs.",
                source.name()
            )));
        }

        let sizes: Vec<_> = glyphs.iter().map(|(_, v)| (v.width, v.height)).collect();
        let layout = atlas::layout(&sizes, pixel_size, padding).ok_or_else(|| {
            Error::FontLoadFailure(format!("glyphs of {} do not fit in an atlas.", source.name()))
        })?;

        let resolution = layout.resolution;
        let mut pixels = vec![0u8; (resolution * resolution) as usize];
        let mut characters = BTreeMap::new();

        for ((c, glyph), rect) in glyphs.iter().zip(&layout.rects) {
            atlas::blit(&mut pixels, resolution, *rect, &glyph.pixels);

            let AtlasRect { x, y, .. } = *rect;
            characters.insert(
                *c,
                Character {
                    width: glyph.width,
                    height: glyph.height,
                    bearing_x: glyph.bearing_x,
                    bearing_y: glyph.bearing_y,
                    advance: glyph.advance,
                    tex_x: x,
                    tex_y: y,
                },
            );
        }

        let options = TextureOptions {
            min_filter: TextureFilter::LinearMipmapLinear,
            mag_filter: TextureFilter::Linear,
            wrap_s: TextureWrap::Clamp,
            wrap_t: TextureWrap::Clamp,
            wrap_r: TextureWrap::Clamp,
        };

        let texture = Texture::with_options(ctx, TextureTarget::Texture2D, options);
        texture.set_format(InternalFormat::R8, PixelFormat::Red);
        texture.set_type(PixelType::UByte);

        // Rows of an atlas are tightly packed.
        let previous = ctx.visitor().get_unpack_alignment();
        Texture::unpack_alignment(ctx, 1);
        let uploaded = texture.upload_2d(Some(&pixels), resolution, resolution);
        Texture::unpack_alignment(ctx, previous);
        uploaded?;
        texture.generate_mipmaps();

        info!(
            "Loaded font {} with {} glyphs into a {}x{} atlas.",
            source.name(),
            characters.len(),
            resolution,
            resolution
        );

        Ok(Font {
            name: source.name().to_owned(),
            atlas: texture,
            resolution,
            pixel_size,
            characters,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn atlas(&self) -> &Texture {
        &self.atlas
    }

    #[inline]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    #[inline]
    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    pub fn character(&self, c: char) -> Option<&Character> {
        self.characters.get(&c)
    }

    pub fn characters(&self) -> impl Iterator<Item = (&char, &Character)> {
        self.characters.iter()
    }

    /// Lays out `text` with its baseline starting at pixel `(x, y)`, rendered
    /// `size` pixels high. Missing characters are replaced by `fallback`, and
    /// dropped if that is missing as well. Empty glyphs only move the pen.
    #[allow(clippy::too_many_arguments)]
    pub fn layout(
        &self,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        viewport: Viewport,
        fallback: char,
        line_spacing: f32,
    ) -> Vec<GlyphQuad> {
        let mut quads = Vec::with_capacity(text.len());
        if viewport.is_empty() || self.pixel_size == 0 {
            return quads;
        }

        let (vw, vh) = (viewport.width as f32, viewport.height as f32);
        let scale = size / self.pixel_size as f32;
        let texel = 1.0 / self.resolution as f32;
        let (mut pen_x, mut pen_y) = (x, y);

        for c in text.chars() {
            if c == '\n' {
                pen_x = x;
                pen_y += size * line_spacing;
                continue;
            }

            let ch = match self.characters.get(&c).or_else(|| self.characters.get(&fallback)) {
                Some(v) => v,
                None => continue,
            };

            if ch.width > 0 && ch.height > 0 {
                let left = pen_x + ch.bearing_x as f32 * scale;
                let bottom = pen_y + (ch.height as f32 - ch.bearing_y as f32) * scale;
                let (w, h) = (ch.width as f32 * scale, ch.height as f32 * scale);

                quads.push(GlyphQuad {
                    position: [
                        left / vw * 2.0 - 1.0,
                        1.0 - bottom / vh * 2.0,
                        w / vw * 2.0,
                        h / vh * 2.0,
                    ],
                    texcoord: [
                        ch.tex_x as f32 * texel,
                        ch.tex_y as f32 * texel,
                        ch.width as f32 * texel,
                        ch.height as f32 * texel,
                    ],
                });
            }

            pen_x += ch.advance * scale;
        }

        quads
    }
}
