use std::fs::File;
use std::io::Read;
use std::path::Path;

use rusttype::{point, Scale};

use crate::errors::*;

/// The coverage bitmap and metrics of one rasterized character, in pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    /// Offset from the pen position to the left edge of the bitmap.
    pub bearing_x: i32,
    /// Offset from the baseline up to the top edge of the bitmap.
    pub bearing_y: i32,
    /// Horizontal distance to the pen position of the next character.
    pub advance: f32,
    /// `width * height` coverage values, row by row from the top.
    pub pixels: Vec<u8>,
}

/// Produces glyph bitmaps for the text renderer.
pub trait GlyphSource {
    /// The name the font is registered under.
    fn name(&self) -> &str;

    /// Rasterizes `c` at `pixel_size` pixels per em. Returns `None` if the font does
    /// not contain the character.
    fn rasterize(&self, c: char, pixel_size: u32) -> Option<GlyphBitmap>;
}

/// A TrueType or OpenType font rasterized with `rusttype`.
pub struct RustTypeFont {
    name: String,
    font: rusttype::Font<'static>,
}

impl RustTypeFont {
    pub fn from_bytes<T: Into<String>>(name: T, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let font = rusttype::Font::try_from_vec(bytes)
            .ok_or_else(|| Error::FontLoadFailure(format!("{} is not a valid font.", name)))?;

        Ok(RustTypeFont { name, font })
    }

    /// Loads the font file at path. The font is named after the file stem.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut bytes = Vec::new();
        File::open(path)?.read_to_end(&mut bytes)?;

        let name = path
            .file_stem()
            .map(|v| v.to_string_lossy().into_owned())
            .unwrap_or_default();

        RustTypeFont::from_bytes(name, bytes)
    }
}

impl ::std::fmt::Debug for RustTypeFont {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        f.debug_struct("RustTypeFont")
            .field("name", &self.name)
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl GlyphSource for RustTypeFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn rasterize(&self, c: char, pixel_size: u32) -> Option<GlyphBitmap> {
        let glyph = self.font.glyph(c);
        if glyph.id().0 == 0 {
            return None;
        }

        let glyph = glyph.scaled(Scale::uniform(pixel_size as f32));
        let advance = glyph.h_metrics().advance_width;
        let glyph = glyph.positioned(point(0.0, 0.0));

        let bb = match glyph.pixel_bounding_box() {
            Some(v) => v,
            None => {
                return Some(GlyphBitmap {
                    advance,
                    ..Default::default()
                });
            }
        };

        let (width, height) = (bb.width() as u32, bb.height() as u32);
        let mut pixels = vec![0; (width * height) as usize];
        glyph.draw(|x, y, v| {
            if let Some(p) = pixels.get_mut((y * width + x) as usize) {
                *p = (v * 255.0).round().min(255.0) as u8;
            }
        });

        Some(GlyphBitmap {
            width,
            height,
            bearing_x: bb.min.x,
            bearing_y: -bb.min.y,
            advance,
            pixels,
        })
    }
}
