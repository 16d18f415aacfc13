//! Functions for loading renderer settings.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::*;

/// A structure containing configuration data for the drawing helpers. Every field
/// falls back to its default when it is missing from the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub shapes: ShapeSettings,
    pub text: TextSettings,
}

impl Settings {
    /// Create settings from the JSON file at path.
    pub fn load_from<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let mut buf = String::new();
        let mut file = File::open(&path)?;
        file.read_to_string(&mut buf)?;

        Self::from_json(&buf)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeSettings {
    /// The number of vertices sampled on the unit circle. This is also the
    /// maximum number of sides a polygon can have.
    pub samples: u32,
    pub color: [f32; 4],
    pub zindex: f32,
}

impl Default for ShapeSettings {
    fn default() -> Self {
        ShapeSettings {
            samples: 360,
            color: [0.0, 0.0, 0.0, 1.0],
            zindex: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    /// How many glyph quads are uploaded per instanced draw call.
    pub batch_capacity: usize,
    /// Empty pixels kept between glyphs in the atlas.
    pub padding: u32,
    /// The characters rasterized into the atlas of every loaded font.
    pub charset: String,
    /// The initial draw size in pixels. Fonts are rasterized at the size passed to
    /// `TextRenderer::load_font`.
    pub pixel_size: u32,
    /// Drawn in place of characters that are missing from a font.
    pub fallback: char,
    pub color: [f32; 3],
    /// The distance between two baselines, relative to the font size.
    pub line_spacing: f32,
}

impl Default for TextSettings {
    fn default() -> Self {
        TextSettings {
            batch_capacity: 100,
            padding: 4,
            charset: (0x20u8..=0x7e).map(char::from).collect(),
            pixel_size: 48,
            fallback: '?',
            color: [0.0, 0.0, 0.0],
            line_spacing: 1.2,
        }
    }
}
