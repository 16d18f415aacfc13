//! Bitmap text rendering.
//!
//! Fonts are rasterized once, when they are loaded, into a single channel atlas.
//! Drawing a string lays out one textured quad per glyph, and draws them as
//! instances of the same unit quad.
//!
//! ```rust,ignore
//! let mut text = TextRenderer::new(&ctx)?;
//! let name = text.load_font_file("assets/Roboto.ttf", 48)?;
//! text.set_font_size(24.0);
//! text.draw("Hello, World!", 10.0, 32.0)?;
//! ```

pub mod atlas;
pub mod font;
pub mod glyphs;
pub mod renderer;

pub use self::atlas::{AtlasLayout, AtlasRect};
pub use self::font::{GlyphBitmap, GlyphSource, RustTypeFont};
pub use self::glyphs::{Character, Font, GlyphQuad};
pub use self::renderer::TextRenderer;
