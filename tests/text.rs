extern crate gltoolbox;
extern crate rand;

use std::rc::Rc;

use rand::Rng;

use gltoolbox::errors::Error;
use gltoolbox::settings::TextSettings;
use gltoolbox::text::atlas;
use gltoolbox::text::{GlyphBitmap, GlyphSource, TextRenderer};
use gltoolbox::video::backends::headless::HeadlessVisitor;
use gltoolbox::video::backends::TextureParameter;
use gltoolbox::video::*;

/// Square glyphs half as large as the pixel size, for a handful of characters.
struct FakeFont {
    name: &'static str,
    chars: &'static str,
}

impl GlyphSource for FakeFont {
    fn name(&self) -> &str {
        self.name
    }

    fn rasterize(&self, c: char, pixel_size: u32) -> Option<GlyphBitmap> {
        if !self.chars.contains(c) {
            return None;
        }

        if c == ' ' {
            return Some(GlyphBitmap {
                advance: pixel_size as f32 * 0.25,
                ..GlyphBitmap::default()
            });
        }

        let side = pixel_size / 2;
        let pixels = (0..side * side).map(|i| ((i / side + 1) * 10) as u8).collect();

        Some(GlyphBitmap {
            width: side,
            height: side,
            bearing_x: 1,
            bearing_y: side as i32,
            advance: (side + 2) as f32,
            pixels,
        })
    }
}

const FAKE: FakeFont = FakeFont {
    name: "fake",
    chars: " ?abc",
};

fn headless() -> (Rc<HeadlessVisitor>, Context) {
    let visitor = Rc::new(HeadlessVisitor::new());
    let ctx = Context::new(visitor.clone());
    (visitor, ctx)
}

fn approx(a: [f32; 4], b: [f32; 4]) -> bool {
    a.iter().zip(&b).all(|(a, b)| (a - b).abs() < 1e-4)
}

#[test]
fn load() {
    let (visitor, ctx) = headless();

    let mut text = TextRenderer::new(&ctx).unwrap();
    assert_eq!(text.current_font(), None);

    let name = text.load_font(&FAKE, 16).unwrap();
    assert_eq!(name, "fake");
    assert_eq!(text.current_font(), Some("fake"));

    let font = text.font("fake").unwrap();
    assert_eq!(font.pixel_size(), 16);
    assert_eq!(font.resolution(), 64);
    assert_eq!(font.characters().count(), 5);
    assert!(font.character('~').is_none());

    let space = font.character(' ').unwrap();
    assert_eq!((space.width, space.height, space.advance), (0, 0, 4.0));

    let atlas = font.atlas();
    assert_eq!(
        visitor.texture_layout(atlas.id()),
        Some(PixelLayout::new(InternalFormat::R8, PixelFormat::Red, PixelType::UByte))
    );
    assert_eq!(visitor.texture_dimensions(atlas.id()), Some(TextureDimensions::D2(64, 64)));
    assert!(visitor.has_mipmaps(atlas.id()));
    assert!(visitor
        .texture_parameters(atlas.id())
        .contains(&TextureParameter::MinFilter(TextureFilter::LinearMipmapLinear)));
    assert_eq!(visitor.unpack_alignment_value(), 4);

    // The bottom row of a glyph is stored first.
    let pixels = visitor.texture_data(atlas.id()).unwrap();
    let a = font.character('a').unwrap();
    assert_eq!(pixels[(a.tex_y * 64 + a.tex_x) as usize], 80);
    assert_eq!(pixels[((a.tex_y + 7) * 64 + a.tex_x) as usize], 10);
    assert_eq!(pixels.iter().filter(|&&v| v != 0).count(), 4 * 64);

    for (_, lhs) in font.characters() {
        for (_, rhs) in font.characters() {
            let l = atlas::AtlasRect { x: lhs.tex_x, y: lhs.tex_y, width: lhs.width, height: lhs.height };
            let r = atlas::AtlasRect { x: rhs.tex_x, y: rhs.tex_y, width: rhs.width, height: rhs.height };
            assert!(l == r || !l.intersects(&r));
        }
    }

    assert!(ctx.check().is_ok());
}

#[test]
fn failed_loads() {
    let (_, ctx) = headless();

    let mut text = TextRenderer::new(&ctx).unwrap();
    let empty = FakeFont {
        name: "empty",
        chars: "",
    };

    match text.load_font(&empty, 16) {
        Err(Error::FontLoadFailure(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert!(!text.has_font("empty"));
    assert!(text.load_font_file("does/not/exist.ttf", 16).is_err());
    assert_eq!(text.fonts().count(), 0);
}

#[test]
fn fonts() {
    let (_, ctx) = headless();

    let mut text = TextRenderer::new(&ctx).unwrap();
    text.load_font(&FAKE, 16).unwrap();
    text.load_font(&FAKE, 32).unwrap();
    assert_eq!(text.fonts().count(), 1);
    assert_eq!(text.font("fake").unwrap().pixel_size(), 32);

    let other = FakeFont {
        name: "other",
        chars: "xyz",
    };

    text.load_font(&other, 16).unwrap();
    assert_eq!(text.current_font(), Some("fake"));
    text.set_font("other").unwrap();
    assert_eq!(text.current_font(), Some("other"));

    match text.set_font("missing") {
        Err(Error::UnknownFont(name)) => assert_eq!(name, "missing"),
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(text.current_font(), Some("other"));
}

#[test]
fn layout() {
    let (_, ctx) = headless();

    let mut text = TextRenderer::new(&ctx).unwrap();
    text.load_font(&FAKE, 16).unwrap();

    let font = text.font("fake").unwrap();
    let viewport = Viewport::new(0, 0, 800, 600);
    let layout = |s: &str, fallback: char| font.layout(s, 100.0, 200.0, 32.0, viewport, fallback, 1.5);

    // Twice the loaded size: 16 pixel glyphs, advancing by 20 pixels.
    let quads = layout("ab", '?');
    assert_eq!(quads.len(), 2);
    assert!(approx(
        quads[0].position,
        [102.0 / 400.0 - 1.0, 1.0 - 200.0 / 300.0, 16.0 / 400.0, 16.0 / 300.0]
    ));
    assert!((quads[1].position[0] - (122.0 / 400.0 - 1.0)).abs() < 1e-4);

    let a = font.character('a').unwrap();
    let texel = 1.0 / 64.0;
    assert!(approx(
        quads[0].texcoord,
        [a.tex_x as f32 * texel, a.tex_y as f32 * texel, 8.0 * texel, 8.0 * texel]
    ));

    // Spaces only move the pen.
    let quads = layout("a b", '?');
    assert_eq!(quads.len(), 2);
    assert!((quads[1].position[0] - (130.0 / 400.0 - 1.0)).abs() < 1e-4);

    // A new line goes back to the first column.
    let quads = layout("a\na", '?');
    assert_eq!(quads[1].position[0], quads[0].position[0]);
    assert!((quads[1].position[1] - (1.0 - 248.0 / 300.0)).abs() < 1e-4);

    // Missing characters are replaced, or skipped.
    let q = font.character('?').unwrap();
    let quads = layout("a~b", '?');
    assert_eq!(quads.len(), 3);
    assert_eq!(quads[1].texcoord[0], q.tex_x as f32 * texel);

    let quads = layout("a~b", '#');
    assert_eq!(quads.len(), 2);
    assert!((quads[1].position[0] - (122.0 / 400.0 - 1.0)).abs() < 1e-4);

    assert!(font
        .layout("abc", 0.0, 0.0, 16.0, Viewport::new(0, 0, 0, 0), '?', 1.0)
        .is_empty());
}

#[test]
fn batched_draws() {
    let (visitor, ctx) = headless();

    let mut text = TextRenderer::new(&ctx).unwrap();
    text.load_font(&FAKE, 16).unwrap();
    text.set_font_color([1.0, 0.5, 0.0]);
    text.set_font_size(24.0);
    assert_eq!(text.font_size(), 24.0);

    let line: String = ::std::iter::repeat('a').take(250).collect();
    text.draw(&line, 0.0, 100.0).unwrap();

    let draws = visitor.draws();
    assert_eq!(draws.len(), 3);
    assert_eq!(
        draws.iter().map(|v| v.instances).collect::<Vec<_>>(),
        vec![Some(100), Some(100), Some(50)]
    );

    for draw in &draws {
        assert_eq!(draw.count, 6);
        assert_eq!(draw.indices, Some(vec![0, 1, 2, 0, 2, 3]));
        assert!(draw.blend);
        assert_eq!(
            draw.uniforms.get("rgb"),
            Some(&UniformVariable::Vector3f([1.0, 0.5, 0.0]))
        );
        assert_eq!(draw.uniforms.get("atlas"), Some(&UniformVariable::I32(0)));
    }

    // Everything is restored once done.
    assert!(!visitor.blend_enabled());
    assert_eq!(visitor.current_program(), 0);
    assert_eq!(visitor.current_vertex_array(), 0);
    assert_eq!(visitor.bound_texture(0, TextureTarget::Texture2D), 0);
    assert!(ctx.check().is_ok());
}

#[test]
fn small_batches() {
    let (visitor, ctx) = headless();

    let settings = TextSettings {
        batch_capacity: 0,
        ..TextSettings::default()
    };

    let mut text = TextRenderer::with_settings(&ctx, settings).unwrap();
    assert_eq!(text.settings().batch_capacity, 1);

    text.load_font(&FAKE, 16).unwrap();
    text.draw_with("abc", 0.0, 0.0, "fake", 16.0, [0.0; 3]).unwrap();
    assert_eq!(visitor.draws().len(), 3);
}

#[test]
fn initial_size() {
    let (_, ctx) = headless();

    let settings = TextSettings {
        pixel_size: 20,
        ..TextSettings::default()
    };

    let mut text = TextRenderer::with_settings(&ctx, settings).unwrap();
    assert_eq!(text.font_size(), 20.0);

    // The rasterization size is the one given to the load.
    text.load_font(&FAKE, 12).unwrap();
    assert_eq!(text.font("fake").unwrap().pixel_size(), 12);
    assert_eq!(text.font_size(), 20.0);
}

#[test]
fn nothing_to_draw() {
    let (visitor, ctx) = headless();

    let mut text = TextRenderer::new(&ctx).unwrap();
    match text.draw("abc", 0.0, 0.0) {
        Err(Error::UnknownFont(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    text.load_font(&FAKE, 16).unwrap();
    assert!(text.draw_with("abc", 0.0, 0.0, "missing", 16.0, [0.0; 3]).is_err());

    text.draw("", 0.0, 0.0).unwrap();
    text.draw("   \n ", 0.0, 0.0).unwrap();
    assert!(visitor.draws().is_empty());
    assert!(!visitor.blend_enabled());
}

#[test]
fn random_atlases() {
    let mut rng = rand::thread_rng();

    for _ in 0..20 {
        let count = rng.gen_range(1, 200);
        let pixel_size = rng.gen_range(1, 64);
        let padding = rng.gen_range(0, 8);

        let sizes: Vec<(u32, u32)> = (0..count)
            .map(|_| (rng.gen_range(0, pixel_size + 1), rng.gen_range(0, pixel_size + 1)))
            .collect();

        let layout = atlas::layout(&sizes, pixel_size, padding).unwrap();
        assert!(layout.resolution.is_power_of_two());
        assert_eq!(layout.rects.len(), sizes.len());

        // Every glyph keeps half the padding between itself and the atlas edges.
        let margin = padding / 2;
        for (i, lhs) in layout.rects.iter().enumerate() {
            assert_eq!((lhs.width, lhs.height), sizes[i]);
            assert!(lhs.x >= margin && lhs.y >= margin);
            assert!(lhs.x + lhs.width + margin <= layout.resolution);
            assert!(lhs.y + lhs.height + margin <= layout.resolution);

            for rhs in &layout.rects[i + 1..] {
                assert!(!lhs.intersects(rhs));
            }
        }
    }
}
