//! Row based packing of glyph bitmaps into a square atlas.
//!
//! Glyphs are placed from left to right, starting a new row whenever the next
//! glyph would cross the right edge. A row is as tall as the tallest glyph it
//! holds. If the glyphs do not fit, the resolution is doubled and the packing
//! starts over.

/// The largest atlas resolution `layout` would try.
pub const MAX_RESOLUTION: u32 = 16_384;

/// A sub-rectangle of the atlas, in pixels.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl AtlasRect {
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, rhs: &AtlasRect) -> bool {
        self.x < rhs.x + rhs.width
            && rhs.x < self.x + self.width
            && self.y < rhs.y + rhs.height
            && rhs.y < self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasLayout {
    pub resolution: u32,
    /// One rectangle per packed size, in the same order.
    pub rects: Vec<AtlasRect>,
}

/// The first resolution tried for `count` glyphs of at most `pixel_size` pixels.
pub fn initial_resolution(pixel_size: u32, padding: u32, count: usize) -> u32 {
    let per_row = (count as f64).sqrt().floor() as u32 + 1;
    ((pixel_size + padding) * per_row).max(1).next_power_of_two()
}

/// Packs `sizes` into a `resolution` wide atlas. Returns `None` if they do not fit.
pub fn pack(sizes: &[(u32, u32)], resolution: u32, padding: u32) -> Option<Vec<AtlasRect>> {
    let margin = padding / 2;
    let (mut x, mut y, mut row) = (margin, margin, 0);

    let mut rects = Vec::with_capacity(sizes.len());
    for &(width, height) in sizes {
        if x + width + margin > resolution {
            y += row + padding;
            x = margin;
            row = 0;
        }

        if x + width + margin > resolution || y + height + margin > resolution {
            return None;
        }

        rects.push(AtlasRect {
            x,
            y,
            width,
            height,
        });

        row = row.max(height);
        x += width + padding;
    }

    Some(rects)
}

/// Packs `sizes`, doubling the resolution until every glyph fits.
pub fn layout(sizes: &[(u32, u32)], pixel_size: u32, padding: u32) -> Option<AtlasLayout> {
    let mut resolution = initial_resolution(pixel_size, padding, sizes.len());

    while resolution <= MAX_RESOLUTION {
        if let Some(rects) = pack(sizes, resolution, padding) {
            return Some(AtlasLayout { resolution, rects });
        }

        resolution *= 2;
    }

    None
}

/// Copies a glyph bitmap, stored row by row from the top, into `rect` of the
/// atlas. The rows are flipped so the bottom of the glyph lands at `rect.y`,
/// where texture coordinates start.
pub fn blit(atlas: &mut [u8], resolution: u32, rect: AtlasRect, pixels: &[u8]) {
    let (res, w, h) = (resolution as usize, rect.width as usize, rect.height as usize);

    for j in 0..h {
        let src = (h - 1 - j) * w;
        let dst = (rect.y as usize + j) * res + rect.x as usize;

        if let (Some(src), Some(dst)) = (pixels.get(src..src + w), atlas.get_mut(dst..dst + w)) {
            dst.copy_from_slice(src);
        }
    }
}
