//! The geometry shared by every polygon: a fan of triangles around the center of
//! the unit circle.

use std::f32::consts::PI;

use crate::video::Viewport;

/// The largest sample count that could still be addressed with 16-bit indices.
pub const MAX_SAMPLES: u32 = 65_534;

/// Returns `samples + 1` vertices: the center `(0, 0)` followed by the points
/// `(sin(iθ), cos(iθ))` with `θ = 2π / samples`. The first sample is at the top
/// of the circle, and they go around clockwise on screen.
pub fn circle_vertices(samples: u32) -> Vec<[f32; 2]> {
    let theta = 2.0 * PI / samples as f32;

    let mut vertices = Vec::with_capacity(samples as usize + 1);
    vertices.push([0.0, 0.0]);

    for i in 0..samples {
        let (sin, cos) = (i as f32 * theta).sin_cos();
        vertices.push([sin, cos]);
    }

    vertices
}

/// Clamps the requested number of sides to what `samples` could represent.
#[inline]
pub fn clamp_sides(sides: u32, samples: u32) -> u32 {
    sides.max(3).min(samples)
}

/// Picks `sides` of the `samples` circle points, as evenly spaced as possible,
/// and returns the `3 * sides` indices of the triangles fanning out of the center.
/// The last triangle wraps around to the first picked point.
pub fn fan_indices(samples: u32, sides: u32) -> Vec<u16> {
    let sides = clamp_sides(sides, samples);
    let sample = |i: u32| (u64::from(i) * u64::from(samples) / u64::from(sides)) as u16 + 1;

    let mut indices = Vec::with_capacity(3 * sides as usize);
    for i in 0..sides {
        let next = if i + 1 == sides { 1 } else { sample(i + 1) };
        indices.extend_from_slice(&[0, sample(i), next]);
    }

    indices
}

/// How a polygon's bounding box ends up in normalized device coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShapeTransform {
    /// The center of the box in device coordinates.
    pub center: [f32; 2],
    /// Half the extent of the box in pixels.
    pub half_size: [f32; 2],
    /// Scales pixels to device units. The y axis is flipped.
    pub to_ndc: [f32; 2],
}

impl ShapeTransform {
    /// Maps the box with top-left corner `(x, y)`, in pixels with y pointing down,
    /// into `viewport`. Returns `None` if nothing could be drawn into the viewport.
    pub fn new(viewport: Viewport, x: f32, y: f32, w: f32, h: f32) -> Option<Self> {
        if viewport.is_empty() {
            return None;
        }

        let (vw, vh) = (viewport.width as f32, viewport.height as f32);
        let (cx, cy) = (x + w * 0.5, y + h * 0.5);

        Some(ShapeTransform {
            center: [cx / vw * 2.0 - 1.0, 1.0 - cy / vh * 2.0],
            half_size: [w * 0.5, h * 0.5],
            to_ndc: [2.0 / vw, -2.0 / vh],
        })
    }

    /// Projects a point of the unit circle, in the same way the polygon shader
    /// does. The unit circle has its y axis pointing up, and both angles turn
    /// clockwise on screen.
    pub fn project(&self, v: [f32; 2], theta: f32, phase: f32) -> [f32; 2] {
        let rotate = |v: [f32; 2], a: f32| {
            let (sin, cos) = a.sin_cos();
            [cos * v[0] - sin * v[1], sin * v[0] + cos * v[1]]
        };

        let v = rotate([v[0], -v[1]], phase);
        let v = rotate([v[0] * self.half_size[0], v[1] * self.half_size[1]], theta);

        [
            self.center[0] + v[0] * self.to_ndc[0],
            self.center[1] + v[1] * self.to_ndc[1],
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn approx(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-4 && (a[1] - b[1]).abs() < 1e-4
    }

    #[test]
    fn circle() {
        let vertices = circle_vertices(4);
        assert_eq!(vertices.len(), 5);
        assert!(approx(vertices[0], [0.0, 0.0]));
        assert!(approx(vertices[1], [0.0, 1.0]));
        assert!(approx(vertices[2], [1.0, 0.0]));
        assert!(approx(vertices[3], [0.0, -1.0]));
        assert!(approx(vertices[4], [-1.0, 0.0]));
    }

    #[test]
    fn fan() {
        assert_eq!(fan_indices(12, 3), vec![0, 1, 5, 0, 5, 9, 0, 9, 1]);
        assert_eq!(fan_indices(4, 4), vec![0, 1, 2, 0, 2, 3, 0, 3, 4, 0, 4, 1]);

        // 360 is not a multiple of 7, the gaps differ by at most one sample.
        let indices = fan_indices(360, 7);
        let picked: Vec<u16> = indices.chunks(3).map(|v| v[1]).collect();
        let gaps: Vec<u16> = picked.windows(2).map(|v| v[1] - v[0]).collect();
        assert!(gaps.iter().all(|&v| v == 51 || v == 52));
    }

    #[test]
    fn clamp() {
        assert_eq!(clamp_sides(0, 360), 3);
        assert_eq!(clamp_sides(2, 360), 3);
        assert_eq!(clamp_sides(100, 360), 100);
        assert_eq!(clamp_sides(1000, 360), 360);
        assert_eq!(fan_indices(360, 1000).len(), 3 * 360);
    }

    #[test]
    fn transform() {
        let viewport = Viewport::new(0, 0, 200, 100);
        assert!(ShapeTransform::new(Viewport::new(0, 0, 0, 100), 0.0, 0.0, 1.0, 1.0).is_none());

        let t = ShapeTransform::new(viewport, 0.0, 0.0, 200.0, 100.0).unwrap();
        assert!(approx(t.center, [0.0, 0.0]));

        // The top of the unit circle lands on the top edge of the box, which is the
        // top edge of the screen.
        assert!(approx(t.project([0.0, 1.0], 0.0, 0.0), [0.0, 1.0]));
        assert!(approx(t.project([1.0, 0.0], 0.0, 0.0), [1.0, 0.0]));

        // A quarter turn moves the top of the circle to the right edge.
        let quarter = std::f32::consts::FRAC_PI_2;
        let t = ShapeTransform::new(viewport, 50.0, 0.0, 100.0, 100.0).unwrap();
        assert!(approx(t.project([0.0, 1.0], quarter, 0.0), [0.5, 0.0]));

        // The top-left quarter of the screen.
        let t = ShapeTransform::new(viewport, 0.0, 0.0, 100.0, 50.0).unwrap();
        assert!(approx(t.center, [-0.5, 0.5]));
    }
}
