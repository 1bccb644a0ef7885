// THEORY:
// A `Contour` is a "dumb" data container: the ordered border points of one
// connected region of a binary mask. It is transient; it lives from detection
// until the centroid or calibration step has summarised it.
//
// The summaries it knows how to compute about itself are:
// -   `moments()`: the zeroth and first raster moments of the polygon, computed
//     with Green's theorem. Orientation is normalised so that `m00` is the
//     non-negative enclosed area.
// -   `bounding_box()`: the axis-aligned box covering every border pixel,
//     inclusive of both edges.

use imageproc::point::Point;

/// The zeroth and first order moments of a contour polygon.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Centroid `(m10/m00, m01/m00)`, or `None` for a zero-area polygon.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 == 0.0 {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}

/// Axis-aligned pixel box, inclusive of its edge pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Ordered border points of one connected region.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn from_coords(coords: &[(i32, i32)]) -> Self {
        Self::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    pub fn moments(&self) -> Moments {
        let n = self.points.len();
        if n < 3 {
            return Moments::default();
        }

        let mut a = 0.0;
        let mut ax = 0.0;
        let mut ay = 0.0;
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            let (x0, y0) = (p.x as f64, p.y as f64);
            let (x1, y1) = (q.x as f64, q.y as f64);

            let cross = x0 * y1 - x1 * y0;
            a += cross;
            ax += (x0 + x1) * cross;
            ay += (y0 + y1) * cross;
        }

        let mut moments = Moments {
            m00: a / 2.0,
            m10: ax / 6.0,
            m01: ay / 6.0,
        };
        // Clockwise traversal gives negative moments; flip them all together
        // so the centroid is unaffected.
        if moments.m00 < 0.0 {
            moments.m00 = -moments.m00;
            moments.m10 = -moments.m10;
            moments.m01 = -moments.m01;
        }
        moments
    }

    /// Enclosed area of the contour polygon.
    pub fn area(&self) -> f64 {
        self.moments().m00
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(BoundingBox {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }
}
