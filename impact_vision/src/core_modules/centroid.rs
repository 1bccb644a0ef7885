// THEORY:
// The centroid extractor turns candidate contours into discrete `Impact`
// events. Each contour is judged on its own:
//
// 1.  **Noise floor**: contours whose area is at or below `min_area` are
//     discarded. Sensor speckle and thin colour fringes never become hits.
// 2.  **Centroid**: the impact point is the first-moment centre of the polygon,
//     `(m10/m00, m01/m00)`, truncated to integer pixels. A zero-area contour
//     has no centroid and is skipped silently.
//
// There is no deduplication: two qualifying blobs in one frame are two impacts,
// and output order follows the order the contours were enumerated in.

use crate::core_modules::contour::Contour;

/// One detected ball-touch event, in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Impact {
    pub x: i32,
    pub y: i32,
}

impl Impact {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Produces one `Impact` per contour whose area exceeds `min_area`.
pub fn extract(contours: &[Contour], min_area: f64) -> Vec<Impact> {
    contours
        .iter()
        .filter_map(|contour| impact_of(contour, min_area))
        .collect()
}

fn impact_of(contour: &Contour, min_area: f64) -> Option<Impact> {
    let moments = contour.moments();
    if moments.m00 <= min_area {
        return None;
    }
    let (cx, cy) = moments.centroid()?;
    Some(Impact::new(cx.floor() as i32, cy.floor() as i32))
}
