// THEORY:
// The `ImpactCanvas` is the "virtual screen": a persistent raster that
// accumulates one filled mark per impact for the whole session. It is created
// solid white and only ever drawn on, so the set of marked pixels never
// shrinks. Marks that fall partly or entirely outside the canvas are clipped.
//
// Presentation resamples the canvas to the nominal output size once the session
// is calibrated. The output size equals the canvas size, so the calibrated view
// is pixel-identical to the raw one; the calibration scale is not applied to
// the marks themselves.

use crate::core_modules::calibration::CalibrationState;
use crate::core_modules::centroid::Impact;
use crate::core_modules::color_mask::Frame;
use image::Rgb;
use image::imageops::{self, FilterType};
use imageproc::drawing::draw_filled_circle_mut;

pub const CANVAS_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const MARK_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

pub struct ImpactCanvas {
    buffer: Frame,
    /// Size the calibrated presentation is resampled to.
    output_size: (u32, u32),
    mark_radius: i32,
    marks_drawn: u64,
}

impl ImpactCanvas {
    pub fn new(width: u32, height: u32, mark_radius: i32) -> Self {
        Self {
            buffer: Frame::from_pixel(width, height, CANVAS_BACKGROUND),
            output_size: (width, height),
            mark_radius,
            marks_drawn: 0,
        }
    }

    /// Paints a filled mark centred on the impact.
    pub fn draw(&mut self, impact: Impact) {
        draw_filled_circle_mut(
            &mut self.buffer,
            (impact.x, impact.y),
            self.mark_radius,
            MARK_COLOR,
        );
        self.marks_drawn += 1;
    }

    /// The image shown on the virtual screen for the given calibration state.
    pub fn present(&self, calibration: &CalibrationState) -> Frame {
        if calibration.calibrated {
            let (width, height) = self.output_size;
            imageops::resize(&self.buffer, width, height, FilterType::Nearest)
        } else {
            self.buffer.clone()
        }
    }

    pub fn buffer(&self) -> &Frame {
        &self.buffer
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    pub fn marks_drawn(&self) -> u64 {
        self.marks_drawn
    }

    pub fn is_marked(&self, x: u32, y: u32) -> bool {
        x < self.buffer.width()
            && y < self.buffer.height()
            && *self.buffer.get_pixel(x, y) != CANVAS_BACKGROUND
    }

    /// Coordinates of every marked pixel, in row-major order.
    pub fn marked_pixels(&self) -> Vec<(u32, u32)> {
        self.buffer
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != CANVAS_BACKGROUND)
            .map(|(x, y, _)| (x, y))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::calibration::Scale;
    use std::collections::HashSet;

    #[test]
    fn starts_white() {
        let canvas = ImpactCanvas::new(64, 48, 10);
        assert_eq!(canvas.dimensions(), (64, 48));
        assert!(canvas.marked_pixels().is_empty());
        assert!(canvas.buffer().pixels().all(|p| *p == CANVAS_BACKGROUND));
    }

    #[test]
    fn draw_paints_a_disc_of_the_mark_radius() {
        let mut canvas = ImpactCanvas::new(100, 100, 10);
        canvas.draw(Impact::new(50, 50));
        assert!(canvas.is_marked(50, 50));
        assert!(canvas.is_marked(60, 50));
        assert!(canvas.is_marked(50, 40));
        assert!(!canvas.is_marked(61, 50));
        assert!(!canvas.is_marked(62, 62));
        assert_eq!(*canvas.buffer().get_pixel(50, 50), MARK_COLOR);
        assert_eq!(canvas.marks_drawn(), 1);
    }

    #[test]
    fn marks_outside_the_canvas_are_clipped() {
        let mut canvas = ImpactCanvas::new(40, 30, 10);
        canvas.draw(Impact::new(-5, -5));
        canvas.draw(Impact::new(500, 500));
        canvas.draw(Impact::new(-100, 15));
        assert!(canvas.is_marked(0, 0));
        assert!(canvas.is_marked(1, 1));
        assert!(!canvas.is_marked(39, 29));
        assert_eq!(canvas.marks_drawn(), 3);
    }

    #[test]
    fn drawing_is_monotone() {
        let impacts = [
            Impact::new(10, 10),
            Impact::new(30, 12),
            Impact::new(10, 10),
            Impact::new(55, 40),
        ];
        let mut canvas = ImpactCanvas::new(64, 48, 6);
        let mut previous: HashSet<(u32, u32)> = HashSet::new();
        for impact in impacts {
            canvas.draw(impact);
            let current: HashSet<(u32, u32)> = canvas.marked_pixels().into_iter().collect();
            assert!(current.is_superset(&previous));
            previous = current;
        }
    }

    #[test]
    fn redrawing_an_impact_is_idempotent() {
        let mut once = ImpactCanvas::new(64, 48, 10);
        once.draw(Impact::new(20, 20));
        let mut twice = ImpactCanvas::new(64, 48, 10);
        twice.draw(Impact::new(20, 20));
        twice.draw(Impact::new(20, 20));
        assert_eq!(once.buffer(), twice.buffer());
    }

    #[test]
    fn calibrated_presentation_matches_the_raw_canvas() {
        let mut canvas = ImpactCanvas::new(64, 48, 5);
        canvas.draw(Impact::new(32, 24));

        let uncalibrated = canvas.present(&CalibrationState::default());
        let mut state = CalibrationState::default();
        state.apply(Scale { x: 12.8, y: 9.6 });
        let calibrated = canvas.present(&state);

        assert_eq!(&uncalibrated, canvas.buffer());
        assert_eq!(calibrated.dimensions(), (64, 48));
        assert_eq!(calibrated, uncalibrated);
    }
}
