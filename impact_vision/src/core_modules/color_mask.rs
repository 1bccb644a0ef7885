// THEORY:
// The colour-mask stage is the entry point of the detection stack. It turns a
// raw RGB frame into a set of candidate blob outlines using nothing but colour:
//
// 1.  **Colour-space conversion**: every pixel is converted to HSV using the
//     8-bit convention (H in [0,180), S and V in [0,255]) that ball colours
//     are usually tuned in. Hue separates "yellow" from "bright" far better
//     than raw RGB does.
// 2.  **Thresholding**: a pixel is foreground iff each of its H, S and V values
//     lies inside the inclusive `ColorRange`. The output is a binary mask.
// 3.  **External contours**: only the outermost border of each connected
//     foreground region is kept. Holes, and blobs nested inside holes, are
//     ignored, so a ring-shaped blob yields a single outline.
//
// The stage is stateless; it knows nothing about previous frames.

use crate::core_modules::contour::Contour;
use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use imageproc::contours::{BorderType, find_contours};
use palette::{Hsv, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

/// A single captured video frame: 3 channels, 8 bits per channel, RGB order.
pub type Frame = RgbImage;

/// A frame converted to HSV. Channel 0 is hue, 1 saturation, 2 value.
pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Largest hue value in the 8-bit HSV encoding.
pub const MAX_HUE: u8 = 179;

const FOREGROUND: Luma<u8> = Luma([255]);
const BACKGROUND: Luma<u8> = Luma([0]);

/// Inclusive HSV bounds that define the tracked ball colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// Returns true when every channel of `hsv` lies within the bounds.
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }
}

impl Default for ColorRange {
    /// Yellow-green of a tennis ball.
    fn default() -> Self {
        Self::new([20, 100, 100], [30, 255, 255])
    }
}

/// Converts one RGB pixel to 8-bit HSV.
pub fn hsv_pixel(pixel: Rgb<u8>) -> [u8; 3] {
    let Rgb([r, g, b]) = pixel;
    let hsv: Hsv = Srgb::new(r, g, b).into_format::<f32>().into_color();

    let hue = (hsv.hue.into_positive_degrees() / 2.0).round() as u16 % (MAX_HUE as u16 + 1);
    let saturation = (hsv.saturation * 255.0).round().clamp(0.0, 255.0) as u8;
    let value = (hsv.value * 255.0).round().clamp(0.0, 255.0) as u8;
    [hue as u8, saturation, value]
}

/// Converts a whole frame to HSV.
pub fn to_hsv(frame: &Frame) -> HsvImage {
    let mut hsv = HsvImage::new(frame.width(), frame.height());
    for (src, dst) in frame.pixels().zip(hsv.pixels_mut()) {
        *dst = Rgb(hsv_pixel(*src));
    }
    hsv
}

/// Builds the binary mask of pixels inside `range`.
pub fn threshold(hsv: &HsvImage, range: &ColorRange) -> GrayImage {
    GrayImage::from_fn(hsv.width(), hsv.height(), |x, y| {
        if range.contains(hsv.get_pixel(x, y).0) {
            FOREGROUND
        } else {
            BACKGROUND
        }
    })
}

/// Extracts the outermost contour of every connected foreground region.
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| Contour::new(c.points))
        .collect()
}

pub mod color_mask_detector {
    use super::*;

    /// Returns the candidate blob contours of `frame` for the given colour range.
    /// An empty frame yields an empty set.
    pub fn detect(frame: &Frame, range: &ColorRange) -> Vec<Contour> {
        if frame.width() == 0 || frame.height() == 0 {
            return Vec::new();
        }
        let hsv = to_hsv(frame);
        let mask = threshold(&hsv, range);
        find_external_contours(&mask)
    }
}
