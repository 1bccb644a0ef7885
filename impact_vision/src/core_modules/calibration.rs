// THEORY:
// Calibration is a one-shot estimate of how large the reference object should
// appear. The operator holds the ball in view, a single frame is taken, and the
// largest blob in that frame is assumed to be the ball. Its bounding box is
// mapped onto the nominal (configured) frame size, even when the device
// delivered frames of another size:
//
//     scale_x = frame_width / box_width
//     scale_y = frame_height / box_height
//
// This is a crude heuristic. It does not correct for lens distortion or
// perspective, and the resulting scale is only consumed by the canvas
// presentation step, which resamples to the nominal frame size. With the
// default sizes that makes calibration visually inert.
//
// The estimator is a pure function of the frame. Persisting the result into
// `CalibrationState` is the caller's job, and only happens on success.

use crate::core_modules::color_mask::{ColorRange, Frame, color_mask_detector};
use crate::core_modules::contour::Contour;
use crate::error::CalibrationError;

/// Horizontal and vertical scale factors derived from a reference blob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

/// Calibration status of a session. The scale is meaningful only once
/// `calibrated` is true.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationState {
    pub calibrated: bool,
    pub scale: Scale,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            calibrated: false,
            scale: Scale { x: 1.0, y: 1.0 },
        }
    }
}

impl CalibrationState {
    /// Records a successful calibration. There is no way back to uncalibrated.
    pub fn apply(&mut self, scale: Scale) {
        self.calibrated = true;
        self.scale = scale;
    }

    /// The scale factors, if the session has been calibrated.
    pub fn scale(&self) -> Option<Scale> {
        self.calibrated.then_some(self.scale)
    }
}

/// Detects the dominant blob of `frame` and derives the scale factors from it.
/// The scale is relative to the `nominal` frame size, whatever size the frame
/// was actually delivered at.
pub fn calibrate(
    frame: &Frame,
    range: &ColorRange,
    nominal: (u32, u32),
) -> Result<Scale, CalibrationError> {
    let contours = color_mask_detector::detect(frame, range);
    estimate_scale(&contours, nominal.0, nominal.1)
}

/// Scale factors for the largest contour relative to a `frame_width` x
/// `frame_height` frame.
pub fn estimate_scale(
    contours: &[Contour],
    frame_width: u32,
    frame_height: u32,
) -> Result<Scale, CalibrationError> {
    let largest = contours
        .iter()
        .max_by(|a, b| a.area().total_cmp(&b.area()))
        .ok_or(CalibrationError::NoBallDetected)?;

    let bbox = largest
        .bounding_box()
        .ok_or(CalibrationError::DegenerateBoundingBox { width: 0, height: 0 })?;
    if bbox.width == 0 || bbox.height == 0 {
        return Err(CalibrationError::DegenerateBoundingBox {
            width: bbox.width,
            height: bbox.height,
        });
    }

    Ok(Scale {
        x: frame_width as f64 / bbox.width as f64,
        y: frame_height as f64 / bbox.height as f64,
    })
}
