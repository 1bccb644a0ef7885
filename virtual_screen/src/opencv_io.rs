// THEORY:
// OpenCV adapters for the session loop. The library works on `image::RgbImage`
// frames; OpenCV hands out BGR `Mat`s. This module is the only place that
// knows about both, converting at the boundary in each direction.

use image::RgbImage;
use impact_vision::session::{DisplaySurface, FrameSource, Key};
use impact_vision::{Frame, ImpactError, Result};
use opencv::{
    core::{self, Mat, Scalar},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::time::Duration;

/// A webcam or video file opened through `videoio`.
pub struct OpenCvCamera {
    capture: VideoCapture,
    frame: Mat,
}

impl OpenCvCamera {
    /// Opens a capture device and requests the given resolution. The request is
    /// not verified; frames are used at whatever size the device delivers.
    pub fn open_device(index: i32, width: u32, height: u32) -> opencv::Result<Self> {
        let mut capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        capture.set(videoio::CAP_PROP_FRAME_WIDTH, width as f64)?;
        capture.set(videoio::CAP_PROP_FRAME_HEIGHT, height as f64)?;
        Self::from_capture(capture)
    }

    pub fn open_file(path: &str) -> opencv::Result<Self> {
        Self::from_capture(VideoCapture::from_file(path, videoio::CAP_ANY)?)
    }

    fn from_capture(capture: VideoCapture) -> opencv::Result<Self> {
        if !capture.is_opened()? {
            return Err(opencv::Error::new(
                core::StsError,
                "capture source could not be opened",
            ));
        }
        Ok(Self {
            capture,
            frame: Mat::default(),
        })
    }
}

impl FrameSource for OpenCvCamera {
    fn capture(&mut self) -> Result<Frame> {
        match self.capture.read(&mut self.frame) {
            Ok(true) if !self.frame.empty() => {
                mat_to_frame(&self.frame).map_err(|e| ImpactError::capture(e.to_string()))
            }
            Ok(_) => Err(ImpactError::capture("end of stream")),
            Err(e) => Err(ImpactError::capture(e.to_string())),
        }
    }

    fn release(&mut self) -> Result<()> {
        self.capture
            .release()
            .map_err(|e| ImpactError::capture(e.to_string()))
    }
}

/// HighGUI windows and keyboard.
pub struct HighGuiSurface;

impl HighGuiSurface {
    pub fn open(windows: &[&str]) -> opencv::Result<Self> {
        for name in windows {
            highgui::named_window(name, highgui::WINDOW_AUTOSIZE)?;
        }
        Ok(Self)
    }
}

impl DisplaySurface for HighGuiSurface {
    fn show(&mut self, window: &str, frame: &Frame) -> Result<()> {
        let mat = frame_to_mat(frame).map_err(|e| ImpactError::display("convert", e))?;
        highgui::imshow(window, &mat).map_err(|e| ImpactError::display("imshow", e))
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<Key>> {
        let delay = timeout.as_millis().clamp(1, i32::MAX as u128) as i32;
        let code = highgui::wait_key(delay).map_err(|e| ImpactError::display("wait_key", e))?;
        Ok(Key::from_code(code))
    }

    fn close(&mut self) -> Result<()> {
        highgui::destroy_all_windows().map_err(|e| ImpactError::display("destroy_all_windows", e))
    }
}

/// BGR `Mat` -> RGB frame.
fn mat_to_frame(mat: &Mat) -> opencv::Result<Frame> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(mat, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
    let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
    let bytes = if rgb.is_continuous() {
        rgb.data_bytes()?.to_vec()
    } else {
        rgb.try_clone()?.data_bytes()?.to_vec()
    };
    RgbImage::from_raw(width, height, bytes)
        .ok_or_else(|| opencv::Error::new(core::StsUnmatchedSizes, "frame buffer size mismatch"))
}

/// RGB frame -> BGR `Mat`.
fn frame_to_mat(frame: &Frame) -> opencv::Result<Mat> {
    let mut rgb = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        core::CV_8UC3,
        Scalar::all(0.0),
    )?;
    rgb.data_bytes_mut()?.copy_from_slice(frame.as_raw());
    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}
