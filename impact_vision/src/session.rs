// THEORY:
// The `session` module is the top-level API of the crate. It owns everything a
// running virtual screen needs, the impact canvas, the calibration state and
// the configuration, in one explicit context, and advances it one tick at a
// time.
//
// A tick is strictly sequential:
//   capture -> mirror -> detect -> extract -> draw -> poll key
//     -> (calibrate) -> present -> show -> (stop)
//
// States:
// -   `Running`: the normal per-frame cycle.
// -   `Calibrating`: entered on the calibrate key. The operator gets a fixed
//     pause to position the ball, then one reference frame is captured and
//     measured. Nothing else happens during this state; a quit request is only
//     seen on a later poll. Success updates the calibration state, failure is
//     logged and leaves it untouched. Either way the session returns to
//     `Running`.
// -   `Stopped`: terminal. Reached on the quit key, or immediately when the
//     frame source fails to deliver a frame. Capture loss is not retried.
//
// Frame acquisition and display sit behind the `FrameSource` and
// `DisplaySurface` traits, so the loop is driven identically by a webcam or by
// a scripted sequence of synthetic frames.

use crate::config::SessionConfig;
use crate::core_modules::calibration::{self, CalibrationState, Scale};
use crate::core_modules::centroid::{self, Impact};
use crate::core_modules::color_mask::{Frame, color_mask_detector};
use crate::core_modules::impact_canvas::ImpactCanvas;
use crate::error::{CalibrationError, Result};
use image::imageops;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const VIDEO_FEED_WINDOW: &str = "Video Feed";
pub const VIRTUAL_SCREEN_WINDOW: &str = "Virtual Screen";

/// Operator commands recognised by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Calibrate,
    Quit,
    Other(u8),
}

impl Key {
    /// Maps a raw key code (as returned by HighGUI) to a `Key`. Negative codes
    /// mean no key was pressed.
    pub fn from_code(code: i32) -> Option<Key> {
        if code < 0 {
            return None;
        }
        Some(match (code & 0xFF) as u8 {
            b'c' => Key::Calibrate,
            b'q' => Key::Quit,
            other => Key::Other(other),
        })
    }
}

/// A source of video frames.
pub trait FrameSource {
    /// Blocks until the next frame is available. An error means the source is
    /// gone for good.
    fn capture(&mut self) -> Result<Frame>;

    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Output windows plus the keyboard attached to them.
pub trait DisplaySurface {
    fn show(&mut self, window: &str, frame: &Frame) -> Result<()>;

    /// Waits up to `timeout` for a key press.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<Key>>;

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Calibrating,
    Stopped,
}

/// Mutable state owned by a session.
pub struct SessionContext {
    pub canvas: ImpactCanvas,
    pub calibration: CalibrationState,
    pub frames_processed: u64,
    pub impacts_recorded: u64,
}

/// Totals reported when a session ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub frames_processed: u64,
    pub impacts_recorded: u64,
    pub calibration: CalibrationState,
}

pub struct SessionLoop<S, D> {
    config: SessionConfig,
    source: S,
    surface: D,
    context: SessionContext,
    state: SessionState,
}

impl<S: FrameSource, D: DisplaySurface> SessionLoop<S, D> {
    pub fn new(config: SessionConfig, source: S, surface: D) -> Result<Self> {
        config.validate()?;
        let canvas = ImpactCanvas::new(config.frame_width, config.frame_height, config.mark_radius);
        Ok(Self {
            config,
            source,
            surface,
            context: SessionContext {
                canvas,
                calibration: CalibrationState::default(),
                frames_processed: 0,
                impacts_recorded: 0,
            },
            state: SessionState::Running,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            frames_processed: self.context.frames_processed,
            impacts_recorded: self.context.impacts_recorded,
            calibration: self.context.calibration,
        }
    }

    /// Runs ticks until the session stops, then releases the source and the
    /// surface. Resources are released even when a tick fails.
    pub async fn run(&mut self) -> Result<SessionSummary> {
        let outcome = loop {
            match self.tick().await {
                Ok(SessionState::Stopped) => break Ok(()),
                Ok(_) => continue,
                Err(err) => {
                    self.state = SessionState::Stopped;
                    break Err(err);
                }
            }
        };
        let released = self.shutdown();
        if let Err(err) = outcome {
            if let Err(release_err) = released {
                warn!(%release_err, "failed to release session resources");
            }
            return Err(err);
        }
        released?;

        let summary = self.summary();
        info!(
            frames = summary.frames_processed,
            impacts = summary.impacts_recorded,
            calibrated = summary.calibration.calibrated,
            "session stopped"
        );
        Ok(summary)
    }

    /// Releases the frame source and closes the display surface.
    pub fn shutdown(&mut self) -> Result<()> {
        let released = self.source.release();
        let closed = self.surface.close();
        released.and(closed)
    }

    /// Advances the session by one frame and returns the resulting state.
    pub async fn tick(&mut self) -> Result<SessionState> {
        if self.state == SessionState::Stopped {
            return Ok(self.state);
        }

        // --- 1. Acquisition ---
        let frame = match self.source.capture() {
            Ok(frame) => frame,
            Err(err) => {
                error!(%err, "frame acquisition failed, stopping session");
                self.state = SessionState::Stopped;
                return Ok(self.state);
            }
        };
        let frame = if self.config.mirror_feed {
            imageops::flip_horizontal(&frame)
        } else {
            frame
        };

        // --- 2. Detection ---
        let impacts = self.detect_impacts(&frame);

        // --- 3. Recording ---
        for impact in &impacts {
            debug!(x = impact.x, y = impact.y, "impact");
            self.context.canvas.draw(*impact);
        }
        self.context.frames_processed += 1;
        self.context.impacts_recorded += impacts.len() as u64;

        // --- 4. Operator Input ---
        let key = self.surface.poll_key(self.config.key_poll_timeout())?;
        if key == Some(Key::Calibrate) {
            self.run_calibration().await;
        }

        // --- 5. Presentation ---
        let screen = self.context.canvas.present(&self.context.calibration);
        self.surface.show(VIRTUAL_SCREEN_WINDOW, &screen)?;
        self.surface.show(VIDEO_FEED_WINDOW, &frame)?;

        if key == Some(Key::Quit) {
            info!("quit requested");
            self.state = SessionState::Stopped;
        }
        Ok(self.state)
    }

    fn detect_impacts(&self, frame: &Frame) -> Vec<Impact> {
        let contours = color_mask_detector::detect(frame, &self.config.color_range);
        centroid::extract(&contours, self.config.min_blob_area)
    }

    async fn run_calibration(&mut self) {
        self.state = SessionState::Calibrating;
        info!("Calibration starting. Ensure the frame is visible and place the ball in the center.");
        tokio::time::sleep(self.config.calibration_delay()).await;

        match self.measure_reference() {
            Ok(scale) => {
                self.context.calibration.apply(scale);
                info!(scale_x = scale.x, scale_y = scale.y, "calibration successful");
            }
            Err(err) => warn!(%err, "calibration failed, keeping previous state"),
        }
        self.state = SessionState::Running;
    }

    fn measure_reference(&mut self) -> std::result::Result<Scale, CalibrationError> {
        // The reference frame is measured unmirrored, against the nominal size.
        let frame = self
            .source
            .capture()
            .map_err(|err| CalibrationError::CaptureUnavailable {
                reason: err.to_string(),
            })?;
        calibration::calibrate(
            &frame,
            &self.config.color_range,
            (self.config.frame_width, self.config.frame_height),
        )
    }
}
