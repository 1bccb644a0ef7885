#![allow(dead_code)]

use image::Rgb;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use impact_vision::session::{DisplaySurface, FrameSource, Key};
use impact_vision::{Frame, ImpactError, Result, SessionConfig};
use std::collections::VecDeque;
use std::time::Duration;

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;
pub const BALL: Rgb<u8> = Rgb([230, 200, 20]);

/// Config for synthetic sessions: no mirroring and no calibration pause.
pub fn test_config() -> SessionConfig {
    SessionConfig {
        mirror_feed: false,
        calibration_delay_ms: 0,
        ..SessionConfig::default()
    }
}

pub fn blank_frame() -> Frame {
    Frame::new(WIDTH, HEIGHT)
}

/// A frame with one square ball blob whose polygon centroid is `(cx, cy)`.
pub fn frame_with_ball(cx: i32, cy: i32, side: u32) -> Frame {
    let mut frame = blank_frame();
    draw_ball(&mut frame, cx, cy, side);
    frame
}

/// Adds a square ball blob centred on `(cx, cy)` to `frame`.
pub fn draw_ball(frame: &mut Frame, cx: i32, cy: i32, side: u32) {
    let half = (side / 2) as i32;
    draw_filled_rect_mut(frame, Rect::at(cx - half, cy - half).of_size(side, side), BALL);
}

/// Plays back a fixed list of frames, then reports the device as gone.
pub struct ScriptedSource {
    frames: VecDeque<Frame>,
    pub captures: usize,
    pub released: bool,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            captures: 0,
            released: false,
        }
    }
}

impl FrameSource for ScriptedSource {
    fn capture(&mut self) -> Result<Frame> {
        self.captures += 1;
        self.frames
            .pop_front()
            .ok_or_else(|| ImpactError::capture("end of stream"))
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        Ok(())
    }
}

/// Records every shown frame and replays a fixed list of key presses.
pub struct RecordingSurface {
    keys: VecDeque<Option<Key>>,
    pub shown: Vec<(String, Frame)>,
    pub polls: Vec<Duration>,
    pub closed: bool,
    pub fail_show: bool,
    pub fail_close: bool,
}

impl RecordingSurface {
    pub fn new(keys: Vec<Option<Key>>) -> Self {
        Self {
            keys: keys.into(),
            shown: Vec::new(),
            polls: Vec::new(),
            closed: false,
            fail_show: false,
            fail_close: false,
        }
    }

    pub fn last_shown(&self, window: &str) -> Option<&Frame> {
        self.shown
            .iter()
            .rev()
            .find(|(name, _)| name == window)
            .map(|(_, frame)| frame)
    }
}

impl DisplaySurface for RecordingSurface {
    fn show(&mut self, window: &str, frame: &Frame) -> Result<()> {
        if self.fail_show {
            return Err(ImpactError::display("imshow", "window is gone"));
        }
        self.shown.push((window.to_string(), frame.clone()));
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<Key>> {
        self.polls.push(timeout);
        Ok(self.keys.pop_front().flatten())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        if self.fail_close {
            return Err(ImpactError::display("destroy_all_windows", "no display"));
        }
        Ok(())
    }
}
