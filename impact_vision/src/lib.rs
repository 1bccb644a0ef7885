// THEORY:
// This file is the main entry point for the `impact_vision` library crate.
// It exposes the `SessionLoop` together with the small set of components it
// composes: a colour-mask detector, a centroid extractor, a one-shot
// calibration estimator and the persistent impact canvas.
//
// The components under `core_modules` are usable on their own (they are plain
// functions over `image` buffers), while `session` wires them into the
// capture -> detect -> draw -> present cycle. Frame acquisition and display are
// traits so the same loop runs against a webcam or a scripted test source.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod session;

pub use config::SessionConfig;
pub use core_modules::calibration::{CalibrationState, Scale};
pub use core_modules::centroid::Impact;
pub use core_modules::color_mask::{ColorRange, Frame};
pub use core_modules::impact_canvas::ImpactCanvas;
pub use error::{CalibrationError, ImpactError, Result};
pub use session::{DisplaySurface, FrameSource, Key, SessionLoop, SessionState, SessionSummary};
