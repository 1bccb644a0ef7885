pub mod calibration;
pub mod centroid;
pub mod color_mask;
pub mod contour;
pub mod impact_canvas;
