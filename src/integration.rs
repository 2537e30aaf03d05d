//! Integration module for connecting object detection backends with the tracker.
//!
//! The tracking core only sees detections. Detector inference, frame decoding
//! and rendering stay on the caller's side of these traits.

mod builder;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections};
pub use pipeline::TrackerPipeline;
