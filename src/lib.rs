//! Multi-object tracking by detection with SORT.
//!
//! Each frame, a [`SortMatcher`] predicts every track's box with a
//! constant-velocity Kalman filter, scores predictions against the frame's
//! detections by IoU, resolves the optimal pairing with the Hungarian
//! algorithm, and reports the tracks that have been matched for enough
//! consecutive frames. Per-track motion state is recycled through a [`Pool`].
//!
//! ```
//! use mot_sort::{Detection, ObjectClass, Rect, SortConfig, SortMatcher, Track};
//!
//! let mut matcher = SortMatcher::new(SortConfig::default()).unwrap();
//! let person = Detection::new(ObjectClass::Person, Rect::new(10.0, 10.0, 50.0, 50.0), 0.9);
//!
//! let mut confirmed = Vec::new();
//! for _ in 0..3 {
//!     confirmed = matcher.update(&[person]).iter().map(|t| t.id()).collect();
//! }
//! assert_eq!(confirmed, vec![1]);
//! ```

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{AssignmentError, ConfigError, Error, MotionError, PoolError, Result};
pub use integration::{DetectionBuilder, DetectionSource, IntoDetections, TrackerPipeline};
pub use tracker::{
    Color, Detection, Matcher, ObjectClass, Pool, PoolPolicy, Rect, SortConfig, SortMatcher,
    SortTrack, Track, TrackState,
};
