mod hungarian;
mod kalman_filter;
mod kalman_tracker;
mod matcher;
mod matching;
mod metrics;
mod pool;
mod rect;
mod sort_matcher;
mod track;
mod track_state;

pub use hungarian::{assignment_cost, solve as solve_assignment};
pub use kalman_filter::{KalmanFilter, KalmanParams};
pub use kalman_tracker::KalmanBoxTracker;
pub use matcher::{
    Matcher, MotionTracker, classify, confirmed_tracks, evict_outdated, newly_confirmed,
    spawn_tracker,
};
pub use matching::{AssignmentResult, Detection, linear_assignment};
pub use metrics::{iou, iou_batch, iou_distance, iou_loss};
pub use pool::{Handle, Pool, PoolPolicy, Reset};
pub use rect::Rect;
pub use sort_matcher::{SortConfig, SortMatcher, SortTracker};
pub use track::{BaseTrack, Color, ObjectClass, SortTrack, Track};
pub use track_state::TrackState;
