//! Per-track motion state: one Kalman estimate plus hit/miss bookkeeping.

use ndarray::{Array1, Array2};

use crate::error::MotionError;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::pool::Reset;
use crate::tracker::rect::Rect;

/// Kalman box tracker owning exactly one track for its active lifetime.
///
/// Instances are recycled through a [`Pool`](crate::tracker::Pool); the
/// filter matrices are shared and passed in on every call.
#[derive(Debug, Clone)]
pub struct KalmanBoxTracker<T> {
    track: T,
    mean: Array1<f64>,
    covariance: Array2<f64>,
    /// Consecutive frames with a matched observation.
    hit_streak: u32,
    /// Consecutive frames without one.
    misses: u32,
    /// Prediction steps since the tracker was started.
    age: u32,
}

impl<T: Default> Default for KalmanBoxTracker<T> {
    fn default() -> Self {
        Self {
            track: T::default(),
            mean: Array1::zeros(8),
            covariance: Array2::zeros((8, 8)),
            hit_streak: 0,
            misses: 0,
            age: 0,
        }
    }
}

impl<T: Reset> Reset for KalmanBoxTracker<T> {
    fn reset(&mut self) {
        self.track.reset();
        self.mean.fill(0.0);
        self.covariance.fill(0.0);
        self.hit_streak = 0;
        self.misses = 0;
        self.age = 0;
    }
}

impl<T> KalmanBoxTracker<T> {
    /// Restart the motion state from a first observed box, in place.
    ///
    /// The first observation counts as the first hit. The track itself is
    /// left for the caller to restart.
    pub fn initiate(
        &mut self,
        kalman_filter: &KalmanFilter,
        bbox: Rect,
    ) -> Result<(), MotionError> {
        let measurement = to_measurement(&bbox)?;
        kalman_filter.initiate_into(measurement, &mut self.mean, &mut self.covariance);
        self.hit_streak = 1;
        self.misses = 0;
        self.age = 0;
        Ok(())
    }

    /// Advance the state one frame and return the predicted box.
    ///
    /// `None` means the estimate diverged into a box that cannot be placed on
    /// the frame; the tracker should be dropped.
    pub fn predict(&mut self, kalman_filter: &KalmanFilter) -> Option<Rect> {
        let (mean, covariance) = kalman_filter.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;
        self.age += 1;
        self.state_box().filter(Rect::is_valid_placement)
    }

    /// Correct the estimate with an observed box.
    pub fn update(&mut self, kalman_filter: &KalmanFilter, bbox: Rect) -> Result<(), MotionError> {
        let measurement = to_measurement(&bbox)?;
        let (mean, covariance) = kalman_filter.update(&self.mean, &self.covariance, measurement)?;
        self.mean = mean;
        self.covariance = covariance;
        self.hit_streak += 1;
        self.misses = 0;
        Ok(())
    }

    /// Record a frame without a matching observation.
    pub fn mark_missed(&mut self) {
        self.misses += 1;
        self.hit_streak = 0;
    }

    /// Box decoded from the current state estimate.
    pub fn state_box(&self) -> Option<Rect> {
        Rect::from_xysr(
            self.mean[0] as f32,
            self.mean[1] as f32,
            self.mean[2] as f32,
            self.mean[3] as f32,
        )
    }

    pub fn track(&self) -> &T {
        &self.track
    }

    pub fn track_mut(&mut self) -> &mut T {
        &mut self.track
    }

    pub fn hit_streak(&self) -> u32 {
        self.hit_streak
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn age(&self) -> u32 {
        self.age
    }
}

fn to_measurement(bbox: &Rect) -> Result<[f64; 4], MotionError> {
    let xysr = bbox.to_xysr()?;
    Ok([
        xysr[0] as f64,
        xysr[1] as f64,
        xysr[2] as f64,
        xysr[3] as f64,
    ])
}
