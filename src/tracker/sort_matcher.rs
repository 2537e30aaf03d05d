//! SORT matcher: Kalman prediction, IoU costs and Hungarian assignment.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tracker::kalman_filter::{KalmanFilter, KalmanParams};
use crate::tracker::kalman_tracker::KalmanBoxTracker;
use crate::tracker::matcher::{self, Matcher};
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::metrics::iou_distance;
use crate::tracker::pool::{Handle, Pool, PoolPolicy};
use crate::tracker::rect::Rect;
use crate::tracker::track::{SortTrack, Track};

/// Configuration for the [`SortMatcher`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Minimum IoU between prediction and detection for a match, in (0, 1].
    pub iou_threshold: f32,
    /// Consecutive misses tolerated before a track is dropped.
    pub max_misses: u32,
    /// Consecutive hits required before a track is reported.
    pub min_streak: u32,
    /// Trackers preallocated by the pool.
    pub pool_capacity: usize,
    pub pool_policy: PoolPolicy,
    pub kalman: KalmanParams,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.3,
            max_misses: 15,
            min_streak: 3,
            pool_capacity: 50,
            pool_policy: PoolPolicy::Grow,
            kalman: KalmanParams::default(),
        }
    }
}

impl SortConfig {
    pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn with_max_misses(mut self, max_misses: u32) -> Self {
        self.max_misses = max_misses;
        self
    }

    pub fn with_min_streak(mut self, min_streak: u32) -> Self {
        self.min_streak = min_streak;
        self
    }

    pub fn with_pool_capacity(mut self, pool_capacity: usize) -> Self {
        self.pool_capacity = pool_capacity;
        self
    }

    pub fn with_pool_policy(mut self, pool_policy: PoolPolicy) -> Self {
        self.pool_policy = pool_policy;
        self
    }

    pub fn with_kalman_params(mut self, kalman: KalmanParams) -> Self {
        self.kalman = kalman;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.iou_threshold > 0.0 && self.iou_threshold <= 1.0) {
            return Err(ConfigError::InvalidIouThreshold(self.iou_threshold));
        }
        if self.min_streak == 0 {
            return Err(ConfigError::ZeroMinStreak);
        }
        if self.pool_capacity == 0 {
            return Err(ConfigError::ZeroPoolCapacity);
        }
        Ok(())
    }
}

/// Pooled tracker type used by [`SortMatcher`].
pub type SortTracker = KalmanBoxTracker<SortTrack>;

pub struct SortMatcher {
    config: SortConfig,
    kalman_filter: KalmanFilter,
    pool: Pool<SortTracker>,
    /// Active trackers in creation order.
    trackers: Vec<Handle>,
    next_id: u64,
    frame_count: u64,
}

impl SortMatcher {
    pub fn new(config: SortConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            kalman_filter: KalmanFilter::new(&config.kalman),
            pool: Pool::new(config.pool_capacity, config.pool_policy),
            trackers: Vec::new(),
            next_id: 1,
            frame_count: 0,
            config,
        })
    }

    /// Run one frame without a frame handle.
    pub fn update(&mut self, detections: &[Detection]) -> Vec<&SortTrack> {
        self.track(&(), detections)
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    pub fn pool(&self) -> &Pool<SortTracker> {
        &self.pool
    }

    /// Frames processed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Number of active trackers, tentative or confirmed.
    pub fn active_len(&self) -> usize {
        self.trackers.len()
    }

    /// Every active track, tentative ones included, in creation order.
    pub fn active_tracks(&self) -> impl Iterator<Item = &SortTrack> + '_ {
        self.trackers
            .iter()
            .filter_map(|handle| self.pool.get(handle))
            .map(|tracker| tracker.track())
    }

    fn spawn(&mut self, detection: &Detection) {
        let id = self.next_id;
        match matcher::spawn_tracker(&mut self.pool, &self.kalman_filter, id, detection) {
            Ok(handle) => {
                log::debug!("spawned track {id} at {:?}", detection.bbox);
                self.next_id += 1;
                self.trackers.push(handle);
            }
            Err(err) => log::warn!("no tracker for detection at {:?}: {err}", detection.bbox),
        }
    }

    /// Advance every tracker one frame; drop those whose state diverged.
    fn predict_boxes(&mut self) {
        let kalman_filter = &self.kalman_filter;
        let pool = &mut self.pool;
        self.trackers.retain(|handle| {
            let Some(tracker) = pool.get_mut(handle) else {
                return false;
            };
            match tracker.predict(kalman_filter) {
                Some(predicted) => {
                    tracker.track_mut().predicted_box = predicted;
                    true
                }
                None => {
                    let id = tracker.track().id();
                    log::debug!("track {id} diverged, dropping it");
                    if let Err(err) = pool.release(*handle) {
                        log::warn!("failed to release track {id}: {err}");
                    }
                    false
                }
            }
        });
    }

    fn associate(&self, detections: &[Detection]) -> AssignmentResult {
        let predicted: Vec<Rect> = self
            .trackers
            .iter()
            .map(|handle| {
                self.pool
                    .get(handle)
                    .map(|tracker| tracker.track().predicted_box)
                    .unwrap_or_default()
            })
            .collect();
        let observed: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
        let dists = iou_distance(&predicted, &observed);

        matching::linear_assignment(&dists, self.config.iou_threshold).unwrap_or_else(|err| {
            log::warn!("assignment failed, treating frame as unmatched: {err}");
            AssignmentResult::unmatched(predicted.len(), observed.len())
        })
    }

    fn apply(&mut self, assignment: &AssignmentResult, detections: &[Detection]) {
        let min_streak = self.config.min_streak;
        for &(itracked, idet) in &assignment.matches {
            let bbox = detections[idet].bbox;
            let Some(tracker) = self.pool.get_mut(&self.trackers[itracked]) else {
                continue;
            };
            match tracker.update(&self.kalman_filter, bbox) {
                Ok(()) => {
                    tracker.track_mut().register_observation(bbox);
                    if matcher::newly_confirmed(&*tracker, min_streak) {
                        log::debug!(
                            "confirmed track {} after {} hits",
                            tracker.track().id(),
                            tracker.hit_streak()
                        );
                    }
                }
                Err(err) => {
                    log::warn!("track {} rejected observation: {err}", tracker.track().id());
                    tracker.mark_missed();
                }
            }
        }

        for &itracked in &assignment.unmatched_tracks {
            if let Some(tracker) = self.pool.get_mut(&self.trackers[itracked]) {
                tracker.mark_missed();
            }
        }
    }

    fn release(&mut self, handle: Handle) {
        if let Err(err) = self.pool.release(handle) {
            log::warn!("pool release failed: {err}");
        }
    }
}

impl Matcher for SortMatcher {
    type Track = SortTrack;

    fn track<F: ?Sized>(&mut self, _frame: &F, detections: &[Detection]) -> Vec<&SortTrack> {
        self.frame_count += 1;

        if self.trackers.is_empty() {
            for detection in detections {
                self.spawn(detection);
            }
            return Vec::new();
        }

        self.predict_boxes();

        let assignment = self.associate(detections);
        self.apply(&assignment, detections);

        for &idet in &assignment.unmatched_detections {
            self.spawn(&detections[idet]);
        }

        let SortConfig {
            min_streak,
            max_misses,
            ..
        } = self.config;
        matcher::evict_outdated(&mut self.pool, &mut self.trackers, min_streak, max_misses);
        matcher::confirmed_tracks(&self.pool, &self.trackers, min_streak, max_misses)
    }

    fn clear(&mut self) {
        let released = self.trackers.len();
        for handle in self.trackers.drain(..) {
            if let Err(err) = self.pool.release(handle) {
                log::warn!("pool release failed: {err}");
            }
        }
        if released > 0 {
            log::debug!("released {released} trackers");
        }
    }
}

impl Drop for SortMatcher {
    fn drop(&mut self) {
        self.clear();
    }
}
