//! Matcher interface and lifecycle helpers shared by matcher strategies.

use crate::error::{PoolError, Result};
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::kalman_tracker::KalmanBoxTracker;
use crate::tracker::matching::Detection;
use crate::tracker::pool::{Handle, Pool, Reset};
use crate::tracker::track::Track;
use crate::tracker::track_state::TrackState;

/// Per-frame association engine.
pub trait Matcher {
    type Track: Track;

    /// Consume one frame's detections and return the confirmed tracks in
    /// creation order. `frame` is reserved for appearance-based strategies.
    fn track<F: ?Sized>(&mut self, frame: &F, detections: &[Detection]) -> Vec<&Self::Track>;

    /// Drop every active track and return its resources.
    fn clear(&mut self);
}

/// Read access to the lifecycle counters of a pooled tracker.
pub trait MotionTracker {
    type Track: Track;

    fn track(&self) -> &Self::Track;
    fn hit_streak(&self) -> u32;
    fn misses(&self) -> u32;
    /// Frames elapsed since the tracker was spawned.
    fn age(&self) -> u32;
}

impl<T: Track> MotionTracker for KalmanBoxTracker<T> {
    type Track = T;

    fn track(&self) -> &T {
        KalmanBoxTracker::track(self)
    }

    fn hit_streak(&self) -> u32 {
        KalmanBoxTracker::hit_streak(self)
    }

    fn misses(&self) -> u32 {
        KalmanBoxTracker::misses(self)
    }

    fn age(&self) -> u32 {
        KalmanBoxTracker::age(self)
    }
}

/// Lifecycle state of a tracker as of the current frame.
///
/// A tracker is never confirmed on the frame it was spawned.
pub fn classify<M: MotionTracker>(tracker: &M, min_streak: u32, max_misses: u32) -> TrackState {
    if tracker.misses() > max_misses {
        TrackState::Removed
    } else if tracker.age() > 0 && tracker.hit_streak() >= min_streak {
        TrackState::Confirmed
    } else {
        TrackState::Tentative
    }
}

/// Whether the tracker became confirmed on the current frame.
///
/// Only meaningful right after a successful update.
pub fn newly_confirmed<M: MotionTracker>(tracker: &M, min_streak: u32) -> bool {
    tracker.misses() == 0
        && tracker.age() > 0
        && tracker.hit_streak() >= min_streak
        && (tracker.age() == 1 || tracker.hit_streak() == min_streak)
}

/// Acquire a tracker from `pool` and start it on `detection`.
///
/// The slot's existing buffers are reused. If the detection cannot be
/// encoded as a measurement the slot goes straight back to the pool.
pub fn spawn_tracker<T: Track + Reset + Default>(
    pool: &mut Pool<KalmanBoxTracker<T>>,
    kalman_filter: &KalmanFilter,
    id: u64,
    detection: &Detection,
) -> Result<Handle> {
    let handle = pool.acquire()?;
    let Some(tracker) = pool.get_mut(&handle) else {
        return Err(PoolError::StaleHandle {
            index: handle.index() as u32,
            generation: handle.generation(),
        }
        .into());
    };
    match tracker.initiate(kalman_filter, detection.bbox) {
        Ok(()) => {
            tracker.track_mut().restart(id, detection.bbox, detection.class);
            Ok(handle)
        }
        Err(err) => {
            pool.release(handle)?;
            Err(err.into())
        }
    }
}

/// Tracks of every confirmed tracker, in `active` order.
pub fn confirmed_tracks<'a, M: MotionTracker>(
    pool: &'a Pool<M>,
    active: &[Handle],
    min_streak: u32,
    max_misses: u32,
) -> Vec<&'a M::Track> {
    active
        .iter()
        .filter_map(|handle| pool.get(handle))
        .filter(|tracker| classify(*tracker, min_streak, max_misses) == TrackState::Confirmed)
        .map(|tracker| tracker.track())
        .collect()
}

/// Release every tracker that missed more than `max_misses` frames in a row.
///
/// Returns the number of evicted trackers.
pub fn evict_outdated<M: MotionTracker>(
    pool: &mut Pool<M>,
    active: &mut Vec<Handle>,
    min_streak: u32,
    max_misses: u32,
) -> usize {
    let before = active.len();
    active.retain(|handle| {
        let (id, misses) = match pool.get(handle) {
            Some(tracker) if classify(tracker, min_streak, max_misses) == TrackState::Removed => {
                (tracker.track().id(), tracker.misses())
            }
            Some(_) => return true,
            None => return false,
        };
        log::debug!("evicting track {id} after {misses} missed frames");
        if let Err(err) = pool.release(*handle) {
            log::warn!("failed to release track {id}: {err}");
        }
        false
    });
    before - active.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, MotionError};
    use crate::tracker::pool::PoolPolicy;
    use crate::tracker::rect::Rect;
    use crate::tracker::track::{BaseTrack, ObjectClass};

    type Tracker = KalmanBoxTracker<BaseTrack>;

    fn person(id: u64) -> Detection {
        Detection::new(ObjectClass::Person, Rect::new(10.0 * id as f32, 10.0, 20.0, 20.0), 0.9)
    }

    fn spawn(pool: &mut Pool<Tracker>, kf: &KalmanFilter, id: u64) -> Handle {
        spawn_tracker(pool, kf, id, &person(id)).unwrap()
    }

    #[test]
    fn test_spawn_tracker_starts_track() {
        let kf = KalmanFilter::default();
        let mut pool: Pool<Tracker> = Pool::new(1, PoolPolicy::Bounded);
        let detection = Detection::new(ObjectClass::Car, Rect::new(5.0, 6.0, 30.0, 20.0), 0.8);

        let handle = spawn_tracker(&mut pool, &kf, 42, &detection).unwrap();

        let tracker = pool.get(&handle).unwrap();
        assert_eq!(tracker.track().id(), 42);
        assert_eq!(tracker.track().class(), ObjectClass::Car);
        assert_eq!(tracker.track().history(), &[detection.bbox]);
        assert_eq!(tracker.hit_streak(), 1);
    }

    #[test]
    fn test_spawn_tracker_errors() {
        let kf = KalmanFilter::default();
        let mut pool: Pool<Tracker> = Pool::new(1, PoolPolicy::Bounded);
        let flat = Detection::new(ObjectClass::Person, Rect::new(0.0, 0.0, 20.0, 0.0), 0.9);

        let err = spawn_tracker(&mut pool, &kf, 1, &flat).unwrap_err();
        assert!(matches!(err, Error::Motion(MotionError::DegenerateMeasurement { .. })));
        // The rejected slot was handed back.
        assert_eq!(pool.live(), 0);

        spawn(&mut pool, &kf, 2);
        let err = spawn_tracker(&mut pool, &kf, 3, &person(3)).unwrap_err();
        assert_eq!(err, Error::Pool(PoolError::Exhausted { capacity: 1 }));
    }

    #[test]
    fn test_recycled_slot_restarts_cleanly() {
        let kf = KalmanFilter::default();
        let mut pool: Pool<Tracker> = Pool::new(1, PoolPolicy::Bounded);
        let handle = spawn(&mut pool, &kf, 1);
        let tracker = pool.get_mut(&handle).unwrap();
        for _ in 0..10 {
            tracker.predict(&kf);
            tracker.update(&kf, person(1).bbox).unwrap();
            tracker.track_mut().register_observation(person(1).bbox);
        }
        pool.release(handle).unwrap();

        let handle = spawn(&mut pool, &kf, 2);
        let tracker = pool.get(&handle).unwrap();
        assert_eq!(tracker.track().id(), 2);
        assert_eq!(tracker.track().history(), &[person(2).bbox]);
        assert_eq!((tracker.hit_streak(), tracker.misses(), tracker.age()), (1, 0, 0));
    }

    #[test]
    fn test_newly_confirmed_fires_once() {
        let kf = KalmanFilter::default();
        let mut pool: Pool<Tracker> = Pool::new(1, PoolPolicy::Grow);
        let handle = spawn(&mut pool, &kf, 1);
        let tracker = pool.get_mut(&handle).unwrap();
        let bbox = person(1).bbox;

        let mut fired = Vec::new();
        for frame in 2..=6 {
            tracker.predict(&kf);
            tracker.update(&kf, bbox).unwrap();
            if newly_confirmed(&*tracker, 3) {
                fired.push(frame);
            }
        }
        assert_eq!(fired, vec![3]);

        // With min_streak = 1 the first update after spawning confirms.
        let handle = spawn(&mut pool, &kf, 2);
        let tracker = pool.get_mut(&handle).unwrap();
        tracker.predict(&kf);
        tracker.update(&kf, bbox).unwrap();
        assert!(newly_confirmed(&*tracker, 1));
        tracker.predict(&kf);
        tracker.update(&kf, bbox).unwrap();
        assert!(!newly_confirmed(&*tracker, 1));
    }

    #[test]
    fn test_classify() {
        let kf = KalmanFilter::default();
        let mut pool: Pool<Tracker> = Pool::new(1, PoolPolicy::Grow);
        let handle = spawn(&mut pool, &kf, 1);
        let tracker = pool.get_mut(&handle).unwrap();

        // Spawned this frame: never confirmed, even with min_streak = 1.
        assert_eq!(classify(&*tracker, 1, 0), TrackState::Tentative);

        tracker.predict(&kf);
        assert_eq!(classify(&*tracker, 1, 0), TrackState::Confirmed);
        assert_eq!(classify(&*tracker, 2, 0), TrackState::Tentative);

        tracker.mark_missed();
        assert_eq!(classify(&*tracker, 1, 1), TrackState::Tentative);
        assert_eq!(classify(&*tracker, 1, 0), TrackState::Removed);
    }

    #[test]
    fn test_confirmed_in_active_order() {
        let kf = KalmanFilter::default();
        let mut pool: Pool<Tracker> = Pool::new(4, PoolPolicy::Grow);
        let active: Vec<Handle> = (1..=3).map(|id| spawn(&mut pool, &kf, id)).collect();
        for handle in &active {
            pool.get_mut(handle).unwrap().predict(&kf);
        }
        pool.get_mut(&active[1]).unwrap().mark_missed();

        let ids: Vec<u64> = confirmed_tracks(&pool, &active, 1, 5)
            .into_iter()
            .map(|t| t.id())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_evict_outdated_releases_to_pool() {
        let kf = KalmanFilter::default();
        let mut pool: Pool<Tracker> = Pool::new(2, PoolPolicy::Bounded);
        let mut active: Vec<Handle> = (1..=2).map(|id| spawn(&mut pool, &kf, id)).collect();
        let stale = pool.get_mut(&active[0]).unwrap();
        stale.mark_missed();
        stale.mark_missed();

        assert_eq!(evict_outdated(&mut pool, &mut active, 1, 2), 0);
        pool.get_mut(&active[0]).unwrap().mark_missed();
        assert_eq!(evict_outdated(&mut pool, &mut active, 1, 2), 1);

        assert_eq!(active.len(), 1);
        assert_eq!(pool.get(&active[0]).unwrap().track().id(), 2);
        assert_eq!(pool.live(), 1);
        assert!(pool.acquire().is_ok());
    }
}
