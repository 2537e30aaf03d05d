//! Track identity and observation history.

use serde::{Deserialize, Serialize};

use crate::tracker::pool::Reset;
use crate::tracker::rect::Rect;

/// Object category reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObjectClass {
    #[default]
    Person,
    Bicycle,
    Car,
    Motorcycle,
    Bus,
    Truck,
    /// Raw class index for anything not listed above.
    Other(u32),
}

/// Display color, used only by downstream rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Deterministic, well-separated color for a track id.
    ///
    /// Hues advance by the golden ratio conjugate so consecutive ids land far
    /// apart on the color wheel.
    pub fn from_id(id: u64) -> Self {
        const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;
        let hue = (id as f64 * GOLDEN_RATIO_CONJUGATE).fract();
        Self::from_hsv(hue, 0.75, 0.95)
    }

    fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let sector = (h * 6.0).floor();
        let f = h * 6.0 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - f * s);
        let t = v * (1.0 - (1.0 - f) * s);
        let (r, g, b) = match sector as u8 % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        let channel = |c: f64| (c * 255.0).round() as u8;
        Self::new(channel(r), channel(g), channel(b))
    }
}

/// A persistent identity with an observation history.
///
/// Algorithm-specific state is layered on by wrapping an existing track (see
/// [`SortTrack`](crate::tracker::SortTrack)) and delegating to it.
pub trait Track {
    fn id(&self) -> u64;

    /// Relabel the track. The color is left untouched.
    fn set_id(&mut self, id: u64);

    fn color(&self) -> Color;

    /// Observed boxes, oldest first.
    fn history(&self) -> &[Rect];

    fn current_box(&self) -> Rect;

    fn class(&self) -> ObjectClass;

    /// Append `bbox` to the history and make it the current box.
    fn register_observation(&mut self, bbox: Rect);

    /// Start over as a fresh track from its first observation, reusing the
    /// storage already held by `self`.
    fn restart(&mut self, id: u64, bbox: Rect, class: ObjectClass);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseTrack {
    id: u64,
    color: Color,
    history: Vec<Rect>,
    class: ObjectClass,
}

impl BaseTrack {
    /// Start a track from its first observation.
    pub fn new(id: u64, bbox: Rect, class: ObjectClass) -> Self {
        Self {
            id,
            color: Color::from_id(id),
            history: vec![bbox],
            class,
        }
    }
}

impl Track for BaseTrack {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn color(&self) -> Color {
        self.color
    }

    fn history(&self) -> &[Rect] {
        &self.history
    }

    fn current_box(&self) -> Rect {
        self.history.last().copied().unwrap_or_default()
    }

    fn class(&self) -> ObjectClass {
        self.class
    }

    fn register_observation(&mut self, bbox: Rect) {
        self.history.push(bbox);
    }

    fn restart(&mut self, id: u64, bbox: Rect, class: ObjectClass) {
        self.id = id;
        self.color = Color::from_id(id);
        self.history.clear();
        self.history.push(bbox);
        self.class = class;
    }
}

impl Reset for BaseTrack {
    fn reset(&mut self) {
        self.id = 0;
        self.color = Color::default();
        self.history.clear();
        self.class = ObjectClass::default();
    }
}

/// SORT extension of a track: remembers the box predicted for the current
/// frame so association can run before the observation is known.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortTrack<T = BaseTrack> {
    inner: T,
    pub predicted_box: Rect,
}

impl<T: Track> SortTrack<T> {
    pub fn new(inner: T) -> Self {
        let predicted_box = inner.current_box();
        Self {
            inner,
            predicted_box,
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Track> Track for SortTrack<T> {
    fn id(&self) -> u64 {
        self.inner.id()
    }

    fn set_id(&mut self, id: u64) {
        self.inner.set_id(id);
    }

    fn color(&self) -> Color {
        self.inner.color()
    }

    fn history(&self) -> &[Rect] {
        self.inner.history()
    }

    fn current_box(&self) -> Rect {
        self.inner.current_box()
    }

    fn class(&self) -> ObjectClass {
        self.inner.class()
    }

    fn register_observation(&mut self, bbox: Rect) {
        self.inner.register_observation(bbox);
    }

    fn restart(&mut self, id: u64, bbox: Rect, class: ObjectClass) {
        self.inner.restart(id, bbox, class);
        self.predicted_box = bbox;
    }
}

impl<T: Reset> Reset for SortTrack<T> {
    fn reset(&mut self) {
        self.inner.reset();
        self.predicted_box = Rect::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_observation_appends() {
        let first = Rect::new(0.0, 0.0, 10.0, 10.0);
        let second = Rect::new(1.0, 1.0, 10.0, 10.0);
        let mut track = BaseTrack::new(1, first, ObjectClass::Car);

        track.register_observation(second);

        assert_eq!(track.history(), &[first, second]);
        assert_eq!(track.current_box(), second);
        assert_eq!(track.class(), ObjectClass::Car);
    }

    #[test]
    fn test_relabel_keeps_color() {
        let mut track = BaseTrack::new(4, Rect::new(0.0, 0.0, 1.0, 1.0), ObjectClass::Person);
        let color = track.color();
        track.set_id(9);
        assert_eq!(track.id(), 9);
        assert_eq!(track.color(), color);
    }

    #[test]
    fn test_sort_track_delegates() {
        let first = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut track = SortTrack::new(BaseTrack::new(2, first, ObjectClass::Bus));
        assert_eq!(track.predicted_box, first);

        track.predicted_box = Rect::new(2.0, 2.0, 10.0, 10.0);
        track.register_observation(Rect::new(1.0, 1.0, 10.0, 10.0));
        track.set_id(3);

        assert_eq!(track.inner().history().len(), 2);
        assert_eq!(track.current_box(), Rect::new(1.0, 1.0, 10.0, 10.0));
        assert_eq!(track.id(), 3);
        assert_eq!(track.inner().id(), 3);
    }

    #[test]
    fn test_restart_reuses_history_storage() {
        let first = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut track = SortTrack::new(BaseTrack::new(1, first, ObjectClass::Car));
        for i in 0..32 {
            track.register_observation(Rect::new(i as f32, 0.0, 10.0, 10.0));
        }
        let capacity = track.inner.history.capacity();
        let storage = track.history().as_ptr();

        track.reset();
        assert!(track.history().is_empty());
        assert_eq!(track.predicted_box, Rect::default());

        let restarted = Rect::new(50.0, 50.0, 20.0, 30.0);
        track.restart(7, restarted, ObjectClass::Bus);

        assert_eq!(track.inner.history.capacity(), capacity);
        assert_eq!(track.history().as_ptr(), storage);
        assert_eq!(track.history(), &[restarted]);
        assert_eq!(track.predicted_box, restarted);
        assert_eq!(track.id(), 7);
        assert_eq!(track.color(), Color::from_id(7));
        assert_eq!(track.class(), ObjectClass::Bus);
    }

    #[test]
    fn test_colors_are_stable_and_distinct() {
        assert_eq!(Color::from_id(5), Color::from_id(5));
        assert_ne!(Color::from_id(1), Color::from_id(2));
    }
}
