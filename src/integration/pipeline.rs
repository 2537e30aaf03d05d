//! TrackerPipeline for combining detection with tracking.

use crate::error::ConfigError;
use crate::tracker::{Detection, Matcher, ObjectClass, SortConfig, SortMatcher};

use super::{DetectionSource, IntoDetections};

/// A combined tracker that bundles detection inference with a matcher.
///
/// Detections below the confidence cutoff, or outside the class filter, are
/// dropped before they reach the matcher.
pub struct TrackerPipeline<D: DetectionSource, M: Matcher = SortMatcher> {
    detector: D,
    matcher: M,
    min_confidence: f32,
    classes: Vec<ObjectClass>,
}

impl<D: DetectionSource> TrackerPipeline<D, SortMatcher> {
    /// Create a new tracking pipeline with a SORT matcher.
    pub fn with_config(detector: D, config: SortConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(detector, SortMatcher::new(config)?))
    }
}

impl<D: DetectionSource, M: Matcher> TrackerPipeline<D, M> {
    pub fn new(detector: D, matcher: M) -> Self {
        Self {
            detector,
            matcher,
            min_confidence: 0.0,
            classes: Vec::new(),
        }
    }

    /// Ignore detections below `min_confidence` (clamped to [0, 1]).
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    /// Only track the given classes. An empty list tracks everything.
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = ObjectClass>) -> Self {
        self.classes = classes.into_iter().collect();
        self
    }

    /// Process a single frame and return the confirmed tracks.
    ///
    /// # Returns
    /// Confirmed tracks in creation order, or the detector's error.
    pub fn process_frame(&mut self, frame: &D::Frame) -> Result<Vec<&M::Track>, D::Error> {
        let detections = self.detector.detect(frame)?;
        Ok(self.process_detections(frame, detections))
    }

    /// Track detections produced outside the pipeline's detector.
    pub fn process_detections<I: IntoDetections>(
        &mut self,
        frame: &D::Frame,
        detections: I,
    ) -> Vec<&M::Track> {
        let detections: Vec<Detection> = detections
            .into_detections()
            .into_iter()
            .filter(|d| self.accepts(d))
            .collect();
        self.matcher.track(frame, &detections)
    }

    fn accepts(&self, detection: &Detection) -> bool {
        detection.confidence >= self.min_confidence
            && (self.classes.is_empty() || self.classes.contains(&detection.class))
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying matcher.
    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    /// Get a mutable reference to the underlying matcher.
    pub fn matcher_mut(&mut self) -> &mut M {
        &mut self.matcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{Rect, Track};

    struct MockDetector {
        detections: Vec<Detection>,
    }

    impl DetectionSource for MockDetector {
        type Frame = [u8];
        type Error = std::convert::Infallible;

        fn detect(&mut self, _frame: &[u8]) -> Result<Vec<Detection>, Self::Error> {
            Ok(self.detections.clone())
        }
    }

    struct FailingDetector;

    impl DetectionSource for FailingDetector {
        type Frame = [u8];
        type Error = String;

        fn detect(&mut self, _frame: &[u8]) -> Result<Vec<Detection>, Self::Error> {
            Err("model not loaded".to_string())
        }
    }

    fn mock() -> MockDetector {
        MockDetector {
            detections: vec![
                Detection::new(ObjectClass::Person, Rect::new(10.0, 20.0, 40.0, 60.0), 0.9),
                Detection::new(ObjectClass::Car, Rect::new(200.0, 20.0, 80.0, 40.0), 0.8),
                Detection::new(ObjectClass::Person, Rect::new(400.0, 20.0, 40.0, 60.0), 0.2),
            ],
        }
    }

    #[test]
    fn test_tracker_pipeline() {
        let mut pipeline = TrackerPipeline::with_config(mock(), SortConfig::default()).unwrap();

        // First frame only initializes tracks
        assert!(pipeline.process_frame(&[]).unwrap().is_empty());
        assert_eq!(pipeline.matcher().active_len(), 3);

        pipeline.process_frame(&[]).unwrap();
        let tracks = pipeline.process_frame(&[]).unwrap();
        assert_eq!(tracks.len(), 3);
    }

    #[test]
    fn test_filters_confidence_and_class() {
        let mut pipeline = TrackerPipeline::with_config(mock(), SortConfig::default())
            .unwrap()
            .with_min_confidence(0.5)
            .with_classes([ObjectClass::Person]);

        for _ in 0..3 {
            pipeline.process_frame(&[]).unwrap();
        }
        let tracks = pipeline.process_frame(&[]).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].class(), ObjectClass::Person);
        assert_eq!(tracks[0].current_box(), Rect::new(10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn test_external_detections() {
        let mut pipeline = TrackerPipeline::with_config(mock(), SortConfig::default()).unwrap();
        let detections = vec![Detection::new(
            ObjectClass::Bus,
            Rect::new(0.0, 0.0, 30.0, 30.0),
            0.7,
        )];
        for _ in 0..3 {
            pipeline.process_detections(&[], detections.clone());
        }
        assert_eq!(pipeline.matcher().active_len(), 1);
    }

    #[test]
    fn test_detector_error_propagates() {
        let mut pipeline =
            TrackerPipeline::with_config(FailingDetector, SortConfig::default()).unwrap();
        assert_eq!(
            pipeline.process_frame(&[]).err(),
            Some("model not loaded".to_string())
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SortConfig::default().with_min_streak(0);
        assert!(TrackerPipeline::with_config(mock(), config).is_err());
    }
}
