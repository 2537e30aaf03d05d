//! Overlap metrics used as association costs.

use ndarray::Array2;

use crate::tracker::rect::Rect;

/// Intersection over union of two boxes, in `[0, 1]`.
#[inline]
pub fn iou(a: &Rect, b: &Rect) -> f32 {
    a.iou(b)
}

/// Assignment cost of pairing `a` with `b`: `1 - iou(a, b)`.
#[inline]
pub fn iou_loss(a: &Rect, b: &Rect) -> f32 {
    1.0 - iou(a, b)
}

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a`
/// and N is the length of `boxes_b`.
pub fn iou_batch(boxes_a: &[Rect], boxes_b: &[Rect]) -> Array2<f32> {
    Array2::from_shape_fn((boxes_a.len(), boxes_b.len()), |(i, j)| {
        iou(&boxes_a[i], &boxes_b[j])
    })
}

/// Compute IoU distance matrix between tracks and detections.
pub fn iou_distance(track_boxes: &[Rect], det_boxes: &[Rect]) -> Array2<f32> {
    Array2::from_shape_fn((track_boxes.len(), det_boxes.len()), |(i, j)| {
        iou_loss(&track_boxes[i], &det_boxes[j])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_boxes() {
        let a = Rect::new(10.0, 10.0, 50.0, 50.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
        assert!(iou_loss(&a, &a).abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_boxes() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(iou(&a, &b), 0.0);
        assert_eq!(iou_loss(&a, &b), 1.0);
    }

    #[test]
    fn test_symmetry() {
        let boxes = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(3.0, 4.0, 12.0, 7.0),
            Rect::new(8.5, 1.5, 2.0, 20.0),
            Rect::new(100.0, 100.0, 1.0, 1.0),
        ];
        for a in &boxes {
            for b in &boxes {
                assert_eq!(iou(a, b), iou(b, a));
            }
        }
    }

    #[test]
    fn test_distance_matrix_shape() {
        let tracks = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(50.0, 50.0, 10.0, 10.0)];
        let dets = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(5.0, 0.0, 10.0, 10.0),
            Rect::new(50.0, 50.0, 10.0, 10.0),
        ];
        let dists = iou_distance(&tracks, &dets);
        assert_eq!(dists.dim(), (2, 3));
        assert!(dists[[0, 0]].abs() < 1e-6);
        assert_eq!(dists[[0, 2]], 1.0);
        assert!(dists[[1, 2]].abs() < 1e-6);

        let ious = iou_batch(&tracks, &dets);
        assert!((ious[[0, 1]] - 50.0 / 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(iou_distance(&[], &[Rect::default()]).dim(), (0, 1));
        assert_eq!(iou_batch(&[Rect::default()], &[]).dim(), (1, 0));
    }
}
