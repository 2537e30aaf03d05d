//! Matching utilities for multi-object tracking.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::AssignmentError;
use crate::tracker::hungarian;
use crate::tracker::rect::Rect;
use crate::tracker::track::ObjectClass;

/// Detection input for the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class: ObjectClass,
    /// Bounding box in pixel coordinates
    pub bbox: Rect,
    /// Detector confidence in [0, 1]
    pub confidence: f32,
}

impl Detection {
    pub fn new(class: ObjectClass, bbox: Rect, confidence: f32) -> Self {
        Self {
            class,
            bbox,
            confidence,
        }
    }

    /// Build a detection from a TLBR box (x1, y1, x2, y2).
    pub fn from_tlbr(
        class: ObjectClass,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        confidence: f32,
    ) -> Self {
        Self::new(class, Rect::from_tlbr(x1, y1, x2, y2), confidence)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

impl AssignmentResult {
    /// Everything unmatched, as when no assignment could be made.
    pub fn unmatched(num_tracks: usize, num_detections: usize) -> Self {
        Self {
            matches: vec![],
            unmatched_tracks: (0..num_tracks).collect(),
            unmatched_detections: (0..num_detections).collect(),
        }
    }
}

/// Optimally pair rows (tracks) with columns (detections) of an IoU-loss
/// matrix, keeping only pairs whose IoU reaches `iou_threshold`.
///
/// Since the cost is `1 - iou`, a pair is accepted iff
/// `1 - cost >= iou_threshold`. Rejected pairs fall back to an unmatched track
/// and an unmatched detection.
pub fn linear_assignment(
    cost_matrix: &Array2<f32>,
    iou_threshold: f32,
) -> Result<AssignmentResult, AssignmentError> {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return Ok(AssignmentResult::unmatched(num_rows, num_cols));
    }

    let row_to_col = hungarian::solve(cost_matrix.view())?;

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut unmatched_detections_mask: Vec<bool> = vec![true; num_cols];

    for (row_idx, col_idx) in row_to_col.into_iter().enumerate() {
        match col_idx {
            Some(col_idx) if 1.0 - cost_matrix[[row_idx, col_idx]] >= iou_threshold => {
                log::trace!("matched track {row_idx} with detection {col_idx}");
                matches.push((row_idx, col_idx));
                unmatched_detections_mask[col_idx] = false;
            }
            _ => unmatched_tracks.push(row_idx),
        }
    }

    let unmatched_detections: Vec<usize> = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { Some(i) } else { None })
        .collect();

    Ok(AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    })
}
