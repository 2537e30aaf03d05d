use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Axis-aligned bounding box in pixel coordinates.
///
/// Stored as TLWH (top-left x, top-left y, width, height). Conversions:
/// - TLBR: Top-Left X, Top-Left Y, Bottom-Right X, Bottom-Right Y
/// - XYSR: Center X, Center Y, Scale (area), Ratio (w/h), the Kalman
///   measurement space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Decode a measurement-space vector (center x, center y, area, w/h ratio).
    ///
    /// Returns `None` when the scale or ratio is not strictly positive, since
    /// no real box has that shape.
    pub fn from_xysr(cx: f32, cy: f32, scale: f32, ratio: f32) -> Option<Self> {
        if !(scale > 0.0 && ratio > 0.0) || !cx.is_finite() || !cy.is_finite() {
            return None;
        }
        let width = (scale * ratio).sqrt();
        let height = scale / width;
        if !width.is_finite() || !height.is_finite() {
            return None;
        }
        Some(Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        })
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Encode into measurement space: (center_x, center_y, area, aspect_ratio).
    ///
    /// Boxes without a strictly positive width and height have no defined
    /// aspect ratio and are rejected.
    pub fn to_xysr(&self) -> Result<[f32; 4], MotionError> {
        let finite = self.x.is_finite() && self.y.is_finite();
        if !finite || !(self.width > 0.0 && self.height > 0.0) || !self.area().is_finite() {
            return Err(MotionError::DegenerateMeasurement {
                width: self.width,
                height: self.height,
            });
        }
        let (cx, cy) = self.center();
        Ok([cx, cy, self.area(), self.width / self.height])
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Get the area of the bounding box.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Whether the box can be placed on a frame: positive size, non-negative origin.
    pub fn is_valid_placement(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.x >= 0.0
            && self.y >= 0.0
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    pub fn iou(&self, other: &Rect) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let inter_width = (x2 - x1).max(0.0);
        let inter_height = (y2 - y1).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            (inter_area / union_area).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
