//! Error types for the tracking core.

use thiserror::Error;

/// Invalid matcher configuration, reported at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("iou threshold must be in (0, 1], got {0}")]
    InvalidIouThreshold(f32),
    #[error("min streak must be at least 1")]
    ZeroMinStreak,
    #[error("pool capacity must be at least 1")]
    ZeroPoolCapacity,
}

/// Misuse or exhaustion of a [`Pool`](crate::tracker::Pool).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("pool exhausted: all {capacity} slots are in use")]
    Exhausted { capacity: usize },
    #[error("handle {index}@{generation} is stale or was already released")]
    StaleHandle { index: u32, generation: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("cost at ({row}, {col}) is negative or not finite")]
    InvalidCost { row: usize, col: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    #[error("cannot encode box {width}x{height} as a measurement")]
    DegenerateMeasurement { width: f32, height: f32 },
    #[error("innovation covariance is singular")]
    SingularInnovation,
}

/// Any failure raised by the tracking core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    #[error(transparent)]
    Motion(#[from] MotionError),
}

pub type Result<T> = std::result::Result<T, Error>;
