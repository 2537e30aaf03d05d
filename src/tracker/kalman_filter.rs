//! Constant-velocity Kalman filter over (center x, center y, scale, ratio).
//!
//! State is 8-dimensional: the four measured quantities followed by their
//! velocities. Vectors and covariances live in ndarray; the 4x4 innovation
//! covariance is inverted with nalgebra.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::MotionError;

const NDIM: usize = 4;

/// Noise diagonals for the box filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KalmanParams {
    /// Initial state covariance: large for the unobserved velocities.
    pub initial_covariance: [f64; 2 * NDIM],
    /// Process noise added on every prediction step.
    pub process_noise: [f64; 2 * NDIM],
    /// Measurement noise for (x, y, s, r).
    pub measurement_noise: [f64; NDIM],
}

impl Default for KalmanParams {
    fn default() -> Self {
        Self {
            initial_covariance: [10.0, 10.0, 10.0, 10.0, 1e4, 1e4, 1e4, 1e4],
            process_noise: [1.0, 1.0, 1.0, 1.0, 1e-2, 1e-2, 1e-4, 1e-4],
            measurement_noise: [1.0, 1.0, 10.0, 10.0],
        }
    }
}

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    initial_cov: Array2<f64>,
    process_cov: Array2<f64>,
    measurement_cov: Array2<f64>,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new(&KalmanParams::default())
    }
}

impl KalmanFilter {
    pub fn new(params: &KalmanParams) -> Self {
        let mut motion_mat = Array2::eye(2 * NDIM);
        for i in 0..NDIM {
            motion_mat[[i, NDIM + i]] = 1.0;
        }

        let mut update_mat = Array2::zeros((NDIM, 2 * NDIM));
        for i in 0..NDIM {
            update_mat[[i, i]] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            initial_cov: Array2::from_diag(&Array1::from_vec(params.initial_covariance.to_vec())),
            process_cov: Array2::from_diag(&Array1::from_vec(params.process_noise.to_vec())),
            measurement_cov: Array2::from_diag(&Array1::from_vec(
                params.measurement_noise.to_vec(),
            )),
        }
    }

    /// Start a track at `measurement` with zero velocity.
    pub fn initiate(&self, measurement: [f64; NDIM]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::zeros(2 * NDIM);
        let mut covariance = Array2::zeros((2 * NDIM, 2 * NDIM));
        self.initiate_into(measurement, &mut mean, &mut covariance);
        (mean, covariance)
    }

    /// Same as [`initiate`](Self::initiate), overwriting existing 8-dim
    /// buffers instead of allocating new ones.
    pub fn initiate_into(
        &self,
        measurement: [f64; NDIM],
        mean: &mut Array1<f64>,
        covariance: &mut Array2<f64>,
    ) {
        mean.fill(0.0);
        for (i, value) in measurement.into_iter().enumerate() {
            mean[i] = value;
        }
        covariance.assign(&self.initial_cov);
    }

    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let new_mean = self.motion_mat.dot(mean);
        let new_covariance =
            self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + &self.process_cov;

        (new_mean, new_covariance)
    }

    /// Project the state distribution into measurement space.
    pub fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + &self.measurement_cov;

        (mean_proj, covariance_proj)
    }

    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; NDIM],
    ) -> Result<(Array1<f64>, Array2<f64>), MotionError> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);

        let innovation = Array1::from_vec(measurement.to_vec()) - projected_mean;

        // K = P * H^T * S^-1
        let s_inv = invert_4x4(&projected_cov).ok_or(MotionError::SingularInnovation)?;
        let pht = covariance.dot(&self.update_mat.t()); // 8x4
        let kalman_gain = pht.dot(&s_inv); // 8x4

        let new_mean = mean + &kalman_gain.dot(&innovation);
        let new_covariance = covariance - &kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());

        Ok((new_mean, new_covariance))
    }
}

fn invert_4x4(m: &Array2<f64>) -> Option<Array2<f64>> {
    let nm = nalgebra::Matrix4::from_fn(|i, j| m[[i, j]]);
    let inv = nm.try_inverse()?;
    Some(Array2::from_shape_fn((NDIM, NDIM), |(i, j)| inv[(i, j)]))
}
