use crate::error::{Result, SeedError};
use crate::random::RandomMode;
use crate::seed::{DistanceMetric, Location, DEFAULT_MAX_ATTEMPTS};

/// Parameters of a fracture job.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FractureParams {
    /// Number of voxels along each axis.
    pub subdivisions: [u32; 3],
    /// Seeds placed by the uniform search.
    pub num_seeds: usize,
    /// Strategy used to draw seed coordinates.
    pub random_mode: RandomMode,
    /// Metric used when merging seeds into fragments.
    pub distance_metric: DistanceMetric,
    /// Which voxels the uniform search may pick.
    pub location: Location,
    /// Chebyshev radius of the boundary test.
    pub boundary_size: u32,
    /// Extra surface samples per triangle when filling from a mesh.
    pub num_samples: u32,
    /// Impacts visited by the near-seed search.
    pub num_impacts: usize,
    /// Seeds placed by the near-seed search.
    pub num_near_seeds: usize,
    /// Bias strength of near-seed offsets; larger keeps seeds closer.
    pub spreading: f64,
    /// Candidate draws allowed per search before giving up.
    pub max_attempts: u32,
    /// Seed of the job's generator; `None` draws one from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for FractureParams {
    fn default() -> Self {
        Self {
            subdivisions: [64, 64, 64],
            num_seeds: 8,
            random_mode: RandomMode::Uniform,
            distance_metric: DistanceMetric::Euclidean,
            location: Location::Both,
            boundary_size: 1,
            num_samples: 20,
            num_impacts: 0,
            num_near_seeds: 0,
            spreading: 1.0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rng_seed: None,
        }
    }
}

impl FractureParams {
    /// Checks the parameters before any work is done.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let invalid =
            |msg: String| -> Result<()> { Err(SeedError::InvalidParameter(msg).into()) };

        if self.subdivisions.iter().any(|&n| n < 2) {
            return invalid(format!(
                "subdivisions must be at least 2 per axis, got {:?}",
                self.subdivisions
            ));
        }
        if !(self.spreading.is_finite() && self.spreading > 0.0) {
            return invalid(format!("spreading must be positive, got {}", self.spreading));
        }
        if self.max_attempts == 0 {
            return invalid("max_attempts must be positive".into());
        }
        if self.num_near_seeds > 0 && self.num_impacts == 0 {
            return invalid("num_near_seeds requires num_impacts > 0".into());
        }
        Ok(())
    }
}
