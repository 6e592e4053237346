pub mod error;
pub mod grid;
pub mod job;
pub mod math;
pub mod params;
pub mod random;
pub mod seed;

pub use error::{FractureError, Result};
pub use grid::{CellLabel, VoxelCoord, VoxelGrid};
pub use job::{FractureJob, FragmentMetadata};
pub use params::FractureParams;
pub use random::{RandomMode, RandomSource};
pub use seed::{DistanceMetric, FragmentImpact, Location, Seed};
