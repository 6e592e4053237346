mod merge;
mod near;
mod uniform;

pub use merge::MergeSeeds;
pub use near::NearSeeds;
pub use uniform::UniformSeeds;

use crate::grid::{VoxelCoord, VOXEL_FREE};

/// Number of low bits of a seed id holding the base fragment id. The bits
/// above count how many seeds were merged into that fragment.
pub const ID_BIT_WIDTH: u32 = 10;

/// Mask selecting the base fragment id of a composite seed id.
pub const ID_MASK: u32 = (1 << ID_BIT_WIDTH) - 1;

/// Id given to the first seed of a fresh seed set; lower ids are reserved
/// for empty and free cells.
pub const FIRST_SEED_ID: u32 = VOXEL_FREE as u32 + 1;

/// Upper bound on candidate draws before a seed search gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1_000_000;

/// A fracture seed: a voxel plus the fragment id growing from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Seed {
    pub coord: VoxelCoord,
    pub id: u32,
}

/// A previously accepted seed, used as anchor for near-seed generation and
/// as merge target.
pub type FragmentImpact = Seed;

impl Seed {
    #[must_use]
    pub fn new(coord: VoxelCoord, id: u32) -> Self {
        Self { coord, id }
    }

    /// Fragment id with the merge counter stripped.
    #[must_use]
    pub fn base_id(self) -> u32 {
        self.id & ID_MASK
    }

    /// Merge counter packed above the base id.
    #[must_use]
    pub fn sub_id(self) -> u32 {
        self.id >> ID_BIT_WIDTH
    }
}

/// Which voxels a uniform seed search may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Location {
    /// Only boundary voxels.
    Outer,
    /// Only non-boundary voxels.
    Inner,
    /// Any occupied voxel.
    #[default]
    Both,
}

impl Location {
    /// Returns `true` if a voxel with the given boundary status passes.
    #[must_use]
    pub fn accepts(self, is_boundary: bool) -> bool {
        match self {
            Self::Outer => is_boundary,
            Self::Inner => !is_boundary,
            Self::Both => true,
        }
    }
}

/// Metric used to find the fragment nearest to a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
    Chebyshev,
}

impl DistanceMetric {
    /// Distance between two voxels in voxel units.
    #[must_use]
    pub fn distance(self, a: VoxelCoord, b: VoxelCoord) -> f64 {
        let d = (a.to_point() - b.to_point()).abs();
        match self {
            Self::Euclidean => d.norm(),
            Self::Manhattan => d.x + d.y + d.z,
            Self::Chebyshev => d.max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn metrics_on_pythagorean_offset() {
        let a = VoxelCoord::new(0, 0, 0);
        let b = VoxelCoord::new(3, 4, 0);
        assert_relative_eq!(DistanceMetric::Euclidean.distance(a, b), 5.0);
        assert_relative_eq!(DistanceMetric::Manhattan.distance(a, b), 7.0);
        assert_relative_eq!(DistanceMetric::Chebyshev.distance(b, a), 4.0);
    }

    #[test]
    fn location_filter() {
        assert!(Location::Outer.accepts(true));
        assert!(!Location::Outer.accepts(false));
        assert!(Location::Inner.accepts(false));
        assert!(!Location::Inner.accepts(true));
        assert!(Location::Both.accepts(true) && Location::Both.accepts(false));
    }

    #[test]
    fn id_packing() {
        let seed = Seed::new(VoxelCoord::default(), 7 | (3 << ID_BIT_WIDTH));
        assert_eq!(seed.base_id(), 7);
        assert_eq!(seed.sub_id(), 3);
    }
}
