use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::{Location, Seed, DEFAULT_MAX_ATTEMPTS, FIRST_SEED_ID};
use crate::error::{Result, SeedError};
use crate::grid::{VoxelCoord, VoxelGrid};
use crate::random::RandomSource;

/// Places seeds on randomly drawn occupied voxels.
///
/// Candidates are drawn inside `subdivisions - 2` on each axis using the
/// attempt counter as sample index, and accepted when the voxel is
/// occupied, not yet chosen and passes the [`Location`] filter. Accepted
/// seeds are numbered from [`FIRST_SEED_ID`] in coordinate order.
pub struct UniformSeeds {
    num_seeds: usize,
    location: Location,
    neighborhood: u32,
    max_attempts: u32,
}

impl UniformSeeds {
    /// Creates a new `UniformSeeds` search.
    #[must_use]
    pub fn new(num_seeds: usize, location: Location) -> Self {
        Self {
            num_seeds,
            location,
            neighborhood: 1,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the Chebyshev radius used by the boundary test.
    #[must_use]
    pub fn with_neighborhood(mut self, neighborhood: u32) -> Self {
        self.neighborhood = neighborhood;
        self
    }

    /// Sets the number of candidate draws before the search fails.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Executes the search. The grid is only read.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::SearchExhausted`] if `max_attempts` candidates
    /// are drawn before `num_seeds` seeds are accepted, or
    /// [`SeedError::InvalidParameter`] if the grid is thinner than two
    /// voxels on some axis.
    pub fn execute(&self, grid: &VoxelGrid, random: &mut RandomSource) -> Result<Vec<Seed>> {
        let subdivisions = grid.subdivisions();
        if subdivisions.iter().any(|&n| n < 2) {
            return Err(SeedError::InvalidParameter(format!(
                "uniform seeding needs at least 2 voxels per axis, grid has {subdivisions:?}"
            ))
            .into());
        }

        let divs = subdivisions.map(|n| n - 2);
        let max_dim = divs.iter().copied().max().unwrap_or(0);
        random.init(max_dim as usize);

        let mut seeds = BTreeSet::new();
        let mut attempt: u32 = 0;

        while seeds.len() < self.num_seeds {
            if attempt == self.max_attempts {
                warn!(
                    max_attempts = self.max_attempts,
                    found = seeds.len(),
                    requested = self.num_seeds,
                    "uniform seed search exhausted"
                );
                return Err(SeedError::SearchExhausted {
                    max_attempts: self.max_attempts,
                    found: seeds.len(),
                    requested: self.num_seeds,
                }
                .into());
            }

            let coord = draw_candidate(random, divs, attempt);
            let [x, y, z] = coord.to_signed();

            if grid.is_occupied(x, y, z)
                && !seeds.contains(&coord)
                && self
                    .location
                    .accepts(grid.is_boundary(x, y, z, self.neighborhood))
            {
                seeds.insert(coord);
            }

            attempt += 1;
        }

        debug!(attempts = attempt, seeds = seeds.len(), "uniform seed search done");
        Ok(seeds
            .into_iter()
            .zip(FIRST_SEED_ID..)
            .map(|(coord, id)| Seed::new(coord, id))
            .collect())
    }
}

/// Draws one voxel in `[0, divs]` per axis, addressed by `attempt`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_candidate(random: &mut RandomSource, divs: [u32; 3], attempt: u32) -> VoxelCoord {
    let mut axis_value = |axis: usize| {
        random.next_int(0, i64::from(divs[axis]) + 1, u64::from(attempt), axis) as u32
    };
    let x = axis_value(0);
    let y = axis_value(1);
    let z = axis_value(2);
    VoxelCoord::new(x, y, z)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FractureError;
    use crate::grid::CellLabel;
    use crate::math::{Aabb, Point3};
    use crate::random::RandomMode;

    fn solid_grid(n: u32) -> VoxelGrid {
        let max = Point3::new(f64::from(n), f64::from(n), f64::from(n));
        let mut grid = VoxelGrid::new(Aabb::new(Point3::origin(), max), [n, n, n]).unwrap();
        for index in 0..grid.num_cells() {
            let coord = grid.coord_of(index).unwrap();
            grid.set(coord, CellLabel::FREE).unwrap();
        }
        grid
    }

    fn assert_unique(seeds: &[Seed]) {
        let coords: BTreeSet<_> = seeds.iter().map(|s| s.coord).collect();
        assert_eq!(coords.len(), seeds.len());
    }

    #[test]
    fn outer_seeds_are_boundary_voxels() {
        let grid = solid_grid(8);
        for mode in [RandomMode::Uniform, RandomMode::Halton, RandomMode::Normal] {
            let mut random = RandomSource::new(mode, Some(17));
            let seeds = UniformSeeds::new(6, Location::Outer)
                .execute(&grid, &mut random)
                .unwrap();
            assert_eq!(seeds.len(), 6, "{mode:?}");
            assert_unique(&seeds);
            for seed in &seeds {
                let [x, y, z] = seed.coord.to_signed();
                assert!(grid.is_occupied(x, y, z));
                assert!(grid.is_boundary(x, y, z, 1), "{mode:?} {seed:?}");
            }
        }
    }

    #[test]
    fn inner_seeds_avoid_boundary() {
        let grid = solid_grid(8);
        let mut random = RandomSource::new(RandomMode::Uniform, Some(4));
        let seeds = UniformSeeds::new(10, Location::Inner)
            .execute(&grid, &mut random)
            .unwrap();
        assert_unique(&seeds);
        for seed in &seeds {
            let [x, y, z] = seed.coord.to_signed();
            assert!(!grid.is_boundary(x, y, z, 1), "{seed:?}");
        }
    }

    #[test]
    fn ids_follow_coordinate_order() {
        let grid = solid_grid(6);
        let mut random = RandomSource::new(RandomMode::Uniform, Some(2));
        let seeds = UniformSeeds::new(5, Location::Both)
            .execute(&grid, &mut random)
            .unwrap();
        let ids: Vec<u32> = seeds.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 5, 6]);
        assert!(seeds.windows(2).all(|w| w[0].coord < w[1].coord));
    }

    #[test]
    fn seeds_skip_empty_voxels() {
        let mut grid = solid_grid(6);
        for index in 0..grid.num_cells() {
            let coord = grid.coord_of(index).unwrap();
            if coord.x < 3 {
                grid.set(coord, CellLabel::EMPTY).unwrap();
            }
        }
        let mut random = RandomSource::new(RandomMode::Uniform, Some(9));
        let seeds = UniformSeeds::new(8, Location::Both)
            .execute(&grid, &mut random)
            .unwrap();
        assert!(seeds.iter().all(|s| s.coord.x >= 3));
    }

    #[test]
    fn too_many_seeds_exhausts_search() {
        // A 4^3 solid has only 8 interior voxels, all within the draw range.
        let grid = solid_grid(4);
        let mut random = RandomSource::new(RandomMode::Uniform, Some(1));
        let err = UniformSeeds::new(9, Location::Inner)
            .with_max_attempts(5_000)
            .execute(&grid, &mut random)
            .unwrap_err();
        assert!(matches!(
            err,
            FractureError::Seed(SeedError::SearchExhausted {
                max_attempts: 5_000,
                found: 8,
                requested: 9
            })
        ));
    }

    #[test]
    fn empty_grid_exhausts_search() {
        let grid = VoxelGrid::new(
            Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)),
            [4, 4, 4],
        )
        .unwrap();
        let mut random = RandomSource::new(RandomMode::Halton, None);
        let result = UniformSeeds::new(1, Location::Both)
            .with_max_attempts(100)
            .execute(&grid, &mut random);
        assert!(result.is_err());
    }

    #[test]
    fn thin_grid_is_rejected() {
        let grid = VoxelGrid::new(
            Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)),
            [4, 1, 4],
        )
        .unwrap();
        let mut random = RandomSource::new(RandomMode::Uniform, Some(0));
        let err = UniformSeeds::new(1, Location::Both)
            .execute(&grid, &mut random)
            .unwrap_err();
        assert!(matches!(
            err,
            FractureError::Seed(SeedError::InvalidParameter(_))
        ));
    }

    #[test]
    fn zero_seeds_is_trivially_satisfied() {
        let grid = solid_grid(3);
        let mut random = RandomSource::new(RandomMode::Uniform, Some(0));
        let seeds = UniformSeeds::new(0, Location::Outer)
            .execute(&grid, &mut random)
            .unwrap();
        assert!(seeds.is_empty());
    }
}
