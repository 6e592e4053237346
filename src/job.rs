use tracing::{debug, info};

use crate::error::{GridError, Result};
use crate::grid::{CellLabel, MeshFill, VoxelGrid, VOXEL_FREE};
use crate::math::{Aabb, Point3};
use crate::params::FractureParams;
use crate::random::RandomSource;
use crate::seed::{FragmentImpact, MergeSeeds, NearSeeds, Seed, UniformSeeds};

/// Voxel statistics of one fragment in a labeled grid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FragmentMetadata {
    /// Fragment id as stored in the grid.
    pub id: u16,
    /// Cells labeled with this fragment.
    pub occupied_voxels: usize,
    /// Share of the object's occupied cells, in percent.
    pub percentage: f32,
    /// Total cells in the grid.
    pub total_voxels: usize,
}

/// One fracturing run over a single object.
///
/// Owns the voxel grid and the random source, so independent jobs never
/// share generator state and can run on separate threads.
pub struct FractureJob {
    params: FractureParams,
    grid: VoxelGrid,
    random: RandomSource,
}

impl FractureJob {
    /// Creates a job with an empty grid over `aabb`.
    ///
    /// # Errors
    ///
    /// Returns an error if `params` is invalid or `aabb` is degenerate.
    pub fn new(aabb: Aabb, params: FractureParams) -> Result<Self> {
        params.validate()?;
        let grid = VoxelGrid::new(aabb, params.subdivisions)?;
        let random = RandomSource::new(params.random_mode, params.rng_seed);
        Ok(Self {
            params,
            grid,
            random,
        })
    }

    /// Creates a job over the bounding box of a mesh and fills the grid
    /// with its surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh is empty or flat, a face is invalid, or
    /// `params` is invalid.
    pub fn from_mesh(
        vertices: &[Point3],
        faces: &[[u32; 3]],
        params: FractureParams,
    ) -> Result<Self> {
        let aabb = Aabb::from_points(vertices)
            .ok_or_else(|| GridError::Degenerate("mesh has no vertices".into()))?;
        let mut job = Self::new(aabb, params)?;
        job.fill_mesh(vertices, faces)?;
        Ok(job)
    }

    #[must_use]
    pub fn params(&self) -> &FractureParams {
        &self.params
    }

    #[must_use]
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Mutable grid access, e.g. to load the partition step's labeling.
    pub fn grid_mut(&mut self) -> &mut VoxelGrid {
        &mut self.grid
    }

    pub fn random_mut(&mut self) -> &mut RandomSource {
        &mut self.random
    }

    /// Consumes the job, handing the grid to downstream stages.
    #[must_use]
    pub fn into_grid(self) -> VoxelGrid {
        self.grid
    }

    /// Rasterizes a mesh surface into the grid as free cells.
    ///
    /// # Errors
    ///
    /// Returns an error if a face references a missing vertex or has zero
    /// area.
    pub fn fill_mesh(&mut self, vertices: &[Point3], faces: &[[u32; 3]]) -> Result<usize> {
        MeshFill::new(vertices, faces, CellLabel::FREE)
            .with_samples(self.params.num_samples)
            .execute(&mut self.grid, self.random.rng())
    }

    /// Places `num_seeds` seeds with the configured strategy and location.
    ///
    /// # Errors
    ///
    /// Returns an error if the search runs out of attempts.
    pub fn seed_uniform(&mut self) -> Result<Vec<Seed>> {
        UniformSeeds::new(self.params.num_seeds, self.params.location)
            .with_neighborhood(self.params.boundary_size)
            .with_max_attempts(self.params.max_attempts)
            .execute(&self.grid, &mut self.random)
    }

    /// Scatters `num_near_seeds` seeds around `impacts`.
    ///
    /// # Errors
    ///
    /// Returns an error if `impacts` is empty or an impact runs out of
    /// attempts.
    pub fn seed_near(&mut self, impacts: &[FragmentImpact]) -> Result<Vec<Seed>> {
        NearSeeds::new(
            self.params.num_impacts,
            self.params.num_near_seeds,
            self.params.spreading,
        )
        .with_neighborhood(self.params.boundary_size)
        .with_max_attempts(self.params.max_attempts)
        .execute(&self.grid, impacts, &mut self.random)
    }

    /// Attaches `seeds` to their nearest fragment with the configured
    /// metric.
    ///
    /// # Errors
    ///
    /// Returns an error if `fragments` is empty or holds an oversized id.
    pub fn merge(&self, fragments: &[FragmentImpact], seeds: &mut [Seed]) -> Result<()> {
        MergeSeeds::new(self.params.distance_metric).execute(fragments, seeds)
    }

    /// Full seeding pass: uniform seeds, then near seeds around them merged
    /// back into their nearest uniform seed when near seeds are requested.
    ///
    /// # Errors
    ///
    /// Propagates any seeding or merging error.
    pub fn plan_seeds(&mut self) -> Result<Vec<Seed>> {
        let fragments = self.seed_uniform()?;
        if self.params.num_near_seeds == 0 {
            info!(seeds = fragments.len(), "seeds planned");
            return Ok(fragments);
        }

        let mut near = self.seed_near(&fragments)?.split_off(fragments.len());
        self.merge(&fragments, &mut near)?;
        debug!(near = near.len(), "near seeds merged");

        let mut seeds = fragments;
        seeds.extend(near);
        info!(seeds = seeds.len(), "seeds planned");
        Ok(seeds)
    }

    /// Noise buffer for the partition step, `count` floats in `[0, 1)`.
    pub fn noise_buffer(&mut self, count: usize) -> Vec<f32> {
        let max_dim = self.grid.subdivisions().into_iter().max().unwrap_or(0);
        self.random.float_noise(max_dim as usize, count)
    }

    /// Per-fragment voxel counts of the (externally labeled) grid.
    ///
    /// Empty and free cells are not fragments and are left out.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn fragment_report(&self) -> Vec<FragmentMetadata> {
        let values = self.grid.count_values();
        let object_voxels = self.grid.num_occupied_voxels();
        let total_voxels = self.grid.num_cells();

        values
            .range(VOXEL_FREE + 1..)
            .map(|(&id, &occupied_voxels)| FragmentMetadata {
                id,
                occupied_voxels,
                percentage: (occupied_voxels as f64 / object_voxels.max(1) as f64 * 100.0) as f32,
                total_voxels,
            })
            .collect()
    }
}
