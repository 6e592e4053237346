use std::collections::BTreeMap;

use super::{VoxelCoord, VoxelGrid};
use crate::error::Result;
use crate::math::{Aabb, Point3};

impl VoxelGrid {
    /// Number of non-empty cells.
    #[must_use]
    pub fn num_occupied_voxels(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// Histogram of cluster ids (boundary markers ignored), empty cells
    /// included under id `0`.
    #[must_use]
    pub fn count_values(&self) -> BTreeMap<u16, usize> {
        let mut values = BTreeMap::new();
        for cell in self.cells.iter() {
            *values.entry(cell.id()).or_insert(0) += 1;
        }
        values
    }

    /// World-space box covered by the cell at `coord`.
    #[must_use]
    pub fn cell_aabb(&self, coord: VoxelCoord) -> Aabb {
        let offset = coord.to_point().coords.component_mul(&self.cell_size);
        let min = self.aabb.min + offset;
        Aabb::new(min, min + self.cell_size)
    }

    /// World-space boxes of every occupied cell, in buffer order.
    #[must_use]
    pub fn occupied_aabbs(&self) -> Vec<Aabb> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_occupied())
            .filter_map(|(index, _)| self.coord_of(index))
            .map(|coord| self.cell_aabb(coord))
            .collect()
    }

    /// World-space center of the cell at `coord`.
    #[must_use]
    pub fn cell_center(&self, coord: VoxelCoord) -> Point3 {
        self.cell_aabb(coord).min + self.cell_size * 0.5
    }

    /// Cluster id of the cell containing each point, boundary marker
    /// stripped.
    ///
    /// # Errors
    ///
    /// Returns an error if any point has a non-finite component.
    pub fn query_cluster(&self, points: &[Point3]) -> Result<Vec<u16>> {
        points
            .iter()
            .map(|p| -> Result<u16> {
                let coord = self.point_to_cell(p)?;
                Ok(self.get(coord).map_or(0, |c| c.id()))
            })
            .collect()
    }
}
