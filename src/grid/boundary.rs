use tracing::debug;

use super::VoxelGrid;

impl VoxelGrid {
    /// Checks whether an occupied voxel touches empty space.
    ///
    /// A voxel is on the boundary if any neighbour within Chebyshev radius
    /// `neighborhood` is empty or falls outside the grid. Empty voxels are
    /// never boundary voxels.
    #[must_use]
    pub fn is_boundary(&self, x: i64, y: i64, z: i64, neighborhood: u32) -> bool {
        if !self.is_occupied(x, y, z) {
            return false;
        }

        let r = i64::from(neighborhood);
        for dx in -r..=r {
            for dy in -r..=r {
                for dz in -r..=r {
                    if (dx, dy, dz) != (0, 0, 0) && self.is_empty(x + dx, y + dy, z + dz) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Sets the boundary marker on every boundary voxel, leaving ids intact.
    ///
    /// Returns the number of marked voxels.
    pub fn detect_boundaries(&mut self, boundary_size: u32) -> usize {
        let marks: Vec<usize> = (0..self.num_cells())
            .filter(|&index| {
                self.coord_of(index).is_some_and(|c| {
                    let [x, y, z] = c.to_signed();
                    self.is_boundary(x, y, z, boundary_size)
                })
            })
            .collect();

        for &index in &marks {
            self.cells[index] = self.cells[index].with_boundary(true);
        }
        debug!(marked = marks.len(), boundary_size, "detected boundaries");
        marks.len()
    }

    /// Clears every boundary marker set by
    /// [`detect_boundaries`](Self::detect_boundaries).
    pub fn undo_mask(&mut self) {
        for cell in self.cells.iter_mut() {
            *cell = cell.unmask();
        }
    }
}
