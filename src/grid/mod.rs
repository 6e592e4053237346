mod boundary;
mod coord;
mod fill;
mod label;
mod query;

pub use coord::VoxelCoord;
pub use fill::MeshFill;
pub use label::{CellLabel, MAX_CELL_ID, VOXEL_EMPTY, VOXEL_FREE};

use tracing::debug;

use crate::error::{GridError, Result};
use crate::math::{Aabb, Point3, Vector3, TOLERANCE};

/// Dense regular grid of cell labels covering an axis-aligned box.
///
/// Cells are stored in a fixed-size buffer linearized as
/// `y * nx * nz + x * nz + z`. Downstream consumers read the packed buffer
/// directly, so this ordering is part of the interchange format.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    aabb: Aabb,
    num_divs: [u32; 3],
    cell_size: Vector3,
    cells: Box<[CellLabel]>,
}

impl VoxelGrid {
    /// Builds an empty grid of `subdivisions` cells spanning `aabb`.
    ///
    /// # Errors
    ///
    /// Returns an error if any subdivision count is zero or the box has a
    /// zero or non-finite extent on some axis.
    pub fn new(aabb: Aabb, subdivisions: [u32; 3]) -> Result<Self> {
        let [nx, ny, nz] = subdivisions;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(GridError::InvalidSubdivisions { nx, ny, nz }.into());
        }

        let extent = aabb.extent();
        if extent.iter().any(|e| !e.is_finite() || *e < TOLERANCE) {
            return Err(GridError::Degenerate(format!(
                "bounding box extent ({}, {}, {}) must be positive on every axis",
                extent.x, extent.y, extent.z
            ))
            .into());
        }

        let cell_size = extent.component_div(&Vector3::new(
            f64::from(nx),
            f64::from(ny),
            f64::from(nz),
        ));
        let len = nx as usize * ny as usize * nz as usize;
        debug!(nx, ny, nz, cells = len, "built voxel grid");

        Ok(Self {
            aabb,
            num_divs: subdivisions,
            cell_size,
            cells: vec![CellLabel::EMPTY; len].into_boxed_slice(),
        })
    }

    /// Bounding box covered by the grid.
    #[must_use]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Number of cells along each axis.
    #[must_use]
    pub fn subdivisions(&self) -> [u32; 3] {
        self.num_divs
    }

    /// World-space size of a single cell.
    #[must_use]
    pub fn cell_size(&self) -> &Vector3 {
        &self.cell_size
    }

    /// Total number of cells, `nx * ny * nz`.
    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Raw view of the cell buffer in linearized order.
    #[must_use]
    pub fn cells(&self) -> &[CellLabel] {
        &self.cells
    }

    /// Returns `true` if the signed coordinate addresses a cell.
    #[must_use]
    pub fn contains(&self, x: i64, y: i64, z: i64) -> bool {
        [x, y, z]
            .iter()
            .zip(self.num_divs)
            .all(|(&c, n)| c >= 0 && c < i64::from(n))
    }

    /// Linear index of `coord`, or `None` if it lies outside the grid.
    #[must_use]
    pub fn index_of(&self, coord: VoxelCoord) -> Option<usize> {
        let [nx, ny, nz] = self.num_divs;
        if coord.x >= nx || coord.y >= ny || coord.z >= nz {
            return None;
        }
        let (nx, nz) = (nx as usize, nz as usize);
        Some(coord.y as usize * nx * nz + coord.x as usize * nz + coord.z as usize)
    }

    /// Inverse of [`index_of`](Self::index_of).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn coord_of(&self, index: usize) -> Option<VoxelCoord> {
        if index >= self.cells.len() {
            return None;
        }
        let nx = self.num_divs[0] as usize;
        let nz = self.num_divs[2] as usize;
        let slab = nx * nz;
        let rest = index % slab;
        // Each quotient is bounded by a u32 subdivision count.
        Some(VoxelCoord::new(
            (rest / nz) as u32,
            (index / slab) as u32,
            (rest % nz) as u32,
        ))
    }

    /// Maps a world-space point to the cell containing it, clamping points
    /// outside the box to the nearest border cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the point has a non-finite component.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn point_to_cell(&self, position: &Point3) -> Result<VoxelCoord> {
        if position.iter().any(|c| !c.is_finite()) {
            return Err(GridError::Degenerate(format!("non-finite position {position}")).into());
        }

        let rel = (position - self.aabb.min).component_div(&self.cell_size);
        let axis = |i: usize| -> u32 {
            let last = self.num_divs[i] - 1;
            let cell = rel[i].floor();
            if cell <= 0.0 {
                0
            } else if cell >= f64::from(last) {
                last
            } else {
                cell as u32
            }
        };

        Ok(VoxelCoord::new(axis(0), axis(1), axis(2)))
    }

    /// Writes `label` into the cell containing `position`.
    ///
    /// # Errors
    ///
    /// Returns an error if the point has a non-finite component.
    pub fn insert(&mut self, position: &Point3, label: CellLabel) -> Result<VoxelCoord> {
        let coord = self.point_to_cell(position)?;
        self.set(coord, label)?;
        Ok(coord)
    }

    /// Label at `coord`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, coord: VoxelCoord) -> Option<CellLabel> {
        self.index_of(coord).map(|i| self.cells[i])
    }

    /// Overwrites the label at `coord`.
    ///
    /// # Errors
    ///
    /// Returns an error if `coord` lies outside the grid.
    pub fn set(&mut self, coord: VoxelCoord, label: CellLabel) -> Result<()> {
        let index = self.index_of(coord).ok_or(GridError::CoordOutOfRange {
            x: i64::from(coord.x),
            y: i64::from(coord.y),
            z: i64::from(coord.z),
        })?;
        self.cells[index] = label;
        Ok(())
    }

    /// Label at a signed coordinate. Anything outside the grid reads as
    /// [`CellLabel::EMPTY`], so neighbourhood scans may step one voxel past
    /// the border.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn at(&self, x: i64, y: i64, z: i64) -> CellLabel {
        if !self.contains(x, y, z) {
            return CellLabel::EMPTY;
        }
        self.get(VoxelCoord::new(x as u32, y as u32, z as u32))
            .unwrap_or(CellLabel::EMPTY)
    }

    #[must_use]
    pub fn is_occupied(&self, x: i64, y: i64, z: i64) -> bool {
        self.at(x, y, z).is_occupied()
    }

    #[must_use]
    pub fn is_empty(&self, x: i64, y: i64, z: i64) -> bool {
        self.at(x, y, z).is_empty()
    }

    /// Sets every non-empty cell to [`CellLabel::FREE`], dropping fragment
    /// ids and boundary markers.
    pub fn homogenize(&mut self) {
        for cell in self.cells.iter_mut().filter(|c| c.is_occupied()) {
            *cell = CellLabel::FREE;
        }
    }

    /// Empties every cell.
    pub fn reset_filling(&mut self) {
        self.cells.fill(CellLabel::EMPTY);
    }

    /// Packs the grid into its 16-bit interchange buffer.
    #[must_use]
    pub fn to_packed(&self) -> Vec<u16> {
        self.cells.iter().map(|c| c.to_bits()).collect()
    }

    /// Replaces the grid content with a packed buffer of identical size,
    /// typically the labeling produced by the partition step.
    ///
    /// # Errors
    ///
    /// Returns an error if `packed` does not hold exactly one label per cell.
    pub fn replace_packed(&mut self, packed: &[u16]) -> Result<()> {
        if packed.len() != self.cells.len() {
            return Err(GridError::BufferSizeMismatch {
                expected: self.cells.len(),
                actual: packed.len(),
            }
            .into());
        }
        for (cell, &bits) in self.cells.iter_mut().zip(packed) {
            *cell = CellLabel::from_bits(bits);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FractureError;
    use approx::assert_relative_eq;

    fn unit_grid(n: [u32; 3]) -> VoxelGrid {
        let max = Point3::new(f64::from(n[0]), f64::from(n[1]), f64::from(n[2]));
        VoxelGrid::new(Aabb::new(Point3::origin(), max), n).unwrap()
    }

    #[test]
    fn new_grid_is_empty() {
        let grid = unit_grid([3, 4, 5]);
        assert_eq!(grid.num_cells(), 60);
        assert!(grid.cells().iter().all(|c| c.is_empty()));
    }

    #[test]
    fn cell_size_per_axis() {
        let aabb = Aabb::new(Point3::new(-1.0, 0.0, 2.0), Point3::new(3.0, 1.0, 5.0));
        let grid = VoxelGrid::new(aabb, [8, 2, 6]).unwrap();
        assert_relative_eq!(grid.cell_size().x, 0.5);
        assert_relative_eq!(grid.cell_size().y, 0.5);
        assert_relative_eq!(grid.cell_size().z, 0.5);
    }

    #[test]
    fn rejects_degenerate_box() {
        let aabb = Aabb::new(Point3::origin(), Point3::new(1.0, 0.0, 1.0));
        let err = VoxelGrid::new(aabb, [2, 2, 2]).unwrap_err();
        assert!(matches!(err, FractureError::Grid(GridError::Degenerate(_))));
    }

    #[test]
    fn rejects_zero_subdivisions() {
        let aabb = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let err = VoxelGrid::new(aabb, [2, 0, 2]).unwrap_err();
        assert!(matches!(
            err,
            FractureError::Grid(GridError::InvalidSubdivisions { nx: 2, ny: 0, nz: 2 })
        ));
    }

    #[test]
    fn linearization_is_y_major() {
        let grid = unit_grid([3, 4, 5]);
        // y * nx * nz + x * nz + z
        assert_eq!(grid.index_of(VoxelCoord::new(1, 2, 3)), Some(2 * 15 + 5 + 3));
        assert_eq!(grid.index_of(VoxelCoord::new(3, 0, 0)), None);
    }

    #[test]
    fn linearization_round_trip() {
        let grid = unit_grid([3, 4, 5]);
        let mut seen = vec![false; grid.num_cells()];
        for x in 0..3 {
            for y in 0..4 {
                for z in 0..5 {
                    let coord = VoxelCoord::new(x, y, z);
                    let index = grid.index_of(coord).unwrap();
                    assert!(!seen[index], "index {index} reused");
                    seen[index] = true;
                    assert_eq!(grid.coord_of(index), Some(coord));
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(grid.coord_of(grid.num_cells()), None);
    }

    #[test]
    fn point_to_cell_floors_and_clamps() {
        let grid = unit_grid([4, 4, 4]);
        assert_eq!(
            grid.point_to_cell(&Point3::new(1.5, 0.2, 3.99)).unwrap(),
            VoxelCoord::new(1, 0, 3)
        );
        assert_eq!(
            grid.point_to_cell(&Point3::new(-3.0, 4.0, 100.0)).unwrap(),
            VoxelCoord::new(0, 3, 3)
        );
    }

    #[test]
    fn point_to_cell_rejects_nan() {
        let grid = unit_grid([4, 4, 4]);
        assert!(grid.point_to_cell(&Point3::new(f64::NAN, 0.0, 0.0)).is_err());
    }

    #[test]
    fn insert_and_query() {
        let mut grid = unit_grid([4, 4, 4]);
        let label = CellLabel::new(7).unwrap();
        let coord = grid.insert(&Point3::new(2.5, 1.5, 0.5), label).unwrap();
        assert_eq!(coord, VoxelCoord::new(2, 1, 0));
        assert_eq!(grid.at(2, 1, 0), label);
        assert!(grid.is_occupied(2, 1, 0));
        assert!(grid.is_empty(1, 1, 0));
    }

    #[test]
    fn out_of_range_reads_as_empty() {
        let mut grid = unit_grid([2, 2, 2]);
        grid.set(VoxelCoord::new(0, 0, 0), CellLabel::FREE).unwrap();
        assert!(grid.is_empty(-1, 0, 0));
        assert!(grid.is_empty(0, 2, 0));
        assert_eq!(grid.get(VoxelCoord::new(0, 0, 2)), None);
        assert!(grid.set(VoxelCoord::new(2, 0, 0), CellLabel::FREE).is_err());
    }

    #[test]
    fn homogenize_is_idempotent() {
        let mut grid = unit_grid([3, 3, 3]);
        grid.set(VoxelCoord::new(0, 0, 0), CellLabel::new(5).unwrap()).unwrap();
        grid.set(
            VoxelCoord::new(1, 1, 1),
            CellLabel::new(9).unwrap().with_boundary(true),
        )
        .unwrap();
        grid.set(VoxelCoord::new(2, 2, 2), CellLabel::FREE).unwrap();

        grid.homogenize();
        let once = grid.to_packed();
        grid.homogenize();
        assert_eq!(grid.to_packed(), once);

        assert_eq!(grid.at(0, 0, 0), CellLabel::FREE);
        assert_eq!(grid.at(1, 1, 1), CellLabel::FREE);
        assert_eq!(grid.at(2, 2, 2), CellLabel::FREE);
        assert_eq!(grid.cells().iter().filter(|c| c.is_empty()).count(), 24);
    }

    #[test]
    fn packed_buffer_swap() {
        let mut grid = unit_grid([2, 2, 2]);
        let mut packed = vec![0_u16; 8];
        packed[3] = 4 | 0x8000;
        grid.replace_packed(&packed).unwrap();
        let coord = grid.coord_of(3).unwrap();
        assert_eq!(grid.get(coord).unwrap().id(), 4);
        assert!(grid.get(coord).unwrap().is_boundary());
        assert_eq!(grid.to_packed(), packed);

        let err = grid.replace_packed(&[0; 7]).unwrap_err();
        assert!(matches!(
            err,
            FractureError::Grid(GridError::BufferSizeMismatch {
                expected: 8,
                actual: 7
            })
        ));
    }

    #[test]
    fn reset_filling_empties_grid() {
        let mut grid = unit_grid([2, 2, 2]);
        grid.set(VoxelCoord::new(1, 1, 1), CellLabel::FREE).unwrap();
        grid.reset_filling();
        assert!(grid.cells().iter().all(|c| c.is_empty()));
    }
}
