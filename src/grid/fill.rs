use rand::Rng;
use tracing::debug;

use super::{CellLabel, VoxelGrid};
use crate::error::{GridError, Result};
use crate::math::{Point3, Triangle};

/// Rasterizes a triangle mesh's surface into a grid by random sampling.
///
/// Each face receives `num_samples + 1` uniformly distributed points, and
/// every point writes `label` into the cell that contains it.
pub struct MeshFill<'a> {
    vertices: &'a [Point3],
    faces: &'a [[u32; 3]],
    label: CellLabel,
    num_samples: u32,
}

impl<'a> MeshFill<'a> {
    /// Creates a new `MeshFill` operation drawing a single sample per face.
    #[must_use]
    pub fn new(vertices: &'a [Point3], faces: &'a [[u32; 3]], label: CellLabel) -> Self {
        Self {
            vertices,
            faces,
            label,
            num_samples: 0,
        }
    }

    /// Sets the number of extra samples drawn per face.
    #[must_use]
    pub fn with_samples(mut self, num_samples: u32) -> Self {
        self.num_samples = num_samples;
        self
    }

    /// Executes the fill, returning the number of inserted points.
    ///
    /// The whole mesh is validated before the grid is touched, so a failed
    /// fill leaves the grid unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if a face references a missing vertex or has zero
    /// area.
    pub fn execute<R: Rng + ?Sized>(&self, grid: &mut VoxelGrid, rng: &mut R) -> Result<usize> {
        let triangles = self.triangles()?;
        let per_face = self.num_samples as usize + 1;

        for triangle in &triangles {
            for _ in 0..per_face {
                grid.insert(&triangle.random_point(rng), self.label)?;
            }
        }

        let inserted = triangles.len() * per_face;
        debug!(faces = triangles.len(), inserted, "filled grid from mesh");
        Ok(inserted)
    }

    fn triangles(&self) -> Result<Vec<Triangle>> {
        self.faces
            .iter()
            .enumerate()
            .map(|(face, indices)| -> Result<Triangle> {
                let mut corners = [Point3::origin(); 3];
                for (corner, &index) in corners.iter_mut().zip(indices) {
                    *corner = *self.vertices.get(index as usize).ok_or(
                        GridError::FaceIndexOutOfRange {
                            face,
                            index,
                            vertices: self.vertices.len(),
                        },
                    )?;
                }

                let triangle = Triangle::new(corners[0], corners[1], corners[2]);
                if triangle.is_degenerate() {
                    return Err(GridError::Degenerate(format!("face {face} has zero area")).into());
                }
                Ok(triangle)
            })
            .collect()
    }
}

impl VoxelGrid {
    /// Inserts every point with the same label.
    ///
    /// # Errors
    ///
    /// Returns an error if any point has a non-finite component. Points
    /// before the offending one have already been written.
    pub fn insert_points<'p>(
        &mut self,
        points: impl IntoIterator<Item = &'p Point3>,
        label: CellLabel,
    ) -> Result<()> {
        for point in points {
            self.insert(point, label)?;
        }
        Ok(())
    }
}
