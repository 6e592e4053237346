use crate::math::Point3;

/// Integer coordinate of a voxel inside a [`VoxelGrid`](super::VoxelGrid).
///
/// Ordered lexicographically by `(x, y, z)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelCoord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl VoxelCoord {
    #[must_use]
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// The coordinate as a point in voxel space.
    #[must_use]
    pub fn to_point(self) -> Point3 {
        Point3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    /// The coordinate widened to signed components, for neighbourhood math.
    #[must_use]
    pub fn to_signed(self) -> [i64; 3] {
        [i64::from(self.x), i64::from(self.y), i64::from(self.z)]
    }
}

impl From<[u32; 3]> for VoxelCoord {
    fn from([x, y, z]: [u32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<VoxelCoord> for [u32; 3] {
    fn from(c: VoxelCoord) -> Self {
        [c.x, c.y, c.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_x_then_y_then_z() {
        let mut coords = vec![
            VoxelCoord::new(1, 0, 0),
            VoxelCoord::new(0, 2, 0),
            VoxelCoord::new(0, 1, 5),
            VoxelCoord::new(0, 1, 3),
        ];
        coords.sort();
        assert_eq!(
            coords,
            vec![
                VoxelCoord::new(0, 1, 3),
                VoxelCoord::new(0, 1, 5),
                VoxelCoord::new(0, 2, 0),
                VoxelCoord::new(1, 0, 0),
            ]
        );
    }
}
